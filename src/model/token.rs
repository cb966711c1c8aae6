//  TOKEN.rs
//    by Lut99
//
//  Description:
//!   Implements [`DeonticToken`], the static deontic-token template minted into
//!   [`DeonticTokenInstance`](crate::runtime::token::DeonticTokenInstance)s by the engine.
//

use std::fmt::{Display, Formatter, Result as FResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::guard::Guard;
use super::vocabulary::{Event, EventExpression};


/***** LIBRARY *****/
/// The three deontic modalities a token may carry (Clause 6.4.1 of the standard this model
/// derives from).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenType {
    /// An obligation to act.
    Burden,
    /// A permission to act.
    Permit,
    /// A prohibition screening actions before any other effect is considered.
    Embargo,
}

/// An enterprise object expressing a constraint on the ability of an active enterprise object
/// holding it to perform certain actions. A deontic token is held by exactly one active
/// enterprise object and is not itself active (Clause 6.4.1).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeonticToken {
    /// Which of the three modalities this token carries.
    pub token_type: TokenType,
    /// The name of this token template.
    pub name: String,
    /// The named parameters this token's context is indexed by when minted.
    pub parameters: Vec<String>,
    /// The name of the role this token constrains, if any.
    pub affected_role: Option<String>,
    /// A guard that must hold before the token may transition `INACTIVE -> ACTIVE`.
    pub pre_activation_guard: Option<Guard>,
    /// The event whose occurrence activates this token.
    pub activation_trigger: Option<Event>,
    /// The event expression whose satisfaction discharges this token once active.
    pub finish_expression: Option<EventExpression>,
    /// A guard re-checked before honouring the discharge triggered by `finish_expression`.
    pub post_event_guard: Option<Guard>,
}
impl DeonticToken {
    /// Checks whether this template describes a permit.
    #[inline]
    pub fn is_permit(&self) -> bool { self.token_type == TokenType::Permit }

    /// Checks whether this template describes a burden.
    #[inline]
    pub fn is_burden(&self) -> bool { self.token_type == TokenType::Burden }

    /// Checks whether this template describes an embargo.
    #[inline]
    pub fn is_embargo(&self) -> bool { self.token_type == TokenType::Embargo }
}
impl Display for DeonticToken {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{} ({:?})", self.name, self.token_type) }
}

/// Builder for [`DeonticToken`], mirroring [`CommunityBuilder`](super::community::CommunityBuilder)'s
/// incremental style.
#[derive(Default)]
pub struct DeonticTokenBuilder {
    token_type: Option<TokenType>,
    name: Option<String>,
    parameters: Vec<String>,
    affected_role: Option<String>,
    pre_activation_guard: Option<Guard>,
    activation_trigger: Option<Event>,
    finish_expression: Option<EventExpression>,
    post_event_guard: Option<Guard>,
}
impl DeonticTokenBuilder {
    /// Starts building a token of the given type with the given name.
    pub fn new(token_type: TokenType, name: impl Into<String>) -> Self {
        Self { token_type: Some(token_type), name: Some(name.into()), ..Default::default() }
    }

    /// Sets the parameter names this token is indexed by.
    pub fn parameters(mut self, parameters: Vec<String>) -> Self { self.parameters = parameters; self }

    /// Sets the role this token affects.
    pub fn affected_role(mut self, role: impl Into<String>) -> Self { self.affected_role = Some(role.into()); self }

    /// Sets the pre-activation guard.
    pub fn pre_activation_guard(mut self, guard: Guard) -> Self { self.pre_activation_guard = Some(guard); self }

    /// Sets the activation-triggering event.
    pub fn activation_trigger(mut self, event: Event) -> Self { self.activation_trigger = Some(event); self }

    /// Sets the discharging event expression.
    pub fn finish_expression(mut self, expr: EventExpression) -> Self { self.finish_expression = Some(expr); self }

    /// Sets the post-event guard.
    pub fn post_event_guard(mut self, guard: Guard) -> Self { self.post_event_guard = Some(guard); self }

    /// Finalizes construction.
    ///
    /// # Panics
    /// Panics if `token_type`/`name` were not set; this only happens if [`DeonticTokenBuilder::new`]
    /// was bypassed, which is impossible through the public API.
    pub fn build(self) -> DeonticToken {
        DeonticToken {
            token_type: self.token_type.expect("token_type set by new()"),
            name: self.name.expect("name set by new()"),
            parameters: self.parameters,
            affected_role: self.affected_role,
            pre_activation_guard: self.pre_activation_guard,
            activation_trigger: self.activation_trigger,
            finish_expression: self.finish_expression,
            post_event_guard: self.post_event_guard,
        }
    }
}
