//  TOKEN.rs
//    by Lut99
//
//  Description:
//!   Implements [`DeonticTokenInstance`] and its [`TokenState`] lifecycle, minted from a
//!   [`DeonticToken`](crate::model::token::DeonticToken) template.
//

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::token::DeonticToken;
use crate::value::Value;


/***** LIBRARY *****/
/// The lifecycle state of a [`DeonticTokenInstance`].
///
/// Monotonic: a token instance visits `Inactive -> Active -> Discharged` at most once each,
/// never backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenState {
    Inactive,
    Active,
    Discharged,
}
impl TokenState {
    /// Checks whether `self -> next` is a legal, forward-only transition.
    #[inline]
    pub fn can_advance_to(&self, next: TokenState) -> bool {
        matches!((self, next), (TokenState::Inactive, TokenState::Active) | (TokenState::Active, TokenState::Discharged))
    }
}
impl Display for TokenState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "{}", match self {
            Self::Inactive => "INACTIVE",
            Self::Active => "ACTIVE",
            Self::Discharged => "DISCHARGED",
        })
    }
}

/// A live, stateful deontic token held by a party, minted from a
/// [`DeonticToken`](crate::model::token::DeonticToken) template.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeonticTokenInstance {
    /// The unique identifier of this token instance.
    pub instance_id: String,
    /// The template this instance was minted from, carried directly rather than looked up by
    /// name so activation/discharge/embargo checks never depend on the minting role still being
    /// reachable from wherever the token happens to be held.
    pub template: DeonticToken,
    /// The name of the party currently holding this token.
    pub owner: String,
    /// The current lifecycle state of this token.
    pub state: TokenState,
    /// The parameter bindings this token was minted with, used to evaluate its guards and
    /// trigger/finish expressions.
    pub context: HashMap<String, Value>,
}
impl DeonticTokenInstance {
    /// Constructor for a DeonticTokenInstance.
    ///
    /// Starts in [`TokenState::Active`] if `template` declares no `activation_trigger`, and in
    /// [`TokenState::Inactive`] otherwise.
    pub fn new(instance_id: impl Into<String>, template: DeonticToken, owner: impl Into<String>, context: HashMap<String, Value>) -> Self {
        let state = if template.activation_trigger.is_none() { TokenState::Active } else { TokenState::Inactive };
        Self { instance_id: instance_id.into(), template, owner: owner.into(), state, context }
    }

    /// Attempts to advance this instance to the given state.
    ///
    /// Returns `false`, leaving `self.state` untouched, if the transition is not forward-only.
    pub fn advance_to(&mut self, next: TokenState) -> bool {
        if !self.state.can_advance_to(next) {
            return false;
        }
        self.state = next;
        true
    }
}
impl Display for DeonticTokenInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "DeonticTokenInstance(id={}, template={}, owner={}, state={})", self.instance_id, self.template.name, self.owner, self.state)
    }
}


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::token::{DeonticTokenBuilder, TokenType};
    use crate::model::vocabulary::Event;

    #[test]
    fn token_state_transitions_are_forward_only() {
        assert!(TokenState::Inactive.can_advance_to(TokenState::Active));
        assert!(TokenState::Active.can_advance_to(TokenState::Discharged));
        assert!(!TokenState::Inactive.can_advance_to(TokenState::Discharged));
        assert!(!TokenState::Active.can_advance_to(TokenState::Inactive));
        assert!(!TokenState::Discharged.can_advance_to(TokenState::Active));
    }

    #[test]
    fn advance_to_rejects_illegal_jump() {
        let template = DeonticTokenBuilder::new(TokenType::Burden, "Borrow").activation_trigger(Event::new("Lent", vec![])).build();
        let mut instance = DeonticTokenInstance::new("token-1", template, "alice", HashMap::new());
        assert!(!instance.advance_to(TokenState::Discharged));
        assert_eq!(instance.state, TokenState::Inactive);
        assert!(instance.advance_to(TokenState::Active));
        assert_eq!(instance.state, TokenState::Active);
        assert!(instance.advance_to(TokenState::Discharged));
        assert_eq!(instance.state, TokenState::Discharged);
    }

    #[test]
    fn new_with_no_activation_trigger_starts_active() {
        let template = DeonticTokenBuilder::new(TokenType::Permit, "AlwaysOn").build();
        let instance = DeonticTokenInstance::new("token-2", template, "alice", HashMap::new());
        assert_eq!(instance.state, TokenState::Active);
    }
}
