//  ACTION.rs
//    by Lut99
//
//  Description:
//!   Implements the [`Action`] family: basic actions, speech acts, authorizations,
//!   declarations and delegations, each a distinguishable unit of behaviour a role may
//!   perform.
//

use std::fmt::{Display, Formatter, Result as FResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::guard::Guard;
use super::token::DeonticToken;
use super::vocabulary::{Event, Parameter};


/***** LIBRARY *****/
/// The kind of deontic token a [`Delegation`] hands off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DelegatedToken {
    Permit,
    Burden,
}

/// A call to an action, nested within a [`BasicAction`]'s body.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionCall {
    /// The name of the role the called action is performed as.
    pub role: String,
    /// The name of the action to call.
    pub action: String,
    /// The names of the arguments to forward, in declaration order.
    pub arguments: Vec<String>,
}
impl ActionCall {
    /// Constructor for an ActionCall.
    #[inline]
    pub fn new(role: impl Into<String>, action: impl Into<String>, arguments: Vec<String>) -> Self {
        Self { role: role.into(), action: action.into(), arguments }
    }
}

/// The common fields every action variant carries, regardless of shape.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionHeader {
    /// The name of this action.
    pub name: String,
    /// The action's formal parameters.
    pub parameters: Vec<Parameter>,
    /// The guard that must hold for this action to be performed.
    pub guard: Option<Guard>,
    /// The event emitted, if any, once this action completes successfully.
    pub trigger_event: Option<Event>,
}

/// A distinguishable unit of behaviour a role may perform (Clause 6.3 of the standard this model
/// derives from). Kept as a tagged sum over the concrete variants rather than as an inheritance
/// hierarchy, since the variant set is closed and known up front.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Action {
    /// A plain action with no deontic side effects of its own, optionally calling other actions.
    Basic { header: ActionHeader, return_type: Option<String>, calls: Vec<ActionCall> },
    /// An action whose performance results in a change to the tokens held by the parties
    /// involved (Clause 6.4.7).
    SpeechAct { header: ActionHeader, tokens: Vec<DeonticToken> },
    /// A speech act indicating that a behaviour shall not be prevented; an empowerment rather
    /// than a mere permission (Clause 6.6.4).
    Authorization { header: ActionHeader, tokens: Vec<DeonticToken> },
    /// A speech act with no additional fields of its own.
    Declaration { header: ActionHeader, tokens: Vec<DeonticToken> },
    /// The speech act that assigns authorization, responsibility or provision of a service to
    /// another object; once made, a delegation may later be withdrawn (Clause 6.6.6).
    Delegation { header: ActionHeader, tokens: Vec<DeonticToken>, token_type: DelegatedToken, token_name: String, agent: Option<String> },
}
impl Action {
    /// Returns this action's shared header.
    pub fn header(&self) -> &ActionHeader {
        match self {
            Self::Basic { header, .. }
            | Self::SpeechAct { header, .. }
            | Self::Authorization { header, .. }
            | Self::Declaration { header, .. }
            | Self::Delegation { header, .. } => header,
        }
    }

    /// Returns this action's name.
    #[inline]
    pub fn name(&self) -> &str { &self.header().name }

    /// Returns the tokens this action, if a speech act, mints upon success.
    pub fn tokens(&self) -> &[DeonticToken] {
        match self {
            Self::Basic { .. } => &[],
            Self::SpeechAct { tokens, .. } | Self::Authorization { tokens, .. } | Self::Declaration { tokens, .. } | Self::Delegation { tokens, .. } => tokens,
        }
    }
}
impl Display for Action {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.name()) }
}
