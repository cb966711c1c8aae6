//  ROLE.rs
//    by Lut99
//
//  Description:
//!   Implements [`Role`], a named set of actions and deontic token templates within a
//!   community.
//

use std::fmt::{Display, Formatter, Result as FResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::token::{DeonticToken, TokenType};


/***** LIBRARY *****/
/// A role within a community: the set of actions a party fulfilling it may perform, and the
/// deontic token templates scoped to it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Role {
    /// The name of this role.
    pub name: String,
    /// A free-text description of this role's purpose.
    pub description: Option<String>,
    /// The actions this role may perform.
    pub actions: Vec<Action>,
    /// The deontic token templates scoped to this role.
    pub tokens: Vec<DeonticToken>,
}
impl Role {
    /// Constructor for a Role.
    #[inline]
    pub fn new(name: impl Into<String>, description: Option<String>, actions: Vec<Action>, tokens: Vec<DeonticToken>) -> Self {
        Self { name: name.into(), description, actions, tokens }
    }

    /// Looks up an action by name.
    #[inline]
    pub fn get_action(&self, name: &str) -> Option<&Action> { self.actions.iter().find(|a| a.name() == name) }

    /// Looks up a deontic token template by name.
    #[inline]
    pub fn get_token(&self, name: &str) -> Option<&DeonticToken> { self.tokens.iter().find(|t| t.name == name) }

    /// Returns the burden templates scoped to this role.
    #[inline]
    pub fn burdens(&self) -> impl Iterator<Item = &DeonticToken> { self.tokens.iter().filter(|t| t.token_type == TokenType::Burden) }

    /// Returns the permit templates scoped to this role.
    #[inline]
    pub fn permits(&self) -> impl Iterator<Item = &DeonticToken> { self.tokens.iter().filter(|t| t.token_type == TokenType::Permit) }

    /// Returns the embargo templates scoped to this role.
    #[inline]
    pub fn embargoes(&self) -> impl Iterator<Item = &DeonticToken> { self.tokens.iter().filter(|t| t.token_type == TokenType::Embargo) }
}
impl Display for Role {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.name) }
}
