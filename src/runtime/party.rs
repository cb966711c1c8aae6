//  PARTY.rs
//    by Lut99
//
//  Description:
//!   Implements [`Party`], the runtime enterprise object that fulfills roles and carries
//!   deontic tokens.
//

use std::fmt::{Display, Formatter, Result as FResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};


/***** LIBRARY *****/
/// A natural person or other entity considered to have some of the rights, powers and duties of
/// a natural person (Clause 6.6.1 of the standard this model derives from).
///
/// Unlike the community-level [`Role`](crate::model::role::Role) template, a `Party` is a runtime
/// object: it is created by the engine and tracked by identity, not structurally compared.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Party {
    /// The name of this party, unique within the engine that created it.
    pub name: String,
    /// The names of the community roles this party currently fulfills.
    pub fulfills_roles: Vec<String>,
}
impl Party {
    /// Constructor for a Party.
    #[inline]
    pub fn new(name: impl Into<String>, fulfills_roles: Vec<String>) -> Self { Self { name: name.into(), fulfills_roles } }

    /// Checks whether this party fulfills the named role.
    #[inline]
    pub fn has_role(&self, role_name: &str) -> bool { self.fulfills_roles.iter().any(|r| r == role_name) }
}
impl Display for Party {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.name) }
}
