//  ARTIFACT.rs
//    by Lut99
//
//  Description:
//!   Implements [`Artifact`], the static template from which [`ArtifactInstance`](crate::runtime::artifact::ArtifactInstance)s
//!   are minted.
//

use std::fmt::{Display, Formatter, Result as FResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::vocabulary::Property;


/***** LIBRARY *****/
/// The role (with respect to an action) in which an enterprise object fulfilling it is referenced
/// by the action; that object may be called an artifact (Clause 6.3.3 of the standard this model
/// derives from).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Artifact {
    /// The name of this artifact template.
    pub name: String,
    /// The names of the community roles permitted to hold an instance of this artifact.
    pub parties: Vec<String>,
    /// The properties an instance of this artifact carries.
    pub properties: Vec<Property>,
}
impl Artifact {
    /// Constructor for an Artifact.
    #[inline]
    pub fn new(name: impl Into<String>, parties: Vec<String>, properties: Vec<Property>) -> Self {
        Self { name: name.into(), parties, properties }
    }

    /// Looks up a declared property by name.
    #[inline]
    pub fn get_property(&self, name: &str) -> Option<&Property> { self.properties.iter().find(|p| p.name == name) }
}
impl Display for Artifact {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.name) }
}
