//  ARTIFACT.rs
//    by Lut99
//
//  Description:
//!   Implements [`ArtifactInstance`], a live instance of an [`Artifact`](crate::model::artifact::Artifact)
//!   template carrying runtime property values.
//

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::Value;


/***** LIBRARY *****/
/// A live instance of an artifact template, holding concrete property values.
///
/// Property access falls through to the `properties` map untyped, since the set of properties a
/// template declares is only known once a community's model graph is loaded.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArtifactInstance {
    /// The unique identifier of this instance, distinct from its template's name.
    pub instance_id: String,
    /// The name of the [`Artifact`](crate::model::artifact::Artifact) template this instance was created from.
    pub template_name: String,
    /// The live property values of this instance.
    pub properties: HashMap<String, Value>,
}
impl ArtifactInstance {
    /// Constructor for an ArtifactInstance.
    #[inline]
    pub fn new(instance_id: impl Into<String>, template_name: impl Into<String>, properties: HashMap<String, Value>) -> Self {
        Self { instance_id: instance_id.into(), template_name: template_name.into(), properties }
    }

    /// Looks up a property by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> { self.properties.get(name) }

    /// Sets a property, returning the previous value if one was set.
    #[inline]
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> { self.properties.insert(name.into(), value) }
}
impl Display for ArtifactInstance {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}[{}]", self.template_name, self.instance_id) }
}
