//  VALUE.rs
//    by Lut99
//
//  Description:
//!   Defines the dynamic [`Value`] that flows through guard contexts,
//!   artifact properties and deontic token contexts.
//

use std::fmt::{Display, Formatter, Result as FResult};
use std::sync::Arc;

use crate::model::policy::{Duration, NumberInterval};
use crate::runtime::artifact::ArtifactInstance;
use crate::runtime::party::Party;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};


/***** LIBRARY *****/
/// A dynamically-typed value.
///
/// Guard expressions, artifact properties and token contexts are all untyped at construction
/// time, so they all flow through this single enum rather than through a family of
/// strongly-typed columns.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind"))]
pub enum Value {
    /// The absence of a value (e.g. a property never set).
    Unit,
    /// A boolean.
    Bool(bool),
    /// A number. Kept as `f64` throughout; this crate does not distinguish integers from floats.
    Number(f64),
    /// A string.
    String(String),
    /// A reference to a party in the simulation.
    Party(Arc<Party>),
    /// A reference to a live artifact instance.
    Artifact(Arc<ArtifactInstance>),
    /// A policy duration value.
    Duration(Duration),
    /// A policy numeric interval.
    Interval(NumberInterval),
}
impl Value {
    /// Returns this value as a [`bool`], if it is one.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns this value as an [`f64`], if it is a number.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns this value as a [`str`], if it is a string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns this value as a [`Party`], if it is one.
    #[inline]
    pub fn as_party(&self) -> Option<&Arc<Party>> {
        match self {
            Self::Party(p) => Some(p),
            _ => None,
        }
    }

    /// Returns this value as an [`ArtifactInstance`], if it is one.
    #[inline]
    pub fn as_artifact(&self) -> Option<&Arc<ArtifactInstance>> {
        match self {
            Self::Artifact(a) => Some(a),
            _ => None,
        }
    }

    /// Looks up a named field on this value, for guard expressions like `self.name` or
    /// `loan.isOverdue`. Parties only expose `name`; artifacts fall through to their
    /// `properties` map for anything beyond `instance_id`.
    pub fn field(&self, name: &str) -> Option<Value> {
        match self {
            Self::Party(p) => match name {
                "name" => Some(Value::String(p.name.clone())),
                _ => None,
            },
            Self::Artifact(a) => match name {
                "instance_id" => Some(Value::String(a.instance_id.clone())),
                _ => a.properties.get(name).cloned(),
            },
            _ => None,
        }
    }
}
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Unit => write!(f, "()"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Party(p) => write!(f, "{}", p.name),
            Self::Artifact(a) => write!(f, "{}", a.instance_id),
            Self::Duration(d) => write!(f, "{d}"),
            Self::Interval(i) => write!(f, "{i}"),
        }
    }
}
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unit, Self::Unit) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Party(a), Self::Party(b)) => Arc::ptr_eq(a, b) || a.name == b.name,
            (Self::Artifact(a), Self::Artifact(b)) => Arc::ptr_eq(a, b) || a.instance_id == b.instance_id,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Interval(a), Self::Interval(b)) => a == b,
            _ => false,
        }
    }
}
impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self { Self::Bool(value) }
}
impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self { Self::Number(value) }
}
impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self { Self::String(value.into()) }
}
impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self { Self::String(value) }
}
impl From<Arc<Party>> for Value {
    #[inline]
    fn from(value: Arc<Party>) -> Self { Self::Party(value) }
}
impl From<Arc<ArtifactInstance>> for Value {
    #[inline]
    fn from(value: Arc<ArtifactInstance>) -> Self { Self::Artifact(value) }
}
