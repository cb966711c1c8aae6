//  VOCABULARY.rs
//    by Lut99
//
//  Description:
//!   Implements the immutable domain vocabulary: [`SimpleType`], [`Parameter`], [`Property`],
//!   [`Event`] and [`EventExpression`].
//

use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};


/***** LIBRARY *****/
/// A named scalar type tag, referenced by [`Parameter`] and [`Property`] via its name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimpleType {
    /// The name of this type, e.g. `"String"` or `"Party"`.
    pub name: String,
}
impl SimpleType {
    /// Constructor for a SimpleType.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }
}
impl Display for SimpleType {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.name) }
}

/// A named, typed slot in an action's parameter list or an event's artifact list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Parameter {
    /// The name of this parameter.
    pub name: String,
    /// The tag name of the [`SimpleType`] this parameter carries.
    pub type_hint: String,
}
impl Parameter {
    /// Constructor for a Parameter.
    #[inline]
    pub fn new(name: impl Into<String>, type_hint: impl Into<String>) -> Self { Self { name: name.into(), type_hint: type_hint.into() } }
}

/// A named, typed slot in an [`Artifact`](crate::model::artifact::Artifact)'s property list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Property {
    /// The name of this property.
    pub name: String,
    /// The tag name of the [`SimpleType`] this property carries.
    pub type_hint: String,
}
impl Property {
    /// Constructor for a Property.
    #[inline]
    pub fn new(name: impl Into<String>, type_hint: impl Into<String>) -> Self { Self { name: name.into(), type_hint: type_hint.into() } }
}

/// A single named event, identified by name within its owning community.
///
/// Events are values; their _occurrence_ is external state kept by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    /// The name of this event.
    pub name: String,
    /// The ordered parameter list describing the artifacts carried by an occurrence of this event.
    pub artifacts: Vec<Parameter>,
}
impl Event {
    /// Constructor for an Event.
    #[inline]
    pub fn new(name: impl Into<String>, artifacts: Vec<Parameter>) -> Self { Self { name: name.into(), artifacts } }
}
impl Display for Event {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.name) }
}

/// The Boolean operator of a non-leaf [`EventExpression`] node.
///
/// NOTE: some source grammars for this model name their AND/OR AST tags the other way around
/// (an `EventExpression` tag meaning AND, an `AndExpression` tag meaning OR). This enum only
/// ever carries the semantic operator (`And`/`Or`); untangling a source grammar's tag naming is
/// the hydrator's problem, not this type's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventOp {
    /// All operands must hold.
    And,
    /// At least one operand must hold.
    Or,
}

/// A Boolean combination of [`Event`]s, used to declare when a deontic token is discharged.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventExpression {
    /// A leaf referencing a single event.
    Leaf(Event),
    /// A Boolean combination of child expressions.
    Node { op: EventOp, operands: Vec<EventExpression> },
}
impl EventExpression {
    /// Constructs a leaf expression wrapping a single event.
    #[inline]
    pub fn leaf(event: Event) -> Self { Self::Leaf(event) }

    /// Constructs an AND node over the given operands.
    #[inline]
    pub fn and(operands: Vec<EventExpression>) -> Self { Self::Node { op: EventOp::And, operands } }

    /// Constructs an OR node over the given operands.
    #[inline]
    pub fn or(operands: Vec<EventExpression>) -> Self { Self::Node { op: EventOp::Or, operands } }

    /// Evaluates this expression given a set of occurred events.
    ///
    /// Pure and total: AND with no operands is vacuously true, OR with no operands is false, and
    /// (since this implementation only ever constructs `And`/`Or` nodes) there is no "unknown
    /// operator" case to fall through to false.
    ///
    /// # Arguments
    /// - `occurred`: the set of events considered to have occurred "now".
    ///
    /// # Returns
    /// Whether this expression holds.
    pub fn evaluate(&self, occurred: &HashSet<Event>) -> bool {
        match self {
            Self::Leaf(event) => occurred.contains(event),
            Self::Node { op: EventOp::And, operands } => operands.iter().all(|o| o.evaluate(occurred)),
            Self::Node { op: EventOp::Or, operands } => operands.iter().any(|o| o.evaluate(occurred)),
        }
    }
}


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    fn ev(name: &str) -> Event { Event::new(name, vec![]) }

    #[test]
    fn and_with_no_operands_is_vacuously_true() {
        let expr = EventExpression::and(vec![]);
        assert!(expr.evaluate(&HashSet::new()));
    }

    #[test]
    fn or_with_no_operands_is_false() {
        let expr = EventExpression::or(vec![]);
        assert!(!expr.evaluate(&HashSet::new()));
    }

    #[test]
    fn leaf_checks_membership() {
        let a = ev("a");
        let expr = EventExpression::leaf(a.clone());
        let mut occurred = HashSet::new();
        assert!(!expr.evaluate(&occurred));
        occurred.insert(a);
        assert!(expr.evaluate(&occurred));
    }

    #[test]
    fn and_requires_all_children() {
        let (a, b) = (ev("a"), ev("b"));
        let expr = EventExpression::and(vec![EventExpression::leaf(a.clone()), EventExpression::leaf(b.clone())]);
        let mut occurred = HashSet::new();
        occurred.insert(a);
        assert!(!expr.evaluate(&occurred));
        occurred.insert(b);
        assert!(expr.evaluate(&occurred));
    }

    #[test]
    fn or_requires_any_child() {
        let (a, b) = (ev("a"), ev("b"));
        let expr = EventExpression::or(vec![EventExpression::leaf(a.clone()), EventExpression::leaf(b.clone())]);
        let mut occurred = HashSet::new();
        assert!(!expr.evaluate(&occurred));
        occurred.insert(a);
        assert!(expr.evaluate(&occurred));
    }
}
