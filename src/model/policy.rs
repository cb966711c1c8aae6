//  POLICY.rs
//    by Lut99
//
//  Description:
//!   Implements the community-level policy model: durations, numeric intervals,
//!   policy envelopes and the policies they bound.
//

use std::fmt::{Display, Formatter, Result as FResult};

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::Value;


/***** ERRORS *****/
/// Errors that can occur while parsing a [`DurationUnit`] or [`EnvelopeRuleType`] from text.
#[derive(Debug, Error)]
pub enum PolicyParseError {
    /// The given text did not name a known duration unit.
    #[error("unknown duration unit '{raw}' (expected one of: minute(s), hour(s), day(s), week(s), month(s), year(s))")]
    UnknownDurationUnit { raw: String },
    /// The given text did not name a known envelope rule type.
    #[error("unknown envelope rule type '{raw}' (expected one of: one, set, list)")]
    UnknownEnvelopeRuleType { raw: String },
}


/***** LIBRARY *****/
/// The unit a [`Duration`]'s magnitude is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DurationUnit {
    Minute,
    Minutes,
    Hour,
    Hours,
    Day,
    Days,
    Week,
    Weeks,
    Month,
    Months,
    Year,
    Years,
}
impl DurationUnit {
    /// Parses a [`DurationUnit`] from its lowercase textual name.
    ///
    /// # Errors
    /// Returns [`PolicyParseError::UnknownDurationUnit`] if `text` names no known unit.
    pub fn from_text(text: &str) -> Result<Self, PolicyParseError> {
        Ok(match text.to_lowercase().as_str() {
            "minute" => Self::Minute,
            "minutes" => Self::Minutes,
            "hour" => Self::Hour,
            "hours" => Self::Hours,
            "day" => Self::Day,
            "days" => Self::Days,
            "week" => Self::Week,
            "weeks" => Self::Weeks,
            "month" => Self::Month,
            "months" => Self::Months,
            "year" => Self::Year,
            "years" => Self::Years,
            _ => return Err(PolicyParseError::UnknownDurationUnit { raw: text.into() }),
        })
    }

    /// Returns this unit's canonical lowercase textual name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Minutes => "minutes",
            Self::Hour => "hour",
            Self::Hours => "hours",
            Self::Day => "day",
            Self::Days => "days",
            Self::Week => "week",
            Self::Weeks => "weeks",
            Self::Month => "month",
            Self::Months => "months",
            Self::Year => "year",
            Self::Years => "years",
        }
    }
}
impl Display for DurationUnit {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.as_str()) }
}

/// A duration like "5 days" or "2 hours".
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Duration {
    /// The duration's magnitude.
    pub value: f64,
    /// The duration's unit.
    pub unit:  DurationUnit,
}
impl Duration {
    /// Constructor for a Duration.
    #[inline]
    pub fn new(value: f64, unit: DurationUnit) -> Self { Self { value, unit } }
}
impl Display for Duration {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{} {}", self.value, self.unit) }
}

/// A closed numeric interval like `10..20`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NumberInterval {
    /// The interval's inclusive lower bound.
    pub from: f64,
    /// The interval's inclusive upper bound.
    pub to:   f64,
}
impl NumberInterval {
    /// Constructor for a NumberInterval.
    #[inline]
    pub fn new(from: f64, to: f64) -> Self { Self { from, to } }

    /// Checks whether `value` falls within `[from, to]`, inclusive on both ends.
    #[inline]
    pub fn contains(&self, value: f64) -> bool { self.from <= value && value <= self.to }
}
impl Display for NumberInterval {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}..{}", self.from, self.to) }
}

/// A value a policy can hold: a [`Duration`], a [`NumberInterval`], a number, a string or a bool.
///
/// This is the policy-specific counterpart of [`Value`]; policies only ever carry these four
/// shapes, so it is kept distinct from the fully dynamic [`Value`] used elsewhere, with a
/// conversion into the latter for guard contexts.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum PolicyValue {
    Duration(Duration),
    Interval(NumberInterval),
    Number(f64),
    Bool(bool),
}
impl From<PolicyValue> for Value {
    fn from(value: PolicyValue) -> Self {
        match value {
            PolicyValue::Duration(d) => Value::Duration(d),
            PolicyValue::Interval(i) => Value::Interval(i),
            PolicyValue::Number(n) => Value::Number(n),
            PolicyValue::Bool(b) => Value::Bool(b),
        }
    }
}
impl Display for PolicyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Duration(d) => write!(f, "{d}"),
            Self::Interval(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// The shape of an [`EnvelopeRule`]'s value list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EnvelopeRuleType {
    /// Exactly one value is permitted.
    One,
    /// An unordered set of values is permitted.
    Set,
    /// An ordered list of values is permitted.
    List,
}
impl EnvelopeRuleType {
    /// Parses an [`EnvelopeRuleType`] from its lowercase textual name.
    ///
    /// # Errors
    /// Returns [`PolicyParseError::UnknownEnvelopeRuleType`] if `text` names no known variant.
    pub fn from_text(text: &str) -> Result<Self, PolicyParseError> {
        Ok(match text.to_lowercase().as_str() {
            "one" => Self::One,
            "set" => Self::Set,
            "list" => Self::List,
            _ => return Err(PolicyParseError::UnknownEnvelopeRuleType { raw: text.into() }),
        })
    }
}

/// A single rule within a [`PolicyEnvelope`], constraining the shape and admissible values a
/// policy's setting may take.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnvelopeRule {
    /// The shape this rule requires of a conforming setting.
    pub rule_type: EnvelopeRuleType,
    /// The admissible values for a conforming setting.
    pub values: Vec<PolicyValue>,
}
impl EnvelopeRule {
    /// Constructor for an EnvelopeRule.
    #[inline]
    pub fn new(rule_type: EnvelopeRuleType, values: Vec<PolicyValue>) -> Self { Self { rule_type, values } }
}

/// The envelope of a policy: the set of rules constraining what values it may be set to.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolicyEnvelope {
    /// The rules making up this envelope.
    pub envelope_rules: Vec<EnvelopeRule>,
}
impl PolicyEnvelope {
    /// Constructor for a PolicyEnvelope.
    #[inline]
    pub fn new(envelope_rules: Vec<EnvelopeRule>) -> Self { Self { envelope_rules } }
}

/// Names the role within the community that is empowered to (re)set a policy's value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolicySettingBehaviour {
    /// The name of the role permitted to set this policy.
    pub policy_setting_role: String,
}
impl PolicySettingBehaviour {
    /// Constructor for a PolicySettingBehaviour.
    #[inline]
    pub fn new(policy_setting_role: impl Into<String>) -> Self { Self { policy_setting_role: policy_setting_role.into() } }
}

/// A single named policy within a community: a typed, envelope-constrained value that guards and
/// domain functions may read. Read-only during action dispatch; only a future host-level API
/// setting a policy's value is expected to write it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Policy {
    /// The name of this policy.
    pub name: String,
    /// The name of the [`SimpleType`](super::vocabulary::SimpleType) this policy's value is tagged with.
    pub type_hint: String,
    /// The role empowered to set this policy's value.
    pub setting_behaviour: PolicySettingBehaviour,
    /// This policy's value at community construction time.
    pub initial_value: PolicyValue,
    /// The envelope constraining admissible values for this policy.
    pub envelope: PolicyEnvelope,
}
impl Policy {
    /// Constructor for a Policy.
    #[inline]
    pub fn new(
        name: impl Into<String>,
        type_hint: impl Into<String>,
        setting_behaviour: PolicySettingBehaviour,
        initial_value: PolicyValue,
        envelope: PolicyEnvelope,
    ) -> Self {
        Self { name: name.into(), type_hint: type_hint.into(), setting_behaviour, initial_value, envelope }
    }
}
impl Display for Policy {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.name) }
}

/// A configuration override for an existing policy's envelope, applied at community construction
/// time rather than at model-definition time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolicyEnvelopeConfig {
    /// The name of the policy this configuration overrides.
    pub policy: String,
    /// The replacement envelope rules.
    pub envelope_rules: Vec<EnvelopeRule>,
}
impl PolicyEnvelopeConfig {
    /// Constructor for a PolicyEnvelopeConfig.
    ///
    /// # Errors
    /// Returns a plain `String` error if `policy` is empty or `envelope_rules` is empty.
    pub fn new(policy: impl Into<String>, envelope_rules: Vec<EnvelopeRule>) -> Result<Self, String> {
        let policy = policy.into();
        if policy.is_empty() {
            return Err("PolicyEnvelopeConfig requires a non-empty policy name".into());
        }
        if envelope_rules.is_empty() {
            return Err(format!("PolicyEnvelopeConfig for '{policy}' needs at least one EnvelopeRule"));
        }
        Ok(Self { policy, envelope_rules })
    }
}


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_unit_round_trips_through_text() {
        for unit in [DurationUnit::Day, DurationUnit::Weeks, DurationUnit::Year] {
            assert_eq!(DurationUnit::from_text(unit.as_str()).unwrap(), unit);
        }
    }

    #[test]
    fn duration_unit_rejects_unknown_text() {
        assert!(DurationUnit::from_text("fortnight").is_err());
    }

    #[test]
    fn number_interval_contains_is_inclusive() {
        let interval = NumberInterval::new(10.0, 20.0);
        assert!(interval.contains(10.0));
        assert!(interval.contains(20.0));
        assert!(interval.contains(15.0));
        assert!(!interval.contains(9.9));
        assert!(!interval.contains(20.1));
    }

    #[test]
    fn policy_envelope_config_rejects_empty_policy_name() {
        assert!(PolicyEnvelopeConfig::new("", vec![EnvelopeRule::new(EnvelopeRuleType::One, vec![])]).is_err());
    }

    #[test]
    fn policy_envelope_config_rejects_empty_rules() {
        assert!(PolicyEnvelopeConfig::new("maxLoans", vec![]).is_err());
    }
}
