//  CONFIG.rs
//    by Lut99
//
//  Description:
//!   Implements [`EngineConfig`], a small host-configurable override for an engine's initial
//!   policy values, loaded from TOML.
//!
//!   This is not a general plugin system: it covers exactly the one piece of state a host may
//!   reasonably want to override between runs of the same community — initial policy values —
//!   not the model graph itself, which is the hydrator's responsibility.
//
//  This module is only compiled with the `config` feature (which implies `serde`).
//

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::policy::PolicyValue;


/***** ERRORS *****/
/// Errors raised while loading an [`EngineConfig`] from TOML text.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] toml::de::Error),
}


/***** LIBRARY *****/
/// A host-configurable override for an engine run: initial policy values, keyed by policy name.
///
/// Applied via [`crate::engine::Engine::apply_config`]/[`crate::engine::Engine::with_config`] on
/// top of a [`Community`](crate::model::community::Community)'s declared `initial_value`s, not
/// in place of them — a config with no entry for a given policy leaves that policy's
/// community-declared default untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Policy name -> overriding initial value.
    #[serde(default)]
    pub policy_values: HashMap<String, PolicyValue>,
}
impl EngineConfig {
    /// Constructs an empty configuration (no overrides).
    #[inline]
    pub fn new() -> Self { Self::default() }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] if `text` is not valid TOML, or does not match this
    /// struct's shape.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(text)?) }

    /// Serializes this configuration back to TOML text.
    ///
    /// # Panics
    /// Panics if serialization fails, which cannot happen for this struct's shape (no
    /// non-serializable types, no cyclic data).
    pub fn to_toml(&self) -> String { toml::to_string_pretty(self).expect("EngineConfig always serializes") }
}


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_round_trips() {
        let config = EngineConfig::new();
        let text = config.to_toml();
        let parsed = EngineConfig::from_toml(&text).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn parses_number_override() {
        let config = EngineConfig::from_toml("[policy_values]\nmaxLoans = 3.0\n").unwrap();
        assert_eq!(config.policy_values.get("maxLoans"), Some(&PolicyValue::Number(3.0)));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(EngineConfig::from_toml("not = [valid").is_err());
    }
}
