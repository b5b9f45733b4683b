// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::config::consts::LOG_OPTION;
use crate::errors::LoaderError;

/// Free-form keyword arguments handed to unit and pipeline factories.
///
/// Definition files flatten everything except `kind` into one of these;
/// each factory then deserializes the part it understands into its own
/// typed config struct with [`Options::parse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(HashMap<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert `value` only when `key` is absent: explicit settings win.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Whether the `log` flag is set. Anything other than `true` is off.
    pub fn log_enabled(&self) -> bool {
        matches!(self.0.get(LOG_OPTION), Some(Value::Bool(true)))
    }

    /// Deserialize these options into a typed config for `kind`.
    pub fn parse<T: DeserializeOwned>(&self, kind: &str) -> Result<T, LoaderError> {
        let mapping: Mapping = self
            .0
            .iter()
            .map(|(key, value)| (Value::String(key.clone()), value.clone()))
            .collect();
        serde_yaml::from_value(Value::Mapping(mapping))
            .map_err(|e| LoaderError::invalid_options(kind, e))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct ReadConfig {
        src: String,
        #[serde(default)]
        log: bool,
    }

    #[test]
    fn test_parse_typed_config() {
        let options = Options::new().with("src", "data/a.csv").with(LOG_OPTION, true);
        let config: ReadConfig = options.parse("read_table").unwrap();
        assert_eq!(config.src, "data/a.csv");
        assert!(config.log);
    }

    #[test]
    fn test_parse_missing_field_names_kind() {
        let err = Options::new().parse::<ReadConfig>("read_table").unwrap_err();
        match err {
            LoaderError::InvalidOptions { kind, reason } => {
                assert_eq!(kind, "read_table");
                assert!(reason.contains("src"), "reason was: {}", reason);
            }
            other => panic!("Expected InvalidOptions, got {:?}", other),
        }
    }

    #[test]
    fn test_set_default_keeps_explicit_value() {
        let mut options = Options::new().with(LOG_OPTION, false);
        options.set_default(LOG_OPTION, true);
        assert!(!options.log_enabled());

        let mut empty = Options::new();
        empty.set_default(LOG_OPTION, true);
        assert!(empty.log_enabled());
    }

    #[test]
    fn test_deserialize_from_yaml_mapping() {
        let options: Options = serde_yaml::from_str("src: a.csv\nlog: true\n").unwrap();
        assert_eq!(options.len(), 2);
        assert!(options.log_enabled());
        assert_eq!(options.get("src"), Some(&Value::String("a.csv".to_string())));
    }
}
