//! Flat configuration key/value sets.
//!
//! A [`Settings`] object maps dotted leaf keys (`stats.jobs_log_size`) to
//! values in insertion order. Writing an existing key replaces its value
//! in place, so the last write wins without reordering.

mod registry;

pub use registry::{BuiltinSettingsRegistry, SettingDefinition, SettingsRegistry};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Value;

/// Immutable, insertion-ordered settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    entries: Vec<(String, Value)>,
}

impl Settings {
    /// Settings with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building settings.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Single-use accumulator for [`Settings`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    entries: Vec<(String, Value)>,
    positions: HashMap<String, usize>,
}

impl SettingsBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a leaf value.
    pub fn put(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        let key = key.into();
        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
        self
    }

    /// Whether a key has been written.
    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Finish building.
    pub fn build(self) -> Settings {
        Settings {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() {
        let mut builder = Settings::builder();
        builder
            .put("stats.jobs_log_size", Value::Int64(10))
            .put("stats.enabled", Value::Bool(true));
        let settings = builder.build();

        let keys: Vec<_> = settings.keys().collect();
        assert_eq!(keys, vec!["stats.jobs_log_size", "stats.enabled"]);
    }

    #[test]
    fn test_last_write_wins_in_place() {
        let mut builder = Settings::builder();
        builder
            .put("a", Value::Int64(1))
            .put("b", Value::Int64(2))
            .put("a", Value::Int64(3));
        assert!(builder.contains("a"));
        let settings = builder.build();

        assert_eq!(settings.len(), 2);
        assert_eq!(settings.get("a"), Some(&Value::Int64(3)));
        let keys: Vec<_> = settings.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_empty() {
        assert!(Settings::empty().is_empty());
        assert_eq!(Settings::empty().get("a"), None);
    }
}
