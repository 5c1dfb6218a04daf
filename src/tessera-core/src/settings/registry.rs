//! Registry of known cluster settings.

use std::collections::BTreeMap;

use common_error::{TesseraError, TesseraResult};

use super::SettingsBuilder;
use crate::types::Value;

/// Validates configuration key names and their mutability class.
pub trait SettingsRegistry: Send + Sync {
    /// Whether `name` is a registered setting or a group prefix of one.
    fn is_valid_setting(&self, name: &str) -> bool;

    /// Whether the leaf setting `name` may be changed while the cluster runs.
    fn is_runtime_alterable(&self, name: &str) -> bool;

    /// Whether `name` is a registered leaf setting.
    fn is_leaf_setting(&self, name: &str) -> bool;

    /// Expand a possibly-structured value into leaf key/value pairs.
    ///
    /// Object values recurse with dotted keys in key order; everything else
    /// is a leaf.
    fn flatten(&self, builder: &mut SettingsBuilder, name: &str, value: Value) {
        match value {
            Value::Object(map) => {
                for (key, nested) in map {
                    self.flatten(builder, &format!("{name}.{key}"), nested);
                }
            }
            leaf => {
                builder.put(name, leaf);
            }
        }
    }

    /// Reject leaf keys that are unknown or fixed at process start.
    fn check_runtime_setting(&self, name: &str) -> TesseraResult<()> {
        if !self.is_leaf_setting(name) {
            return Err(TesseraError::unsupported_setting(name));
        }
        if !self.is_runtime_alterable(name) {
            return Err(TesseraError::not_runtime_setting(name));
        }
        Ok(())
    }
}

/// A registered setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingDefinition {
    /// Dotted leaf name.
    pub name: String,
    /// Whether the setting can be changed at runtime.
    pub runtime_alterable: bool,
}

impl SettingDefinition {
    /// A setting that can be changed at runtime.
    pub fn runtime(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runtime_alterable: true,
        }
    }

    /// A setting that is fixed at process start.
    pub fn fixed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runtime_alterable: false,
        }
    }
}

const RUNTIME_SETTINGS: &[&str] = &[
    "stats.enabled",
    "stats.jobs_log_size",
    "stats.operations_log_size",
    "stats.service.interval",
    "cluster.routing.allocation.enable",
    "cluster.routing.allocation.allow_rebalance",
    "cluster.routing.allocation.cluster_concurrent_rebalance",
    "cluster.routing.rebalance.enable",
    "cluster.graceful_stop.min_availability",
    "cluster.graceful_stop.timeout",
    "cluster.graceful_stop.force",
    "discovery.zen.minimum_master_nodes",
    "indices.breaker.query.limit",
    "indices.recovery.max_bytes_per_sec",
    "bulk.request_timeout",
];

const FIXED_SETTINGS: &[&str] = &[
    "cluster.name",
    "node.name",
    "path.data",
    "path.logs",
    "network.host",
    "udc.enabled",
];

/// Registry backed by a static table of cluster settings.
#[derive(Debug, Clone)]
pub struct BuiltinSettingsRegistry {
    definitions: BTreeMap<String, SettingDefinition>,
}

impl BuiltinSettingsRegistry {
    /// Registry with the built-in setting table.
    pub fn new() -> Self {
        let definitions = RUNTIME_SETTINGS
            .iter()
            .map(|name| SettingDefinition::runtime(*name))
            .chain(FIXED_SETTINGS.iter().map(|name| SettingDefinition::fixed(*name)))
            .map(|def| (def.name.clone(), def))
            .collect();
        Self { definitions }
    }

    /// Registry without any settings.
    pub fn empty() -> Self {
        Self {
            definitions: BTreeMap::new(),
        }
    }

    /// Register an extra setting, replacing an existing one with the same name.
    pub fn with_setting(mut self, definition: SettingDefinition) -> Self {
        self.definitions.insert(definition.name.clone(), definition);
        self
    }

    /// Definition of a leaf setting.
    pub fn definition(&self, name: &str) -> Option<&SettingDefinition> {
        self.definitions.get(name)
    }

    /// Number of registered leaf settings.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no settings are registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn is_group(&self, name: &str) -> bool {
        let prefix = format!("{name}.");
        self.definitions
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(&prefix))
    }
}

impl Default for BuiltinSettingsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRegistry for BuiltinSettingsRegistry {
    fn is_valid_setting(&self, name: &str) -> bool {
        self.is_leaf_setting(name) || self.is_group(name)
    }

    fn is_runtime_alterable(&self, name: &str) -> bool {
        self.definitions
            .get(name)
            .is_some_and(|def| def.runtime_alterable)
    }

    fn is_leaf_setting(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_settings() {
        let registry = BuiltinSettingsRegistry::new();
        assert!(registry.is_valid_setting("cluster.routing.allocation.enable"));
        assert!(registry.is_valid_setting("stats"));
        assert!(registry.is_valid_setting("cluster.routing"));
        assert!(!registry.is_valid_setting("unknown.setting"));
        assert!(!registry.is_valid_setting("stat"));
        assert!(!registry.is_valid_setting("stats.enabled.deeper"));
    }

    #[test]
    fn test_runtime_alterable() {
        let registry = BuiltinSettingsRegistry::new();
        assert!(registry.is_runtime_alterable("stats.enabled"));
        assert!(!registry.is_runtime_alterable("cluster.name"));
        assert!(!registry.is_runtime_alterable("stats"));
    }

    #[test]
    fn test_check_runtime_setting() {
        let registry = BuiltinSettingsRegistry::new();
        assert!(registry.check_runtime_setting("stats.enabled").is_ok());
        assert!(matches!(
            registry.check_runtime_setting("cluster.name"),
            Err(TesseraError::NotRuntimeSetting(_))
        ));
        assert!(matches!(
            registry.check_runtime_setting("stats.bogus"),
            Err(TesseraError::UnsupportedSetting(_))
        ));
    }

    #[test]
    fn test_flatten_object() {
        let registry = BuiltinSettingsRegistry::new();
        let value: Value = [
            ("enabled", Value::Bool(true)),
            ("jobs_log_size", Value::Int64(100)),
        ]
        .into_iter()
        .collect();

        let mut builder = SettingsBuilder::new();
        registry.flatten(&mut builder, "stats", value);
        let settings = builder.build();

        assert_eq!(settings.get("stats.enabled"), Some(&Value::Bool(true)));
        assert_eq!(settings.get("stats.jobs_log_size"), Some(&Value::Int64(100)));
        assert_eq!(settings.len(), 2);
    }

    #[test]
    fn test_flatten_object_leaves_follow_key_order() {
        let registry = BuiltinSettingsRegistry::new();
        let value: Value = [
            ("jobs_log_size", Value::Int64(1)),
            ("enabled", Value::Bool(true)),
        ]
        .into_iter()
        .collect();

        let mut builder = SettingsBuilder::new();
        builder.put("cluster.routing.allocation.enable", Value::from("none"));
        registry.flatten(&mut builder, "stats", value);
        let settings = builder.build();

        assert_eq!(
            settings.keys().collect::<Vec<_>>(),
            vec![
                "cluster.routing.allocation.enable",
                "stats.enabled",
                "stats.jobs_log_size"
            ]
        );
    }

    #[test]
    fn test_flatten_nested_object() {
        let registry = BuiltinSettingsRegistry::new();
        let inner: Value = [("interval", Value::from("1h"))].into_iter().collect();
        let value: Value = [("service", inner)].into_iter().collect();

        let mut builder = SettingsBuilder::new();
        registry.flatten(&mut builder, "stats", value);
        let settings = builder.build();

        assert_eq!(settings.get("stats.service.interval"), Some(&Value::from("1h")));
    }

    #[test]
    fn test_with_setting() {
        let registry = BuiltinSettingsRegistry::empty()
            .with_setting(SettingDefinition::runtime("custom.flag"));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_valid_setting("custom"));
        assert!(registry.is_runtime_alterable("custom.flag"));
        assert!(registry.definition("custom.flag").is_some());
    }
}
