//! Unit tests for common-config crate

use std::io::Write;

use common_config::{ExecutionConfig, SettingsConfig, TesseraConfig};
use common_error::TesseraError;

#[test]
fn test_tessera_config_default() {
    let config = TesseraConfig::default();

    assert_eq!(config.execution.max_in_flight_operations, None);
    assert!(config.execution.verify_graph);
    assert!(config.execution.cancel_in_flight_on_failure);
    assert!(config.settings.mirror_persistent_into_transient);
}

#[test]
fn test_execution_config_builders() {
    let config = ExecutionConfig::default()
        .with_max_in_flight(8)
        .with_verify_graph(false)
        .with_cancel_in_flight(false);

    assert_eq!(config.max_in_flight_operations, Some(8));
    assert!(!config.verify_graph);
    assert!(!config.cancel_in_flight_on_failure);
}

#[test]
fn test_max_in_flight_never_zero() {
    let config = ExecutionConfig::default().with_max_in_flight(0);
    assert_eq!(config.max_in_flight_operations, Some(1));
}

#[test]
fn test_config_serialization_roundtrip() {
    let config = TesseraConfig::default()
        .with_execution(ExecutionConfig::default().with_max_in_flight(4))
        .with_settings(SettingsConfig::default().with_mirror(false));

    let json = serde_json::to_string(&config).unwrap();
    let parsed = TesseraConfig::from_json_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_partial_json_uses_defaults() {
    let config =
        TesseraConfig::from_json_str(r#"{"execution": {"max_in_flight_operations": 2}}"#).unwrap();

    assert_eq!(config.execution.max_in_flight_operations, Some(2));
    assert!(config.execution.verify_graph);
    assert!(config.settings.mirror_persistent_into_transient);
}

#[test]
fn test_invalid_json_is_config_error() {
    let err = TesseraConfig::from_json_str("{not json").unwrap_err();
    assert!(matches!(err, TesseraError::ConfigError(_)));
}

#[test]
fn test_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"execution": {{"verify_graph": false}}}}"#).unwrap();

    let config = TesseraConfig::from_json_file(file.path()).unwrap();
    assert!(!config.execution.verify_graph);
}

#[test]
fn test_missing_file_is_config_error() {
    let err = TesseraConfig::from_json_file("/nonexistent/tessera.json").unwrap_err();
    assert!(matches!(err, TesseraError::ConfigError(_)));
}
