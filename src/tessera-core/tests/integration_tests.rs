//! Integration tests for tessera-core
//!
//! These tests exercise evaluation and settings flattening together, the way a
//! settings plan drives them.

use proptest::prelude::*;
use tessera_core::*;

fn evaluate(symbol: &Symbol, params: &Row) -> Value {
    BasicSymbolEvaluator::new()
        .evaluate(
            &TransactionContext::default(),
            &Functions::builtin(),
            symbol,
            params,
            &SubQueryResults::empty(),
        )
        .unwrap()
}

#[test]
fn test_evaluate_then_flatten_object_assignment() {
    let registry = BuiltinSettingsRegistry::new();
    let assignment = Assignment::new(
        Symbol::literal("stats"),
        Symbol::Object(vec![
            ("enabled".to_string(), Symbol::literal(false)),
            ("jobs_log_size".to_string(), Symbol::Parameter(0)),
        ]),
    );
    let params = Row::single(500i64);

    let key = evaluate(&assignment.column_name, &params);
    let key = key.as_str().unwrap();
    assert!(registry.is_valid_setting(key));

    let value = evaluate(assignment.only_expression().unwrap(), &params);
    let mut builder = Settings::builder();
    registry.flatten(&mut builder, key, value);
    let settings = builder.build();

    assert_eq!(settings.len(), 2);
    for leaf in settings.keys() {
        assert!(registry.check_runtime_setting(leaf).is_ok());
    }
    assert_eq!(settings.get("stats.jobs_log_size"), Some(&Value::Int64(500)));
}

#[test]
fn test_computed_key() {
    let key = Symbol::function(
        "concat",
        vec![Symbol::literal("cluster.routing."), Symbol::Parameter(0)],
    );
    let value = evaluate(&key, &Row::single("allocation.enable"));
    assert_eq!(value, Value::from("cluster.routing.allocation.enable"));
}

#[test]
fn test_settings_serialize() {
    let mut builder = Settings::builder();
    builder.put("stats.enabled", Value::Bool(true));
    let settings = builder.build();

    let json = serde_json::to_string(&settings).unwrap();
    let parsed: Settings = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, settings);
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int64),
        "[a-z]{0,12}".prop_map(Value::String),
    ]
}

fn arb_object() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-z]{1,6}", inner, 1..4).prop_map(Value::Object)
    })
}

fn count_leaves(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.values().map(count_leaves).sum(),
        _ => 1,
    }
}

proptest! {
    #[test]
    fn prop_flatten_keeps_prefix_and_leaf_count(value in arb_object()) {
        let registry = BuiltinSettingsRegistry::empty();
        let mut builder = Settings::builder();
        registry.flatten(&mut builder, "root", value.clone());
        let settings = builder.build();

        prop_assert_eq!(settings.len(), count_leaves(&value));
        for (key, leaf) in settings.iter() {
            prop_assert!(key == "root" || key.starts_with("root."));
            prop_assert!(!matches!(leaf, Value::Object(_)));
        }
    }
}
