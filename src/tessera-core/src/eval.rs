//! Symbol evaluation.
//!
//! [`SymbolEvaluator`] is the capability plans use to turn deferred symbols
//! into values at dispatch time. [`BasicSymbolEvaluator`] resolves literals,
//! parameters, sub-query results, object literals and registered scalar
//! functions.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use common_error::{TesseraError, TesseraResult};

use crate::symbol::{SubQueryResults, Symbol};
use crate::types::{Row, Value};

/// Transaction state visible to evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionContext {
    /// User executing the statement.
    pub session_user: String,
    /// Default schema for unqualified names.
    pub current_schema: String,
}

impl Default for TransactionContext {
    fn default() -> Self {
        Self {
            session_user: "crate".to_string(),
            current_schema: "doc".to_string(),
        }
    }
}

impl TransactionContext {
    /// Create a context for a user and schema.
    pub fn new(session_user: impl Into<String>, current_schema: impl Into<String>) -> Self {
        Self {
            session_user: session_user.into(),
            current_schema: current_schema.into(),
        }
    }
}

/// Implementation of a scalar function.
pub type ScalarFunction = Arc<dyn Fn(&[Value]) -> TesseraResult<Value> + Send + Sync>;

/// Registry of scalar functions available to evaluation.
#[derive(Clone)]
pub struct Functions {
    functions: HashMap<String, ScalarFunction>,
}

impl Functions {
    /// A registry with no functions.
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// A registry with the built-in scalar functions.
    pub fn builtin() -> Self {
        Self::empty()
            .with_function("concat", Arc::new(concat))
            .with_function(
                "lower",
                Arc::new(|args: &[Value]| map_string("lower", args, str::to_lowercase)),
            )
            .with_function(
                "upper",
                Arc::new(|args: &[Value]| map_string("upper", args, str::to_uppercase)),
            )
    }

    /// Register a function, replacing any function with the same name.
    pub fn with_function(mut self, name: &str, function: ScalarFunction) -> Self {
        self.functions.insert(name.to_lowercase(), function);
        self
    }

    /// Look up a function by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&ScalarFunction> {
        self.functions.get(&name.to_lowercase())
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for Functions {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for Functions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("Functions").field("names", &names).finish()
    }
}

fn concat(args: &[Value]) -> TesseraResult<Value> {
    let mut out = String::new();
    for arg in args {
        if !arg.is_null() {
            out.push_str(&arg.to_string());
        }
    }
    Ok(Value::String(out))
}

fn map_string(name: &str, args: &[Value], f: impl Fn(&str) -> String) -> TesseraResult<Value> {
    match args {
        [Value::Null] => Ok(Value::Null),
        [Value::String(s)] => Ok(Value::String(f(s))),
        [other] => Err(TesseraError::evaluation(format!(
            "{name}() expects a string argument, got {}",
            other.type_name()
        ))),
        _ => Err(TesseraError::evaluation(format!(
            "{name}() expects 1 argument, got {}",
            args.len()
        ))),
    }
}

/// Resolves deferred symbols into concrete values.
pub trait SymbolEvaluator: Send + Sync {
    /// Evaluate `symbol` against bound parameters and sub-query results.
    fn evaluate(
        &self,
        txn: &TransactionContext,
        functions: &Functions,
        symbol: &Symbol,
        params: &Row,
        sub_query_results: &SubQueryResults,
    ) -> TesseraResult<Value>;
}

/// Evaluator for the symbol forms produced by statement analysis.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSymbolEvaluator;

impl BasicSymbolEvaluator {
    /// Create a new evaluator.
    pub fn new() -> Self {
        Self
    }
}

impl SymbolEvaluator for BasicSymbolEvaluator {
    fn evaluate(
        &self,
        txn: &TransactionContext,
        functions: &Functions,
        symbol: &Symbol,
        params: &Row,
        sub_query_results: &SubQueryResults,
    ) -> TesseraResult<Value> {
        match symbol {
            Symbol::Literal(value) => Ok(value.clone()),
            Symbol::Parameter(idx) => params.get(*idx).cloned().ok_or_else(|| {
                TesseraError::evaluation(format!(
                    "parameter ${} is not bound ({} parameters given)",
                    idx + 1,
                    params.len()
                ))
            }),
            Symbol::SubQuery(id) => sub_query_results.get(*id).cloned(),
            Symbol::Object(entries) => entries
                .iter()
                .map(|(key, value)| {
                    self.evaluate(txn, functions, value, params, sub_query_results)
                        .map(|v| (key.clone(), v))
                })
                .collect::<TesseraResult<BTreeMap<String, Value>>>()
                .map(Value::Object),
            Symbol::Function { name, args } => {
                let function = functions
                    .get(name)
                    .ok_or_else(|| TesseraError::evaluation(format!("unknown function: {name}")))?;
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(txn, functions, arg, params, sub_query_results))
                    .collect::<TesseraResult<Vec<_>>>()?;
                function(&values)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SubQueryId;

    fn eval(symbol: &Symbol, params: &Row, subq: &SubQueryResults) -> TesseraResult<Value> {
        BasicSymbolEvaluator::new().evaluate(
            &TransactionContext::default(),
            &Functions::builtin(),
            symbol,
            params,
            subq,
        )
    }

    #[test]
    fn test_literal_and_parameter() {
        let params = Row::new(vec![Value::from("none")]);
        let subq = SubQueryResults::empty();

        assert_eq!(
            eval(&Symbol::literal(1i64), &params, &subq).unwrap(),
            Value::Int64(1)
        );
        assert_eq!(
            eval(&Symbol::Parameter(0), &params, &subq).unwrap(),
            Value::from("none")
        );
        let err = eval(&Symbol::Parameter(3), &params, &subq).unwrap_err();
        assert!(matches!(err, TesseraError::EvaluationError(_)));
    }

    #[test]
    fn test_sub_query() {
        let subq = SubQueryResults::empty().with_result(SubQueryId(7), 42i64);
        assert_eq!(
            eval(&Symbol::SubQuery(SubQueryId(7)), &Row::empty(), &subq).unwrap(),
            Value::Int64(42)
        );
    }

    #[test]
    fn test_object_literal() {
        let symbol = Symbol::Object(vec![
            ("enabled".to_string(), Symbol::literal(true)),
            ("jobs_log_size".to_string(), Symbol::Parameter(0)),
        ]);
        let params = Row::single(100i64);
        let value = eval(&symbol, &params, &SubQueryResults::empty()).unwrap();

        let expected: Value = [
            ("enabled", Value::Bool(true)),
            ("jobs_log_size", Value::Int64(100)),
        ]
        .into_iter()
        .collect();
        assert_eq!(value, expected);
    }

    #[test]
    fn test_functions() {
        let symbol = Symbol::function(
            "CONCAT",
            vec![
                Symbol::literal("stats."),
                Symbol::function("lower", vec![Symbol::literal("ENABLED")]),
            ],
        );
        assert_eq!(
            eval(&symbol, &Row::empty(), &SubQueryResults::empty()).unwrap(),
            Value::from("stats.enabled")
        );

        let unknown = Symbol::function("nope", vec![]);
        assert!(eval(&unknown, &Row::empty(), &SubQueryResults::empty()).is_err());

        let bad = Symbol::function("upper", vec![Symbol::literal(1i64)]);
        assert!(eval(&bad, &Row::empty(), &SubQueryResults::empty()).is_err());
    }

    #[test]
    fn test_registry() {
        let functions = Functions::builtin();
        assert_eq!(functions.len(), 3);
        assert!(functions.get("Upper").is_some());
        assert!(Functions::empty().is_empty());
    }
}
