//! Deferred expressions and statement assignments.
//!
//! Symbols are produced by statement analysis and stay unevaluated until a
//! plan is dispatched; see [`crate::eval`] for resolution.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use common_error::{TesseraError, TesseraResult, ensure};

use crate::types::Value;

/// Identifier of a sub-query whose result is bound at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubQueryId(pub u32);

impl fmt::Display for SubQueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubQuery#{}", self.0)
    }
}

/// An unevaluated expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Symbol {
    /// A constant.
    Literal(Value),
    /// Zero-based index into the bound parameters.
    Parameter(usize),
    /// The single value produced by a sub-query.
    SubQuery(SubQueryId),
    /// Object literal, e.g. `{enabled = true}`.
    Object(Vec<(String, Symbol)>),
    /// Scalar function call resolved through the function registry.
    Function {
        /// Function name, matched case-insensitively.
        name: String,
        /// Argument expressions.
        args: Vec<Symbol>,
    },
}

impl Symbol {
    /// A literal symbol.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// A function call symbol.
    pub fn function(name: impl Into<String>, args: Vec<Symbol>) -> Self {
        Self::Function {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(Value::String(s)) => write!(f, "'{s}'"),
            Self::Literal(v) => write!(f, "{v}"),
            Self::Parameter(idx) => write!(f, "${}", idx + 1),
            Self::SubQuery(id) => write!(f, "{id}"),
            Self::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                write!(f, "}}")
            }
            Self::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Values of the sub-queries a statement depends on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubQueryResults {
    values: HashMap<SubQueryId, Value>,
}

impl SubQueryResults {
    /// No sub-query results.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bind the result of a sub-query.
    pub fn with_result(mut self, id: SubQueryId, value: impl Into<Value>) -> Self {
        self.values.insert(id, value.into());
        self
    }

    /// The bound result for `id`.
    pub fn get(&self, id: SubQueryId) -> TesseraResult<&Value> {
        self.values
            .get(&id)
            .ok_or_else(|| TesseraError::evaluation(format!("no result bound for {id}")))
    }
}

/// `key = expr` as written in a `SET` statement.
///
/// Both sides stay symbolic until evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Configuration key expression.
    pub column_name: Symbol,
    /// Value expressions; settings assignments carry exactly one.
    pub expressions: Vec<Symbol>,
}

impl Assignment {
    /// Create an assignment with a single value expression.
    pub fn new(column_name: Symbol, expression: Symbol) -> Self {
        Self {
            column_name,
            expressions: vec![expression],
        }
    }

    /// Assignment of a literal value to a literal key.
    pub fn literal(key: &str, value: impl Into<Value>) -> Self {
        Self::new(Symbol::literal(key), Symbol::Literal(value.into()))
    }

    /// The only value expression.
    ///
    /// Fails if the assignment carries zero or several expressions.
    pub fn only_expression(&self) -> TesseraResult<&Symbol> {
        ensure!(
            self.expressions.len() == 1,
            format!(
                "expected exactly one value for '{}', got {}",
                self.column_name,
                self.expressions.len()
            )
        );
        Ok(&self.expressions[0])
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = ", self.column_name)?;
        for (i, expr) in self.expressions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{expr}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_expression() {
        let assignment = Assignment::literal("stats.enabled", true);
        assert_eq!(
            assignment.only_expression().unwrap(),
            &Symbol::literal(true)
        );

        let empty = Assignment {
            column_name: Symbol::literal("stats.enabled"),
            expressions: vec![],
        };
        assert!(matches!(
            empty.only_expression(),
            Err(TesseraError::InvalidArgument(_))
        ));

        let multi = Assignment {
            column_name: Symbol::literal("stats.enabled"),
            expressions: vec![Symbol::literal(true), Symbol::literal(false)],
        };
        assert!(multi.only_expression().is_err());
    }

    #[test]
    fn test_assignment_display() {
        let assignment = Assignment::new(
            Symbol::literal("cluster.routing.allocation.enable"),
            Symbol::Parameter(0),
        );
        assert_eq!(
            assignment.to_string(),
            "'cluster.routing.allocation.enable' = $1"
        );
    }

    #[test]
    fn test_sub_query_results() {
        let results = SubQueryResults::empty().with_result(SubQueryId(1), 10i64);
        assert_eq!(results.get(SubQueryId(1)).unwrap(), &Value::Int64(10));
        assert!(results.get(SubQueryId(2)).is_err());
    }
}
