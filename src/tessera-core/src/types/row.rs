//! Fixed-arity result rows.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::Value;

/// An ordered, fixed-arity tuple of values.
///
/// Also used to carry bound statement parameters, where column `i` holds
/// the value of parameter `$i+1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Create a row from its values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// A row with no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single-column row.
    pub fn single(value: impl Into<Value>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// All column values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the row into its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}
