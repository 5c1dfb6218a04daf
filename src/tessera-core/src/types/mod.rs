//! Type system for Tessera values.
//!
//! This module defines the `Value` enum for runtime values and `Row` for
//! result tuples and bound parameters.

mod row;
mod value;

pub use row::Row;
pub use value::Value;
