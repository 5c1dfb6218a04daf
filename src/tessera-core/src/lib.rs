//! Core data model for Tessera statement execution.
//!
//! This crate provides the values and symbols that flow through plans:
//! - `Value` and `Row` for results and bound parameters
//! - `Symbol` and `Assignment` for deferred statement expressions
//! - `SymbolEvaluator` and `Functions` for dispatch-time evaluation
//! - `Settings` and `SettingsRegistry` for cluster configuration
//! - `RowConsumer` for delivering results

pub mod consumer;
pub mod eval;
pub mod settings;
pub mod symbol;
pub mod types;

// Re-export commonly used types
pub use consumer::{
    BoxedRowConsumer, ChannelConsumer, Collected, Rejection, RowConsumer, RowEvent, RowReceiver,
    acknowledgement_row, row_channel,
};
pub use eval::{
    BasicSymbolEvaluator, Functions, ScalarFunction, SymbolEvaluator, TransactionContext,
};
pub use settings::{
    BuiltinSettingsRegistry, SettingDefinition, Settings, SettingsBuilder, SettingsRegistry,
};
pub use symbol::{Assignment, SubQueryId, SubQueryResults, Symbol};
pub use types::{Row, Value};
