//! Tessera - statement-execution core for a clustered relational database
//!
//! Tessera turns compiled statements into distributed operation graphs,
//! dispatches them across cluster nodes and funnels row streams and single
//! acknowledgements back through one row consumer contract.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export member crates
pub use common_config as config;
pub use common_display as display;
pub use common_error as error;
pub use common_runtime as runtime;
pub use tessera_core as core;
pub use tessera_distributed as distributed;
pub use tessera_engine as engine;

pub use common_error::{TesseraError, TesseraResult};
pub use tessera_engine::{DependencyCarrier, Plan, PlannerContext};

/// Tessera version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
