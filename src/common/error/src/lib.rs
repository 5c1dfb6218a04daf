//! Error types and result aliases for Tessera.
//!
//! Every crate in the workspace reports failures through [`TesseraError`], so a
//! failure raised during validation, inside a remote call, or while walking the
//! operation graph reaches the row consumer with the same type.

mod error;

pub use error::{TesseraError, TesseraResult};
