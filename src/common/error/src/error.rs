//! Core error types for Tessera.

use thiserror::Error;

/// Result type alias using `TesseraError`.
pub type TesseraResult<T> = std::result::Result<T, TesseraError>;

/// Core error type for statement execution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TesseraError {
    /// Configuration key is not a recognized setting.
    #[error("UnsupportedSetting: Setting '{0}' is not supported")]
    UnsupportedSetting(String),

    /// Configuration key exists but is fixed at process start.
    #[error("NotRuntimeSetting: Setting '{0}' cannot be set/reset at runtime")]
    NotRuntimeSetting(String),

    /// Malformed statement data (wrong arity, wrong key type, ...).
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),

    /// A symbol could not be resolved to a value.
    #[error("EvaluationError: {0}")]
    EvaluationError(String),

    /// Operation graph is empty, cyclic or otherwise malformed.
    #[error("GraphError: {0}")]
    GraphError(String),

    /// A node could not be reached or failed to execute an operation.
    #[error("RemoteError: {0}")]
    RemoteError(String),

    /// Execution was cancelled before it completed.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Configuration could not be loaded.
    #[error("ConfigError: {0}")]
    ConfigError(String),

    /// Internal error (bug in Tessera).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl TesseraError {
    /// Create a new `UnsupportedSetting` error.
    pub fn unsupported_setting<S: Into<String>>(name: S) -> Self {
        Self::UnsupportedSetting(name.into())
    }

    /// Create a new `NotRuntimeSetting` error.
    pub fn not_runtime_setting<S: Into<String>>(name: S) -> Self {
        Self::NotRuntimeSetting(name.into())
    }

    /// Create a new `InvalidArgument` error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new `EvaluationError`.
    pub fn evaluation<S: Into<String>>(msg: S) -> Self {
        Self::EvaluationError(msg.into())
    }

    /// Create a new `GraphError`.
    pub fn graph<S: Into<String>>(msg: S) -> Self {
        Self::GraphError(msg.into())
    }

    /// Create a new `RemoteError`.
    pub fn remote<S: Into<String>>(msg: S) -> Self {
        Self::RemoteError(msg.into())
    }

    /// Create a new `Cancelled` error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a new `ConfigError`.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }

    /// Errors raised before any remote call is attempted.
    ///
    /// These reject the statement; they are never the result of a remote round trip.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedSetting(_)
                | Self::NotRuntimeSetting(_)
                | Self::InvalidArgument(_)
                | Self::EvaluationError(_)
        )
    }

    /// Whether the engine may retry the failed execution on its own.
    ///
    /// Result semantics are at-most-once per operation, so this is always `false`.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Ensure a condition holds, returning an `InvalidArgument` error if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::TesseraError::InvalidArgument($msg.to_string()));
        }
    };
}

/// Return early with a `GraphError`.
#[macro_export]
macro_rules! graph_err {
    ($($arg:tt)*) => {
        return Err($crate::TesseraError::GraphError(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TesseraError::unsupported_setting("unknown.setting");
        assert_eq!(
            err.to_string(),
            "UnsupportedSetting: Setting 'unknown.setting' is not supported"
        );

        let err = TesseraError::not_runtime_setting("cluster.name");
        assert_eq!(
            err.to_string(),
            "NotRuntimeSetting: Setting 'cluster.name' cannot be set/reset at runtime"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(TesseraError::unsupported_setting("x").is_validation());
        assert!(TesseraError::not_runtime_setting("x").is_validation());
        assert!(TesseraError::invalid_argument("x").is_validation());
        assert!(!TesseraError::remote("node gone").is_validation());
        assert!(!TesseraError::graph("cycle").is_validation());
        assert!(!TesseraError::remote("node gone").is_retryable());
    }

    fn check_positive(n: i64) -> TesseraResult<i64> {
        crate::ensure!(n > 0, "n must be positive");
        Ok(n)
    }

    fn check_graph(len: usize) -> TesseraResult<()> {
        if len == 0 {
            crate::graph_err!("empty graph for job {}", "j1");
        }
        Ok(())
    }

    #[test]
    fn test_macros() {
        assert!(check_positive(1).is_ok());
        assert!(matches!(
            check_positive(0),
            Err(TesseraError::InvalidArgument(_))
        ));
        let err = check_graph(0).unwrap_err();
        assert_eq!(err.to_string(), "GraphError: empty graph for job j1");
    }
}
