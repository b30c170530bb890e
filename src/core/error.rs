//! Error types for the fan-out logger
//!
//! Only construction and maintenance calls (`Logger::new`, `flush`, handler
//! setup) return these. Leveled logging calls never do.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO failure with the operation that hit it
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Log directory could not be created or replaced
    #[error("Cannot provision log directory '{path}': {message}")]
    DirectoryProvision { path: String, message: String },

    /// Opening or writing the log file failed
    #[error("Cannot write log file '{path}': {message}")]
    FileWrite { path: String, message: String },

    #[error("Rotation of '{path}' failed: {message}")]
    Rotation { path: String, message: String },

    /// Delivery queue has no live worker
    #[error("Delivery queue closed")]
    QueueClosed,

    /// A handler panicked while processing a record
    #[error("Handler '{handler}' panicked: {message}")]
    HandlerPanicked { handler: String, message: String },

    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn provision(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DirectoryProvision {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn file_write(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rotation {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn handler_panicked(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerPanicked {
            handler: handler.into(),
            message: message.into(),
        }
    }

    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
