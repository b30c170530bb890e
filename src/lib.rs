//! # Rust Fanout Logger
//!
//! A leveled, structured logger that fans every record out to an ordered
//! list of handlers, either inline on the calling thread or through a
//! single background worker.
//!
//! ## Features
//!
//! - **Fan-out delivery**: each handler decides on its own whether a level is enabled
//! - **Default handlers**: a rotating JSON-lines file (Warn and above) and a
//!   colored console (Debug and above)
//! - **Call-site capture**: records carry the file and line of the logging call
//! - **Failure isolation**: a failing or panicking handler never affects the
//!   caller or the other handlers
//!
//! ## Example
//!
//! ```no_run
//! use rust_fanout_logger::prelude::*;
//! use rust_fanout_logger::info;
//!
//! let logger = Logger::new(LoggerOptions::new().dir("logs")).unwrap();
//! logger.warn("disk almost full", [attr("free_mb", 512)]);
//! info!(logger, "listening on port {}", 8080; "tls" => true);
//! ```

pub mod core;
pub mod handlers;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        attr, Attr, DeliveryQueue, FieldValue, Handler, LogLevel, LogRecord, Logger,
        LoggerBuilder, LoggerError, LoggerOptions, Result, SharedHandler, TimestampFormat,
    };
    pub use crate::handlers::{ConsoleHandler, MemoryHandler, RotatingFileHandler, RotationPolicy};
}

pub use crate::core::{
    attr, default_handlers, format_attrs, global_worker_state, init_worker, provision_dir, Attr,
    DeliveryQueue, DispatchUnit, FieldValue, Handler, LogLevel, LogRecord, Logger, LoggerBuilder,
    LoggerError, LoggerOptions, Provisioned, QueueSender, Result, SharedHandler, SourceLocation,
    TimestampFormat, WorkerState, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::handlers::{ConsoleHandler, MemoryHandler, RotatingFileHandler, RotationPolicy};
