//! Core logger types and traits

pub mod attribute;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod options;
pub mod provision;
pub mod timestamp;
pub mod worker;

pub use attribute::{attr, format_attrs, Attr, FieldValue};
pub use error::{LoggerError, Result};
pub use handler::{Handler, SharedHandler};
pub use log_level::LogLevel;
pub use log_record::{LogRecord, SourceLocation};
pub use logger::{default_handlers, Logger, LoggerBuilder};
pub use options::LoggerOptions;
pub use provision::{provision_dir, Provisioned};
pub use timestamp::TimestampFormat;
pub use worker::{
    global_worker_state, init_worker, DeliveryQueue, DispatchUnit, QueueSender, WorkerState,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
