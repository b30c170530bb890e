//! Handler trait for log destinations

use super::{error::Result, log_level::LogLevel, log_record::LogRecord};
use std::sync::Arc;

/// A destination that filters by level and writes records.
///
/// Handlers are shared between calling threads and the delivery worker, so
/// every method takes `&self`; implementations guard their own state.
///
/// A handler must not log through an async logger that shares its delivery
/// queue. The worker runs [`Handler::handle`], and a nested send would wait
/// on that same worker, so the queue deadlocks.
pub trait Handler: Send + Sync {
    /// Whether records at `level` should reach [`Handler::handle`].
    fn enabled(&self, level: LogLevel) -> bool;

    /// Render and write one record.
    fn handle(&self, record: &LogRecord) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// Handler reference held by loggers and dispatch units
pub type SharedHandler = Arc<dyn Handler>;
