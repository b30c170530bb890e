//! In-memory handler that keeps every record it receives

use crate::core::{Handler, LogLevel, LogRecord, Result};
use parking_lot::Mutex;

/// Collects records in arrival order. Useful for tests and diagnostics.
///
/// # Examples
///
/// ```
/// use rust_fanout_logger::handlers::MemoryHandler;
/// use rust_fanout_logger::{Handler, LogLevel, LogRecord};
///
/// let handler = MemoryHandler::new("memory").with_min_level(LogLevel::Info);
/// handler.handle(&LogRecord::new(LogLevel::Info, "kept", Vec::new())).unwrap();
/// assert_eq!(handler.len(), 1);
/// ```
pub struct MemoryHandler {
    name: String,
    min_level: LogLevel,
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: LogLevel::Debug,
            records: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Snapshot of received records
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Handler for MemoryHandler {
    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn handle(&self, record: &LogRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
