//! Logger façade
//!
//! A [`Logger`] owns an ordered, immutable handler list and a delivery mode
//! fixed at construction. Leveled calls never fail: handler errors are
//! reported on stderr and never reach the caller.

use super::{
    attribute::Attr,
    dispatch,
    error::{LoggerError, Result},
    handler::{Handler, SharedHandler},
    log_level::LogLevel,
    log_record::LogRecord,
    options::LoggerOptions,
    provision::provision_dir,
    worker::{init_worker, DeliveryQueue, DispatchUnit, QueueSender},
};
use crate::handlers::{ConsoleHandler, RotatingFileHandler, RotationPolicy};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static QUEUE_CLOSED_REPORTED: AtomicBool = AtomicBool::new(false);

#[derive(Clone)]
enum Delivery {
    Sync,
    Async(QueueSender),
}

/// Fans each record out to every handler, inline or through a worker
///
/// # Example
///
/// ```no_run
/// use rust_fanout_logger::prelude::*;
///
/// let logger = Logger::new(LoggerOptions::new().dir("logs")).unwrap();
/// logger.info("started", [attr("pid", 123)]);
/// logger.debug("console only", []);
/// ```
#[derive(Clone)]
pub struct Logger {
    handlers: Arc<[SharedHandler]>,
    delivery: Delivery,
}

impl Logger {
    /// Synchronous logger with the default file and console handlers.
    ///
    /// Provisions `options.dir` first. **If a regular file occupies that
    /// path it is deleted** unless `replace_colliding_path` is off.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be provisioned or the log file
    /// cannot be opened
    pub fn new(options: LoggerOptions) -> Result<Self> {
        Ok(Self::with_handlers(default_handlers(&options)?))
    }

    /// Same handlers as [`Logger::new`], delivered by the process-wide worker.
    ///
    /// Starts the worker on first use (see [`init_worker`]).
    ///
    /// # Errors
    ///
    /// As [`Logger::new`], or if the worker thread cannot be spawned
    pub fn new_async(options: LoggerOptions) -> Result<Self> {
        let handlers = default_handlers(&options)?;
        Ok(Self::with_handlers_on(handlers, init_worker()?))
    }

    /// Synchronous logger over custom handlers
    pub fn with_handlers(handlers: Vec<SharedHandler>) -> Self {
        Self {
            handlers: handlers.into(),
            delivery: Delivery::Sync,
        }
    }

    /// Asynchronous logger over custom handlers and a given queue
    pub fn with_handlers_on(handlers: Vec<SharedHandler>, queue: QueueSender) -> Self {
        Self {
            handlers: handlers.into(),
            delivery: Delivery::Async(queue),
        }
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn handlers(&self) -> &[SharedHandler] {
        &self.handlers
    }

    pub fn is_async(&self) -> bool {
        matches!(self.delivery, Delivery::Async(_))
    }

    /// Build a record at the caller's location and dispatch it.
    #[track_caller]
    pub fn log<I>(&self, level: LogLevel, message: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        let record = LogRecord::capture(level, message, attrs.into_iter().collect());
        self.dispatch(record);
    }

    /// Route an already built record to every handler in list order.
    ///
    /// Async mode blocks until the worker has accepted one unit per handler.
    pub fn dispatch(&self, record: LogRecord) {
        match &self.delivery {
            Delivery::Sync => dispatch::dispatch_sync(&self.handlers, &record),
            Delivery::Async(queue) => {
                let record = Arc::new(record);
                for handler in self.handlers.iter() {
                    let unit = DispatchUnit::new(Arc::clone(handler), Arc::clone(&record));
                    if let Err(unit) = queue.send(unit) {
                        report_queue_closed();
                        unit.process();
                    }
                }
            }
        }
    }

    #[track_caller]
    #[inline]
    pub fn debug<I>(&self, message: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.log(LogLevel::Debug, message, attrs);
    }

    #[track_caller]
    #[inline]
    pub fn info<I>(&self, message: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.log(LogLevel::Info, message, attrs);
    }

    #[track_caller]
    #[inline]
    pub fn warn<I>(&self, message: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.log(LogLevel::Warn, message, attrs);
    }

    #[track_caller]
    #[inline]
    pub fn error<I>(&self, message: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = Attr>,
    {
        self.log(LogLevel::Error, message, attrs);
    }

    /// Flush every handler.
    ///
    /// In async mode this first waits until the worker has handled every
    /// record this logger's queue accepted before the call.
    pub fn flush(&self) -> Result<()> {
        if let Delivery::Async(queue) = &self.delivery {
            if !queue.barrier() {
                report_queue_closed();
            }
        }
        for handler in self.handlers.iter() {
            handler.flush()?;
        }
        Ok(())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .field("async", &self.is_async())
            .finish()
    }
}

fn report_queue_closed() {
    if !QUEUE_CLOSED_REPORTED.swap(true, Ordering::Relaxed) {
        eprintln!(
            "[LOGGER ERROR] Delivery queue closed; delivering records on the calling thread"
        );
    }
}

/// The rotating file handler followed by the console handler.
///
/// # Errors
///
/// Returns error if the directory cannot be provisioned or the log file
/// cannot be opened
pub fn default_handlers(options: &LoggerOptions) -> Result<Vec<SharedHandler>> {
    provision_dir(&options.dir, options.replace_colliding_path)?;

    let policy = RotationPolicy::new()
        .with_max_size(options.max_size)
        .with_max_backups(options.max_backups)
        .with_max_age(options.max_age)
        .with_compression(options.compress);

    let file = RotatingFileHandler::with_policy(options.log_path(), policy)?
        .with_min_level(options.file_level);
    let console =
        ConsoleHandler::with_colors(options.console_colors).with_min_level(options.console_level);

    Ok(vec![Arc::new(file), Arc::new(console)])
}

enum BuilderMode {
    Sync,
    GlobalWorker,
    /// `None` when the queue was already shut down
    Queue(Option<QueueSender>),
}

/// Builder for constructing a Logger with a fluent API
///
/// # Example
/// ```
/// use rust_fanout_logger::prelude::*;
/// use std::sync::Arc;
///
/// let memory = Arc::new(MemoryHandler::new("memory"));
/// let logger = Logger::builder()
///     .shared_handler(memory.clone())
///     .handler(ConsoleHandler::with_colors(false))
///     .build()
///     .unwrap();
///
/// logger.info("hello", []);
/// assert_eq!(memory.len(), 1);
/// ```
pub struct LoggerBuilder {
    handlers: Vec<SharedHandler>,
    mode: BuilderMode,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            mode: BuilderMode::Sync,
        }
    }

    /// Append a handler; delivery follows insertion order
    #[must_use = "builder methods return a new value"]
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Append a handler the caller keeps a reference to
    #[must_use = "builder methods return a new value"]
    pub fn shared_handler(mut self, handler: SharedHandler) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Deliver through the process-wide worker
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self) -> Self {
        self.mode = BuilderMode::GlobalWorker;
        self
    }

    /// Deliver through a caller-owned queue
    #[must_use = "builder methods return a new value"]
    pub fn queue(mut self, queue: &DeliveryQueue) -> Self {
        self.mode = BuilderMode::Queue(queue.sender());
        self
    }

    /// # Errors
    ///
    /// Returns error if the process-wide worker cannot be started, or
    /// [`LoggerError::QueueClosed`] if the queue given to
    /// [`LoggerBuilder::queue`] was already shut down
    pub fn build(self) -> Result<Logger> {
        match self.mode {
            BuilderMode::Sync => Ok(Logger::with_handlers(self.handlers)),
            BuilderMode::GlobalWorker => Ok(Logger::with_handlers_on(self.handlers, init_worker()?)),
            BuilderMode::Queue(Some(sender)) => Ok(Logger::with_handlers_on(self.handlers, sender)),
            BuilderMode::Queue(None) => Err(LoggerError::QueueClosed),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::attr;
    use crate::handlers::MemoryHandler;
    use std::time::Duration;

    fn memory(name: &str, level: LogLevel) -> Arc<MemoryHandler> {
        Arc::new(MemoryHandler::new(name).with_min_level(level))
    }

    #[test]
    fn test_leveled_methods_report_call_site() {
        let sink = memory("sink", LogLevel::Debug);
        let logger = Logger::with_handlers(vec![sink.clone()]);

        let first = line!() + 1;
        logger.debug("d", []);
        logger.info("i", []);
        logger.warn("w", []);
        logger.error("e", []);
        logger.log(LogLevel::Info, "l", []);

        let records = sink.records();
        assert_eq!(records.len(), 5);
        for (offset, record) in records.iter().enumerate() {
            let location = record.location().expect("location");
            assert_eq!(location.line, first + offset as u32);
            assert!(location.file.ends_with("logger.rs"));
        }
    }

    #[test]
    fn test_sync_mode_records_and_attrs() {
        let sink = memory("sink", LogLevel::Debug);
        let logger = Logger::with_handlers(vec![sink.clone()]);

        logger.info("started", [attr("pid", 123), attr("role", "api")]);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level(), LogLevel::Info);
        assert_eq!(records[0].message(), "started");
        assert_eq!(records[0].attrs().len(), 2);
        assert_eq!(records[0].attrs()[1].key, "role");
        assert!(!logger.is_async());
    }

    #[test]
    fn test_async_mode_on_owned_queue() {
        let mut queue = DeliveryQueue::start().unwrap();
        let sink = memory("sink", LogLevel::Debug);
        let logger = Logger::builder()
            .shared_handler(sink.clone())
            .queue(&queue)
            .build()
            .unwrap();
        assert!(logger.is_async());

        for i in 0..10 {
            logger.warn(format!("message {i}"), []);
        }

        drop(logger);
        assert!(queue.shutdown(Duration::from_secs(5)));
        assert_eq!(sink.len(), 10);
    }

    #[test]
    fn test_queue_closed_falls_back_inline() {
        let sink = memory("sink", LogLevel::Debug);
        let logger = Logger::with_handlers_on(vec![sink.clone()], QueueSender::disconnected());

        logger.info("delivered inline", []);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.records()[0].message(), "delivered inline");
    }

    struct Sluggish {
        handled: std::sync::atomic::AtomicUsize,
    }

    impl Handler for Sluggish {
        fn enabled(&self, _level: LogLevel) -> bool {
            true
        }

        fn handle(&self, _record: &LogRecord) -> Result<()> {
            std::thread::sleep(Duration::from_millis(300));
            self.handled.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "sluggish"
        }
    }

    #[test]
    fn test_flush_waits_for_global_worker() {
        let sluggish = Arc::new(Sluggish {
            handled: std::sync::atomic::AtomicUsize::new(0),
        });
        let logger = Logger::builder()
            .shared_handler(sluggish.clone())
            .async_mode()
            .build()
            .unwrap();

        logger.error("last words", []);
        logger.flush().unwrap();

        assert_eq!(sluggish.handled.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_builder_rejects_shut_down_queue() {
        let mut queue = DeliveryQueue::start().unwrap();
        assert!(queue.shutdown(Duration::from_secs(5)));

        let result = Logger::builder()
            .handler(MemoryHandler::new("memory"))
            .queue(&queue)
            .build();

        assert!(matches!(result, Err(LoggerError::QueueClosed)));
    }

    #[test]
    fn test_builder_preserves_handler_order() {
        let logger = Logger::builder()
            .handler(MemoryHandler::new("first"))
            .handler(MemoryHandler::new("second"))
            .build()
            .unwrap();

        let names: Vec<_> = logger.handlers().iter().map(|h| h.name().to_string()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn test_flush_empty_logger() {
        let logger = Logger::builder().build().unwrap();
        assert!(logger.flush().is_ok());
        logger.error("nobody listening", []);
    }
}
