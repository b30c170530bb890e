//! Logging macros with `format!` style messages and optional attributes.
//!
//! Attributes follow the format arguments after a `;` as `key => value`
//! pairs. The call site recorded is the line of the macro invocation.
//!
//! # Examples
//!
//! ```
//! use rust_fanout_logger::prelude::*;
//! use rust_fanout_logger::{info, warn};
//! use std::sync::Arc;
//!
//! let memory = Arc::new(MemoryHandler::new("memory"));
//! let logger = Logger::with_handlers(vec![memory.clone()]);
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! warn!(logger, "Slow request"; "path" => "/users", "ms" => 950);
//!
//! assert_eq!(memory.len(), 3);
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::with_handlers(Vec::new());
/// use rust_fanout_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warn, "Retrying"; "attempt" => 2);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* ; $($key:expr => $value:expr),+ $(,)?) => {
        $logger.log($level, format!($fmt $(, $arg)*), [$($crate::attr($key, $value)),+])
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), [])
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::with_handlers(Vec::new());
/// use rust_fanout_logger::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::with_handlers(Vec::new());
/// use rust_fanout_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100; "batch" => 7);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::with_handlers(Vec::new());
/// use rust_fanout_logger::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::with_handlers(Vec::new());
/// use rust_fanout_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}", 500; "retryable" => false);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{FieldValue, LogLevel, Logger};
    use crate::handlers::MemoryHandler;
    use std::sync::Arc;

    fn logger() -> (Logger, Arc<MemoryHandler>) {
        let memory = Arc::new(MemoryHandler::new("memory"));
        (Logger::with_handlers(vec![memory.clone()]), memory)
    }

    #[test]
    fn test_log_macro() {
        let (logger, memory) = logger();
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Error, "Formatted: {}", 42);

        let records = memory.records();
        assert_eq!(records[0].message(), "Test message");
        assert_eq!(records[1].message(), "Formatted: 42");
        assert_eq!(records[1].level(), LogLevel::Error);
        assert!(records[1].attrs().is_empty());
    }

    #[test]
    fn test_leveled_macros() {
        let (logger, memory) = logger();
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);

        let levels: Vec<_> = memory.records().iter().map(|r| r.level()).collect();
        assert_eq!(levels, LogLevel::ALL);
    }

    #[test]
    fn test_macro_attributes() {
        let (logger, memory) = logger();
        info!(logger, "request {}", "done"; "status" => 200, "path" => "/health",);

        let record = &memory.records()[0];
        assert_eq!(record.message(), "request done");
        assert_eq!(record.attrs().len(), 2);
        assert_eq!(record.attr("status").unwrap().value, FieldValue::Int(200));
        assert_eq!(
            record.attr("path").unwrap().value,
            FieldValue::String("/health".to_string())
        );
    }

    #[test]
    fn test_macro_reports_invocation_line() {
        let (logger, memory) = logger();
        let line = line!() + 1;
        warn!(logger, "here");

        let location = memory.records()[0].location().cloned().unwrap();
        assert_eq!(location.line, line);
        assert!(location.file.ends_with("macros.rs"));
    }
}
