//! Console handler implementation

use crate::core::attribute::format_attrs;
use crate::core::{Handler, LogLevel, LogRecord, LoggerError, Result, TimestampFormat};
use colored::Colorize;
use parking_lot::Mutex;
use std::io::{self, Write};

/// Human-readable handler, Debug and above, writing to stdout
///
/// Lines look like `2025-01-08 10:30:45 INFO  src/main.rs:12 started pid=123`.
pub struct ConsoleHandler {
    min_level: LogLevel,
    use_colors: bool,
    show_source: bool,
    timestamp_format: TimestampFormat,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleHandler {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Debug,
            use_colors: true,
            show_source: true,
            timestamp_format: TimestampFormat::DateTime,
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn with_source(mut self, show_source: bool) -> Self {
        self.show_source = show_source;
        self
    }

    /// Set the timestamp format for this handler
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_fanout_logger::handlers::ConsoleHandler;
    /// use rust_fanout_logger::TimestampFormat;
    ///
    /// let handler = ConsoleHandler::new()
    ///     .with_timestamp_format(TimestampFormat::Rfc3339);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Write somewhere other than stdout
    #[must_use]
    pub fn with_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.writer = Mutex::new(Box::new(writer));
        self
    }

    fn format_line(&self, record: &LogRecord) -> String {
        let level_str = if self.use_colors {
            format!("{:5}", record.level().to_str())
                .color(record.level().color_code())
                .to_string()
        } else {
            format!("{:5}", record.level().to_str())
        };

        let mut line = format!(
            "{} {}",
            self.timestamp_format.format_local(record.timestamp()),
            level_str
        );

        if self.show_source {
            if let Some(location) = record.location() {
                line.push(' ');
                line.push_str(&location.to_string());
            }
        }

        line.push(' ');
        line.push_str(record.message());

        if !record.attrs().is_empty() {
            line.push(' ');
            line.push_str(&format_attrs(record.attrs()));
        }

        line
    }
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for ConsoleHandler {
    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn handle(&self, record: &LogRecord) -> Result<()> {
        let line = self.format_line(record);
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)
            .map_err(|e| LoggerError::io_operation("writing console record", "write failed", e))
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
