//! Log record and caller-location capture

use super::attribute::Attr;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;

/// Source position of the application call that produced a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Location of the nearest caller not marked `#[track_caller]`.
    ///
    /// Every frame between the application and this function must carry
    /// `#[track_caller]`; that chain is what makes the reported location the
    /// original call site no matter which leveled method was used.
    #[track_caller]
    #[must_use]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One structured log event. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    timestamp: DateTime<Utc>,
    level: LogLevel,
    message: String,
    attrs: Vec<Attr>,
    location: Option<SourceLocation>,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so a record always renders as a single line.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    /// Build a record stamped with the current time and the caller's location.
    #[track_caller]
    pub fn capture(level: LogLevel, message: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Self::new(level, message, attrs).with_location(SourceLocation::caller())
    }

    /// Build a record with no source location.
    pub fn new(level: LogLevel, message: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: Self::sanitize_message(&message.into()),
            attrs,
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// Look up the first attribute with `key`.
    pub fn attr(&self, key: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.key == key)
    }

    /// `None` when the record was built without a call site.
    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::{attr, FieldValue};

    #[test]
    fn test_capture_reports_this_line() {
        let line = line!() + 1;
        let record = LogRecord::capture(LogLevel::Info, "here", Vec::new());
        let location = record.location().expect("location captured");
        assert_eq!(location.line, line);
        assert!(location.file.ends_with("log_record.rs"));
    }

    #[test]
    fn test_new_has_no_location() {
        let record = LogRecord::new(LogLevel::Debug, "plain", Vec::new());
        assert!(record.location().is_none());
    }

    #[test]
    fn test_message_sanitized() {
        let record = LogRecord::new(LogLevel::Warn, "a\nb\tc\r", Vec::new());
        assert_eq!(record.message(), "a\\nb\\tc\\r");
    }

    #[test]
    fn test_attr_lookup() {
        let record = LogRecord::new(
            LogLevel::Info,
            "started",
            vec![attr("pid", 123), attr("pid", 456)],
        );
        assert_eq!(record.attr("pid").map(|a| &a.value), Some(&FieldValue::Int(123)));
        assert!(record.attr("missing").is_none());
    }
}
