//! Timestamp rendering for handler output
//!
//! The file handler writes machine-readable UTC timestamps; the console
//! handler writes a short local date-time.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// How a handler renders record timestamps
///
/// # Examples
///
/// ```
/// use rust_fanout_logger::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let time = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Rfc3339.format(&time), "2025-01-08T10:30:45.000Z");
/// assert_eq!(TimestampFormat::DateTime.format(&time), "2025-01-08 10:30:45");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Rfc3339,

    /// `2025-01-08 10:30:45`
    DateTime,

    /// Any strftime pattern
    Custom(String),
}

const DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::Millis, true),
            TimestampFormat::DateTime => datetime.format(DATE_TIME).to_string(),
            TimestampFormat::Custom(pattern) => datetime.format(pattern).to_string(),
        }
    }

    /// Same as [`TimestampFormat::format`], in the local time zone
    #[must_use]
    pub fn format_local(&self, datetime: &DateTime<Utc>) -> String {
        let local = datetime.with_timezone(&Local);
        match self {
            TimestampFormat::Rfc3339 => local.to_rfc3339_opts(SecondsFormat::Millis, false),
            TimestampFormat::DateTime => local.format(DATE_TIME).to_string(),
            TimestampFormat::Custom(pattern) => local.format(pattern).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap() + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn test_rfc3339_has_millis_and_z() {
        assert_eq!(TimestampFormat::Rfc3339.format(&sample()), "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_date_time() {
        assert_eq!(TimestampFormat::DateTime.format(&sample()), "2025-01-08 10:30:45");
    }

    #[test]
    fn test_local_date_time_shape() {
        let local = TimestampFormat::DateTime.format_local(&sample());
        assert_eq!(local.len(), 19);
        assert_eq!(&local[4..5], "-");
        assert_eq!(&local[10..11], " ");
        assert_eq!(&local[13..14], ":");
    }

    #[test]
    fn test_custom_pattern() {
        let format = TimestampFormat::Custom("%Y/%m/%d %H:%M".to_string());
        assert_eq!(format.format(&sample()), "2025/01/08 10:30");
    }

    #[test]
    fn test_serde_names() {
        let parsed: TimestampFormat = serde_json::from_str("\"DateTime\"").unwrap();
        assert_eq!(parsed, TimestampFormat::DateTime);

        let parsed: TimestampFormat = serde_json::from_str(r#"{"Custom":"%H"}"#).unwrap();
        assert_eq!(parsed, TimestampFormat::Custom("%H".to_string()));
    }
}
