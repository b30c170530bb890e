//! Logger construction options
//!
//! Setters are applied in the order the caller chains them over a struct of
//! defaults. Numeric values are not validated here; the rotating file
//! handler decides what zero or negative limits mean.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DIR: &str = "logs";
pub const DEFAULT_FILE: &str = "app.log";
/// Megabytes
pub const DEFAULT_MAX_SIZE: i64 = 10;
pub const DEFAULT_MAX_BACKUPS: i64 = 3;
/// Days
pub const DEFAULT_MAX_AGE: i64 = 7;

/// Options for the default file + console handler pair
///
/// # Examples
///
/// ```
/// use rust_fanout_logger::LoggerOptions;
///
/// let options = LoggerOptions::new()
///     .dir("/var/log/myapp")
///     .file("service.log")
///     .max_size(50)
///     .max_backups(5);
///
/// assert_eq!(options.log_path().to_str(), Some("/var/log/myapp/service.log"));
/// assert_eq!(options.max_age, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    /// Directory holding the log file and its backups
    pub dir: PathBuf,
    /// Log file name inside `dir`
    pub file: String,
    /// Rotation threshold in megabytes
    pub max_size: i64,
    /// Rotated files to keep
    pub max_backups: i64,
    /// Days to keep rotated files
    pub max_age: i64,
    /// Gzip rotated files
    pub compress: bool,
    /// Minimum level written to the file
    pub file_level: LogLevel,
    /// Minimum level written to the console
    pub console_level: LogLevel,
    /// Colorize console level names
    pub console_colors: bool,
    /// Replace a non-directory found at `dir` with a directory.
    ///
    /// When `true` (the default) a regular file at `dir` is **deleted**
    /// during construction. Set to `false` to fail construction instead.
    pub replace_colliding_path: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_DIR),
            file: DEFAULT_FILE.to_string(),
            max_size: DEFAULT_MAX_SIZE,
            max_backups: DEFAULT_MAX_BACKUPS,
            max_age: DEFAULT_MAX_AGE,
            compress: false,
            file_level: LogLevel::Warn,
            console_level: LogLevel::Debug,
            console_colors: true,
            replace_colliding_path: true,
        }
    }
}

impl LoggerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from JSON; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not a valid options object
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LoggerError::config("LoggerOptions", e.to_string()))
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn max_size(mut self, megabytes: i64) -> Self {
        self.max_size = megabytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn max_backups(mut self, count: i64) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn max_age(mut self, days: i64) -> Self {
        self.max_age = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn file_level(mut self, level: LogLevel) -> Self {
        self.file_level = level;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn console_level(mut self, level: LogLevel) -> Self {
        self.console_level = level;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn console_colors(mut self, enabled: bool) -> Self {
        self.console_colors = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn replace_colliding_path(mut self, enabled: bool) -> Self {
        self.replace_colliding_path = enabled;
        self
    }

    /// `dir` joined with `file`
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LoggerOptions::default();
        assert_eq!(options.dir, PathBuf::from("logs"));
        assert_eq!(options.file, "app.log");
        assert_eq!(options.max_size, 10);
        assert_eq!(options.max_backups, 3);
        assert_eq!(options.max_age, 7);
        assert_eq!(options.file_level, LogLevel::Warn);
        assert_eq!(options.console_level, LogLevel::Debug);
        assert!(options.replace_colliding_path);
    }

    #[test]
    fn test_explicit_defaults_equal_no_options() {
        let explicit = LoggerOptions::new()
            .dir(DEFAULT_DIR)
            .file(DEFAULT_FILE)
            .max_size(DEFAULT_MAX_SIZE)
            .max_backups(DEFAULT_MAX_BACKUPS)
            .max_age(DEFAULT_MAX_AGE);
        assert_eq!(explicit, LoggerOptions::default());
    }

    #[test]
    fn test_setters_apply_in_order() {
        let options = LoggerOptions::new().file("a.log").file("b.log").max_size(1).max_size(2);
        assert_eq!(options.file, "b.log");
        assert_eq!(options.max_size, 2);
    }

    #[test]
    fn test_values_pass_through_unvalidated() {
        let options = LoggerOptions::new().max_size(0).max_backups(-1).max_age(-7);
        assert_eq!(options.max_size, 0);
        assert_eq!(options.max_backups, -1);
        assert_eq!(options.max_age, -7);
    }

    #[test]
    fn test_from_json_partial() {
        let options =
            LoggerOptions::from_json(r#"{"dir":"/tmp/x","max_backups":9,"file_level":"Error"}"#)
                .unwrap();
        assert_eq!(options.dir, PathBuf::from("/tmp/x"));
        assert_eq!(options.max_backups, 9);
        assert_eq!(options.file_level, LogLevel::Error);
        assert_eq!(options.file, DEFAULT_FILE);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = LoggerOptions::from_json("{\"max_size\": \"big\"}").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
