//! Rotating JSON-lines file handler
//!
//! Each record becomes one JSON object per line. Before a write that would
//! grow the file past the size limit, the current file is renamed to
//! `<file>.1`, older backups shift up by one (`<file>.2`, ...), backups past
//! the count limit are deleted, and backups older than the age limit are
//! pruned.

use crate::core::error::{LoggerError, Result};
use crate::core::handler::Handler;
use crate::core::log_level::LogLevel;
use crate::core::log_record::LogRecord;
use crate::core::options::{DEFAULT_MAX_AGE, DEFAULT_MAX_BACKUPS, DEFAULT_MAX_SIZE};
use crate::core::timestamp::TimestampFormat;
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const MEGABYTE: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const GZ_SUFFIX: &str = ".gz";

/// Size, count and age limits for rotation
///
/// Zero or negative values disable the corresponding limit.
///
/// # Examples
///
/// ```
/// use rust_fanout_logger::handlers::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(50)
///     .with_max_backups(7)
///     .with_compression(true);
///
/// assert_eq!(policy.max_bytes(), Some(50 * 1024 * 1024));
/// assert_eq!(policy.backup_limit(), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Megabytes before rotating
    pub max_size: i64,
    /// Rotated files to keep
    pub max_backups: i64,
    /// Days to keep rotated files
    pub max_age: i64,
    /// Gzip rotated files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            max_backups: DEFAULT_MAX_BACKUPS,
            max_age: DEFAULT_MAX_AGE,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, megabytes: i64) -> Self {
        self.max_size = megabytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: i64) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, days: i64) -> Self {
        self.max_age = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Size limit in bytes, `None` when size rotation is off
    #[must_use]
    pub fn max_bytes(&self) -> Option<u64> {
        u64::try_from(self.max_size)
            .ok()
            .filter(|&mb| mb > 0)
            .map(|mb| mb.saturating_mul(MEGABYTE))
    }

    /// Backup count limit, `None` when every backup is kept
    #[must_use]
    pub fn backup_limit(&self) -> Option<usize> {
        usize::try_from(self.max_backups).ok().filter(|&n| n > 0)
    }

    /// Backup age limit, `None` when age pruning is off
    #[must_use]
    pub fn max_backup_age(&self) -> Option<Duration> {
        u32::try_from(self.max_age)
            .ok()
            .filter(|&days| days > 0)
            .map(|days| DAY * days)
    }
}

#[derive(Serialize)]
struct JsonSource<'a> {
    file: &'a str,
    line: u32,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    time: String,
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<JsonSource<'a>>,
    msg: &'a str,
    #[serde(flatten)]
    attrs: serde_json::Map<String, serde_json::Value>,
}

struct FileState {
    writer: Option<BufWriter<File>>,
    current_size: u64,
}

/// File handler writing JSON lines with size-based rotation
///
/// # Examples
///
/// ```no_run
/// use rust_fanout_logger::handlers::{RotatingFileHandler, RotationPolicy};
/// use rust_fanout_logger::LogLevel;
///
/// let handler = RotatingFileHandler::with_policy(
///     "/var/log/app.log",
///     RotationPolicy::new().with_max_size(100).with_max_backups(5),
/// )
/// .unwrap()
/// .with_min_level(LogLevel::Info);
/// ```
pub struct RotatingFileHandler {
    base_path: PathBuf,
    policy: RotationPolicy,
    min_level: LogLevel,
    timestamp_format: TimestampFormat,
    state: Mutex<FileState>,
}

impl RotatingFileHandler {
    /// Create a handler with the default policy, writing Warn and above
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Create a handler with a custom policy, writing Warn and above
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size) = Self::open(&base_path)?;

        let handler = Self {
            base_path,
            policy,
            min_level: LogLevel::Warn,
            timestamp_format: TimestampFormat::Rfc3339,
            state: Mutex::new(FileState {
                writer: Some(BufWriter::new(file)),
                current_size,
            }),
        };
        handler.prune_expired();
        Ok(handler)
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn open(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_write(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_write(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        Ok((file, size))
    }

    fn encode(&self, record: &LogRecord) -> Result<String> {
        let line = JsonLine {
            time: self.timestamp_format.format(record.timestamp()),
            level: record.level().to_str(),
            source: record.location().map(|loc| JsonSource {
                file: &loc.file,
                line: loc.line,
            }),
            msg: record.message(),
            attrs: record
                .attrs()
                .iter()
                .map(|a| (a.key.clone(), a.value.to_json_value()))
                .collect(),
        };

        let mut json = serde_json::to_string(&line)?;
        json.push('\n');
        Ok(json)
    }

    fn should_rotate(&self, current_size: u64, incoming: u64) -> bool {
        match self.policy.max_bytes() {
            Some(max_bytes) => current_size > 0 && current_size + incoming > max_bytes,
            None => false,
        }
    }

    /// Move the current file to `.1` and reopen an empty one
    fn rotate(&self, state: &mut FileState) -> Result<()> {
        if let Some(mut writer) = state.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let keep = self.policy.backup_limit().unwrap_or(usize::MAX);

        // Highest index first so a rename never lands on a live backup
        for (index, path) in self.backups() {
            if index >= keep {
                if let Err(e) = fs::remove_file(&path) {
                    eprintln!("[WARN] Failed to remove old backup {}: {}", path.display(), e);
                }
                continue;
            }

            let compressed = Self::is_compressed(&path);
            let target = self.backup_path(index + 1, compressed);
            fs::rename(&path, &target).map_err(|e| {
                LoggerError::rotation(
                    path.display().to_string(),
                    format!("Failed to rotate backup files: {}", e),
                )
            })?;
        }

        if self.base_path.exists() {
            let backup = self.backup_path(1, false);
            fs::rename(&self.base_path, &backup).map_err(|e| {
                LoggerError::rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;

            if self.policy.compress {
                self.compress_file(&backup)?;
            }
        }

        let (file, size) = Self::open(&self.base_path).map_err(|e| {
            LoggerError::rotation(
                self.base_path.display().to_string(),
                format!("Failed to create new log file: {}", e),
            )
        })?;
        state.writer = Some(BufWriter::new(file));
        state.current_size = size;

        self.prune_expired();
        Ok(())
    }

    /// Delete backups whose modification time is past the age limit
    fn prune_expired(&self) {
        let Some(max_age) = self.policy.max_backup_age() else {
            return;
        };
        let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
            return;
        };

        for (_, path) in self.backups() {
            let expired = fs::metadata(&path)
                .and_then(|m| m.modified())
                .map(|modified| modified < cutoff)
                .unwrap_or(false);
            if expired {
                if let Err(e) = fs::remove_file(&path) {
                    eprintln!("[WARN] Failed to remove expired backup {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Existing backups as `(index, path)`, highest index first
    fn backups(&self) -> Vec<(usize, PathBuf)> {
        let prefix = format!("{}.", self.file_name());
        let dir = match self.base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };

        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut backups: Vec<(usize, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let rest = name.strip_prefix(&prefix)?;
                let digits = rest.strip_suffix(GZ_SUFFIX).unwrap_or(rest);
                let index = digits.parse::<usize>().ok().filter(|&i| i > 0)?;
                Some((index, entry.path()))
            })
            .collect();

        backups.sort_by(|a, b| b.0.cmp(&a.0));
        backups
    }

    fn file_name(&self) -> String {
        self.base_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log")
            .to_string()
    }

    fn backup_path(&self, index: usize, compressed: bool) -> PathBuf {
        let suffix = if compressed { GZ_SUFFIX } else { "" };
        self.base_path
            .with_file_name(format!("{}.{}{}", self.file_name(), index, suffix))
    }

    fn is_compressed(path: &Path) -> bool {
        path.to_str().is_some_and(|p| p.ends_with(GZ_SUFFIX))
    }

    /// Gzip `path` into `path.gz`, removing the original only on success
    fn compress_file(&self, path: &Path) -> Result<()> {
        use std::io::{copy, BufReader};

        let mut gz_name = path.as_os_str().to_owned();
        gz_name.push(GZ_SUFFIX);
        let gz_path = PathBuf::from(gz_name);
        let mut tmp_name = gz_path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let temp_gz_path = PathBuf::from(tmp_name);

        let compress = || -> std::io::Result<()> {
            let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
            let output = BufWriter::with_capacity(64 * 1024, File::create(&temp_gz_path)?);
            let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
            copy(&mut reader, &mut encoder)?;
            encoder.finish()?.flush()?;
            fs::rename(&temp_gz_path, &gz_path)
        };

        if let Err(e) = compress() {
            let _ = fs::remove_file(&temp_gz_path);
            return Err(LoggerError::io_operation(
                "compress log file",
                format!("Failed to compress {}", path.display()),
                e,
            ));
        }

        if let Err(e) = fs::remove_file(path) {
            eprintln!(
                "[WARN] Compression succeeded but failed to remove original file {}: {}",
                path.display(),
                e
            );
        }

        Ok(())
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

impl Handler for RotatingFileHandler {
    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn handle(&self, record: &LogRecord) -> Result<()> {
        let line = self.encode(record)?;
        let bytes = line.len() as u64;

        let mut state = self.state.lock();

        if self.should_rotate(state.current_size, bytes) {
            if let Err(e) = self.rotate(&mut state) {
                eprintln!("[WARN] Log rotation failed: {}. Continuing with current file.", e);

                if state.writer.is_none() {
                    let (file, size) = Self::open(&self.base_path)?;
                    state.writer = Some(BufWriter::new(file));
                    state.current_size = size;
                }
                // Let the file grow past the limit rather than retry every write
                state.current_size = 0;
            }
        }

        let writer = state.writer.as_mut().ok_or_else(|| {
            LoggerError::file_write(self.base_path.display().to_string(), "Writer not initialized")
        })?;

        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| {
                LoggerError::file_write(
                    self.base_path.display().to_string(),
                    format!("Failed to write log record: {}", e),
                )
            })?;
        state.current_size += bytes;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(writer) = self.state.lock().writer.as_mut() {
            writer.flush().map_err(|e| {
                LoggerError::file_write(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}

impl Drop for RotatingFileHandler {
    fn drop(&mut self) {
        if let Some(mut writer) = self.state.get_mut().writer.take() {
            let _ = writer.flush();
        }
    }
}
