// src/util/log.rs

//! File-based leveled logger. A terminal UI owns stdout, so everything the
//! client wants to say goes to `<log_dir>/{error,warn,info,debug}.log`.
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::OnceLock;
use chrono::Local;

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Log severity levels
#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn as_str(&self) -> &str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    fn filename(&self) -> &str {
        match self {
            LogLevel::Error => "error.log",
            LogLevel::Warn => "warn.log",
            LogLevel::Info => "info.log",
            LogLevel::Debug => "debug.log",
        }
    }
}

/// Logger that writes to separate files by severity
pub struct Logger {
    log_dir: PathBuf,
    debug_enabled: bool,
    error_file: Mutex<File>,
    warn_file: Mutex<File>,
    info_file: Mutex<File>,
    debug_file: Mutex<File>,
}

impl Logger {
    /// Create a new logger with the specified directory
    pub fn new(log_dir: impl AsRef<Path>, debug_enabled: bool) -> std::io::Result<Self> {
        let log_dir = log_dir.as_ref().to_path_buf();

        create_dir_all(&log_dir)?;

        // Truncate on start, one run per file set
        let open = |level: LogLevel| File::create(log_dir.join(level.filename()));
        let error_file = open(LogLevel::Error)?;
        let warn_file = open(LogLevel::Warn)?;
        let info_file = open(LogLevel::Info)?;
        let debug_file = open(LogLevel::Debug)?;

        Ok(Self {
            log_dir,
            debug_enabled,
            error_file: Mutex::new(error_file),
            warn_file: Mutex::new(warn_file),
            info_file: Mutex::new(info_file),
            debug_file: Mutex::new(debug_file),
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    /// Write a log entry to the appropriate file
    fn write_log(&self, level: LogLevel, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let formatted = format!("[{}] [{}] {}\n", timestamp, level.as_str(), message);

        let file = match level {
            LogLevel::Error => &self.error_file,
            LogLevel::Warn => &self.warn_file,
            LogLevel::Info => &self.info_file,
            LogLevel::Debug => &self.debug_file,
        };

        if let Ok(mut file) = file.lock() {
            let _ = file.write_all(formatted.as_bytes());
            let _ = file.flush();
        }
    }

    pub fn error(&self, message: &str) {
        self.write_log(LogLevel::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.write_log(LogLevel::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.write_log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        if self.debug_enabled {
            self.write_log(LogLevel::Debug, message);
        }
    }
}

/// Install the process-wide logger. Only the first call wins; later calls
/// return the logger that is already installed.
pub fn init_logger(log_dir: impl AsRef<Path>, debug_enabled: bool) -> std::io::Result<&'static Logger> {
    if let Some(logger) = LOGGER.get() {
        return Ok(logger);
    }
    let logger = Logger::new(log_dir, debug_enabled)?;
    Ok(LOGGER.get_or_init(|| logger))
}

/// The installed logger, if any. Macros are silent until `init_logger` runs.
pub fn logger() -> Option<&'static Logger> {
    LOGGER.get()
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        if let Some(logger) = $crate::util::log::logger() {
            logger.error(&format!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        if let Some(logger) = $crate::util::log::logger() {
            logger.warn(&format!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        if let Some(logger) = $crate::util::log::logger() {
            logger.info(&format!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        if let Some(logger) = $crate::util::log::logger() {
            if logger.debug_enabled() {
                logger.debug(&format!($($arg)*));
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_logger_creation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(temp_dir.path(), true).expect("Failed to create logger");

        logger.error("Test error");
        logger.warn("Test warning");
        logger.info("Test info");
        logger.debug("Test debug");

        for name in ["error.log", "warn.log", "info.log", "debug.log"] {
            assert!(temp_dir.path().join(name).exists(), "{} missing", name);
        }

        let info = fs::read_to_string(temp_dir.path().join("info.log")).unwrap();
        assert!(info.contains("[INFO] Test info"));
    }

    #[test]
    fn test_debug_gated_when_disabled() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(temp_dir.path(), false).unwrap();

        logger.debug("hidden");

        let debug = fs::read_to_string(temp_dir.path().join("debug.log")).unwrap();
        assert!(debug.is_empty());
    }
}
