//! Structured logging for the admin core
//!
//! - Log levels (ERROR, WARN, INFO, DEBUG, TRACE)
//! - JSON lines in production, human-readable lines in development
//! - Daily log file with size-based rotation
//! - Redaction of member identity numbers and credentials

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::config::LoggingConfig;

/// Log levels following RFC 5424
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "TRACE" => LogLevel::Trace,
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARN" => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// Key words whose values never reach a log line. Matched against whole
/// camelCase/snake_case words of a key, so `panNo` matches but `companyName`
/// does not.
const SENSITIVE_KEYS: &[&str] = &[
    "token", "password", "secret", "key", "aadhaar", "pan", "account", "authorization",
];

/// Structured log entry
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub log_to_file: bool,
    pub log_to_stdout: bool,
    pub json_format: bool,
    pub max_file_size_mb: u64,
    pub max_log_files: u32,
}

impl From<&LoggingConfig> for LoggerConfig {
    fn from(c: &LoggingConfig) -> Self {
        Self {
            level: LogLevel::parse(&c.level),
            log_to_file: c.log_to_file,
            log_to_stdout: c.log_to_stdout,
            json_format: c.json_format,
            max_file_size_mb: c.max_file_size_mb,
            max_log_files: c.max_log_files,
        }
    }
}

pub struct Logger {
    config: LoggerConfig,
    log_dir: PathBuf,
    current_file: Mutex<Option<BufWriter<File>>>,
    current_file_size: Mutex<u64>,
}

impl Logger {
    /// Create the log directory under `log_dir` and open today's file.
    pub fn init(log_dir: &Path, config: LoggerConfig) -> Result<Self, String> {
        std::fs::create_dir_all(log_dir)
            .map_err(|e| format!("Failed to create log directory: {}", e))?;

        let logger = Self {
            config,
            log_dir: log_dir.to_path_buf(),
            current_file: Mutex::new(None),
            current_file_size: Mutex::new(0),
        };

        if logger.config.log_to_file {
            logger.open_log_file()?;
        }

        Ok(logger)
    }

    fn log_file_path(&self, suffix: Option<u32>) -> PathBuf {
        let date = Local::now().format("%Y-%m-%d");
        match suffix {
            Some(n) => self.log_dir.join(format!("admin-{}.{}.log", date, n)),
            None => self.log_dir.join(format!("admin-{}.log", date)),
        }
    }

    /// Shift numbered files up by one and drop the oldest.
    fn rotate(&self) {
        let oldest = self.log_file_path(Some(self.config.max_log_files));
        let _ = std::fs::remove_file(&oldest);

        for i in (1..self.config.max_log_files).rev() {
            let from = self.log_file_path(Some(i));
            if from.exists() {
                let _ = std::fs::rename(&from, self.log_file_path(Some(i + 1)));
            }
        }

        let _ = std::fs::rename(self.log_file_path(None), self.log_file_path(Some(1)));
    }

    fn open_log_file(&self) -> Result<(), String> {
        let log_path = self.log_file_path(None);
        let max_size = self.config.max_file_size_mb * 1024 * 1024;

        if let Ok(meta) = std::fs::metadata(&log_path) {
            if meta.len() >= max_size {
                self.rotate();
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let size = file.metadata().map(|m| m.len()).unwrap_or(0);

        if let Ok(mut guard) = self.current_file.lock() {
            *guard = Some(BufWriter::new(file));
        }
        if let Ok(mut guard) = self.current_file_size.lock() {
            *guard = size;
        }

        Ok(())
    }

    fn format_line(&self, entry: &LogEntry) -> String {
        if self.config.json_format {
            return serde_json::to_string(entry).unwrap_or_else(|_| "{}".to_string());
        }

        format!(
            "{} [{}] [{}] {}{}{}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.level.as_str(),
            entry.target,
            entry.message,
            entry.data.as_ref().map(|d| format!(" | {}", d)).unwrap_or_default(),
            entry.error.as_ref().map(|e| format!(" | error: {}", e)).unwrap_or_default(),
        )
    }

    fn write(&self, mut entry: LogEntry) {
        if entry.level > self.config.level {
            return;
        }

        entry.data = entry.data.map(redact_sensitive_data);
        let line = self.format_line(&entry);

        if self.config.log_to_stdout {
            match entry.level {
                LogLevel::Error | LogLevel::Warn => eprintln!("{}", line),
                _ => println!("{}", line),
            }
        }

        if !self.config.log_to_file {
            return;
        }

        let max_size = self.config.max_file_size_mb * 1024 * 1024;
        let needs_rotation = self
            .current_file_size
            .lock()
            .map(|size| *size >= max_size)
            .unwrap_or(false);
        if needs_rotation {
            if let Ok(mut guard) = self.current_file.lock() {
                guard.take();
            }
            let _ = self.open_log_file();
        }

        if let Ok(mut guard) = self.current_file.lock() {
            if let Some(writer) = guard.as_mut() {
                let _ = writeln!(writer, "{}", line);
                let _ = writer.flush();

                if let Ok(mut size) = self.current_file_size.lock() {
                    *size += line.len() as u64 + 1;
                }
            }
        }
    }

    fn entry(level: LogLevel, target: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            level,
            target: target.to_string(),
            message: message.to_string(),
            data: None,
            error: None,
        }
    }

    pub fn error(&self, target: &str, message: &str, error: Option<&str>) {
        let mut entry = Self::entry(LogLevel::Error, target, message);
        entry.error = error.map(String::from);
        self.write(entry);
    }

    pub fn warn(&self, target: &str, message: &str, data: Option<serde_json::Value>) {
        let mut entry = Self::entry(LogLevel::Warn, target, message);
        entry.data = data;
        self.write(entry);
    }

    pub fn info(&self, target: &str, message: &str, data: Option<serde_json::Value>) {
        let mut entry = Self::entry(LogLevel::Info, target, message);
        entry.data = data;
        self.write(entry);
    }

    pub fn debug(&self, target: &str, message: &str, data: Option<serde_json::Value>) {
        let mut entry = Self::entry(LogLevel::Debug, target, message);
        entry.data = data;
        self.write(entry);
    }
}

/// Replace values of sensitive keys, recursively.
pub fn redact_sensitive_data(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(key, val)| {
                    if is_sensitive_key(&key) {
                        (key, serde_json::Value::String("***REDACTED***".to_string()))
                    } else {
                        (key, redact_sensitive_data(val))
                    }
                })
                .collect(),
        ),
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(redact_sensitive_data).collect())
        }
        other => other,
    }
}

fn is_sensitive_key(key: &str) -> bool {
    key_words(key).iter().any(|word| SENSITIVE_KEYS.contains(&word.as_str()))
}

/// `aadhaarCardNo` -> `["aadhaar", "card", "no"]`, `ENCRYPTION_KEY` -> `["encryption", "key"]`
fn key_words(key: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in key.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

static GLOBAL_LOGGER: OnceLock<Logger> = OnceLock::new();

/// Initialize the global logger
pub fn init_global_logger(log_dir: &Path, config: &LoggingConfig) -> Result<(), String> {
    let logger = Logger::init(log_dir, LoggerConfig::from(config))?;

    GLOBAL_LOGGER
        .set(logger)
        .map_err(|_| "Logger already initialized".to_string())
}

pub fn get_logger() -> Option<&'static Logger> {
    GLOBAL_LOGGER.get()
}

#[macro_export]
macro_rules! log_error {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.error($target, $msg, None);
        }
    };
    ($target:expr, $msg:expr, $err:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.error($target, $msg, Some(&$err.to_string()));
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.warn($target, $msg, None);
        }
    };
    ($target:expr, $msg:expr, $data:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.warn($target, $msg, Some($data));
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.info($target, $msg, None);
        }
    };
    ($target:expr, $msg:expr, $data:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.info($target, $msg, Some($data));
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.debug($target, $msg, None);
        }
    };
    ($target:expr, $msg:expr, $data:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.debug($target, $msg, Some($data));
        }
    };
}
