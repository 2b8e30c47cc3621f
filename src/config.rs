//! Environment-based configuration module
//!
//! Configuration for the admin core in two environments:
//! - Development: verbose logging, human-readable log lines
//! - Production: minimal logging, JSON log lines, encryption key required
//!
//! Values are resolved from:
//! 1. Environment variables (highest priority)
//! 2. .env file
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::{env, fs};

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Get environment from APP_ENV variable or default to Development
    pub fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub app_name: String,
    pub version: String,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
    pub forms: FormConfig,
    pub exports: ExportConfig,
    pub logging: LoggingConfig,
}

/// Remote society backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Fixed HTTPS base URL, no trailing slash
    pub base_url: String,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Page size used when listing members
    pub page_size: u32,
}

/// Local client store (SQLite)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file, relative to the app data dir
    pub path: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Secret used to encrypt the persisted bearer token
    pub encryption_key: Option<String>,

    /// Key under which the bearer token is persisted
    pub token_storage_key: String,

    /// Enable activity logging to the local store
    pub enable_audit_log: bool,

    /// Notice/bulk dispatches allowed per admin per window
    pub dispatch_limit: u32,

    /// Dispatch rate-limit window in seconds
    pub dispatch_window_secs: i64,
}

/// Client-side file upload constraints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Submit a dossier even while field errors are outstanding
    pub submit_on_error: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for generated documents, relative to the app data dir
    pub directory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    pub log_to_file: bool,
    pub log_to_stdout: bool,

    /// Use JSON format (true for production)
    pub json_format: bool,
    pub max_file_size_mb: u64,
    pub max_log_files: u32,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key).map(|s| s == "true" || s == "1").unwrap_or(default)
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::from_env();

        Self {
            environment: env,
            app_name: env::var("APP_NAME")
                .unwrap_or_else(|_| "Credit Society Admin".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),

            api: ApiConfig {
                base_url: env::var("API_BASE_URL")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| "https://api.creditsociety.example/api".to_string()),
                timeout_secs: env_parse("API_TIMEOUT_SECS").unwrap_or(30),
                connect_timeout_secs: 10,
                page_size: env_parse("API_PAGE_SIZE").unwrap_or(50),
            },

            storage: StorageConfig {
                path: env::var("DB_PATH").unwrap_or_else(|_| "society-admin.db".to_string()),
                max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(4),
                connect_timeout_secs: 30,
            },

            security: SecurityConfig {
                encryption_key: env::var("ENCRYPTION_KEY").ok(),
                token_storage_key: "authToken".to_string(),
                enable_audit_log: env_flag("AUDIT_LOG", true),
                dispatch_limit: env_parse("DISPATCH_LIMIT").unwrap_or(10),
                dispatch_window_secs: 60,
            },

            uploads: UploadConfig {
                max_file_bytes: env_parse("UPLOAD_MAX_BYTES").unwrap_or(5 * 1024 * 1024),
                allowed_extensions: vec![
                    "jpg".to_string(),
                    "jpeg".to_string(),
                    "png".to_string(),
                    "pdf".to_string(),
                ],
            },

            forms: FormConfig {
                submit_on_error: env_flag("SUBMIT_ON_ERROR", false),
            },

            exports: ExportConfig {
                directory: env::var("EXPORT_DIR").unwrap_or_else(|_| "exports".to_string()),
            },

            logging: LoggingConfig {
                level: env::var("RUST_LOG").unwrap_or_else(|_| {
                    if env.is_production() { "warn".to_string() } else { "debug".to_string() }
                }),
                log_to_file: true,
                log_to_stdout: env_flag("LOG_TO_STDOUT", true),
                json_format: env.is_production(),
                max_file_size_mb: 10,
                max_log_files: 5,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and defaults
    pub fn load() -> Self {
        Self::default()
    }

    /// Load configuration with a `.env` file (if it exists) underneath the
    /// environment. Variables already set are not overridden.
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;

        for (key, value) in parse_env_file(&content) {
            if env::var_os(&key).is_none() {
                env::set_var(key, value);
            }
        }

        Some(Self::default())
    }

    pub fn get_log_dir(&self, app_data_dir: &Path) -> PathBuf {
        app_data_dir.join("logs")
    }

    pub fn get_database_path(&self, app_data_dir: &Path) -> PathBuf {
        app_data_dir.join(&self.storage.path)
    }

    pub fn get_export_dir(&self, app_data_dir: &Path) -> PathBuf {
        app_data_dir.join(&self.exports.directory)
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// Validate configuration for production
    pub fn validate(&self) -> Result<(), String> {
        if !self.api.base_url.starts_with("https://") && self.is_production() {
            return Err("API_BASE_URL must use https in production".to_string());
        }

        if self.is_production() && self.security.encryption_key.is_none() {
            return Err(
                "ENCRYPTION_KEY must be set in production so the session token \
                 is not encrypted with a machine-derived key."
                    .to_string(),
            );
        }

        if self.uploads.max_file_bytes == 0 {
            return Err("UPLOAD_MAX_BYTES must be greater than zero".to_string());
        }

        Ok(())
    }
}

/// `KEY=value` pairs of a `.env` file. Comments and blank lines are skipped,
/// surrounding quotes are stripped.
fn parse_env_file(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

static GLOBAL_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize the global configuration, reading `env_file` first when present
pub fn init_config(env_file: &Path) -> &'static AppConfig {
    GLOBAL_CONFIG.get_or_init(|| AppConfig::load_from_file(env_file).unwrap_or_else(AppConfig::load))
}

/// Get the global configuration, initializing it from the environment on first use
pub fn get_config() -> &'static AppConfig {
    GLOBAL_CONFIG.get_or_init(AppConfig::load)
}
