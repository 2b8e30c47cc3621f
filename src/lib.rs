pub mod api;
pub mod audit;
pub mod auth;
pub mod commands;
pub mod config;
pub mod database;
pub mod encryption;
pub mod errors;
pub mod export;
pub mod forms;
pub mod logger;
pub mod models;
pub mod rate_limiter;
pub mod record;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use api::ApiClient;
use auth::SessionContext;
use database::LocalStore;
use encryption::TokenCipher;
use errors::{AppError, AppResult};

/// Shared application state, passed to every command.
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub store: LocalStore,
    pub session: Mutex<SessionContext>,
    pub api: ApiClient,
    pub export_dir: PathBuf,
}

impl AppState {
    /// Boot: configuration, logger, local store, then the persisted session.
    pub async fn init(app_data_dir: &Path) -> AppResult<Self> {
        let config = config::init_config(&app_data_dir.join(".env"));

        if let Err(e) = config.validate() {
            if config.is_production() {
                return Err(AppError::Internal(e));
            }
            eprintln!("⚠️  Warning: {}", e);
        }

        if let Err(e) = logger::init_global_logger(&config.get_log_dir(app_data_dir), &config.logging) {
            eprintln!("⚠️  Warning: Failed to initialize logger: {}", e);
        }

        log_info!("APP", "Application starting", serde_json::json!({
            "version": config.version,
            "environment": config.environment.as_str(),
            "api": config.api.base_url,
            "app_data_dir": app_data_dir.to_string_lossy()
        }));

        let pool = database::connection::init_db(app_data_dir).await?;
        let cipher = TokenCipher::from_config(config.security.encryption_key.as_deref())
            .map_err(AppError::Internal)?;
        let api = ApiClient::from_config(&config.api)?;

        Self::from_parts(
            LocalStore::new(pool, cipher),
            api,
            config.get_export_dir(app_data_dir),
        )
        .await
    }

    /// Assemble state from ready parts and restore the persisted session.
    pub async fn from_parts(store: LocalStore, api: ApiClient, export_dir: PathBuf) -> AppResult<Self> {
        let key = &config::get_config().security.token_storage_key;
        let session = SessionContext::restore(&store, key).await?;

        log_info!("AUTH", "Session restored", serde_json::json!({
            "authenticated": session.is_authenticated()
        }));

        Ok(Self {
            db: store.pool().clone(),
            store,
            session: Mutex::new(session),
            api,
            export_dir,
        })
    }
}
