use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use super::migrations::run_migrations;
use crate::config::get_config;
use crate::errors::AppResult;
use crate::log_info;

/// Open the local store under `app_data_dir` and run migrations.
///
/// WAL mode, a busy timeout and a small pool: the store only holds client
/// state and the activity trail.
pub async fn init_db(app_data_dir: &Path) -> AppResult<SqlitePool> {
    std::fs::create_dir_all(app_data_dir)
        .map_err(|e| crate::errors::AppError::Internal(format!("Cannot create data dir: {}", e)))?;

    let config = get_config();
    let db_path = config.get_database_path(app_data_dir);
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.storage.max_connections)
        .acquire_timeout(Duration::from_secs(config.storage.connect_timeout_secs))
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    log_info!(
        "DATABASE",
        "Local store ready",
        serde_json::json!({
            "path": db_path.to_string_lossy(),
            "max_connections": config.storage.max_connections
        })
    );

    Ok(pool)
}

/// A migrated in-memory store. One connection, so every query sees the
/// same database.
pub async fn init_memory_db() -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_created_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_db(dir.path()).await.unwrap();
        health_check(&pool).await.unwrap();
        assert!(get_config().get_database_path(dir.path()).exists());
    }
}
