use sqlx::SqlitePool;

use crate::encryption::TokenCipher;
use crate::errors::{AppError, AppResult};
use crate::log_warn;

/// Key/value state that survives restarts. Secret values are sealed with
/// AES-GCM before they reach the table.
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
    cipher: TokenCipher,
}

impl LocalStore {
    pub fn new(pool: SqlitePool, cipher: TokenCipher) -> Self {
        Self { pool, cipher }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM client_state WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(v,)| v))
    }

    pub async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.upsert(key, value, false).await
    }

    pub async fn set_secret(&self, key: &str, value: &str) -> AppResult<()> {
        let sealed = self.cipher.seal(value).map_err(AppError::Internal)?;
        self.upsert(key, &sealed, true).await
    }

    /// Read and unseal a secret. A value sealed under another key cannot be
    /// recovered; it is dropped and reported as absent.
    pub async fn get_secret(&self, key: &str) -> AppResult<Option<String>> {
        let row: Option<(String, bool)> =
            sqlx::query_as("SELECT value, encrypted FROM client_state WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        let Some((value, encrypted)) = row else {
            return Ok(None);
        };
        if !encrypted {
            return Ok(Some(value));
        }

        match self.cipher.open(&value) {
            Ok(plain) => Ok(Some(plain)),
            Err(e) => {
                log_warn!("STORE", "Dropping unreadable secret", serde_json::json!({ "key": key, "error": e }));
                self.remove(key).await?;
                Ok(None)
            }
        }
    }

    pub async fn remove(&self, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM client_state WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert(&self, key: &str, value: &str, encrypted: bool) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO client_state (key, value, encrypted, updated_at)
             VALUES (?, ?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                encrypted = excluded.encrypted,
                updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .bind(encrypted)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::init_memory_db;

    async fn store(secret: &str) -> LocalStore {
        let pool = init_memory_db().await.unwrap();
        LocalStore::new(pool, TokenCipher::from_secret(secret).unwrap())
    }

    #[tokio::test]
    async fn test_plain_values_round_trip_and_overwrite() {
        let store = store("k").await;
        assert_eq!(store.get("theme").await.unwrap(), None);

        store.set("theme", "light").await.unwrap();
        store.set("theme", "dark").await.unwrap();
        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("dark"));

        store.remove("theme").await.unwrap();
        assert_eq!(store.get("theme").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_secret_is_not_stored_in_clear() {
        let store = store("k").await;
        store.set_secret("authToken", "jwt-abc").await.unwrap();

        let raw = store.get("authToken").await.unwrap().unwrap();
        assert!(!raw.contains("jwt-abc"));
        assert_eq!(store.get_secret("authToken").await.unwrap().as_deref(), Some("jwt-abc"));
    }

    #[tokio::test]
    async fn test_secret_under_other_key_is_dropped() {
        let store = store("first").await;
        store.set_secret("authToken", "jwt-abc").await.unwrap();

        let rekeyed = LocalStore::new(store.pool().clone(), TokenCipher::from_secret("second").unwrap());
        assert_eq!(rekeyed.get_secret("authToken").await.unwrap(), None);
        assert_eq!(rekeyed.get("authToken").await.unwrap(), None);
    }
}
