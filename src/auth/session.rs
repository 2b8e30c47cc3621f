use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::LocalStore;
use crate::errors::AppResult;
use crate::models::auth::AdminProfile;

/// Who is signed in. Held in `AppState` and passed to every command that
/// talks to the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionContext {
    #[serde(skip)]
    token: Option<String>,
    pub admin: Option<AdminProfile>,
    pub login_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the session from the token persisted under `key`.
    pub async fn restore(store: &LocalStore, key: &str) -> AppResult<Self> {
        let token = store.get_secret(key).await?.filter(|t| !t.is_empty());
        let profile = match store.get(PROFILE_KEY).await? {
            Some(raw) if token.is_some() => serde_json::from_str(&raw).ok(),
            _ => None,
        };
        Ok(Self { token, admin: profile, login_at: None })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn begin(&mut self, token: String, admin: AdminProfile) {
        self.token = Some(token);
        self.admin = Some(admin);
        self.login_at = Some(Utc::now());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Stable key for per-admin limits and the activity trail.
    pub fn admin_key(&self) -> Option<String> {
        let admin = self.admin.as_ref()?;
        [&admin.id, &admin.email]
            .into_iter()
            .find(|s| !s.is_empty())
            .cloned()
    }
}

/// Client-state key for the cached admin profile.
pub const PROFILE_KEY: &str = "adminProfile";

/// Persist a fresh login: token sealed, profile in clear.
pub async fn persist(store: &LocalStore, key: &str, token: &str, admin: &AdminProfile) -> AppResult<()> {
    store.set_secret(key, token).await?;
    let profile = serde_json::to_string(admin)
        .map_err(|e| crate::errors::AppError::Internal(e.to_string()))?;
    store.set(PROFILE_KEY, &profile).await
}

pub async fn forget(store: &LocalStore, key: &str) -> AppResult<()> {
    store.remove(key).await?;
    store.remove(PROFILE_KEY).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::init_memory_db;
    use crate::encryption::TokenCipher;

    async fn store() -> LocalStore {
        LocalStore::new(init_memory_db().await.unwrap(), TokenCipher::from_secret("k").unwrap())
    }

    fn admin() -> AdminProfile {
        AdminProfile { id: "a1".into(), name: "Admin".into(), email: "admin@society.in".into(), role: "admin".into() }
    }

    #[tokio::test]
    async fn test_empty_store_is_signed_out() {
        let session = SessionContext::restore(&store().await, "authToken").await.unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.admin_key(), None);
    }

    #[tokio::test]
    async fn test_persisted_login_survives_restart() {
        let store = store().await;
        persist(&store, "authToken", "jwt-1", &admin()).await.unwrap();

        let session = SessionContext::restore(&store, "authToken").await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("jwt-1"));
        assert_eq!(session.admin_key().as_deref(), Some("a1"));

        forget(&store, "authToken").await.unwrap();
        assert!(!SessionContext::restore(&store, "authToken").await.unwrap().is_authenticated());
    }

    #[test]
    fn test_admin_key_falls_back_to_email() {
        let mut session = SessionContext::new();
        session.begin("t".into(), AdminProfile { id: String::new(), ..admin() });
        assert_eq!(session.admin_key().as_deref(), Some("admin@society.in"));

        session.clear();
        assert!(!session.is_authenticated());
        assert!(session.admin.is_none());
    }
}
