use chrono::NaiveDate;

use crate::api::ApiClient;
use crate::database::connection::init_memory_db;
use crate::database::LocalStore;
use crate::encryption::TokenCipher;
use crate::models::auth::AdminProfile;
use crate::AppState;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

/// Signed-out state on an in-memory store, talking to `base_url`.
pub async fn state_with_api(base_url: &str) -> AppState {
    let store = LocalStore::new(
        init_memory_db().await.unwrap(),
        TokenCipher::from_secret("test-secret").unwrap(),
    );
    let api = ApiClient::new(base_url, 5, 5).unwrap();
    let export_dir = std::env::temp_dir().join(format!("society-exports-{}", uuid::Uuid::new_v4()));
    AppState::from_parts(store, api, export_dir).await.unwrap()
}

/// Signed in as a fresh admin, so shared dispatch limits never collide
/// between tests.
pub async fn signed_in_state(base_url: &str) -> AppState {
    let state = state_with_api(base_url).await;
    let admin = AdminProfile {
        id: uuid::Uuid::new_v4().to_string(),
        name: "Test Admin".into(),
        email: "admin@society.in".into(),
        role: "admin".into(),
    };
    state.session.lock().unwrap().begin("jwt-test".into(), admin);
    state
}
