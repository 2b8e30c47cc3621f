use crate::audit::{self, AuditAction};
use crate::auth::session::{self, SessionContext};
use crate::config::get_config;
use crate::errors::{AppError, AppResult};
use crate::models::auth::{AdminProfile, Credentials};
use crate::validation::validate_email_recipient;
use crate::{log_info, log_warn, AppState};

/// Sign in against the backend and persist the token.
pub async fn login(state: &AppState, email: String, password: String) -> AppResult<AdminProfile> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Email and password are required".to_string()));
    }
    validate_email_recipient(&email).map_err(AppError::Validation)?;

    let response = state
        .api
        .login(&Credentials { email: email.clone(), password })
        .await?;
    if response.token.trim().is_empty() {
        return Err(AppError::Auth("Server did not return a session token".to_string()));
    }

    let key = &get_config().security.token_storage_key;
    session::persist(&state.store, key, &response.token, &response.user).await?;

    let admin = response.user.clone();
    {
        let mut current = state
            .session
            .lock()
            .map_err(|_| AppError::Internal("Session lock poisoned".to_string()))?;
        current.begin(response.token, response.user);
    }

    let admin_id = if admin.id.is_empty() { email.clone() } else { admin.id.clone() };
    audit::log_activity(
        &state.db,
        Some(&admin_id),
        AuditAction::Login,
        &format!("Admin {} logged in", email),
        None,
    )
    .await;
    log_info!("AUTH", "Admin logged in", serde_json::json!({ "admin": admin_id }));

    Ok(admin)
}

/// Sign out. Local state is cleared even when the backend call fails.
pub async fn logout(state: &AppState) -> AppResult<()> {
    let current = crate::auth::guard::current_session(state)?;

    if let Some(token) = current.token() {
        if let Err(e) = state.api.logout(token).await {
            log_warn!("AUTH", "Remote logout failed", serde_json::json!({ "error": e.to_string() }));
        }
    }

    end_session(state).await?;

    audit::log_activity(
        &state.db,
        current.admin_key().as_deref(),
        AuditAction::Logout,
        "Admin logged out",
        None,
    )
    .await;
    Ok(())
}

pub fn check_session(state: &AppState) -> AppResult<SessionContext> {
    crate::auth::guard::current_session(state)
}

/// Drop the local session when the backend says the token is no longer
/// valid. Returns the error unchanged for the caller to surface.
pub async fn expire_on_unauthorized(state: &AppState, err: AppError) -> AppError {
    if matches!(err, AppError::Api { status: 401, .. }) {
        if let Err(e) = end_session(state).await {
            log_warn!("AUTH", "Failed to clear expired session", serde_json::json!({ "error": e.to_string() }));
        }
    }
    err
}

async fn end_session(state: &AppState) -> AppResult<()> {
    {
        let mut current = state
            .session
            .lock()
            .map_err(|_| AppError::Internal("Session lock poisoned".to_string()))?;
        current.clear();
    }
    session::forget(&state.store, &get_config().security.token_storage_key).await
}
