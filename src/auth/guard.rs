use super::session::SessionContext;
use crate::errors::{AppError, AppResult};
use crate::AppState;

/// Snapshot of the current session. The lock is not held across awaits.
pub fn current_session(state: &AppState) -> AppResult<SessionContext> {
    let session = state
        .session
        .lock()
        .map_err(|_| AppError::Internal("Session lock poisoned".to_string()))?;
    Ok(session.clone())
}

/// The bearer token, or an auth error when nobody is signed in.
pub fn require_token(state: &AppState) -> AppResult<String> {
    current_session(state)?
        .token()
        .map(String::from)
        .ok_or_else(|| AppError::Auth("Please log in to continue".to_string()))
}

/// Token plus the key used for rate limits and the activity trail.
pub fn require_admin(state: &AppState) -> AppResult<(String, String)> {
    let session = current_session(state)?;
    let token = session
        .token()
        .map(String::from)
        .ok_or_else(|| AppError::Auth("Please log in to continue".to_string()))?;
    let key = session.admin_key().unwrap_or_else(|| "admin".to_string());
    Ok((token, key))
}
