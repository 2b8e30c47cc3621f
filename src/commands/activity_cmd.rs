use crate::audit;
use crate::auth::guard::require_token;
use crate::errors::AppResult;
use crate::models::activity::ActivityLog;
use crate::AppState;

/// Recent local activity, newest first. Signed-in admins only.
pub async fn get_activity_logs(state: &AppState, limit: i64) -> AppResult<Vec<ActivityLog>> {
    require_token(state)?;
    audit::recent_activity(&state.db, limit.clamp(1, 500)).await
}
