use sqlx::SqlitePool;

use crate::config::get_config;
use crate::errors::{AppError, AppResult};
use crate::log_error;
use crate::models::activity::ActivityLog;

/// Actions recorded in the activity trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Login,
    Logout,
    MemberCreate,
    MemberUpdate,
    MemberDelete,
    NoticeSend,
    WhatsAppSend,
    BulkMailSend,
    Export,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::MemberCreate => "MEMBER_CREATE",
            AuditAction::MemberUpdate => "MEMBER_UPDATE",
            AuditAction::MemberDelete => "MEMBER_DELETE",
            AuditAction::NoticeSend => "NOTICE_SEND",
            AuditAction::WhatsAppSend => "WHATSAPP_SEND",
            AuditAction::BulkMailSend => "BULK_MAIL_SEND",
            AuditAction::Export => "EXPORT",
        }
    }
}

/// Append to the activity trail. A failed insert is logged, never returned.
pub async fn log_activity(
    db: &SqlitePool,
    admin_id: Option<&str>,
    action: AuditAction,
    description: &str,
    metadata: Option<&serde_json::Value>,
) {
    if !get_config().security.enable_audit_log {
        return;
    }

    let metadata_str = metadata.map(|m| crate::logger::redact_sensitive_data(m.clone()).to_string());

    let result = sqlx::query(
        "INSERT INTO activity_logs (admin_id, action, description, metadata) VALUES (?, ?, ?, ?)",
    )
    .bind(admin_id)
    .bind(action.as_str())
    .bind(description)
    .bind(metadata_str.as_deref())
    .execute(db)
    .await;

    if let Err(e) = result {
        log_error!("AUDIT", "Failed to record activity", e);
    }
}

/// Newest first.
pub async fn recent_activity(db: &SqlitePool, limit: i64) -> AppResult<Vec<ActivityLog>> {
    let logs = sqlx::query_as::<_, ActivityLog>(
        "SELECT id, admin_id, action, description, metadata, created_at
         FROM activity_logs
         ORDER BY id DESC
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(logs)
}

/// User-facing text for an error. Backend and validation messages pass
/// through; internal details are logged and replaced.
pub fn sanitize_error(error: &AppError, context: &str) -> String {
    match error {
        AppError::Api { .. }
        | AppError::Auth(_)
        | AppError::Validation(_)
        | AppError::Upload(_)
        | AppError::NotFound(_) => error.to_string(),
        AppError::Http(e) if e.is_timeout() => {
            "The server took too long to respond. Check your connection and try again.".to_string()
        }
        AppError::Http(_) => {
            log_error!("API", context, error);
            "Could not reach the server. Check your internet connection.".to_string()
        }
        AppError::Export(_) => {
            log_error!("EXPORT", context, error);
            "The file could not be written. Check the export folder.".to_string()
        }
        AppError::Database(_) | AppError::Path(_) | AppError::Internal(_) => {
            log_error!("APP", context, error);
            "Something went wrong. Please try again or contact the administrator.".to_string()
        }
    }
}
