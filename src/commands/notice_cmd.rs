use super::auth_cmd::expire_on_unauthorized;
use crate::audit::{self, AuditAction};
use crate::auth::guard::{require_admin, require_token};
use crate::config::get_config;
use crate::errors::{AppError, AppResult};
use crate::forms::check_upload;
use crate::models::member::Member;
use crate::models::notice::{DispatchReceipt, NoticeChannel, NoticeDraft, NoticeRecord, WhatsAppNotice};
use crate::rate_limiter::NOTICE_DISPATCH_LIMIT;
use crate::validation::{sanitize_string, validate_email_recipient, validate_mobile_recipient};
use crate::{log_info, AppState};

/// Trim, drop blanks and duplicates, then check every recipient against the
/// channel's rule. All invalid entries are reported together.
pub fn prepare_recipients(raw: &[String], channel: NoticeChannel) -> AppResult<Vec<String>> {
    let mut recipients: Vec<String> = Vec::new();
    for r in raw {
        let r = match channel {
            NoticeChannel::Email => r.trim().to_lowercase(),
            NoticeChannel::WhatsApp => mobile_digits(r),
        };
        if !r.is_empty() && !recipients.contains(&r) {
            recipients.push(r);
        }
    }

    if recipients.is_empty() {
        return Err(AppError::Validation("Add at least one recipient".to_string()));
    }

    let invalid: Vec<String> = recipients
        .iter()
        .filter_map(|r| match channel {
            NoticeChannel::Email => validate_email_recipient(r).err(),
            NoticeChannel::WhatsApp => validate_mobile_recipient(r).err(),
        })
        .collect();
    if !invalid.is_empty() {
        return Err(AppError::Validation(invalid.join("; ")));
    }

    Ok(recipients)
}

/// Ten-digit national number; a `91` country code is dropped.
fn mobile_digits(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.strip_prefix("91") {
        Some(rest) if digits.len() == 12 => rest.to_string(),
        _ => digits,
    }
}

/// Recipients for a channel taken from member records.
pub fn member_recipients(members: &[Member], channel: NoticeChannel) -> Vec<String> {
    members
        .iter()
        .map(|m| match channel {
            NoticeChannel::Email => m.email(),
            NoticeChannel::WhatsApp => m.mobile(),
        })
        .filter(|r| !r.trim().is_empty())
        .collect()
}

fn require_text(label: &str, value: &str) -> AppResult<String> {
    let clean = sanitize_string(value.trim());
    if clean.is_empty() {
        return Err(AppError::Validation(format!("{} is required", label)));
    }
    Ok(clean)
}

pub async fn send_notice(state: &AppState, draft: NoticeDraft) -> AppResult<DispatchReceipt> {
    let (token, admin) = require_admin(state)?;

    let limits = &get_config().uploads;
    for attachment in &draft.attachments {
        check_upload(attachment, limits)?;
    }
    let draft = NoticeDraft {
        subject: require_text("Subject", &draft.subject)?,
        message: require_text("Message", &draft.message)?,
        recipients: prepare_recipients(&draft.recipients, NoticeChannel::Email)?,
        attachments: draft.attachments,
    };

    NOTICE_DISPATCH_LIMIT.check(&admin, "notice")?;

    let receipt = match state.api.send_notice(&token, &draft).await {
        Ok(r) => r,
        Err(e) => return Err(expire_on_unauthorized(state, e).await),
    };

    let metadata = serde_json::json!({
        "recipients": draft.recipients.len(),
        "attachments": draft.attachments.len(),
        "sent": receipt.sent,
        "failed": receipt.failed
    });
    audit::log_activity(
        &state.db,
        Some(&admin),
        AuditAction::NoticeSend,
        &format!("Notice \"{}\" sent", draft.subject),
        Some(&metadata),
    )
    .await;
    log_info!("NOTICE", "Email notice dispatched", metadata);

    Ok(receipt)
}

pub async fn send_whatsapp(state: &AppState, numbers: &[String], message: &str) -> AppResult<DispatchReceipt> {
    let (token, admin) = require_admin(state)?;

    let notice = WhatsAppNotice {
        numbers: prepare_recipients(numbers, NoticeChannel::WhatsApp)?,
        message: require_text("Message", message)?,
    };

    NOTICE_DISPATCH_LIMIT.check(&admin, "whatsapp")?;

    let receipt = match state.api.send_whatsapp(&token, &notice).await {
        Ok(r) => r,
        Err(e) => return Err(expire_on_unauthorized(state, e).await),
    };

    audit::log_activity(
        &state.db,
        Some(&admin),
        AuditAction::WhatsAppSend,
        "WhatsApp notice sent",
        Some(&serde_json::json!({ "recipients": notice.numbers.len(), "sent": receipt.sent })),
    )
    .await;

    Ok(receipt)
}

pub async fn notice_history(state: &AppState) -> AppResult<Vec<NoticeRecord>> {
    let token = require_token(state)?;
    match state.api.notice_history(&token).await {
        Ok(history) => Ok(history),
        Err(e) => Err(expire_on_unauthorized(state, e).await),
    }
}
