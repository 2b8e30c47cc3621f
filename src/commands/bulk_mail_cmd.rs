use super::auth_cmd::expire_on_unauthorized;
use super::notice_cmd::prepare_recipients;
use crate::audit::{self, AuditAction};
use crate::auth::guard::{require_admin, require_token};
use crate::config::{get_config, UploadConfig};
use crate::errors::{AppError, AppResult};
use crate::forms::{check_upload, Upload};
use crate::models::bulk_mail::{BulkMailDraft, BulkMailRecord, BulkMailStats, Festival};
use crate::models::notice::{DispatchReceipt, NoticeChannel};
use crate::rate_limiter::BULK_DISPATCH_LIMIT;
use crate::validation::sanitize_string;
use crate::{log_info, AppState};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// A campaign prefilled from the festival template.
pub fn compose_campaign(festival: Festival) -> BulkMailDraft {
    BulkMailDraft::from_template(festival, &get_config().app_name)
}

/// Attach the greeting image. Same size limit as other uploads, images only.
pub fn attach_campaign_image(draft: &mut BulkMailDraft, image: Upload, limits: &UploadConfig) -> AppResult<()> {
    let image_limits = UploadConfig {
        max_file_bytes: limits.max_file_bytes,
        allowed_extensions: limits
            .allowed_extensions
            .iter()
            .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .cloned()
            .collect(),
    };
    check_upload(&image, &image_limits)?;
    draft.image = Some(image);
    Ok(())
}

/// Dispatch a campaign. An empty recipient list addresses every member.
pub async fn send_bulk_mail(state: &AppState, draft: BulkMailDraft) -> AppResult<DispatchReceipt> {
    let (token, admin) = require_admin(state)?;

    let subject = sanitize_string(draft.subject.trim());
    let message = sanitize_string(draft.message.trim());
    if subject.is_empty() || message.is_empty() {
        return Err(AppError::Validation("Subject and message are required".to_string()));
    }
    let recipients = if draft.recipients.iter().all(|r| r.trim().is_empty()) {
        Vec::new()
    } else {
        prepare_recipients(&draft.recipients, NoticeChannel::Email)?
    };
    let draft = BulkMailDraft { subject, message, recipients, ..draft };

    BULK_DISPATCH_LIMIT.check(&admin, "bulk_mail")?;

    let receipt = match state.api.send_bulk_mail(&token, &draft).await {
        Ok(r) => r,
        Err(e) => return Err(expire_on_unauthorized(state, e).await),
    };

    let metadata = serde_json::json!({
        "festival": draft.festival.key(),
        "recipients": if draft.recipients.is_empty() { "all".to_string() } else { draft.recipients.len().to_string() },
        "image": draft.image.is_some(),
        "sent": receipt.sent,
        "failed": receipt.failed
    });
    audit::log_activity(
        &state.db,
        Some(&admin),
        AuditAction::BulkMailSend,
        &format!("{} campaign sent", draft.festival.name()),
        Some(&metadata),
    )
    .await;
    log_info!("BULK_MAIL", "Festival campaign dispatched", metadata);

    Ok(receipt)
}

pub async fn bulk_history(state: &AppState) -> AppResult<Vec<BulkMailRecord>> {
    let token = require_token(state)?;
    match state.api.bulk_history(&token).await {
        Ok(history) => Ok(history),
        Err(e) => Err(expire_on_unauthorized(state, e).await),
    }
}

pub async fn bulk_stats(state: &AppState) -> AppResult<BulkMailStats> {
    let token = require_token(state)?;
    match state.api.bulk_stats(&token).await {
        Ok(stats) => Ok(stats),
        Err(e) => Err(expire_on_unauthorized(state, e).await),
    }
}

pub async fn bulk_detail(state: &AppState, id: &str) -> AppResult<BulkMailRecord> {
    let token = require_token(state)?;
    match state.api.bulk_detail(&token, id).await {
        Ok(record) => Ok(record),
        Err(AppError::Api { status: 404, .. }) => Err(AppError::NotFound(format!("Campaign {}", id))),
        Err(e) => Err(expire_on_unauthorized(state, e).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::signed_in_state;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn limits() -> UploadConfig {
        UploadConfig {
            max_file_bytes: 1024,
            allowed_extensions: vec!["jpg".into(), "png".into(), "pdf".into()],
        }
    }

    #[test]
    fn test_campaign_image_rules() {
        let mut draft = compose_campaign(Festival::Holi);
        assert!(draft.subject.starts_with("Happy Holi from "));

        let pdf = attach_campaign_image(&mut draft, Upload::new("card.pdf", vec![1; 10]), &limits());
        assert!(matches!(pdf, Err(AppError::Upload(_))));
        assert!(attach_campaign_image(&mut draft, Upload::new("card.png", vec![1; 4096]), &limits()).is_err());
        assert!(draft.image.is_none());

        attach_campaign_image(&mut draft, Upload::new("card.PNG", vec![1; 10]), &limits()).unwrap();
        assert!(draft.image.is_some());
    }

    #[tokio::test]
    async fn test_send_to_all_members() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bulk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "message": "Campaign queued", "sentCount": 250
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = signed_in_state(&server.uri()).await;
        let receipt = send_bulk_mail(&state, compose_campaign(Festival::Diwali)).await.unwrap();
        assert_eq!(receipt.sent, 250);

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("diwali"));
        assert!(!body.contains("recipients[0]"));
    }

    #[tokio::test]
    async fn test_blank_subject_rejected() {
        let server = MockServer::start().await;
        let state = signed_in_state(&server.uri()).await;
        let mut draft = compose_campaign(Festival::Eid);
        draft.subject = "   ".into();
        assert!(matches!(send_bulk_mail(&state, draft).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_campaign_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bulk/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Campaign not found" })))
            .mount(&server)
            .await;

        let state = signed_in_state(&server.uri()).await;
        assert!(matches!(bulk_detail(&state, "nope").await, Err(AppError::NotFound(_))));
    }
}
