use reqwest::Method;

use super::client::{decode, unwrap_envelope, ApiClient};
use crate::errors::AppResult;
use crate::models::notice::{DispatchReceipt, NoticeDraft, NoticeRecord, WhatsAppNotice};

impl ApiClient {
    /// `POST /notice/send` (multipart with attachments)
    pub async fn send_notice(&self, token: &str, draft: &NoticeDraft) -> AppResult<DispatchReceipt> {
        let body = self
            .send_multipart(Method::POST, "notice/send", Some(token), draft.to_payload())
            .await?;
        decode(unwrap_envelope(body, &["data"]))
    }

    /// `POST /notice/send-whatsapp`
    pub async fn send_whatsapp(&self, token: &str, notice: &WhatsAppNotice) -> AppResult<DispatchReceipt> {
        let body = self
            .execute(self.request(Method::POST, "notice/send-whatsapp", Some(token)).json(notice))
            .await?;
        decode(unwrap_envelope(body, &["data"]))
    }

    /// `GET /notice/history`
    pub async fn notice_history(&self, token: &str) -> AppResult<Vec<NoticeRecord>> {
        let body = self
            .execute(self.request(Method::GET, "notice/history", Some(token)))
            .await?;
        decode(unwrap_envelope(body, &["data", "notices", "history"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_whatsapp_body_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notice/send-whatsapp"))
            .and(body_json(json!({ "numbers": ["9876543210"], "message": "Meeting at 5" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "message": "Queued", "sentCount": 1
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), 5, 5).unwrap();
        let receipt = client
            .send_whatsapp(
                "jwt",
                &WhatsAppNotice { numbers: vec!["9876543210".into()], message: "Meeting at 5".into() },
            )
            .await
            .unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.sent, 1);
    }

    #[tokio::test]
    async fn test_history_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notice/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "notices": [{ "_id": "n1", "subject": "AGM" }]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), 5, 5).unwrap();
        let history = client.notice_history("jwt").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].subject, "AGM");
    }
}
