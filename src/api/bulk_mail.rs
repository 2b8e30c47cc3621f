use reqwest::Method;

use super::client::{decode, unwrap_envelope, ApiClient};
use crate::errors::AppResult;
use crate::models::bulk_mail::{BulkMailDraft, BulkMailRecord, BulkMailStats};
use crate::models::notice::DispatchReceipt;

impl ApiClient {
    /// `POST /bulk`
    pub async fn send_bulk_mail(&self, token: &str, draft: &BulkMailDraft) -> AppResult<DispatchReceipt> {
        let body = self
            .send_multipart(Method::POST, "bulk", Some(token), draft.to_payload())
            .await?;
        decode(unwrap_envelope(body, &["data"]))
    }

    /// `GET /bulk/history`
    pub async fn bulk_history(&self, token: &str) -> AppResult<Vec<BulkMailRecord>> {
        let body = self
            .execute(self.request(Method::GET, "bulk/history", Some(token)))
            .await?;
        decode(unwrap_envelope(body, &["data", "history", "campaigns"]))
    }

    /// `GET /bulk/stats`
    pub async fn bulk_stats(&self, token: &str) -> AppResult<BulkMailStats> {
        let body = self
            .execute(self.request(Method::GET, "bulk/stats", Some(token)))
            .await?;
        decode(unwrap_envelope(body, &["data", "stats"]))
    }

    /// `GET /bulk/{id}`
    pub async fn bulk_detail(&self, token: &str, id: &str) -> AppResult<BulkMailRecord> {
        let body = self
            .execute(self.request(Method::GET, &format!("bulk/{}", id), Some(token)))
            .await?;
        decode(unwrap_envelope(body, &["data", "campaign"]))
    }
}
