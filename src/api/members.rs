use reqwest::Method;
use serde_json::Value;

use super::client::{decode, unwrap_envelope, ApiClient};
use crate::errors::AppResult;
use crate::forms::MultipartPayload;
use crate::models::member::{Member, MemberPage, MemberQuery};

impl ApiClient {
    /// `GET /members`. Accepts a bare array or a paged envelope.
    pub async fn list_members(&self, token: &str, query: &MemberQuery) -> AppResult<MemberPage> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(("search", search.trim().to_string()));
        }
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        let body = self
            .execute(self.request(Method::GET, "members", Some(token)).query(&params))
            .await?;

        match body {
            Value::Array(_) => {
                let members: Vec<Member> = decode(body)?;
                Ok(MemberPage {
                    total: members.len() as u64,
                    page: 1,
                    total_pages: 1,
                    members,
                })
            }
            other => decode(unwrap_page(other)),
        }
    }

    /// `GET /members/{id}`
    pub async fn get_member(&self, token: &str, id: &str) -> AppResult<Member> {
        let body = self
            .execute(self.request(Method::GET, &format!("members/{}", id), Some(token)))
            .await?;
        decode(unwrap_envelope(body, &["data", "member"]))
    }

    /// `POST /members` with the dossier as multipart.
    pub async fn create_member(&self, token: &str, payload: MultipartPayload) -> AppResult<Member> {
        let body = self
            .send_multipart(Method::POST, "members", Some(token), payload)
            .await?;
        decode(unwrap_envelope(body, &["data", "member"]))
    }

    /// `PUT /members/{id}` with the dossier as multipart.
    pub async fn update_member(&self, token: &str, id: &str, payload: MultipartPayload) -> AppResult<Member> {
        let body = self
            .send_multipart(Method::PUT, &format!("members/{}", id), Some(token), payload)
            .await?;
        decode(unwrap_envelope(body, &["data", "member"]))
    }

    /// `DELETE /members/{id}`
    pub async fn delete_member(&self, token: &str, id: &str) -> AppResult<()> {
        self.execute(self.request(Method::DELETE, &format!("members/{}", id), Some(token)))
            .await?;
        Ok(())
    }
}

/// `{ data: { members: [...], total } }` and `{ data: [...], total }` both
/// become a flat page object.
fn unwrap_page(body: Value) -> Value {
    let Value::Object(mut map) = body else { return body };
    match map.remove("data") {
        Some(Value::Array(items)) => {
            map.insert("members".into(), Value::Array(items));
            Value::Object(map)
        }
        Some(inner @ Value::Object(_)) => inner,
        Some(other) => {
            map.insert("data".into(), other);
            Value::Object(map)
        }
        None => Value::Object(map),
    }
}
