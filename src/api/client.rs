use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::errors::{AppError, AppResult};
use crate::forms::MultipartPayload;
use crate::{log_debug, log_warn};

/// Client for the society REST backend. Cheap to clone; the connection pool
/// is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_secs: u64, connect_timeout_secs: u64) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> AppResult<Self> {
        Self::new(&config.base_url, config.timeout_secs, config.connect_timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// A request with the bearer token attached when one is held.
    pub(crate) fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match token {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        }
    }

    pub(crate) async fn send_multipart(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        payload: MultipartPayload,
    ) -> AppResult<Value> {
        log_debug!(
            "API",
            "Sending multipart request",
            serde_json::json!({ "path": path, "parts": payload.len(), "files": payload.file_count() })
        );
        let form = payload.into_form()?;
        self.execute(self.request(method, path, token).multipart(form)).await
    }

    /// Send and return the JSON body. Non-2xx statuses become `AppError::Api`
    /// carrying the backend's own message when it sent one.
    pub(crate) async fn execute(&self, builder: RequestBuilder) -> AppResult<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = api_error(status, &body);
            log_warn!(
                "API",
                "Request rejected",
                serde_json::json!({ "status": status.as_u16(), "error": err.to_string() })
            );
            return Err(err);
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| AppError::Internal(format!("Unexpected response from server: {}", e)))
    }
}

/// Take the first of `keys` out of a response envelope such as
/// `{ "success": true, "data": ... }`, or the body itself when none is present.
pub(crate) fn unwrap_envelope(body: Value, keys: &[&str]) -> Value {
    if let Value::Object(mut map) = body {
        for key in keys {
            if let Some(inner) = map.remove(*key) {
                return inner;
            }
        }
        return Value::Object(map);
    }
    body
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Internal(format!("Unexpected response from server: {}", e)))
}

/// Build the error for a failed response.
pub fn api_error(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| body_message(&v))
        .unwrap_or_else(|| fallback_message(status).to_string());
    AppError::Api { status: status.as_u16(), message }
}

fn body_message(body: &Value) -> Option<String> {
    let text = |v: &Value| v.as_str().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    body.get("message")
        .and_then(text)
        .or_else(|| body.get("error").and_then(text))
        .or_else(|| body.pointer("/error/message").and_then(text))
}

fn fallback_message(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "The request was invalid",
        401 => "Session expired, please log in again",
        403 => "You do not have permission to do this",
        404 => "The requested record was not found",
        409 => "The record already exists",
        413 => "The upload is too large",
        422 => "Some fields were rejected by the server",
        429 => "Too many requests, please wait and try again",
        500..=599 => "The server could not complete the request, please try again later",
        _ => "The request failed",
    }
}
