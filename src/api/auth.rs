use reqwest::Method;

use super::client::{decode, unwrap_envelope, ApiClient};
use crate::errors::AppResult;
use crate::models::auth::{Credentials, LoginResponse};

impl ApiClient {
    /// `POST /login`
    pub async fn login(&self, credentials: &Credentials) -> AppResult<LoginResponse> {
        let body = self
            .execute(self.request(Method::POST, "login", None).json(credentials))
            .await?;
        decode(unwrap_envelope(body, &["data"]))
    }

    /// `POST /logout`
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.execute(self.request(Method::POST, "logout", Some(token))).await?;
        Ok(())
    }
}
