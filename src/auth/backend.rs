//! Hosted auth service client

use crate::auth::session::RawSession;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

/// Capability set the provider needs from an identity service.
///
/// `Ok(None)` means the backend reported success without producing a
/// session (the provider treats that as an invariant violation on
/// sign-in and as "signed out" on refresh).
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn password_sign_in(&self, email: &str, password: &str) -> Result<Option<RawSession>>;
    async fn sign_out(&self, access_token: &str) -> Result<()>;
    async fn refresh(&self, refresh_token: &str) -> Result<Option<RawSession>>;
}

#[derive(Debug, Deserialize)]
struct AuthErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// HTTP implementation against a hosted identity service
pub struct HttpAuthBackend {
    client: reqwest::Client,
    auth_url: String,
    api_key: String,
}

impl HttpAuthBackend {
    pub fn new(auth_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn token_request(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<Option<RawSession>> {
        let url = format!("{}/token?grant_type={}", self.auth_url, grant_type);
        debug!("Requesting {} token from auth service", grant_type);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<AuthErrorResponse>(&text) {
                let msg = err
                    .error_description
                    .or(err.error)
                    .unwrap_or_else(|| "Unknown error".to_string());
                error!("Auth request failed: {}", msg);
                return Err(Error::Auth(msg));
            }
            error!("Auth request failed with status {}", status);
            return Err(Error::Backend(format!("auth request failed with status {}", status)));
        }

        let raw: RawSession = serde_json::from_str(&text)?;
        Ok(Some(raw))
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn password_sign_in(&self, email: &str, password: &str) -> Result<Option<RawSession>> {
        self.token_request(
            "password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/logout", self.auth_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Backend(format!("logout failed with status {}", status)));
        }
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Option<RawSession>> {
        self.token_request(
            "refresh_token",
            serde_json::json!({ "refresh_token": refresh_token }),
        )
        .await
    }
}
