//! Remote store client
//!
//! The connector only ever needs three write primitives from the
//! remote side, all keyed by table name and row id.

use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error};

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert-or-update the full row
    async fn upsert(&self, table: &str, id: &str, row: &serde_json::Value) -> Result<()>;

    /// Apply changed fields to an existing row
    async fn patch(&self, table: &str, id: &str, fields: &serde_json::Value) -> Result<()>;

    async fn delete(&self, table: &str, id: &str) -> Result<()>;
}

/// HTTP implementation against the hosted data store
pub struct HttpRemoteStore {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    bearer_token: String,
}

impl HttpRemoteStore {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        bearer_token: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            bearer_token: bearer_token.into(),
        })
    }

    fn row_url(&self, table: &str, id: &str) -> String {
        format!("{}/{}/{}", self.api_url, table, id)
    }

    async fn check(&self, response: reqwest::Response, action: &str) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Remote {} failed with status {}: {}", action, status, body);
            return Err(Error::Backend(format!("remote {} failed with status {}", action, status)));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn upsert(&self, table: &str, id: &str, row: &serde_json::Value) -> Result<()> {
        debug!("Upserting {}/{}", table, id);
        let response = self
            .client
            .put(self.row_url(table, id))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer_token)
            .json(row)
            .send()
            .await?;
        self.check(response, "upsert").await
    }

    async fn patch(&self, table: &str, id: &str, fields: &serde_json::Value) -> Result<()> {
        debug!("Patching {}/{}", table, id);
        let response = self
            .client
            .patch(self.row_url(table, id))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer_token)
            .json(fields)
            .send()
            .await?;
        self.check(response, "patch").await
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        debug!("Deleting {}/{}", table, id);
        let response = self
            .client
            .delete(self.row_url(table, id))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;
        self.check(response, "delete").await
    }
}
