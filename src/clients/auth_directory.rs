//! Authorization directory client
//!
//! Remote token registry that enforces stream access and session limits.
//! The relay pushes token lifecycle operations here; this client only speaks
//! the wire protocol and reports failures as `AppError::Upstream`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Serialize;
use std::collections::HashMap;

use crate::config::AuthDirectoryConfig;
use crate::errors::{AppError, AppResult};

/// Payload for creating a remote token
#[derive(Debug, Clone, Serialize)]
pub struct TokenCreate {
    pub token: String,
    /// Subscriber agreement number
    pub user_id: String,
    /// "active" or "suspended"
    pub status: String,
    pub max_sessions: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    pub allowed_streams: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, String>>,
}

/// Payload for updating a remote token (no token rotation)
#[derive(Debug, Clone, Serialize)]
pub struct TokenUpdate {
    pub status: String,
    pub max_sessions: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    pub allowed_streams: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, String>>,
}

#[async_trait]
pub trait AuthDirectoryApi: Send + Sync {
    /// Create a token; returns the remote token id
    async fn create_token(&self, payload: &TokenCreate) -> AppResult<i64>;

    async fn update_token(&self, token_id: i64, payload: &TokenUpdate) -> AppResult<()>;

    /// Delete a token; "already absent" counts as success
    async fn delete_token(&self, token_id: i64) -> AppResult<()>;
}

pub struct HttpAuthDirectoryClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpAuthDirectoryClient {
    pub fn new(config: &AuthDirectoryConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn tokens_url(&self) -> String {
        format!("{}/api/tokens", self.base_url)
    }
}

#[async_trait]
impl AuthDirectoryApi for HttpAuthDirectoryClient {
    async fn create_token(&self, payload: &TokenCreate) -> AppResult<i64> {
        let response = self
            .client
            .post(self.tokens_url())
            .header("X-API-Key", &self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            #[derive(serde::Deserialize)]
            struct Created {
                id: i64,
            }
            let created: Created = response.json().await?;
            Ok(created.id)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AppError::upstream(
                "auth-directory",
                format!("token create failed: {status} - {body}"),
            ))
        }
    }

    async fn update_token(&self, token_id: i64, payload: &TokenUpdate) -> AppResult<()> {
        let response = self
            .client
            .patch(format!("{}/{token_id}", self.tokens_url()))
            .header("X-API-Key", &self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AppError::upstream(
                "auth-directory",
                format!("token update failed: {status} - {body}"),
            ))
        }
    }

    async fn delete_token(&self, token_id: i64) -> AppResult<()> {
        let response = self
            .client
            .delete(format!("{}/{token_id}", self.tokens_url()))
            .header("X-API-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        // Idempotent delete: not-found means the token is already gone
        if status == StatusCode::OK
            || status == StatusCode::NO_CONTENT
            || status == StatusCode::NOT_FOUND
        {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AppError::upstream(
                "auth-directory",
                format!("token delete failed: {status} - {body}"),
            ))
        }
    }
}
