use std::time::Duration;

use async_trait::async_trait;
use essence_core::MediahavenConfig;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{LookupOutcome, MediaObject, MetadataLookup};

const MEDIA_ACCEPT: &str = "application/vnd.mediahaven.v2+json";

#[derive(Debug, thiserror::Error)]
pub enum MediahavenError {
    #[error("Failed to obtain MediaHaven token: {0}")]
    Authentication(String),

    #[error("MediaHaven request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("MediaHaven returned {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Authenticated MediaHaven REST client.
///
/// One bearer token is shared by all callers. A 401 triggers a single
/// refresh, serialized so concurrent callers reuse the new token.
pub struct MediahavenClient {
    http_client: reqwest::Client,
    config: MediahavenConfig,
    token: Mutex<Option<String>>,
}

impl MediahavenClient {
    pub fn new(config: MediahavenConfig) -> Result<Self, MediahavenError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            config,
            token: Mutex::new(None),
        })
    }

    async fn request_token(&self) -> Result<String, MediahavenError> {
        let url = format!("{}/oauth/access_token", self.config.host);
        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .form(&[("grant_type", "password")])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(MediahavenError::Authentication(format!(
                "{} - {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!("Obtained MediaHaven access token");
        Ok(token.access_token)
    }

    async fn current_token(&self) -> Result<String, MediahavenError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }
        let token = self.request_token().await?;
        *guard = Some(token.clone());
        Ok(token)
    }

    /// Replace `stale` with a new token unless another caller already did.
    async fn refresh_token(&self, stale: &str) -> Result<String, MediahavenError> {
        let mut guard = self.token.lock().await;
        if let Some(current) = guard.as_ref().filter(|current| current.as_str() != stale) {
            return Ok(current.clone());
        }
        tracing::info!("MediaHaven token rejected, refreshing");
        let token = self.request_token().await?;
        *guard = Some(token.clone());
        Ok(token)
    }

    async fn send_get(&self, fragment_id: &str, token: &str) -> Result<Response, MediahavenError> {
        let url = format!(
            "{}/media/{}",
            self.config.host,
            utf8_percent_encode(fragment_id, NON_ALPHANUMERIC)
        );
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, MEDIA_ACCEPT)
            .send()
            .await?;
        Ok(response)
    }

    /// Fetch a fragment. Errors cover everything except MediaHaven
    /// answering that the fragment is unknown.
    pub async fn fetch_fragment(&self, fragment_id: &str) -> Result<LookupOutcome, MediahavenError> {
        let token = self.current_token().await?;
        let mut response = self.send_get(fragment_id, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let token = self.refresh_token(&token).await?;
            response = self.send_get(fragment_id, &token).await?;
        }

        let status = response.status();
        match status {
            s if s.is_success() => Ok(LookupOutcome::Found(
                response.json::<MediaObject>().await?,
            )),
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                let body = response.text().await.unwrap_or_default();
                Ok(LookupOutcome::NotFound {
                    detail: format!("{} - {}", status, body),
                })
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(MediahavenError::UnexpectedStatus { status, body })
            }
        }
    }

    #[cfg(test)]
    async fn seed_token(&self, token: &str) {
        *self.token.lock().await = Some(token.to_string());
    }
}

#[async_trait]
impl MetadataLookup for MediahavenClient {
    async fn get_fragment(&self, fragment_id: &str) -> LookupOutcome {
        self.fetch_fragment(fragment_id)
            .await
            .unwrap_or_else(|e| LookupOutcome::TransportError(e.to_string()))
    }
}
