use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::error;

use pollbot_core::config::MattermostConfig;

/// Display string substituted whenever the directory lookup fails.
pub const RESOLVE_FAILED_SENTINEL: &str = "<Failed to resolve usernames>";

/// Resolves opaque user ids to display names.
///
/// Infallible by contract: any failure degrades to a single sentinel entry
/// so poll rendering always succeeds. The result is a display list — the
/// directory does not guarantee positional correspondence with the request,
/// so it must not be treated as a lookup table.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve_usernames(&self, user_ids: &[String]) -> Vec<String>;
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("directory request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("directory returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Batched username lookup against the platform's user directory
/// (`POST <base>/api/v4/users/ids`, bearer-authenticated).
#[derive(Clone)]
pub struct UserDirectory {
    client: reqwest::Client,
    base_url: String,
    pa_token: SecretString,
}

impl UserDirectory {
    pub fn from_config(config: &MattermostConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_owned(),
            pa_token: config.pa_token.clone(),
        })
    }

    async fn fetch_usernames(&self, user_ids: &[String]) -> Result<Vec<String>, ResolveError> {
        let url = format!("{}/api/v4/users/ids", self.base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(self.pa_token.expose_secret())
            .json(user_ids)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status(status));
        }

        let records: Vec<UserRecord> = response.json().await?;
        Ok(records.into_iter().map(|record| record.username).collect())
    }
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    username: String,
}

#[async_trait]
impl NameResolver for UserDirectory {
    async fn resolve_usernames(&self, user_ids: &[String]) -> Vec<String> {
        if user_ids.is_empty() {
            return Vec::new();
        }

        match self.fetch_usernames(user_ids).await {
            Ok(usernames) => usernames,
            Err(err) => {
                error!(
                    event_name = "mattermost.directory.resolve_failed",
                    error = %err,
                    id_count = user_ids.len(),
                    "username resolution failed"
                );
                vec![RESOLVE_FAILED_SENTINEL.to_owned()]
            }
        }
    }
}
