use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::ProfileSnapshot;

/// Errors that can occur when talking to the profile service
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Read-only access to user profiles, owned by the external profile
/// service.
///
/// `get_profiles` must be a single batch call; the feed pipeline fetches
/// the requester plus the whole candidate pool in one round trip.
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// Fetch snapshots for the given user ids in one batch. Ids without a
    /// corresponding profile are simply absent from the result.
    async fn get_profiles(&self, ids: &[String]) -> Result<Vec<ProfileSnapshot>, ProfileError>;

    /// Ids of potential candidates for the given user, before any
    /// swipe/match exclusion is applied.
    async fn candidate_ids(&self, user_id: &str, limit: usize) -> Result<Vec<String>, ProfileError>;
}

/// HTTP client for the profile service's REST API
pub struct HttpProfileProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpProfileProvider {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    fn parse_profiles(json: &Value) -> Result<Vec<ProfileSnapshot>, ProfileError> {
        let documents = json
            .get("profiles")
            .and_then(|d| d.as_array())
            .ok_or_else(|| ProfileError::InvalidResponse("Missing profiles array".into()))?;

        // Individually malformed documents are dropped, not fatal
        let profiles = documents
            .iter()
            .filter_map(|doc| match serde_json::from_value(doc.clone()) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("Dropping unparseable profile document: {}", e);
                    None
                }
            })
            .collect();

        Ok(profiles)
    }
}

#[async_trait]
impl ProfileProvider for HttpProfileProvider {
    async fn get_profiles(&self, ids: &[String]) -> Result<Vec<ProfileSnapshot>, ProfileError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let joined = ids.join(",");
        let url = format!(
            "{}/v1/profiles?ids={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&joined)
        );

        tracing::debug!("Fetching {} profiles in one batch", ids.len());

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProfileError::ApiError(format!(
                "Failed to fetch profiles: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        Self::parse_profiles(&json)
    }

    async fn candidate_ids(&self, user_id: &str, limit: usize) -> Result<Vec<String>, ProfileError> {
        let url = format!(
            "{}/v1/profiles/candidates?userId={}&limit={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(user_id),
            limit
        );

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProfileError::ApiError(format!(
                "Failed to fetch candidate ids: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let ids = json
            .get("userIds")
            .and_then(|d| d.as_array())
            .ok_or_else(|| ProfileError::InvalidResponse("Missing userIds array".into()))?
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();

        Ok(ids)
    }
}
