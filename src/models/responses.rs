use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::CompatibilityScore;

/// Response for the record swipe endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSwipeResponse {
    #[serde(rename = "swipeId")]
    pub swipe_id: Uuid,
    #[serde(rename = "isMatch")]
    pub is_match: bool,
    #[serde(rename = "matchId", skip_serializing_if = "Option::is_none")]
    pub match_id: Option<Uuid>,
}

/// One page of the ranked candidate feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub candidates: Vec<CompatibilityScore>,
    pub total: usize,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
