use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::SwipeAction;

/// Request to record a swipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordSwipeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "actor_id", rename = "actorId")]
    pub actor_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_id", rename = "targetId")]
    pub target_id: String,
    pub action: SwipeAction,
}

/// Query parameters for the feed endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u16,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u16 {
    20
}

/// Request to evict a user's cached feed (sent by the profile service on
/// preference updates).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvalidateFeedRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}
