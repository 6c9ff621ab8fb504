// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    canonical_pair, CompatibilityScore, Match, MatchCreated, ProfileSnapshot, Swipe, SwipeAction,
};
pub use requests::{FeedQuery, InvalidateFeedRequest, RecordSwipeRequest};
pub use responses::{ErrorResponse, FeedResponse, HealthResponse, RecordSwipeResponse};
