//! Ember Match - match detection and compatibility scoring engine for the
//! Ember dating app.
//!
//! This library records directional swipes, detects mutual matches exactly
//! once per user pair, and builds ranked, paginated candidate feeds from a
//! set of weighted compatibility scorers.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    FeedConfig, FeedGenerator, FeedPage, MatchDetector, ScoreAggregator, SwipeError,
    SwipeRecorder,
};
pub use models::{
    canonical_pair, CompatibilityScore, Match, MatchCreated, ProfileSnapshot, Swipe, SwipeAction,
};
