// Core engine exports
pub mod aggregator;
pub mod feed;
pub mod scorers;
pub mod swipes;

pub use aggregator::ScoreAggregator;
pub use feed::{FeedConfig, FeedError, FeedGenerator, FeedPage};
pub use scorers::{
    ActivityScorer, AgeScorer, CompatibilityScorer, GenderScorer, InterestScorer, NEUTRAL_SCORE,
};
pub use swipes::{MatchDetector, SwipeError, SwipeOutcome, SwipeRecorder};
