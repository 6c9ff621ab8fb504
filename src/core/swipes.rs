use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Match, MatchCreated, Swipe, SwipeAction};
use crate::services::events::MatchEventSink;
use crate::services::store::{MatchStore, StoreError, SwipeStore};

/// Errors surfaced to swipe callers
#[derive(Debug, Error)]
pub enum SwipeError {
    /// Self-swipe; not retryable.
    #[error("Invalid swipe: {0}")]
    InvalidSwipe(String),

    /// The ordered (actor, target) pair was already swiped; retrying with
    /// the same inputs will fail again.
    #[error("Swipe already recorded for this pair")]
    DuplicateSwipe,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result of recording a swipe
#[derive(Debug)]
pub struct SwipeOutcome {
    pub swipe_id: Uuid,
    pub matched: Option<Match>,
}

/// Detects mutual interest and creates at most one match per user pair.
///
/// The load-bearing decision: creation goes through the store's atomic
/// insert-if-absent on the canonical (low, high) key. Two reciprocal
/// detection calls racing on different workers both reach the insert; the
/// winner creates the row and emits the event, the loser silently no-ops.
/// Check-then-insert without that primitive would be racy.
pub struct MatchDetector {
    swipes: Arc<dyn SwipeStore>,
    matches: Arc<dyn MatchStore>,
    events: Arc<dyn MatchEventSink>,
}

impl MatchDetector {
    pub fn new(
        swipes: Arc<dyn SwipeStore>,
        matches: Arc<dyn MatchStore>,
        events: Arc<dyn MatchEventSink>,
    ) -> Self {
        Self {
            swipes,
            matches,
            events,
        }
    }

    /// Check for a reciprocal like and create the match if both sides have
    /// liked each other. Returns None both when there is no reciprocal
    /// interest and when the insert race was lost (the match exists and
    /// was, or will be, reported by the winning call).
    pub async fn detect_and_create(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> Result<Option<Match>, StoreError> {
        let reciprocal = self.swipes.find_reciprocal_like(target_id, actor_id).await?;
        if reciprocal.is_none() {
            return Ok(None);
        }

        let m = Match::new(actor_id, target_id);
        if self.matches.insert_match_if_absent(&m).await? {
            tracing::info!(
                "Match created: {} ({} / {})",
                m.id,
                m.user_low_id,
                m.user_high_id
            );

            // This call won the insert, so it alone emits the event.
            // Publishing is best-effort; a failed publish must not undo a
            // committed match.
            if let Err(e) = self.events.publish(&MatchCreated::from(&m)).await {
                tracing::warn!("Failed to publish match event for {}: {}", m.id, e);
            }

            Ok(Some(m))
        } else {
            tracing::debug!(
                "Match for ({}, {}) already exists; reciprocal detection won the race",
                m.user_low_id,
                m.user_high_id
            );
            Ok(None)
        }
    }
}

/// Validates and persists swipes, then hands LIKE/SUPER_LIKE swipes to the
/// match detector.
pub struct SwipeRecorder {
    swipes: Arc<dyn SwipeStore>,
    detector: MatchDetector,
}

impl SwipeRecorder {
    pub fn new(swipes: Arc<dyn SwipeStore>, detector: MatchDetector) -> Self {
        Self { swipes, detector }
    }

    /// Record one directional swipe.
    ///
    /// The existence pre-check gives a clean error on the common duplicate
    /// path, but the authoritative guard is the storage unique constraint:
    /// a concurrent duplicate that slips past the check comes back as
    /// `StoreError::Conflict` and is mapped to the same `DuplicateSwipe`.
    pub async fn record_swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        action: SwipeAction,
    ) -> Result<SwipeOutcome, SwipeError> {
        if actor_id == target_id {
            return Err(SwipeError::InvalidSwipe(
                "Users cannot swipe on themselves".to_string(),
            ));
        }

        if self.swipes.swipe_exists(actor_id, target_id).await? {
            return Err(SwipeError::DuplicateSwipe);
        }

        let swipe = Swipe::new(actor_id, target_id, action);
        match self.swipes.insert_swipe(&swipe).await {
            Ok(()) => {}
            Err(StoreError::Conflict) => return Err(SwipeError::DuplicateSwipe),
            Err(e) => return Err(e.into()),
        }

        // The swipe is durably visible at this point, so the reciprocal
        // check cannot miss it.
        let matched = if action.is_like() {
            self.detector.detect_and_create(actor_id, target_id).await?
        } else {
            None
        };

        Ok(SwipeOutcome {
            swipe_id: swipe.id,
            matched,
        })
    }
}
