use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Match, Swipe};

/// Errors surfaced by the swipe/match stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. For swipes this means the
    /// ordered pair was already swiped; for matches it means the canonical
    /// pair already exists (the insert-if-absent race was lost).
    #[error("Unique constraint violation")]
    Conflict,

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Persistence operations for swipes.
///
/// Implementations must enforce uniqueness of the ordered
/// (actor_id, target_id) pair at the storage level; `insert_swipe` reports a
/// violation as `StoreError::Conflict` so that races past the existence
/// pre-check still surface as a duplicate.
#[async_trait]
pub trait SwipeStore: Send + Sync {
    async fn insert_swipe(&self, swipe: &Swipe) -> Result<(), StoreError>;

    async fn swipe_exists(&self, actor_id: &str, target_id: &str) -> Result<bool, StoreError>;

    /// Look up a LIKE/SUPER_LIKE swipe from `actor_id` toward `target_id`.
    /// PASS swipes never count as reciprocal interest.
    async fn find_reciprocal_like(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> Result<Option<Swipe>, StoreError>;

    /// All target ids the user has swiped on, regardless of action.
    async fn swiped_target_ids(&self, actor_id: &str) -> Result<Vec<String>, StoreError>;
}

/// Persistence operations for matches.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Atomically create the match unless one already exists for the
    /// canonical pair. Returns true when this call created the row, false
    /// when the pair already existed. Never errors on the duplicate case.
    async fn insert_match_if_absent(&self, m: &Match) -> Result<bool, StoreError>;

    /// All users currently matched with the given user.
    async fn matched_user_ids(&self, user_id: &str) -> Result<Vec<String>, StoreError>;
}
