use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::core::aggregator::ScoreAggregator;
use crate::models::{CompatibilityScore, ProfileSnapshot};
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::profiles::ProfileProvider;
use crate::services::store::{MatchStore, StoreError, SwipeStore};

/// Errors surfaced by the feed pipeline.
///
/// Profile-provider failures never appear here; the read path degrades to
/// an empty feed instead of failing loud.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// One page of the ranked candidate feed
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub candidates: Vec<CompatibilityScore>,
    pub total: usize,
    pub has_more: bool,
}

impl FeedPage {
    fn empty() -> Self {
        Self {
            candidates: vec![],
            total: 0,
            has_more: false,
        }
    }
}

/// Tunables for the feed pipeline
#[derive(Debug, Clone, Copy)]
pub struct FeedConfig {
    /// Candidates scoring below this are dropped from the feed. This is
    /// the hard filter; scorer weights alone only suppress, never exclude.
    pub min_score: f64,
    /// Upper bound on the candidate pool requested from the provider.
    pub candidate_pool_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            min_score: 0.2,
            candidate_pool_limit: 500,
        }
    }
}

/// Builds the ranked, paginated candidate feed for a user.
///
/// Pipeline: exclusion set (swiped ∪ matched ∪ self) → one batch profile
/// fetch → aggregate per candidate → cutoff → sort → cache the full list →
/// page. The full scored list, not the page, is cached; pagination over an
/// unchanged list is therefore stable.
pub struct FeedGenerator {
    swipes: Arc<dyn SwipeStore>,
    matches: Arc<dyn MatchStore>,
    profiles: Arc<dyn ProfileProvider>,
    aggregator: Arc<ScoreAggregator>,
    cache: Arc<CacheManager>,
    config: FeedConfig,
}

impl FeedGenerator {
    pub fn new(
        swipes: Arc<dyn SwipeStore>,
        matches: Arc<dyn MatchStore>,
        profiles: Arc<dyn ProfileProvider>,
        aggregator: Arc<ScoreAggregator>,
        cache: Arc<CacheManager>,
        config: FeedConfig,
    ) -> Self {
        Self {
            swipes,
            matches,
            profiles,
            aggregator,
            cache,
            config,
        }
    }

    /// Get one page of the user's feed.
    pub async fn get_feed(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<FeedPage, FeedError> {
        let key = CacheKey::feed(user_id);

        let scored = match self.cache.get::<Vec<CompatibilityScore>>(&key).await {
            Ok(cached) => {
                tracing::debug!("Feed cache hit for {}", user_id);
                cached
            }
            Err(_) => {
                let scored = self.build_scored_list(user_id).await?;
                if let Err(e) = self.cache.set(&key, &scored).await {
                    tracing::warn!("Failed to cache feed for {}: {}", user_id, e);
                }
                scored
            }
        };

        Ok(Self::paginate(scored, limit, offset))
    }

    /// Evict the cached feed, e.g. after a swipe or a preference update.
    pub async fn invalidate(&self, user_id: &str) {
        if let Err(e) = self.cache.delete(&CacheKey::feed(user_id)).await {
            tracing::warn!("Failed to invalidate feed cache for {}: {}", user_id, e);
        }
    }

    /// Score and rank the full candidate list for a user.
    async fn build_scored_list(
        &self,
        user_id: &str,
    ) -> Result<Vec<CompatibilityScore>, FeedError> {
        // Exclusion set: everyone already swiped on, every current match,
        // and the user themself.
        let mut excluded: HashSet<String> =
            self.swipes.swiped_target_ids(user_id).await?.into_iter().collect();
        excluded.extend(self.matches.matched_user_ids(user_id).await?);
        excluded.insert(user_id.to_string());

        let pool = match self
            .profiles
            .candidate_ids(user_id, self.config.candidate_pool_limit)
            .await
        {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    "Profile provider unavailable for {} candidate pool, serving empty feed: {}",
                    user_id,
                    e
                );
                return Ok(vec![]);
            }
        };

        // One batch fetch for the requester plus the surviving pool.
        let mut wanted: Vec<String> = vec![user_id.to_string()];
        wanted.extend(pool.into_iter().filter(|id| !excluded.contains(id)));

        let snapshots = match self.profiles.get_profiles(&wanted).await {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::warn!(
                    "Profile provider unavailable for {} batch fetch, serving empty feed: {}",
                    user_id,
                    e
                );
                return Ok(vec![]);
            }
        };

        let requested = wanted.len();
        let mut user_snapshot: Option<ProfileSnapshot> = None;
        let mut candidates: Vec<ProfileSnapshot> = Vec::with_capacity(snapshots.len());
        for snapshot in snapshots {
            if snapshot.user_id == user_id {
                user_snapshot = Some(snapshot);
            } else if !excluded.contains(&snapshot.user_id) {
                candidates.push(snapshot);
            }
        }

        let user_snapshot = match user_snapshot {
            Some(s) => s,
            None => {
                tracing::warn!("No profile snapshot for {}, serving empty feed", user_id);
                return Ok(vec![]);
            }
        };

        // Candidates the provider silently omitted from the batch are
        // dropped from the feed, not an error.
        let returned = candidates.len() + 1;
        if returned < requested {
            tracing::debug!(
                "Provider returned {}/{} requested profiles for {}",
                returned,
                requested,
                user_id
            );
        }

        let mut scored: Vec<CompatibilityScore> = candidates
            .iter()
            .map(|candidate| self.aggregator.aggregate(&user_snapshot, candidate))
            .filter(|score| score.final_score >= self.config.min_score)
            .collect();

        // Descending by score, candidate id ascending on ties, so repeated
        // pagination over the same list is deterministic.
        scored.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });

        tracing::debug!(
            "Scored {} candidates for {} ({} above cutoff)",
            candidates.len(),
            user_id,
            scored.len()
        );

        Ok(scored)
    }

    fn paginate(scored: Vec<CompatibilityScore>, limit: usize, offset: usize) -> FeedPage {
        let total = scored.len();
        let candidates: Vec<CompatibilityScore> =
            scored.into_iter().skip(offset).take(limit).collect();
        let has_more = offset + limit < total;

        FeedPage {
            candidates,
            total,
            has_more,
        }
    }
}
