use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::models::{Match, Swipe};
use crate::services::store::{MatchStore, StoreError, SwipeStore};

/// In-memory swipe/match store for tests and local development.
///
/// Provides the same guarantees as the PostgreSQL schema: swipes unique on
/// the ordered (actor, target) pair and matches unique on the canonical
/// pair. Each map sits behind one mutex, so check-and-insert is atomic.
#[derive(Default)]
pub struct InMemoryStore {
    swipes: Mutex<HashMap<(String, String), Swipe>>,
    matches: Mutex<HashMap<(String, String), Match>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored matches; used by tests asserting exactly-once
    /// creation.
    pub async fn match_count(&self) -> usize {
        self.matches.lock().await.len()
    }

    pub async fn all_matches(&self) -> Vec<Match> {
        self.matches.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl SwipeStore for InMemoryStore {
    async fn insert_swipe(&self, swipe: &Swipe) -> Result<(), StoreError> {
        let mut swipes = self.swipes.lock().await;
        let key = (swipe.actor_id.clone(), swipe.target_id.clone());
        if swipes.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        swipes.insert(key, swipe.clone());
        Ok(())
    }

    async fn swipe_exists(&self, actor_id: &str, target_id: &str) -> Result<bool, StoreError> {
        let swipes = self.swipes.lock().await;
        Ok(swipes.contains_key(&(actor_id.to_string(), target_id.to_string())))
    }

    async fn find_reciprocal_like(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> Result<Option<Swipe>, StoreError> {
        let swipes = self.swipes.lock().await;
        Ok(swipes
            .get(&(actor_id.to_string(), target_id.to_string()))
            .filter(|s| s.action.is_like())
            .cloned())
    }

    async fn swiped_target_ids(&self, actor_id: &str) -> Result<Vec<String>, StoreError> {
        let swipes = self.swipes.lock().await;
        Ok(swipes
            .values()
            .filter(|s| s.actor_id == actor_id)
            .map(|s| s.target_id.clone())
            .collect())
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn insert_match_if_absent(&self, m: &Match) -> Result<bool, StoreError> {
        let mut matches = self.matches.lock().await;
        let key = (m.user_low_id.clone(), m.user_high_id.clone());
        if matches.contains_key(&key) {
            return Ok(false);
        }
        matches.insert(key, m.clone());
        Ok(true)
    }

    async fn matched_user_ids(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let matches = self.matches.lock().await;
        Ok(matches
            .values()
            .filter(|m| m.ended_at.is_none())
            .filter_map(|m| {
                if m.user_low_id == user_id {
                    Some(m.user_high_id.clone())
                } else if m.user_high_id == user_id {
                    Some(m.user_low_id.clone())
                } else {
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SwipeAction;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_duplicate_swipe_conflicts() {
        let store = InMemoryStore::new();
        let first = Swipe::new("a", "b", SwipeAction::Like);
        let second = Swipe::new("a", "b", SwipeAction::Pass);

        store.insert_swipe(&first).await.unwrap();
        assert!(matches!(
            store.insert_swipe(&second).await,
            Err(StoreError::Conflict)
        ));

        // Opposite direction is a different ordered pair
        let reverse = Swipe::new("b", "a", SwipeAction::Like);
        store.insert_swipe(&reverse).await.unwrap();
    }

    #[tokio::test]
    async fn test_pass_is_not_reciprocal_interest() {
        let store = InMemoryStore::new();
        store
            .insert_swipe(&Swipe::new("a", "b", SwipeAction::Pass))
            .await
            .unwrap();

        assert!(store.find_reciprocal_like("a", "b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_match_insert_is_exactly_once() {
        let store = Arc::new(InMemoryStore::new());

        for _ in 0..50 {
            let m1 = Match::new("a", "b");
            let m2 = Match::new("b", "a");
            let s1 = Arc::clone(&store);
            let s2 = Arc::clone(&store);

            let (r1, r2) = tokio::join!(
                tokio::spawn(async move { s1.insert_match_if_absent(&m1).await.unwrap() }),
                tokio::spawn(async move { s2.insert_match_if_absent(&m2).await.unwrap() }),
            );

            let created = [r1.unwrap(), r2.unwrap()]
                .iter()
                .filter(|&&c| c)
                .count();
            assert_eq!(created, 1, "exactly one insert must win");
            assert_eq!(store.match_count().await, 1);

            store.matches.lock().await.clear();
        }
    }
}
