use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A one-way swipe action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum SwipeAction {
    Like,
    Pass,
    SuperLike,
}

impl SwipeAction {
    /// Whether this action expresses interest and can participate in a match.
    pub fn is_like(&self) -> bool {
        matches!(self, SwipeAction::Like | SwipeAction::SuperLike)
    }
}

/// A directional, immutable expression of interest by one user toward another.
///
/// At most one swipe may exist per ordered (actor_id, target_id) pair; the
/// storage layer enforces this with a unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swipe {
    pub id: Uuid,
    #[serde(rename = "actorId")]
    pub actor_id: String,
    #[serde(rename = "targetId")]
    pub target_id: String,
    pub action: SwipeAction,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Swipe {
    pub fn new(actor_id: &str, target_id: &str, action: SwipeAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            action,
            created_at: Utc::now(),
        }
    }
}

/// A mutually-confirmed pairing, stored once per unordered user pair.
///
/// Invariant: user_low_id < user_high_id (lexicographic). The canonical
/// ordering is what makes Match(A,B) and Match(B,A) collide on the same
/// storage key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    #[serde(rename = "userLowId")]
    pub user_low_id: String,
    #[serde(rename = "userHighId")]
    pub user_high_id: String,
    #[serde(rename = "matchedAt")]
    pub matched_at: DateTime<Utc>,
    #[serde(rename = "endedAt", default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Build a match for the canonical ordering of the two users.
    pub fn new(user_a: &str, user_b: &str) -> Self {
        let (low, high) = canonical_pair(user_a, user_b);
        Self {
            id: Uuid::new_v4(),
            user_low_id: low.to_string(),
            user_high_id: high.to_string(),
            matched_at: Utc::now(),
            ended_at: None,
        }
    }

    /// The other participant, given one side of the match.
    pub fn other_user(&self, user_id: &str) -> &str {
        if self.user_low_id == user_id {
            &self.user_high_id
        } else {
            &self.user_low_id
        }
    }
}

/// Order two user ids into the canonical (low, high) pair.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Read-only view of a user's profile, owned by the external profile
/// service. Attributes a scorer needs may be absent; scorers degrade to a
/// neutral score when they are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(rename = "genderPreferences", default)]
    pub gender_preferences: Option<Vec<String>>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(rename = "lastActiveAt", default)]
    pub last_active_at: Option<DateTime<Utc>>,
    #[serde(rename = "minAgePreference", default)]
    pub min_age_preference: Option<u8>,
    #[serde(rename = "maxAgePreference", default)]
    pub max_age_preference: Option<u8>,
}

impl ProfileSnapshot {
    /// Minimal snapshot with just an id; building block for tests.
    pub fn bare(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            age: None,
            gender: None,
            gender_preferences: None,
            interests: vec![],
            latitude: None,
            longitude: None,
            last_active_at: None,
            min_age_preference: None,
            max_age_preference: None,
        }
    }
}

/// Aggregated compatibility of one candidate against the requesting user.
/// Ephemeral; only cached as part of a feed's full scored list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityScore {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    #[serde(rename = "finalScore")]
    pub final_score: f64,
    pub breakdown: BTreeMap<String, f64>,
}

/// Match-created event published to the external event channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCreated {
    #[serde(rename = "matchId")]
    pub match_id: Uuid,
    #[serde(rename = "userLowId")]
    pub user_low_id: String,
    #[serde(rename = "userHighId")]
    pub user_high_id: String,
    #[serde(rename = "matchedAt")]
    pub matched_at: DateTime<Utc>,
}

impl From<&Match> for MatchCreated {
    fn from(m: &Match) -> Self {
        Self {
            match_id: m.id,
            user_low_id: m.user_low_id.clone(),
            user_high_id: m.user_high_id.clone(),
            matched_at: m.matched_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pair_ordering() {
        assert_eq!(canonical_pair("alice", "bob"), ("alice", "bob"));
        assert_eq!(canonical_pair("bob", "alice"), ("alice", "bob"));
        assert_eq!(canonical_pair("same", "same"), ("same", "same"));
    }

    #[test]
    fn test_match_is_canonical_regardless_of_argument_order() {
        let m1 = Match::new("user_b", "user_a");
        let m2 = Match::new("user_a", "user_b");

        assert_eq!(m1.user_low_id, "user_a");
        assert_eq!(m1.user_high_id, "user_b");
        assert_eq!(m1.user_low_id, m2.user_low_id);
        assert_eq!(m1.user_high_id, m2.user_high_id);
        assert!(m1.user_low_id < m1.user_high_id);
    }

    #[test]
    fn test_other_user() {
        let m = Match::new("a", "b");
        assert_eq!(m.other_user("a"), "b");
        assert_eq!(m.other_user("b"), "a");
    }

    #[test]
    fn test_like_actions() {
        assert!(SwipeAction::Like.is_like());
        assert!(SwipeAction::SuperLike.is_like());
        assert!(!SwipeAction::Pass.is_like());
    }
}
