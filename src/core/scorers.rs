use chrono::Utc;
use std::collections::HashSet;

use crate::models::ProfileSnapshot;

/// Neutral score returned when the data a scorer needs is missing.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// A single, independently pluggable compatibility factor.
///
/// Implementations must be deterministic and side-effect-free, return a
/// value in [0, 1], and fall back to `NEUTRAL_SCORE` rather than erroring
/// when required candidate data is absent. A weight of 0 disables the
/// scorer.
pub trait CompatibilityScorer: Send + Sync {
    fn name(&self) -> &'static str;
    fn weight(&self) -> f64;
    fn score(&self, user: &ProfileSnapshot, candidate: &ProfileSnapshot) -> f64;
}

/// Mutual age-range compatibility.
///
/// Both users inside each other's preferred range scores 1.0, exactly one
/// direction holding scores 0.5, neither scores 0.0. A missing age on
/// either side is neutral. Missing preference bounds fall back to the
/// configured defaults.
pub struct AgeScorer {
    weight: f64,
    default_min_age: u8,
    default_max_age: u8,
}

impl AgeScorer {
    pub fn new(weight: f64, default_min_age: u8, default_max_age: u8) -> Self {
        Self {
            weight,
            default_min_age,
            default_max_age,
        }
    }

    fn accepts(&self, who: &ProfileSnapshot, age: u8) -> bool {
        let min = who.min_age_preference.unwrap_or(self.default_min_age);
        let max = who.max_age_preference.unwrap_or(self.default_max_age);
        age >= min && age <= max
    }
}

impl CompatibilityScorer for AgeScorer {
    fn name(&self) -> &'static str {
        "age"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(&self, user: &ProfileSnapshot, candidate: &ProfileSnapshot) -> f64 {
        let (user_age, candidate_age) = match (user.age, candidate.age) {
            (Some(u), Some(c)) => (u, c),
            _ => return NEUTRAL_SCORE,
        };

        let user_accepts = self.accepts(user, candidate_age);
        let candidate_accepts = self.accepts(candidate, user_age);

        match (user_accepts, candidate_accepts) {
            (true, true) => 1.0,
            (false, false) => 0.0,
            _ => 0.5,
        }
    }
}

/// Mutual gender-preference compatibility.
///
/// A missing or empty preference set means "open to all" and is
/// non-restrictive; a missing gender value on either side is neutral.
pub struct GenderScorer {
    weight: f64,
}

impl GenderScorer {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }

    fn accepts(who: &ProfileSnapshot, gender: &str) -> bool {
        match &who.gender_preferences {
            Some(prefs) if !prefs.is_empty() => prefs.iter().any(|g| g == gender),
            _ => true,
        }
    }
}

impl CompatibilityScorer for GenderScorer {
    fn name(&self) -> &'static str {
        "gender"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(&self, user: &ProfileSnapshot, candidate: &ProfileSnapshot) -> f64 {
        let (user_gender, candidate_gender) = match (&user.gender, &candidate.gender) {
            (Some(u), Some(c)) => (u, c),
            _ => return NEUTRAL_SCORE,
        };

        if Self::accepts(user, candidate_gender) && Self::accepts(candidate, user_gender) {
            1.0
        } else {
            0.0
        }
    }
}

/// Jaccard similarity over interest sets: |A ∩ B| / |A ∪ B|.
/// An empty set on either side is neutral, not penalized.
pub struct InterestScorer {
    weight: f64,
}

impl InterestScorer {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl CompatibilityScorer for InterestScorer {
    fn name(&self) -> &'static str {
        "interests"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(&self, user: &ProfileSnapshot, candidate: &ProfileSnapshot) -> f64 {
        if user.interests.is_empty() || candidate.interests.is_empty() {
            return NEUTRAL_SCORE;
        }

        let a: HashSet<&str> = user.interests.iter().map(String::as_str).collect();
        let b: HashSet<&str> = candidate.interests.iter().map(String::as_str).collect();

        let shared = a.intersection(&b).count() as f64;
        let union = a.union(&b).count() as f64;

        shared / union
    }
}

/// Linear decay on the candidate's days since last activity:
/// max(0, 1 - days / threshold). Missing timestamp is neutral; a future
/// timestamp (clock skew) scores 1.0.
pub struct ActivityScorer {
    weight: f64,
    threshold_days: f64,
}

impl ActivityScorer {
    pub fn new(weight: f64, threshold_days: f64) -> Self {
        Self {
            weight,
            threshold_days,
        }
    }
}

impl CompatibilityScorer for ActivityScorer {
    fn name(&self) -> &'static str {
        "activity"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(&self, _user: &ProfileSnapshot, candidate: &ProfileSnapshot) -> f64 {
        let last_active = match candidate.last_active_at {
            Some(ts) => ts,
            None => return NEUTRAL_SCORE,
        };

        let elapsed = Utc::now() - last_active;
        if elapsed < chrono::Duration::zero() {
            return 1.0;
        }

        let days = elapsed.num_seconds() as f64 / 86_400.0;
        (1.0 - days / self.threshold_days).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot(age: Option<u8>, min: Option<u8>, max: Option<u8>) -> ProfileSnapshot {
        let mut p = ProfileSnapshot::bare("u");
        p.age = age;
        p.min_age_preference = min;
        p.max_age_preference = max;
        p
    }

    #[test]
    fn test_age_mutual_acceptance() {
        let scorer = AgeScorer::new(1.0, 18, 99);
        let user = snapshot(Some(25), Some(23), Some(30));
        let candidate = snapshot(Some(27), Some(24), Some(28));

        assert_eq!(scorer.score(&user, &candidate), 1.0);
    }

    #[test]
    fn test_age_one_way_acceptance() {
        let scorer = AgeScorer::new(1.0, 18, 99);
        // User accepts the candidate's 27, but the candidate only accepts 30-40
        let user = snapshot(Some(25), Some(23), Some(30));
        let candidate = snapshot(Some(27), Some(30), Some(40));

        assert_eq!(scorer.score(&user, &candidate), 0.5);
    }

    #[test]
    fn test_age_neither_accepts() {
        let scorer = AgeScorer::new(1.0, 18, 99);
        let user = snapshot(Some(20), Some(18), Some(22));
        let candidate = snapshot(Some(45), Some(40), Some(50));

        assert_eq!(scorer.score(&user, &candidate), 0.0);
    }

    #[test]
    fn test_age_missing_is_neutral() {
        let scorer = AgeScorer::new(1.0, 18, 99);
        let user = snapshot(None, Some(23), Some(30));
        let candidate = snapshot(Some(27), Some(24), Some(28));

        assert_eq!(scorer.score(&user, &candidate), NEUTRAL_SCORE);
        assert_eq!(scorer.score(&candidate, &user), NEUTRAL_SCORE);
    }

    #[test]
    fn test_age_defaults_apply_when_preferences_missing() {
        let scorer = AgeScorer::new(1.0, 18, 99);
        let user = snapshot(Some(25), None, None);
        let candidate = snapshot(Some(27), None, None);

        assert_eq!(scorer.score(&user, &candidate), 1.0);
    }

    fn gendered(gender: Option<&str>, prefs: Option<Vec<&str>>) -> ProfileSnapshot {
        let mut p = ProfileSnapshot::bare("u");
        p.gender = gender.map(str::to_string);
        p.gender_preferences =
            prefs.map(|v| v.into_iter().map(str::to_string).collect());
        p
    }

    #[test]
    fn test_gender_mutual_match() {
        let scorer = GenderScorer::new(1.0);
        let user = gendered(Some("male"), Some(vec!["female"]));
        let candidate = gendered(Some("female"), Some(vec!["male"]));

        assert_eq!(scorer.score(&user, &candidate), 1.0);
    }

    #[test]
    fn test_gender_one_way_mismatch_is_zero() {
        let scorer = GenderScorer::new(1.0);
        let user = gendered(Some("male"), Some(vec!["female"]));
        let candidate = gendered(Some("female"), Some(vec!["female"]));

        assert_eq!(scorer.score(&user, &candidate), 0.0);
    }

    #[test]
    fn test_gender_missing_preferences_open_to_all() {
        let scorer = GenderScorer::new(1.0);
        let user = gendered(Some("male"), None);
        let candidate = gendered(Some("female"), Some(vec![]));

        assert_eq!(scorer.score(&user, &candidate), 1.0);
    }

    #[test]
    fn test_gender_missing_value_is_neutral() {
        let scorer = GenderScorer::new(1.0);
        let user = gendered(None, Some(vec!["female"]));
        let candidate = gendered(Some("female"), Some(vec!["male"]));

        assert_eq!(scorer.score(&user, &candidate), NEUTRAL_SCORE);
    }

    fn interested(interests: Vec<&str>) -> ProfileSnapshot {
        let mut p = ProfileSnapshot::bare("u");
        p.interests = interests.into_iter().map(str::to_string).collect();
        p
    }

    #[test]
    fn test_jaccard_reference_example() {
        let scorer = InterestScorer::new(1.0);
        let user = interested(vec!["hiking", "cooking", "travel", "photography"]);
        let candidate = interested(vec!["hiking", "cooking", "travel", "yoga", "reading"]);

        // shared = 3, union = 6
        assert!((scorer.score(&user, &candidate) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_empty_side_is_neutral() {
        let scorer = InterestScorer::new(1.0);
        let user = interested(vec![]);
        let candidate = interested(vec!["hiking"]);

        assert_eq!(scorer.score(&user, &candidate), NEUTRAL_SCORE);
    }

    #[test]
    fn test_jaccard_identical_sets() {
        let scorer = InterestScorer::new(1.0);
        let user = interested(vec!["hiking", "cooking"]);
        let candidate = interested(vec!["cooking", "hiking"]);

        assert_eq!(scorer.score(&user, &candidate), 1.0);
    }

    #[test]
    fn test_activity_linear_decay() {
        let scorer = ActivityScorer::new(1.0, 30.0);
        let mut candidate = ProfileSnapshot::bare("c");

        candidate.last_active_at = Some(Utc::now() - Duration::days(15));
        let mid = scorer.score(&ProfileSnapshot::bare("u"), &candidate);
        assert!((mid - 0.5).abs() < 0.01);

        candidate.last_active_at = Some(Utc::now() - Duration::days(60));
        assert_eq!(scorer.score(&ProfileSnapshot::bare("u"), &candidate), 0.0);
    }

    #[test]
    fn test_activity_missing_is_neutral_and_future_is_full() {
        let scorer = ActivityScorer::new(1.0, 30.0);
        let user = ProfileSnapshot::bare("u");

        let mut candidate = ProfileSnapshot::bare("c");
        assert_eq!(scorer.score(&user, &candidate), NEUTRAL_SCORE);

        candidate.last_active_at = Some(Utc::now() + Duration::hours(2));
        assert_eq!(scorer.score(&user, &candidate), 1.0);
    }
}
