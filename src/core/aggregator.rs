use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::core::scorers::{CompatibilityScorer, NEUTRAL_SCORE};
use crate::models::{CompatibilityScore, ProfileSnapshot};

/// Combines every registered scorer into one normalized score.
///
/// final = Σ(score_i × weight_i) / Σ(weight_i); weights need not sum to 1.
/// A binary scorer returning 0.0 drags the weighted average down in
/// proportion to its weight instead of hard-filtering the candidate; callers
/// that need a true filter apply a minimum-score cutoff after aggregation.
pub struct ScoreAggregator {
    scorers: Vec<Box<dyn CompatibilityScorer>>,
}

impl ScoreAggregator {
    pub fn new() -> Self {
        Self { scorers: vec![] }
    }

    /// Register a scorer. Scorers with weight 0 are disabled: never
    /// evaluated and absent from the breakdown.
    pub fn register(mut self, scorer: Box<dyn CompatibilityScorer>) -> Self {
        if scorer.weight() > 0.0 {
            self.scorers.push(scorer);
        } else {
            tracing::debug!("Scorer '{}' disabled (weight 0)", scorer.name());
        }
        self
    }

    pub fn scorer_count(&self) -> usize {
        self.scorers.len()
    }

    /// Score one candidate against the requesting user.
    pub fn aggregate(
        &self,
        user: &ProfileSnapshot,
        candidate: &ProfileSnapshot,
    ) -> CompatibilityScore {
        let mut breakdown = BTreeMap::new();
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for scorer in &self.scorers {
            // A panicking scorer is a programming error, but it must not
            // take the whole aggregation down with it.
            let raw = catch_unwind(AssertUnwindSafe(|| scorer.score(user, candidate)))
                .unwrap_or_else(|_| {
                    tracing::error!(
                        "Scorer '{}' panicked scoring candidate {}, substituting neutral",
                        scorer.name(),
                        candidate.user_id
                    );
                    NEUTRAL_SCORE
                });

            let score = raw.clamp(0.0, 1.0);
            breakdown.insert(scorer.name().to_string(), score);
            weighted_sum += score * scorer.weight();
            total_weight += scorer.weight();
        }

        // With no registered scorers the score is 0.0, keeping every
        // candidate below any positive feed cutoff.
        let final_score = if total_weight > 0.0 {
            (weighted_sum / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };

        CompatibilityScore {
            candidate_id: candidate.user_id.clone(),
            final_score,
            breakdown,
        }
    }
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scorers::{ActivityScorer, AgeScorer, GenderScorer, InterestScorer};
    use crate::models::ProfileSnapshot;

    struct ConstScorer {
        name: &'static str,
        weight: f64,
        value: f64,
    }

    impl CompatibilityScorer for ConstScorer {
        fn name(&self) -> &'static str {
            self.name
        }
        fn weight(&self) -> f64 {
            self.weight
        }
        fn score(&self, _u: &ProfileSnapshot, _c: &ProfileSnapshot) -> f64 {
            self.value
        }
    }

    struct PanickyScorer;

    impl CompatibilityScorer for PanickyScorer {
        fn name(&self) -> &'static str {
            "panicky"
        }
        fn weight(&self) -> f64 {
            1.0
        }
        fn score(&self, _u: &ProfileSnapshot, _c: &ProfileSnapshot) -> f64 {
            panic!("boom")
        }
    }

    fn full_aggregator() -> ScoreAggregator {
        ScoreAggregator::new()
            .register(Box::new(AgeScorer::new(0.25, 18, 99)))
            .register(Box::new(GenderScorer::new(0.30)))
            .register(Box::new(InterestScorer::new(0.25)))
            .register(Box::new(ActivityScorer::new(0.20, 30.0)))
    }

    #[test]
    fn test_weighted_average() {
        let agg = ScoreAggregator::new()
            .register(Box::new(ConstScorer {
                name: "a",
                weight: 1.0,
                value: 1.0,
            }))
            .register(Box::new(ConstScorer {
                name: "b",
                weight: 3.0,
                value: 0.0,
            }));

        let score = agg.aggregate(&ProfileSnapshot::bare("u"), &ProfileSnapshot::bare("c"));
        assert!((score.final_score - 0.25).abs() < 1e-9);
        assert_eq!(score.breakdown.len(), 2);
        assert_eq!(score.breakdown["a"], 1.0);
        assert_eq!(score.breakdown["b"], 0.0);
    }

    #[test]
    fn test_zero_weight_scorer_is_disabled() {
        let agg = ScoreAggregator::new()
            .register(Box::new(ConstScorer {
                name: "on",
                weight: 1.0,
                value: 0.8,
            }))
            .register(Box::new(ConstScorer {
                name: "off",
                weight: 0.0,
                value: 0.0,
            }));

        assert_eq!(agg.scorer_count(), 1);
        let score = agg.aggregate(&ProfileSnapshot::bare("u"), &ProfileSnapshot::bare("c"));
        assert!((score.final_score - 0.8).abs() < 1e-9);
        assert!(!score.breakdown.contains_key("off"));
    }

    #[test]
    fn test_panicking_scorer_substitutes_neutral() {
        let agg = ScoreAggregator::new()
            .register(Box::new(PanickyScorer))
            .register(Box::new(ConstScorer {
                name: "ok",
                weight: 1.0,
                value: 1.0,
            }));

        let score = agg.aggregate(&ProfileSnapshot::bare("u"), &ProfileSnapshot::bare("c"));
        assert_eq!(score.breakdown["panicky"], 0.5);
        assert!((score.final_score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_scorer_is_clamped() {
        let agg = ScoreAggregator::new().register(Box::new(ConstScorer {
            name: "hot",
            weight: 1.0,
            value: 7.5,
        }));

        let score = agg.aggregate(&ProfileSnapshot::bare("u"), &ProfileSnapshot::bare("c"));
        assert_eq!(score.final_score, 1.0);
    }

    #[test]
    fn test_empty_registry_scores_zero() {
        let agg = ScoreAggregator::new();
        let score = agg.aggregate(&ProfileSnapshot::bare("u"), &ProfileSnapshot::bare("c"));
        assert_eq!(score.final_score, 0.0);
        assert!(score.breakdown.is_empty());
    }

    #[test]
    fn test_final_score_bounded_on_bare_profiles() {
        let agg = full_aggregator();
        let score = agg.aggregate(&ProfileSnapshot::bare("u"), &ProfileSnapshot::bare("c"));
        assert!(score.final_score >= 0.0 && score.final_score <= 1.0);
        // Every factor is neutral on empty profiles
        assert!((score.final_score - 0.5).abs() < 1e-9);
    }
}
