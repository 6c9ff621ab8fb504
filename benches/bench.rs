// Criterion benchmarks for the Ember match engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::{Duration, Utc};
use ember_match::core::{
    ActivityScorer, AgeScorer, GenderScorer, InterestScorer, ScoreAggregator,
};
use ember_match::models::ProfileSnapshot;

const INTERESTS: [&str; 8] = [
    "hiking",
    "cooking",
    "travel",
    "photography",
    "yoga",
    "reading",
    "climbing",
    "film",
];

fn create_candidate(id: usize) -> ProfileSnapshot {
    let mut p = ProfileSnapshot::bare(&format!("candidate_{:05}", id));
    p.age = Some(22 + (id % 25) as u8);
    p.gender = Some(if id % 2 == 0 { "female" } else { "male" }.to_string());
    p.gender_preferences = Some(vec!["male".to_string(), "female".to_string()]);
    p.interests = INTERESTS[..(id % (INTERESTS.len() + 1))]
        .iter()
        .map(|s| s.to_string())
        .collect();
    p.min_age_preference = Some(21);
    p.max_age_preference = Some(45);
    p.last_active_at = Some(Utc::now() - Duration::days((id % 40) as i64));
    p
}

fn create_user() -> ProfileSnapshot {
    let mut p = ProfileSnapshot::bare("current_user");
    p.age = Some(29);
    p.gender = Some("male".to_string());
    p.gender_preferences = Some(vec!["female".to_string()]);
    p.interests = INTERESTS[..5].iter().map(|s| s.to_string()).collect();
    p.min_age_preference = Some(23);
    p.max_age_preference = Some(38);
    p.last_active_at = Some(Utc::now());
    p
}

fn aggregator() -> ScoreAggregator {
    ScoreAggregator::new()
        .register(Box::new(AgeScorer::new(0.25, 18, 99)))
        .register(Box::new(GenderScorer::new(0.30)))
        .register(Box::new(InterestScorer::new(0.25)))
        .register(Box::new(ActivityScorer::new(0.20, 30.0)))
}

fn bench_single_aggregate(c: &mut Criterion) {
    let agg = aggregator();
    let user = create_user();
    let candidate = create_candidate(7);

    c.bench_function("aggregate_single_candidate", |b| {
        b.iter(|| agg.aggregate(black_box(&user), black_box(&candidate)));
    });
}

fn bench_interest_overlap(c: &mut Criterion) {
    let scorer = InterestScorer::new(0.25);
    let user = create_user();
    let candidate = create_candidate(3);

    c.bench_function("interest_jaccard", |b| {
        b.iter(|| {
            use ember_match::core::CompatibilityScorer;
            scorer.score(black_box(&user), black_box(&candidate))
        });
    });
}

fn bench_score_pool(c: &mut Criterion) {
    let agg = aggregator();
    let user = create_user();

    let mut group = c.benchmark_group("score_pool");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let candidates: Vec<ProfileSnapshot> =
            (0..*candidate_count).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::new("aggregate", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    let scored: Vec<_> = candidates
                        .iter()
                        .map(|candidate| agg.aggregate(black_box(&user), candidate))
                        .collect();
                    black_box(scored)
                });
            },
        );
    }

    group.finish();
}

fn bench_rank_pipeline(c: &mut Criterion) {
    let agg = aggregator();
    let user = create_user();
    let candidates: Vec<ProfileSnapshot> = (0..500).map(create_candidate).collect();

    c.bench_function("rank_pipeline_500_candidates", |b| {
        b.iter(|| {
            let mut scored: Vec<_> = candidates
                .iter()
                .map(|candidate| agg.aggregate(&user, candidate))
                .filter(|score| score.final_score >= 0.2)
                .collect();

            scored.sort_by(|a, b| {
                b.final_score
                    .partial_cmp(&a.final_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.candidate_id.cmp(&b.candidate_id))
            });

            black_box(scored)
        });
    });
}

criterion_group!(
    benches,
    bench_single_aggregate,
    bench_interest_overlap,
    bench_score_pool,
    bench_rank_pipeline
);
criterion_main!(benches);
