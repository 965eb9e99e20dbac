//! Pipeline benchmark: bet history → sessions → feature vector.

use bigdecimal::BigDecimal;
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wager_scan::bets::{Bet, BetStatus};
use wager_scan::config::{FeaturesConfig, SessionConfig};
use wager_scan::features::{FeatureExtractor, SessionSegmenter};

fn make_bets(n: usize) -> Vec<Bet> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut at = start;
    (0..n)
        .map(|i| {
            // mix of short gaps and session breaks
            at += Duration::minutes(if i % 17 == 0 { 95 } else { (i % 9) as i64 + 1 });
            Bet::new(1, BigDecimal::from((i % 250) as i64 + 1), BetStatus::Lost, at).unwrap()
        })
        .collect()
}

fn bench_segmentation(c: &mut Criterion) {
    let segmenter = SessionSegmenter::new(&SessionConfig::default());
    let bets = make_bets(1_000);

    c.bench_function("segment_1000_bets", |b| {
        b.iter(|| black_box(segmenter.assign(1, black_box(&bets)).unwrap()))
    });
}

fn bench_feature_extraction(c: &mut Criterion) {
    let extractor = FeatureExtractor::new(&SessionConfig::default(), FeaturesConfig::default());

    let mut g = c.benchmark_group("extract_by_history_len");
    for n in [15, 100, 1_000, 10_000] {
        let bets = make_bets(n);
        g.bench_function(format!("bets_{}", n).as_str(), |b| {
            b.iter(|| black_box(extractor.extract(1, black_box(&bets)).unwrap()))
        });
    }
    g.finish();
}

criterion_group!(benches, bench_segmentation, bench_feature_extraction);
criterion_main!(benches);
