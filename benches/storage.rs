//! Storage benchmark: bet inserts and scan-result upserts.

use bigdecimal::BigDecimal;
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wager_scan::bets::{Bet, BetStatus, GamblerSummary};
use wager_scan::model::ClusterLabel;
use wager_scan::risk::{RiskEngine, RiskScores};
use wager_scan::scan::ScanResult;
use wager_scan::storage::{BetRepository, ScanResultRepository, SqliteStore};
use tempfile::tempdir;

fn bench_insert_bet(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let store = SqliteStore::open(&dir.path().join("store.db")).unwrap();
    let bet = Bet::new(
        1,
        BigDecimal::from(25),
        BetStatus::Lost,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )
    .unwrap();

    c.bench_function("storage_insert_bet", |b| {
        b.iter(|| black_box(store.insert_bet(black_box(&bet))).unwrap())
    });
}

fn bench_upsert_scan(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let store = SqliteStore::open(&dir.path().join("store.db")).unwrap();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for i in 0..200 {
        let bet = Bet::new(1, BigDecimal::from(i % 50 + 1), BetStatus::Lost, start + Duration::minutes(i))
            .unwrap();
        store.insert_bet(&bet).unwrap();
    }
    let bets = store.fetch_bets_for_gambler(1).unwrap();
    let result = ScanResult {
        gambler_id: 1,
        has_scan: true,
        scanned_at: start,
        previous_scan: None,
        assessments: RiskEngine::assess(&RiskScores::from_raw([0.2, 0.5, 0.7, 0.9, 0.1])),
        cluster_label: ClusterLabel::ModerateRisk,
        summary: GamblerSummary::from_bets(&bets).unwrap(),
    };

    c.bench_function("storage_upsert_scan_result", |b| {
        b.iter(|| black_box(store.upsert_scan_result(black_box(&result))).unwrap())
    });
    c.bench_function("storage_fetch_200_bets", |b| {
        b.iter(|| black_box(store.fetch_bets_for_gambler(1)).unwrap())
    });
}

criterion_group!(benches, bench_insert_bet, bench_upsert_scan);
criterion_main!(benches);
