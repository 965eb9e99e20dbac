//! Classification benchmark: summary → k-means cluster, scores → severity bands.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wager_scan::model::{ClusterPredictor, KMeansClusterer, Scaler};
use wager_scan::risk::{recommendations, RiskEngine, RiskScores};

fn bench_cluster_predict(c: &mut Criterion) {
    let model = KMeansClusterer::new(
        Scaler {
            mean: vec![40.0, 2_000.0, 50.0, 300.0, 5.0, 1_500.0, 0.3, 500.0],
            scale: vec![20.0, 1_500.0, 40.0, 250.0, 4.0, 1_200.0, 0.15, 600.0],
        },
        vec![vec![-0.5; 8], vec![0.5; 8], vec![2.0; 8]],
    )
    .unwrap();
    let input = [55.0, 3_100.0, 56.4, 480.0, 2.0, 2_050.0, 0.27, 1_050.0];

    c.bench_function("kmeans_predict_3_clusters", |b| {
        b.iter(|| model.predict(black_box(&input)).unwrap())
    });
}

fn bench_assess_and_recommend(c: &mut Criterion) {
    let scores = RiskScores::from_raw([0.12, 0.47, 0.66, 0.91, 0.39]);

    c.bench_function("assess_and_recommend", |b| {
        b.iter(|| {
            let assessments = RiskEngine::assess(black_box(&scores));
            black_box(recommendations(&assessments))
        })
    });
}

criterion_group!(benches, bench_cluster_predict, bench_assess_and_recommend);
criterion_main!(benches);
