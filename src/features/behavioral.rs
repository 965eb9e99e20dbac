//! Behavioral statistics over a gambler's full bet history.

use super::{FeatureVector, Session};
use crate::bets::Bet;
use crate::config::FeaturesConfig;
use chrono::{FixedOffset, Timelike};
use std::collections::HashSet;

/// Bets must be non-empty and ordered by `placed_at`; `sessions` is their grouping.
pub(super) fn compute(
    bets: &[Bet],
    sessions: &[Session],
    config: &FeaturesConfig,
    offset: FixedOffset,
) -> FeatureVector {
    let n = bets.len() as f64;
    let amounts: Vec<f64> = bets.iter().map(Bet::stake_f64).collect();

    let total = amounts.iter().sum::<f64>();
    let mean = total / n;
    let min = amounts.iter().copied().fold(f64::INFINITY, f64::min);
    let max = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let std = sample_std(&amounts, mean);

    let gaps: Vec<f64> = bets
        .windows(2)
        .map(|w| (w[1].placed_at - w[0].placed_at).num_milliseconds() as f64 / 60_000.0)
        .collect();
    let (avg_gap, min_gap) = if gaps.is_empty() {
        (0.0, 0.0)
    } else {
        (
            gaps.iter().sum::<f64>() / gaps.len() as f64,
            gaps.iter().copied().fold(f64::INFINITY, f64::min),
        )
    };
    let bursts = gaps.iter().filter(|&&g| g <= config.burst_gap_minutes).count();

    let mut days = HashSet::new();
    let mut night = 0usize;
    for bet in bets {
        let local = bet.placed_at.with_timezone(&offset);
        let hour = local.hour();
        if hour >= config.night_start_hour && hour < config.night_end_hour {
            night += 1;
        }
        days.insert(local.date_naive());
    }

    let session_count = sessions.len().max(1) as f64;
    let avg_per_session = sessions.iter().map(|s| s.bet_count as f64).sum::<f64>() / session_count;
    let max_per_session = sessions.iter().map(|s| s.bet_count).max().unwrap_or(0) as f64;
    let avg_duration = sessions.iter().map(Session::duration_minutes).sum::<f64>() / session_count;
    let long_sessions = sessions
        .iter()
        .filter(|s| s.duration_minutes() >= config.long_session_minutes)
        .count();

    FeatureVector {
        total_amount_spent: total,
        avg_transaction_amount: mean,
        std_transaction_amount: std,
        min_transaction_amount: min,
        max_transaction_amount: max,
        avg_time_between_txn: avg_gap,
        min_time_between_txn: min_gap,
        night_txn_ratio: night as f64 / n,
        txn_burst_ratio: bursts as f64 / n,
        avg_txn_per_day: n / days.len().max(1) as f64,
        amount_cv: std / if mean == 0.0 { 1.0 } else { mean },
        range_transaction_amount: max - min,
        avg_txn_per_session: avg_per_session,
        max_txn_per_session: max_per_session,
        avg_session_duration: avg_duration,
        long_session_ratio: long_sessions as f64 / session_count,
    }
}

/// Sample standard deviation (n - 1); zero for fewer than two values.
fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_matches_hand_computation() {
        // mean 5, squared deviations sum 32, n-1 = 7
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let s = sample_std(&v, 5.0);
        assert!((s - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(sample_std(&[3.0], 3.0), 0.0);
    }
}
