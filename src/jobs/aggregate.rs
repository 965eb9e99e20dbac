//! Fleet-wide population means over gamblers with enough history.

use crate::bets::{decimal_to_f64, Bet, GamblerSummary};
use crate::config::AggregateConfig;
use crate::error::Result;
use crate::risk::round_to;
use crate::storage::{AggregateStatsRepository, BetRepository};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub calculated_at: DateTime<Utc>,
    /// Zero means no gambler met the bet minimum and every mean below is 0.
    pub qualifying_gamblers: u64,
    pub avg_total_bets: f64,
    pub avg_total_stake: f64,
    pub avg_avg_stake: f64,
    pub avg_max_stake: f64,
    pub avg_min_stake: f64,
    pub avg_total_payout: f64,
    pub avg_win_count: f64,
    pub avg_total_loss: f64,
    pub avg_win_rate: f64,
}

impl AggregateStats {
    pub fn empty(calculated_at: DateTime<Utc>) -> Self {
        Self {
            calculated_at,
            qualifying_gamblers: 0,
            avg_total_bets: 0.0,
            avg_total_stake: 0.0,
            avg_avg_stake: 0.0,
            avg_max_stake: 0.0,
            avg_min_stake: 0.0,
            avg_total_payout: 0.0,
            avg_win_count: 0.0,
            avg_total_loss: 0.0,
            avg_win_rate: 0.0,
        }
    }

    /// Mean of each statistic, rounded to 4 decimals.
    pub fn from_summaries(summaries: &[GamblerSummary], calculated_at: DateTime<Utc>) -> Self {
        let mut s = Self::empty(calculated_at);
        for g in summaries {
            s.avg_total_bets += g.total_bets as f64;
            s.avg_total_stake += decimal_to_f64(&g.total_stake);
            s.avg_avg_stake += decimal_to_f64(&g.avg_stake);
            s.avg_max_stake += decimal_to_f64(&g.max_stake);
            s.avg_min_stake += decimal_to_f64(&g.min_stake);
            s.avg_total_payout += decimal_to_f64(&g.total_payout);
            s.avg_win_count += g.win_count as f64;
            s.avg_total_loss += decimal_to_f64(&g.total_loss);
            s.avg_win_rate += g.win_rate;
        }

        s.qualifying_gamblers = summaries.len() as u64;
        let divisor = summaries.len().max(1) as f64;
        for v in [
            &mut s.avg_total_bets,
            &mut s.avg_total_stake,
            &mut s.avg_avg_stake,
            &mut s.avg_max_stake,
            &mut s.avg_min_stake,
            &mut s.avg_total_payout,
            &mut s.avg_win_count,
            &mut s.avg_total_loss,
            &mut s.avg_win_rate,
        ] {
            *v = round_to(*v / divisor, 4);
        }
        s
    }
}

pub struct AggregateStatsJob {
    config: AggregateConfig,
}

impl AggregateStatsJob {
    pub fn new(config: AggregateConfig) -> Self {
        Self { config }
    }

    /// Recompute the singleton from scratch and store it.
    pub fn run<S>(&self, store: &S) -> Result<AggregateStats>
    where
        S: BetRepository + AggregateStatsRepository,
    {
        let mut by_gambler: BTreeMap<i64, Vec<Bet>> = BTreeMap::new();
        for bet in store.fetch_all_bets(None)? {
            by_gambler.entry(bet.gambler_id).or_default().push(bet);
        }
        let total_gamblers = by_gambler.len();

        let summaries: Vec<GamblerSummary> = by_gambler
            .values()
            .filter(|bets| bets.len() >= self.config.min_bets)
            .filter_map(|bets| GamblerSummary::from_bets(bets))
            .collect();

        let stats = AggregateStats::from_summaries(&summaries, Utc::now().trunc_subsecs(3));
        store.upsert_aggregate_stats(&stats)?;
        info!(
            gamblers = total_gamblers,
            qualifying = stats.qualifying_gamblers,
            min_bets = self.config.min_bets,
            "aggregate stats recomputed"
        );
        Ok(stats)
    }
}
