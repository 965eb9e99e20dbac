//! Persistence seams for bets, scan results, fleet stats and triggers.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::bets::Bet;
use crate::error::Result;
use crate::jobs::{AggregateStats, Trigger, TriggerType};
use crate::scan::ScanResult;
use bigdecimal::BigDecimal;

pub trait BetRepository {
    /// One gambler's bets, ascending by placed time.
    fn fetch_bets_for_gambler(&self, gambler_id: i64) -> Result<Vec<Bet>>;
    /// Every bet, optionally only those with stake >= `min_stake`.
    fn fetch_all_bets(&self, min_stake: Option<&BigDecimal>) -> Result<Vec<Bet>>;
}

pub trait ScanResultRepository {
    /// Insert or replace the gambler's single scan row; returns the stored row.
    fn upsert_scan_result(&self, result: &ScanResult) -> Result<ScanResult>;
    fn latest_scan_result(&self, gambler_id: i64) -> Result<Option<ScanResult>>;
}

pub trait AggregateStatsRepository {
    fn upsert_aggregate_stats(&self, stats: &AggregateStats) -> Result<()>;
    fn latest_aggregate_stats(&self) -> Result<Option<AggregateStats>>;
}

pub trait TriggerRepository {
    fn trigger_exists(&self, gambler_id: i64, trigger_type: TriggerType) -> Result<bool>;
    /// Fails with `PersistenceConflict` when (gambler, type) already has a trigger.
    fn create_trigger(&self, trigger: &Trigger) -> Result<()>;
    fn triggers_for_gambler(&self, gambler_id: i64) -> Result<Vec<Trigger>>;
}
