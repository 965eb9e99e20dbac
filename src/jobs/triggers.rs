//! Static-threshold operator alerts, at most one per (gambler, type).

use crate::config::TriggerConfig;
use crate::error::{Error, Result};
use crate::storage::{BetRepository, TriggerRepository};
use bigdecimal::BigDecimal;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    HighestBet,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::HighestBet => "highest_bet",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "highest_bet" => Ok(TriggerType::HighestBet),
            other => Err(format!("unknown trigger type {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: Uuid,
    pub gambler_id: i64,
    pub trigger_type: TriggerType,
    pub explanation: String,
    /// Free text filled in by operators; empty on creation.
    pub actions_taken: String,
    pub value: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl Trigger {
    pub fn highest_bet(gambler_id: i64, max_stake: BigDecimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            gambler_id,
            trigger_type: TriggerType::HighestBet,
            explanation: format!(
                "Gambler {gambler_id} placed a high-stake bet; highest stake on record is {max_stake}"
            ),
            actions_taken: String::new(),
            value: max_stake,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}

/// Outcome counts for one detector run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TriggerRunReport {
    pub evaluated: usize,
    pub created: usize,
    pub skipped: usize,
}

pub struct TriggerDetector {
    config: TriggerConfig,
}

impl TriggerDetector {
    pub fn new(config: TriggerConfig) -> Self {
        Self { config }
    }

    /// Raise a `highest_bet` trigger for every gambler with a stake at or above
    /// the threshold who does not already have one.
    pub fn run<S>(&self, store: &S) -> Result<TriggerRunReport>
    where
        S: BetRepository + TriggerRepository,
    {
        let flagged: BTreeSet<i64> = store
            .fetch_all_bets(Some(&self.config.high_stake_threshold))?
            .into_iter()
            .map(|b| b.gambler_id)
            .collect();

        let mut report = TriggerRunReport::default();
        for gambler_id in flagged {
            report.evaluated += 1;
            if store.trigger_exists(gambler_id, TriggerType::HighestBet)? {
                report.skipped += 1;
                continue;
            }

            let Some(max_stake) = store
                .fetch_bets_for_gambler(gambler_id)?
                .into_iter()
                .map(|b| b.stake_amount)
                .max()
            else {
                report.skipped += 1;
                continue;
            };

            match store.create_trigger(&Trigger::highest_bet(gambler_id, max_stake.clone())) {
                Ok(()) => {
                    report.created += 1;
                    info!(gambler_id, value = %max_stake, "highest_bet trigger created");
                }
                Err(Error::PersistenceConflict { .. }) => {
                    debug!(gambler_id, "highest_bet trigger created concurrently");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            evaluated = report.evaluated,
            created = report.created,
            skipped = report.skipped,
            threshold = %self.config.high_stake_threshold,
            "trigger detection complete"
        );
        Ok(report)
    }
}
