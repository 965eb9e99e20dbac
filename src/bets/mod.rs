//! Wager records and per-gambler summaries.

mod summary;

pub use summary::{decimal_to_f64, GamblerSummary};

use crate::error::{Error, Result};
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
    Cancelled,
}

impl BetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStatus::Pending => "pending",
            BetStatus::Won => "won",
            BetStatus::Lost => "lost",
            BetStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BetStatus::Pending),
            "won" => Ok(BetStatus::Won),
            "lost" => Ok(BetStatus::Lost),
            "cancelled" => Ok(BetStatus::Cancelled),
            other => Err(format!("unknown bet status {other:?}")),
        }
    }
}

/// A single wager. `bet_id` is 0 until the store assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    #[serde(default)]
    pub bet_id: i64,
    pub gambler_id: i64,
    pub stake_amount: BigDecimal,
    #[serde(default)]
    pub payout_amount: BigDecimal,
    pub status: BetStatus,
    pub placed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,
}

impl Bet {
    pub fn new(
        gambler_id: i64,
        stake_amount: BigDecimal,
        status: BetStatus,
        placed_at: DateTime<Utc>,
    ) -> Result<Self> {
        let bet = Self {
            bet_id: 0,
            gambler_id,
            stake_amount,
            payout_amount: BigDecimal::from(0),
            status,
            placed_at,
            settled_at: None,
        };
        bet.validate()?;
        Ok(bet)
    }

    pub fn with_payout(mut self, payout_amount: BigDecimal) -> Self {
        self.payout_amount = payout_amount;
        self
    }

    pub fn settled(mut self, at: DateTime<Utc>) -> Self {
        self.settled_at = Some(at);
        self
    }

    /// Stake must be non-negative.
    pub fn validate(&self) -> Result<()> {
        if self.stake_amount < BigDecimal::from(0) {
            return Err(Error::InvalidAmount(format!(
                "negative stake {} for gambler {}",
                self.stake_amount, self.gambler_id
            )));
        }
        Ok(())
    }

    pub fn stake_f64(&self) -> f64 {
        self.stake_amount.to_f64().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn negative_stake_rejected() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let err = Bet::new(1, BigDecimal::from(-5), BetStatus::Lost, at).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
    }

    #[test]
    fn status_parses_its_own_text() {
        for s in [BetStatus::Pending, BetStatus::Won, BetStatus::Lost, BetStatus::Cancelled] {
            assert_eq!(s.as_str().parse::<BetStatus>().unwrap(), s);
        }
        assert!("void".parse::<BetStatus>().is_err());
    }
}
