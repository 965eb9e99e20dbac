//! Per-gambler aggregate used as cluster input and by the fleet stats job.

use super::{Bet, BetStatus};
use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamblerSummary {
    pub total_bets: u64,
    pub total_stake: BigDecimal,
    /// Unrounded mean stake.
    pub avg_stake: BigDecimal,
    pub max_stake: BigDecimal,
    pub min_stake: BigDecimal,
    pub total_payout: BigDecimal,
    pub win_count: u64,
    /// win_count / total_bets
    pub win_rate: f64,
    /// total_stake - total_payout
    pub total_loss: BigDecimal,
}

impl GamblerSummary {
    /// Returns `None` for an empty history.
    pub fn from_bets(bets: &[Bet]) -> Option<Self> {
        let first = bets.first()?;
        let mut total_stake = BigDecimal::from(0);
        let mut total_payout = BigDecimal::from(0);
        let mut max_stake = first.stake_amount.clone();
        let mut min_stake = first.stake_amount.clone();
        let mut win_count = 0u64;

        for bet in bets {
            total_stake += &bet.stake_amount;
            total_payout += &bet.payout_amount;
            if bet.stake_amount > max_stake {
                max_stake = bet.stake_amount.clone();
            }
            if bet.stake_amount < min_stake {
                min_stake = bet.stake_amount.clone();
            }
            if bet.status == BetStatus::Won {
                win_count += 1;
            }
        }

        let total_bets = bets.len() as u64;
        let avg_stake = total_stake.clone() / BigDecimal::from(total_bets);
        let total_loss = total_stake.clone() - total_payout.clone();

        Some(Self {
            total_bets,
            total_stake,
            avg_stake,
            max_stake,
            min_stake,
            total_payout,
            win_count,
            win_rate: win_count as f64 / total_bets as f64,
            total_loss,
        })
    }

    /// Cluster model input, in training-time column order.
    pub fn cluster_input(&self) -> [f64; 8] {
        [
            self.total_bets as f64,
            decimal_to_f64(&self.total_stake),
            decimal_to_f64(&self.avg_stake),
            decimal_to_f64(&self.max_stake),
            decimal_to_f64(&self.min_stake),
            decimal_to_f64(&self.total_payout),
            self.win_rate,
            decimal_to_f64(&self.total_loss),
        ]
    }
}

pub fn decimal_to_f64(d: &BigDecimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    fn bet(stake: &str, payout: &str, status: BetStatus) -> Bet {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        Bet::new(7, BigDecimal::from_str(stake).unwrap(), status, at)
            .unwrap()
            .with_payout(BigDecimal::from_str(payout).unwrap())
    }

    #[test]
    fn summary_totals() {
        let bets = vec![
            bet("10.00", "25.00", BetStatus::Won),
            bet("30.00", "0", BetStatus::Lost),
            bet("20.00", "0", BetStatus::Lost),
            bet("40.00", "0", BetStatus::Pending),
        ];
        let s = GamblerSummary::from_bets(&bets).unwrap();
        assert_eq!(s.total_bets, 4);
        assert_eq!(s.total_stake, BigDecimal::from(100));
        assert_eq!(s.avg_stake, BigDecimal::from(25));
        assert_eq!(s.max_stake, BigDecimal::from(40));
        assert_eq!(s.min_stake, BigDecimal::from(10));
        assert_eq!(s.total_payout, BigDecimal::from(25));
        assert_eq!(s.win_count, 1);
        assert_eq!(s.win_rate, 0.25);
        assert_eq!(s.total_loss, BigDecimal::from(75));

        let input = s.cluster_input();
        assert_eq!(input, [4.0, 100.0, 25.0, 40.0, 10.0, 25.0, 0.25, 75.0]);
    }

    #[test]
    fn mean_stake_keeps_full_precision() {
        let mut bets = vec![bet("11", "0", BetStatus::Lost)];
        bets.extend((0..14).map(|_| bet("10", "0", BetStatus::Lost)));
        let s = GamblerSummary::from_bets(&bets).unwrap();
        assert_eq!(s.avg_stake.round(4), BigDecimal::from_str("10.0667").unwrap());
        assert_ne!(s.avg_stake, s.avg_stake.round(2));
        assert!((s.cluster_input()[2] - 151.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn empty_history_has_no_summary() {
        assert!(GamblerSummary::from_bets(&[]).is_none());
    }
}
