//! Gap-based session segmentation over a time-ordered bet stream.

use crate::bets::Bet;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One maximal run of bets with no gap above the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub bet_count: usize,
}

impl Session {
    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 60_000.0
    }
}

#[derive(Debug, Clone)]
pub struct SessionSegmenter {
    gap: Duration,
}

impl SessionSegmenter {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            gap: Duration::minutes(config.gap_minutes),
        }
    }

    /// Session id per bet, starting at 1. Bets must be ordered by `placed_at`.
    pub fn assign(&self, gambler_id: i64, bets: &[Bet]) -> Result<Vec<u32>> {
        let first = bets.first().ok_or(Error::InsufficientData { gambler_id })?;
        let mut ids = Vec::with_capacity(bets.len());
        let mut session_id = 1u32;
        let mut last = first.placed_at;
        for bet in bets {
            if bet.placed_at - last > self.gap {
                session_id += 1;
            }
            ids.push(session_id);
            last = bet.placed_at;
        }
        Ok(ids)
    }

    /// Group bets by their assigned session id.
    pub fn sessions(bets: &[Bet], ids: &[u32]) -> Vec<Session> {
        let mut out: Vec<Session> = Vec::new();
        for (bet, &id) in bets.iter().zip(ids) {
            match out.last_mut() {
                Some(s) if s.id == id => {
                    s.end = bet.placed_at;
                    s.bet_count += 1;
                }
                _ => out.push(Session {
                    id,
                    start: bet.placed_at,
                    end: bet.placed_at,
                    bet_count: 1,
                }),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bets::BetStatus;
    use bigdecimal::BigDecimal;
    use chrono::TimeZone;

    fn bets_at(times: &[(u32, u32)]) -> Vec<Bet> {
        times
            .iter()
            .map(|&(h, m)| {
                let at = Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap();
                Bet::new(1, BigDecimal::from(10), BetStatus::Lost, at).unwrap()
            })
            .collect()
    }

    #[test]
    fn splits_on_gap_over_threshold() {
        let seg = SessionSegmenter::new(&SessionConfig::default());
        let bets = bets_at(&[(9, 0), (9, 10), (10, 0)]);
        let ids = seg.assign(1, &bets).unwrap();
        assert_eq!(ids, vec![1, 1, 2]);

        let sessions = SessionSegmenter::sessions(&bets, &ids);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].duration_minutes(), 10.0);
        assert_eq!(sessions[1].duration_minutes(), 0.0);
    }

    #[test]
    fn gap_equal_to_threshold_stays_in_session() {
        let seg = SessionSegmenter::new(&SessionConfig::default());
        let bets = bets_at(&[(9, 0), (9, 30), (10, 1)]);
        assert_eq!(seg.assign(1, &bets).unwrap(), vec![1, 1, 2]);
    }

    #[test]
    fn single_bet_is_one_zero_length_session() {
        let seg = SessionSegmenter::new(&SessionConfig::default());
        let bets = bets_at(&[(23, 59)]);
        let ids = seg.assign(1, &bets).unwrap();
        assert_eq!(ids, vec![1]);
        let sessions = SessionSegmenter::sessions(&bets, &ids);
        assert_eq!(sessions[0].duration_minutes(), 0.0);
    }

    #[test]
    fn empty_input_is_insufficient() {
        let seg = SessionSegmenter::new(&SessionConfig::default());
        assert!(matches!(seg.assign(17, &[]), Err(Error::InsufficientData { gambler_id: 17 })));
    }

    #[test]
    fn ids_are_non_decreasing_and_cover_input() {
        let seg = SessionSegmenter::new(&SessionConfig { gap_minutes: 5 });
        let bets = bets_at(&[(1, 0), (1, 3), (1, 9), (1, 14), (2, 0), (2, 1), (5, 0)]);
        let ids = seg.assign(1, &bets).unwrap();
        assert_eq!(ids.len(), bets.len());
        assert!(ids.windows(2).all(|w| w[0] <= w[1]));
        for (pair, id) in bets.windows(2).zip(ids.windows(2)) {
            let gap = pair[1].placed_at - pair[0].placed_at;
            assert_eq!(gap > Duration::minutes(5), id[1] == id[0] + 1);
        }
    }
}
