//! SQLite-backed store. Scan results and the stats singleton are upserted in
//! one statement; trigger uniqueness is a table constraint.

use super::{AggregateStatsRepository, BetRepository, ScanResultRepository, TriggerRepository};
use crate::bets::{decimal_to_f64, Bet, BetStatus, GamblerSummary};
use crate::error::{Error, Result};
use crate::jobs::{AggregateStats, Trigger, TriggerType};
use crate::model::ClusterLabel;
use crate::risk::{PatternAssessment, RiskPattern, Severity};
use crate::scan::ScanResult;
use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::Type;
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS bets (
    bet_id INTEGER PRIMARY KEY AUTOINCREMENT,
    gambler_id INTEGER NOT NULL,
    stake_amount TEXT NOT NULL CHECK (CAST(stake_amount AS REAL) >= 0),
    payout_amount TEXT NOT NULL DEFAULT '0',
    bet_status TEXT NOT NULL,
    placed_at INTEGER NOT NULL,
    settled_at INTEGER
);
CREATE INDEX IF NOT EXISTS idx_bets_gambler_placed ON bets(gambler_id, placed_at);
CREATE INDEX IF NOT EXISTS idx_bets_status ON bets(bet_status);
CREATE INDEX IF NOT EXISTS idx_bets_stake ON bets(CAST(stake_amount AS REAL));

CREATE TABLE IF NOT EXISTS scan_results (
    gambler_id INTEGER PRIMARY KEY,
    has_scan INTEGER NOT NULL,
    scanned_at INTEGER NOT NULL,
    previous_scan INTEGER,
    loss_chasing_score REAL NOT NULL,
    loss_chasing_severity TEXT NOT NULL,
    fluctuating_wagers_score REAL NOT NULL,
    fluctuating_wagers_severity TEXT NOT NULL,
    impulsive_transactions_score REAL NOT NULL,
    impulsive_transactions_severity TEXT NOT NULL,
    binge_gambling_score REAL NOT NULL,
    binge_gambling_severity TEXT NOT NULL,
    monetary_consumption_score REAL NOT NULL,
    monetary_consumption_severity TEXT NOT NULL,
    cluster_label TEXT NOT NULL,
    summary_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS aggregate_stats (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    calculated_at INTEGER NOT NULL,
    qualifying_gamblers INTEGER NOT NULL,
    avg_total_bets REAL NOT NULL,
    avg_total_stake REAL NOT NULL,
    avg_avg_stake REAL NOT NULL,
    avg_max_stake REAL NOT NULL,
    avg_min_stake REAL NOT NULL,
    avg_total_payout REAL NOT NULL,
    avg_win_count REAL NOT NULL,
    avg_total_loss REAL NOT NULL,
    avg_win_rate REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS triggers (
    id TEXT PRIMARY KEY,
    gambler_id INTEGER NOT NULL,
    trigger_type TEXT NOT NULL,
    explanation TEXT NOT NULL,
    actions_taken TEXT NOT NULL DEFAULT '',
    value TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (gambler_id, trigger_type)
);
"#;

const BET_COLUMNS: &str =
    "bet_id, gambler_id, stake_amount, payout_amount, bet_status, placed_at, settled_at";

const SCAN_COLUMNS: &str = "gambler_id, has_scan, scanned_at, previous_scan, \
    loss_chasing_score, loss_chasing_severity, \
    fluctuating_wagers_score, fluctuating_wagers_severity, \
    impulsive_transactions_score, impulsive_transactions_severity, \
    binge_gambling_score, binge_gambling_severity, \
    monetary_consumption_score, monetary_consumption_severity, \
    cluster_label, summary_json";

const TRIGGER_COLUMNS: &str =
    "id, gambler_id, trigger_type, explanation, actions_taken, value, created_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create DB at path.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // Each statement is atomic, so a poisoned lock holds no partial state.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a bet; the stored id is assigned by SQLite and returned.
    pub fn insert_bet(&self, bet: &Bet) -> Result<i64> {
        bet.validate()?;
        let conn = self.conn();
        conn.execute(
            "INSERT INTO bets (gambler_id, stake_amount, payout_amount, bet_status, placed_at, settled_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                bet.gambler_id,
                bet.stake_amount.to_string(),
                bet.payout_amount.to_string(),
                bet.status.as_str(),
                bet.placed_at.timestamp_millis(),
                bet.settled_at.map(|t| t.timestamp_millis()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn all_triggers(&self) -> Result<Vec<Trigger>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TRIGGER_COLUMNS} FROM triggers ORDER BY gambler_id, trigger_type"
        ))?;
        let rows = stmt.query_map([], trigger_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl BetRepository for SqliteStore {
    fn fetch_bets_for_gambler(&self, gambler_id: i64) -> Result<Vec<Bet>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {BET_COLUMNS} FROM bets WHERE gambler_id = ?1 ORDER BY placed_at, bet_id"
        ))?;
        let rows = stmt.query_map(params![gambler_id], bet_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn fetch_all_bets(&self, min_stake: Option<&BigDecimal>) -> Result<Vec<Bet>> {
        // REAL prefilter set slightly below the bound; the decimal check below is exact.
        let floor = min_stake.map_or(f64::NEG_INFINITY, |min| {
            let f = decimal_to_f64(min);
            f - f.abs() * 1e-9 - 1e-9
        });
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {BET_COLUMNS} FROM bets WHERE CAST(stake_amount AS REAL) >= ?1 \
             ORDER BY gambler_id, placed_at, bet_id"
        ))?;
        let rows = stmt.query_map(params![floor], bet_from_row)?;
        let mut out = Vec::new();
        for bet in rows {
            let bet = bet?;
            // Decimal comparison: 449.999 stays below 450.
            if min_stake.map_or(true, |min| bet.stake_amount >= *min) {
                out.push(bet);
            }
        }
        Ok(out)
    }
}

impl ScanResultRepository for SqliteStore {
    fn upsert_scan_result(&self, result: &ScanResult) -> Result<ScanResult> {
        let score = |p: RiskPattern| {
            result
                .assessments
                .iter()
                .find(|a| a.pattern == p)
                .map(|a| (a.score_percent, a.severity.as_str()))
                .unwrap_or((0.0, Severity::Low.as_str()))
        };
        let (lc, lc_s) = score(RiskPattern::LossChasing);
        let (fw, fw_s) = score(RiskPattern::FluctuatingWagers);
        let (it, it_s) = score(RiskPattern::ImpulsiveTransactions);
        let (bg, bg_s) = score(RiskPattern::BingeGambling);
        let (mc, mc_s) = score(RiskPattern::MonetaryConsumption);
        let summary_json = serde_json::to_string(&result.summary)?;

        let conn = self.conn();
        conn.execute(
            &format!(
                "INSERT INTO scan_results ({SCAN_COLUMNS}) \
                 VALUES (?1, 1, ?2, NULL, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14) \
                 ON CONFLICT(gambler_id) DO UPDATE SET \
                    has_scan = 1, \
                    previous_scan = scan_results.scanned_at, \
                    scanned_at = excluded.scanned_at, \
                    loss_chasing_score = excluded.loss_chasing_score, \
                    loss_chasing_severity = excluded.loss_chasing_severity, \
                    fluctuating_wagers_score = excluded.fluctuating_wagers_score, \
                    fluctuating_wagers_severity = excluded.fluctuating_wagers_severity, \
                    impulsive_transactions_score = excluded.impulsive_transactions_score, \
                    impulsive_transactions_severity = excluded.impulsive_transactions_severity, \
                    binge_gambling_score = excluded.binge_gambling_score, \
                    binge_gambling_severity = excluded.binge_gambling_severity, \
                    monetary_consumption_score = excluded.monetary_consumption_score, \
                    monetary_consumption_severity = excluded.monetary_consumption_severity, \
                    cluster_label = excluded.cluster_label, \
                    summary_json = excluded.summary_json"
            ),
            params![
                result.gambler_id,
                result.scanned_at.timestamp_millis(),
                lc,
                lc_s,
                fw,
                fw_s,
                it,
                it_s,
                bg,
                bg_s,
                mc,
                mc_s,
                result.cluster_label.as_str(),
                summary_json,
            ],
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {SCAN_COLUMNS} FROM scan_results WHERE gambler_id = ?1"
        ))?;
        Ok(stmt.query_row(params![result.gambler_id], scan_from_row)?)
    }

    fn latest_scan_result(&self, gambler_id: i64) -> Result<Option<ScanResult>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SCAN_COLUMNS} FROM scan_results WHERE gambler_id = ?1"
        ))?;
        Ok(stmt
            .query_row(params![gambler_id], scan_from_row)
            .optional()?)
    }
}

impl AggregateStatsRepository for SqliteStore {
    fn upsert_aggregate_stats(&self, stats: &AggregateStats) -> Result<()> {
        self.conn().execute(
            "INSERT INTO aggregate_stats (id, calculated_at, qualifying_gamblers, avg_total_bets, \
                avg_total_stake, avg_avg_stake, avg_max_stake, avg_min_stake, avg_total_payout, \
                avg_win_count, avg_total_loss, avg_win_rate) \
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
             ON CONFLICT(id) DO UPDATE SET \
                calculated_at = excluded.calculated_at, \
                qualifying_gamblers = excluded.qualifying_gamblers, \
                avg_total_bets = excluded.avg_total_bets, \
                avg_total_stake = excluded.avg_total_stake, \
                avg_avg_stake = excluded.avg_avg_stake, \
                avg_max_stake = excluded.avg_max_stake, \
                avg_min_stake = excluded.avg_min_stake, \
                avg_total_payout = excluded.avg_total_payout, \
                avg_win_count = excluded.avg_win_count, \
                avg_total_loss = excluded.avg_total_loss, \
                avg_win_rate = excluded.avg_win_rate",
            params![
                stats.calculated_at.timestamp_millis(),
                stats.qualifying_gamblers as i64,
                stats.avg_total_bets,
                stats.avg_total_stake,
                stats.avg_avg_stake,
                stats.avg_max_stake,
                stats.avg_min_stake,
                stats.avg_total_payout,
                stats.avg_win_count,
                stats.avg_total_loss,
                stats.avg_win_rate,
            ],
        )?;
        Ok(())
    }

    fn latest_aggregate_stats(&self) -> Result<Option<AggregateStats>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT calculated_at, qualifying_gamblers, avg_total_bets, avg_total_stake, \
                avg_avg_stake, avg_max_stake, avg_min_stake, avg_total_payout, avg_win_count, \
                avg_total_loss, avg_win_rate \
             FROM aggregate_stats WHERE id = 1",
        )?;
        let stats = stmt
            .query_row([], |row| {
                Ok(AggregateStats {
                    calculated_at: millis(row, 0)?,
                    qualifying_gamblers: row.get::<_, i64>(1)? as u64,
                    avg_total_bets: row.get(2)?,
                    avg_total_stake: row.get(3)?,
                    avg_avg_stake: row.get(4)?,
                    avg_max_stake: row.get(5)?,
                    avg_min_stake: row.get(6)?,
                    avg_total_payout: row.get(7)?,
                    avg_win_count: row.get(8)?,
                    avg_total_loss: row.get(9)?,
                    avg_win_rate: row.get(10)?,
                })
            })
            .optional()?;
        Ok(stats)
    }
}

impl TriggerRepository for SqliteStore {
    fn trigger_exists(&self, gambler_id: i64, trigger_type: TriggerType) -> Result<bool> {
        let found: Option<i64> = self
            .conn()
            .query_row(
                "SELECT 1 FROM triggers WHERE gambler_id = ?1 AND trigger_type = ?2",
                params![gambler_id, trigger_type.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn create_trigger(&self, trigger: &Trigger) -> Result<()> {
        let res = self.conn().execute(
            &format!("INSERT INTO triggers ({TRIGGER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                trigger.id.to_string(),
                trigger.gambler_id,
                trigger.trigger_type.as_str(),
                trigger.explanation,
                trigger.actions_taken,
                trigger.value.to_string(),
                trigger.created_at.timestamp_millis(),
            ],
        );
        match res {
            Ok(_) => Ok(()),
            // Only the (gambler_id, trigger_type) key is UNIQUE; id clashes are PRIMARYKEY.
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(Error::PersistenceConflict {
                    gambler_id: trigger.gambler_id,
                    trigger_type: trigger.trigger_type.as_str().to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn triggers_for_gambler(&self, gambler_id: i64) -> Result<Vec<Trigger>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TRIGGER_COLUMNS} FROM triggers WHERE gambler_id = ?1 ORDER BY trigger_type"
        ))?;
        let rows = stmt.query_map(params![gambler_id], trigger_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn conversion_err<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
}

fn decimal(row: &Row<'_>, idx: usize) -> rusqlite::Result<BigDecimal> {
    let s: String = row.get(idx)?;
    BigDecimal::from_str(&s).map_err(|e| conversion_err(idx, e))
}

fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let s: String = row.get(idx)?;
    s.parse().map_err(|e: String| conversion_err(idx, e))
}

fn millis(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

fn opt_millis(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<i64>>(idx)? {
        Some(ms) => Utc
            .timestamp_millis_opt(ms)
            .single()
            .map(Some)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms)),
        None => Ok(None),
    }
}

fn bet_from_row(row: &Row<'_>) -> rusqlite::Result<Bet> {
    Ok(Bet {
        bet_id: row.get(0)?,
        gambler_id: row.get(1)?,
        stake_amount: decimal(row, 2)?,
        payout_amount: decimal(row, 3)?,
        status: parsed::<BetStatus>(row, 4)?,
        placed_at: millis(row, 5)?,
        settled_at: opt_millis(row, 6)?,
    })
}

fn scan_from_row(row: &Row<'_>) -> rusqlite::Result<ScanResult> {
    let mut assessments = Vec::with_capacity(RiskPattern::ALL.len());
    for (i, pattern) in RiskPattern::ALL.into_iter().enumerate() {
        let idx = 4 + i * 2;
        assessments.push(PatternAssessment {
            pattern,
            score_percent: row.get(idx)?,
            severity: parsed::<Severity>(row, idx + 1)?,
        });
    }
    let summary_json: String = row.get(15)?;
    let summary: GamblerSummary =
        serde_json::from_str(&summary_json).map_err(|e| conversion_err(15, e))?;

    Ok(ScanResult {
        gambler_id: row.get(0)?,
        has_scan: row.get(1)?,
        scanned_at: millis(row, 2)?,
        previous_scan: opt_millis(row, 3)?,
        assessments,
        cluster_label: parsed::<ClusterLabel>(row, 14)?,
        summary,
    })
}

fn trigger_from_row(row: &Row<'_>) -> rusqlite::Result<Trigger> {
    let id: String = row.get(0)?;
    Ok(Trigger {
        id: uuid::Uuid::parse_str(&id).map_err(|e| conversion_err(0, e))?,
        gambler_id: row.get(1)?,
        trigger_type: parsed::<TriggerType>(row, 2)?,
        explanation: row.get(3)?,
        actions_taken: row.get(4)?,
        value: decimal(row, 5)?,
        created_at: millis(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn bet(gambler_id: i64, stake: &str, minutes: i64) -> Bet {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Bet::new(
            gambler_id,
            BigDecimal::from_str(stake).unwrap(),
            BetStatus::Lost,
            base + Duration::minutes(minutes),
        )
        .unwrap()
    }

    #[test]
    fn bets_come_back_in_placed_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_bet(&bet(1, "5.00", 20)).unwrap();
        store.insert_bet(&bet(1, "7.50", 0)).unwrap();
        store.insert_bet(&bet(2, "9.00", 10)).unwrap();

        let bets = store.fetch_bets_for_gambler(1).unwrap();
        assert_eq!(bets.len(), 2);
        assert!(bets[0].placed_at < bets[1].placed_at);
        assert_eq!(bets[0].stake_amount, BigDecimal::from_str("7.5").unwrap());
    }

    #[test]
    fn min_stake_filter_is_inclusive() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_bet(&bet(1, "449.99", 0)).unwrap();
        store.insert_bet(&bet(2, "450.00", 0)).unwrap();
        store.insert_bet(&bet(3, "900", 0)).unwrap();

        let min = BigDecimal::from(450);
        let ids: Vec<i64> = store
            .fetch_all_bets(Some(&min))
            .unwrap()
            .iter()
            .map(|b| b.gambler_id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(store.fetch_all_bets(None).unwrap().len(), 3);
    }

    #[test]
    fn min_stake_filter_is_exact_beyond_float_precision() {
        let store = SqliteStore::open_in_memory().unwrap();
        // both cast to 450.0 as REAL
        store.insert_bet(&bet(1, "449.9999999999999999", 0)).unwrap();
        store.insert_bet(&bet(2, "450.0000000000000001", 0)).unwrap();

        let min = BigDecimal::from(450);
        let bets = store.fetch_all_bets(Some(&min)).unwrap();
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].gambler_id, 2);
    }

    #[test]
    fn duplicate_trigger_is_a_conflict() {
        let store = SqliteStore::open_in_memory().unwrap();
        let t = Trigger::highest_bet(4, BigDecimal::from(500));
        store.create_trigger(&t).unwrap();
        assert!(store.trigger_exists(4, TriggerType::HighestBet).unwrap());

        let again = Trigger::highest_bet(4, BigDecimal::from(700));
        let err = store.create_trigger(&again).unwrap_err();
        assert!(matches!(err, Error::PersistenceConflict { gambler_id: 4, .. }));
        assert_eq!(store.triggers_for_gambler(4).unwrap(), vec![t]);
    }

    #[test]
    fn id_clash_is_not_a_conflict() {
        let store = SqliteStore::open_in_memory().unwrap();
        let t = Trigger::highest_bet(4, BigDecimal::from(500));
        store.create_trigger(&t).unwrap();

        let mut other = Trigger::highest_bet(5, BigDecimal::from(600));
        other.id = t.id;
        let err = store.create_trigger(&other).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!store.trigger_exists(5, TriggerType::HighestBet).unwrap());
    }

    #[test]
    fn stats_singleton_is_replaced() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.latest_aggregate_stats().unwrap().is_none());

        let mut stats = AggregateStats::empty(Utc.timestamp_millis_opt(1_000).unwrap());
        store.upsert_aggregate_stats(&stats).unwrap();
        stats.qualifying_gamblers = 3;
        stats.avg_total_bets = 21.3333;
        store.upsert_aggregate_stats(&stats).unwrap();

        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM aggregate_stats", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.latest_aggregate_stats().unwrap(), Some(stats));
    }
}
