//! One end-to-end risk scan for a single gambler:
//! collect bets → segment → extract features → score → classify → recommend → persist.

use crate::bets::GamblerSummary;
use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::features::FeatureExtractor;
use crate::logging::StructuredLogger;
use crate::model::{ClusterLabel, Models};
use crate::risk::{self, PatternAssessment, RiskEngine, RiskScores};
use crate::storage::{BetRepository, ScanResultRepository};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The single stored scan row per gambler ("latest wins").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub gambler_id: i64,
    pub has_scan: bool,
    pub scanned_at: DateTime<Utc>,
    /// `scanned_at` of the row this one replaced
    pub previous_scan: Option<DateTime<Utc>>,
    pub assessments: Vec<PatternAssessment>,
    pub cluster_label: ClusterLabel,
    /// Statistics the cluster label was derived from
    pub summary: GamblerSummary,
}

/// Everything returned to the caller of a successful scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub result: ScanResult,
    pub scores: RiskScores,
    pub recommendations: Vec<String>,
    pub bet_count: usize,
    pub session_count: usize,
}

pub struct Scanner {
    models: Models,
    extractor: FeatureExtractor,
}

impl Scanner {
    pub fn new(config: &ScanConfig, models: Models) -> Self {
        Self {
            models,
            extractor: FeatureExtractor::new(&config.sessions, config.features.clone()),
        }
    }

    /// Nothing is written unless every stage before persistence succeeds.
    pub fn scan<S>(&self, store: &S, gambler_id: i64) -> Result<ScanReport>
    where
        S: BetRepository + ScanResultRepository,
    {
        let _span = StructuredLogger::scan_span(gambler_id).entered();
        let bets = store.fetch_bets_for_gambler(gambler_id)?;
        let summary =
            GamblerSummary::from_bets(&bets).ok_or(Error::InsufficientData { gambler_id })?;

        let extraction = self.extractor.extract(gambler_id, &bets)?;
        debug!(
            bets = bets.len(),
            sessions = extraction.sessions.len(),
            "features extracted"
        );

        let scores = self.models.score(&extraction.features)?;
        let assessments = RiskEngine::assess(&scores);
        let cluster_label = self.models.classify(&summary)?;
        let recommendations = risk::recommendations(&assessments);

        let computed = ScanResult {
            gambler_id,
            has_scan: true,
            scanned_at: Utc::now().trunc_subsecs(3),
            previous_scan: None,
            assessments,
            cluster_label,
            summary,
        };
        let stored = store.upsert_scan_result(&computed)?;

        info!(
            cluster = %stored.cluster_label,
            warnings = recommendations.len(),
            previous_scan = ?stored.previous_scan,
            "scan complete"
        );
        Ok(ScanReport {
            result: stored,
            scores,
            recommendations,
            bet_count: bets.len(),
            session_count: extraction.sessions.len(),
        })
    }
}
