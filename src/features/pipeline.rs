//! Feature extraction pipeline: bets → sessions → behavioral stats → vector.

use super::{behavioral, FeatureVector, Session, SessionSegmenter};
use crate::bets::Bet;
use crate::config::{FeaturesConfig, SessionConfig};
use crate::error::Result;
use chrono::{FixedOffset, Offset, Utc};

pub struct FeatureExtractor {
    config: FeaturesConfig,
    segmenter: SessionSegmenter,
    offset: FixedOffset,
}

/// Feature vector plus the sessions it was derived from.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub features: FeatureVector,
    pub sessions: Vec<Session>,
}

impl FeatureExtractor {
    pub fn new(sessions: &SessionConfig, config: FeaturesConfig) -> Self {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).unwrap_or_else(|| {
            tracing::warn!(
                utc_offset_minutes = config.utc_offset_minutes,
                "offset out of range; using UTC"
            );
            Utc.fix()
        });
        Self {
            config,
            segmenter: SessionSegmenter::new(sessions),
            offset,
        }
    }

    /// Segment then summarize one gambler's history, ordered by `placed_at`.
    pub fn extract(&self, gambler_id: i64, bets: &[Bet]) -> Result<Extraction> {
        let ids = self.segmenter.assign(gambler_id, bets)?;
        let sessions = SessionSegmenter::sessions(bets, &ids);
        let features = behavioral::compute(bets, &sessions, &self.config, self.offset);
        Ok(Extraction { features, sessions })
    }
}
