//! Predictive models behind single-function traits.
//!
//! - [`RiskPredictor`]: feature vector → five pattern scores ([`OnnxRiskModel`])
//! - [`ClusterPredictor`]: gambler summary → cluster id ([`KMeansClusterer`])
//!
//! Both are loaded once into [`Models`] at startup and shared read-only.

mod kmeans;
mod onnx;

pub use kmeans::{KMeansClusterer, Scaler};
pub use onnx::OnnxRiskModel;

use crate::bets::GamblerSummary;
use crate::config::ModelsConfig;
use crate::error::Result;
use crate::features::FeatureVector;
use crate::risk::RiskScores;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

pub trait RiskPredictor: Send + Sync {
    /// Raw scores in `RiskPattern::ALL` order, each clamped to [0, 1].
    fn predict(&self, features: &FeatureVector) -> Result<[f64; 5]>;
}

pub trait ClusterPredictor: Send + Sync {
    fn predict(&self, input: &[f64; 8]) -> Result<i64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterLabel {
    #[serde(rename = "Low-Risk")]
    LowRisk,
    #[serde(rename = "Moderate-Risk")]
    ModerateRisk,
    #[serde(rename = "High-Risk")]
    HighRisk,
    Unknown,
}

impl ClusterLabel {
    /// Anything outside the fitted clusters is `Unknown`.
    pub fn from_cluster_id(id: i64) -> Self {
        match id {
            0 => ClusterLabel::LowRisk,
            1 => ClusterLabel::ModerateRisk,
            2 => ClusterLabel::HighRisk,
            _ => ClusterLabel::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterLabel::LowRisk => "Low-Risk",
            ClusterLabel::ModerateRisk => "Moderate-Risk",
            ClusterLabel::HighRisk => "High-Risk",
            ClusterLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Low-Risk" => Ok(ClusterLabel::LowRisk),
            "Moderate-Risk" => Ok(ClusterLabel::ModerateRisk),
            "High-Risk" => Ok(ClusterLabel::HighRisk),
            "Unknown" => Ok(ClusterLabel::Unknown),
            other => Err(format!("unknown cluster label {other:?}")),
        }
    }
}

/// Process-wide model handles.
#[derive(Clone)]
pub struct Models {
    pub risk: Arc<dyn RiskPredictor>,
    pub cluster: Arc<dyn ClusterPredictor>,
}

impl Models {
    pub fn new(risk: Arc<dyn RiskPredictor>, cluster: Arc<dyn ClusterPredictor>) -> Self {
        Self { risk, cluster }
    }

    /// Load both artifacts; fails if either is missing or unreadable.
    pub fn load(config: &ModelsConfig) -> Result<Self> {
        let risk = OnnxRiskModel::load(&config.risk_model_path)?;
        let cluster = KMeansClusterer::load(&config.cluster_model_path)?;
        info!(
            risk_model = %config.risk_model_path.display(),
            cluster_model = %config.cluster_model_path.display(),
            clusters = cluster.cluster_count(),
            "models loaded"
        );
        Ok(Self::new(Arc::new(risk), Arc::new(cluster)))
    }

    pub fn score(&self, features: &FeatureVector) -> Result<RiskScores> {
        Ok(RiskScores::from_raw(self.risk.predict(features)?))
    }

    pub fn classify(&self, summary: &GamblerSummary) -> Result<ClusterLabel> {
        let id = self.cluster.predict(&summary.cluster_input())?;
        let label = ClusterLabel::from_cluster_id(id);
        if label == ClusterLabel::Unknown {
            warn!(cluster_id = id, "cluster id outside fitted labels");
        }
        Ok(label)
    }
}
