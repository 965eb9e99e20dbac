//! Wager Scan: behavioral risk scanning over gambler wagering histories.
//!
//! Modular structure:
//! - [`bets`]: Bet records and per-gambler summaries
//! - [`features`]: Session segmentation and behavioral feature extraction
//! - [`model`]: Risk score (ONNX) and cluster (k-means) predictors
//! - [`risk`]: Severity bands and guidance messages
//! - [`scan`]: Per-gambler scan orchestration
//! - [`jobs`]: Fleet-wide aggregate stats and trigger detection
//! - [`storage`]: Repository traits and the SQLite store
//! - [`logging`]: Structured JSON logging

pub mod bets;
pub mod config;
pub mod error;
pub mod features;
pub mod jobs;
pub mod logging;
pub mod model;
pub mod risk;
pub mod scan;
pub mod storage;

pub use bets::{Bet, BetStatus, GamblerSummary};
pub use config::ScanConfig;
pub use error::{Error, Result};
pub use features::{FeatureExtractor, FeatureVector, SessionSegmenter};
pub use jobs::{AggregateStatsJob, TriggerDetector};
pub use logging::StructuredLogger;
pub use model::{ClusterLabel, Models};
pub use risk::{RiskEngine, Severity};
pub use scan::{ScanReport, ScanResult, Scanner};
pub use storage::SqliteStore;
