//! Statistical behavioral feature extraction from a gambler's bet history.

mod behavioral;
mod pipeline;
mod session;

pub use pipeline::{Extraction, FeatureExtractor};
pub use session::{Session, SessionSegmenter};

use serde::{Deserialize, Serialize};

/// Column names in the order the risk model was trained on.
pub const FEATURE_NAMES: [&str; FEATURE_DIM] = [
    "total_amount_spent",
    "avg_transaction_amount",
    "std_transaction_amount",
    "min_transaction_amount",
    "max_transaction_amount",
    "avg_time_between_txn",
    "min_time_between_txn",
    "night_txn_ratio",
    "txn_burst_ratio",
    "avg_txn_per_day",
    "amount_cv",
    "range_transaction_amount",
    "avg_txn_per_session",
    "max_txn_per_session",
    "avg_session_duration",
    "long_session_ratio",
];

pub const FEATURE_DIM: usize = 16;

/// Fixed-shape behavioral summary for one gambler. Times are in minutes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub total_amount_spent: f64,
    pub avg_transaction_amount: f64,
    pub std_transaction_amount: f64,
    pub min_transaction_amount: f64,
    pub max_transaction_amount: f64,
    pub avg_time_between_txn: f64,
    pub min_time_between_txn: f64,
    pub night_txn_ratio: f64,
    pub txn_burst_ratio: f64,
    pub avg_txn_per_day: f64,
    pub amount_cv: f64,
    pub range_transaction_amount: f64,
    pub avg_txn_per_session: f64,
    pub max_txn_per_session: f64,
    pub avg_session_duration: f64,
    pub long_session_ratio: f64,
}

impl FeatureVector {
    /// Values in `FEATURE_NAMES` order.
    pub fn values(&self) -> [f64; FEATURE_DIM] {
        [
            self.total_amount_spent,
            self.avg_transaction_amount,
            self.std_transaction_amount,
            self.min_transaction_amount,
            self.max_transaction_amount,
            self.avg_time_between_txn,
            self.min_time_between_txn,
            self.night_txn_ratio,
            self.txn_burst_ratio,
            self.avg_txn_per_day,
            self.amount_cv,
            self.range_transaction_amount,
            self.avg_txn_per_session,
            self.max_txn_per_session,
            self.avg_session_duration,
            self.long_session_ratio,
        ]
    }

    /// f32 model input row
    pub fn to_f32(&self) -> Vec<f32> {
        self.values().iter().map(|&v| v as f32).collect()
    }
}
