//! Scanner configuration. Every section falls back to its defaults.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// SQLite database holding bets, scan results, stats and triggers
    pub database_path: PathBuf,
    /// Model artifact locations
    pub models: ModelsConfig,
    /// Session segmentation
    pub sessions: SessionConfig,
    /// Feature extraction parameters
    pub features: FeaturesConfig,
    /// Fleet-wide aggregate job
    pub aggregate: AggregateConfig,
    /// Operator alert rules
    pub triggers: TriggerConfig,
    /// Batch job scheduling for daemon mode
    pub jobs: JobsConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Multi-output risk score model (ONNX, input [1, 16], output 5 scores)
    pub risk_model_path: PathBuf,
    /// Fitted scaler + k-means centroids (JSON)
    pub cluster_model_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// A gap strictly greater than this starts a new session
    pub gap_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Offset applied before taking hour-of-day and calendar day
    pub utc_offset_minutes: i32,
    /// Night window is [night_start_hour, night_end_hour)
    pub night_start_hour: u32,
    pub night_end_hour: u32,
    /// Gaps at or below this count as a burst
    pub burst_gap_minutes: f64,
    /// Sessions at or above this duration count as long
    pub long_session_minutes: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Gamblers need at least this many bets to contribute
    pub min_bets: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Any bet with stake at or above this flags its gambler
    pub high_stake_threshold: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Daemon mode: seconds between batch runs
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("wager-scan.db"),
            models: ModelsConfig::default(),
            sessions: SessionConfig::default(),
            features: FeaturesConfig::default(),
            aggregate: AggregateConfig::default(),
            triggers: TriggerConfig::default(),
            jobs: JobsConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            risk_model_path: PathBuf::from("models/risk_model.onnx"),
            cluster_model_path: PathBuf::from("models/kmeans.json"),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { gap_minutes: 30 }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            night_start_hour: 0,
            night_end_hour: 6,
            burst_gap_minutes: 10.0,
            long_session_minutes: 60.0,
        }
    }
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self { min_bets: 15 }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            high_stake_threshold: BigDecimal::from(450),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self { interval_secs: 300 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl ScanConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<ScanConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let c: ScanConfig =
            serde_json::from_str(r#"{"sessions":{"gap_minutes":45},"log":{"json":false}}"#).unwrap();
        assert_eq!(c.sessions.gap_minutes, 45);
        assert!(!c.log.json);
        assert_eq!(c.log.level, "info");
        assert_eq!(c.aggregate.min_bets, 15);
        assert_eq!(c.triggers.high_stake_threshold, BigDecimal::from(450));
    }
}
