//! Maps raw model scores onto per-pattern severity bands.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Behavioral patterns scored by the risk model, in model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskPattern {
    LossChasing,
    FluctuatingWagers,
    ImpulsiveTransactions,
    BingeGambling,
    MonetaryConsumption,
}

impl RiskPattern {
    pub const ALL: [RiskPattern; 5] = [
        RiskPattern::LossChasing,
        RiskPattern::FluctuatingWagers,
        RiskPattern::ImpulsiveTransactions,
        RiskPattern::BingeGambling,
        RiskPattern::MonetaryConsumption,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskPattern::LossChasing => "loss_chasing",
            RiskPattern::FluctuatingWagers => "fluctuating_wagers",
            RiskPattern::ImpulsiveTransactions => "impulsive_transactions",
            RiskPattern::BingeGambling => "binge_gambling",
            RiskPattern::MonetaryConsumption => "monetary_consumption",
        }
    }
}

impl fmt::Display for RiskPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Moderate,
    High,
    #[serde(rename = "Extremely High")]
    ExtremelyHigh,
}

impl Severity {
    /// `percent` is a score already scaled to [0, 100].
    pub fn from_percent(percent: f64) -> Self {
        if percent <= 40.0 {
            Severity::Low
        } else if percent <= 60.0 {
            Severity::Moderate
        } else if percent < 80.0 {
            Severity::High
        } else {
            Severity::ExtremelyHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Moderate => "Moderate",
            Severity::High => "High",
            Severity::ExtremelyHigh => "Extremely High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Severity::Low),
            "Moderate" => Ok(Severity::Moderate),
            "High" => Ok(Severity::High),
            "Extremely High" => Ok(Severity::ExtremelyHigh),
            other => Err(format!("unknown severity {other:?}")),
        }
    }
}

/// Five model scores in [0, 1], rounded to 3 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskScores {
    pub loss_chasing: f64,
    pub fluctuating_wagers: f64,
    pub impulsive_transactions: f64,
    pub binge_gambling: f64,
    pub monetary_consumption: f64,
}

impl RiskScores {
    /// Build from raw model output in `RiskPattern::ALL` order.
    pub fn from_raw(raw: [f64; 5]) -> Self {
        let r = |v: f64| round_to(v.clamp(0.0, 1.0), 3);
        Self {
            loss_chasing: r(raw[0]),
            fluctuating_wagers: r(raw[1]),
            impulsive_transactions: r(raw[2]),
            binge_gambling: r(raw[3]),
            monetary_consumption: r(raw[4]),
        }
    }

    pub fn get(&self, pattern: RiskPattern) -> f64 {
        match pattern {
            RiskPattern::LossChasing => self.loss_chasing,
            RiskPattern::FluctuatingWagers => self.fluctuating_wagers,
            RiskPattern::ImpulsiveTransactions => self.impulsive_transactions,
            RiskPattern::BingeGambling => self.binge_gambling,
            RiskPattern::MonetaryConsumption => self.monetary_consumption,
        }
    }
}

/// Score and band for one pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternAssessment {
    pub pattern: RiskPattern,
    pub score_percent: f64,
    pub severity: Severity,
}

pub struct RiskEngine;

impl RiskEngine {
    /// Band every pattern independently, in pattern order.
    pub fn assess(scores: &RiskScores) -> Vec<PatternAssessment> {
        RiskPattern::ALL
            .iter()
            .map(|&pattern| {
                let score_percent = round_to(scores.get(pattern) * 100.0, 2);
                PatternAssessment {
                    pattern,
                    score_percent,
                    severity: Severity::from_percent(score_percent),
                }
            })
            .collect()
    }
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_are_exact() {
        assert_eq!(Severity::from_percent(0.0), Severity::Low);
        assert_eq!(Severity::from_percent(40.0), Severity::Low);
        assert_eq!(Severity::from_percent(40.01), Severity::Moderate);
        assert_eq!(Severity::from_percent(41.0), Severity::Moderate);
        assert_eq!(Severity::from_percent(60.0), Severity::Moderate);
        assert_eq!(Severity::from_percent(60.01), Severity::High);
        assert_eq!(Severity::from_percent(79.99), Severity::High);
        assert_eq!(Severity::from_percent(80.0), Severity::ExtremelyHigh);
        assert_eq!(Severity::from_percent(100.0), Severity::ExtremelyHigh);
    }

    #[test]
    fn every_hundredth_maps_to_one_band() {
        let mut last = Severity::Low;
        for i in 0..=10_000 {
            let s = Severity::from_percent(i as f64 / 100.0);
            assert!(s >= last);
            last = s;
        }
        assert_eq!(last, Severity::ExtremelyHigh);
    }

    #[test]
    fn assess_rounds_and_orders() {
        let scores = RiskScores::from_raw([0.4004, 0.6, 0.61, 0.79949, 1.2]);
        assert_eq!(scores.loss_chasing, 0.4);
        assert_eq!(scores.binge_gambling, 0.799);
        assert_eq!(scores.monetary_consumption, 1.0);

        let out = RiskEngine::assess(&scores);
        let got: Vec<(RiskPattern, f64, Severity)> =
            out.iter().map(|a| (a.pattern, a.score_percent, a.severity)).collect();
        assert_eq!(
            got,
            vec![
                (RiskPattern::LossChasing, 40.0, Severity::Low),
                (RiskPattern::FluctuatingWagers, 60.0, Severity::Moderate),
                (RiskPattern::ImpulsiveTransactions, 61.0, Severity::High),
                (RiskPattern::BingeGambling, 79.9, Severity::High),
                (RiskPattern::MonetaryConsumption, 100.0, Severity::ExtremelyHigh),
            ]
        );
    }

    #[test]
    fn severity_text_round_trips() {
        assert_eq!("Extremely High".parse::<Severity>().unwrap(), Severity::ExtremelyHigh);
        assert_eq!(serde_json::to_string(&Severity::ExtremelyHigh).unwrap(), "\"Extremely High\"");
    }
}
