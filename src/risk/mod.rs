//! Severity banding and guidance for model risk scores.

mod engine;
mod recommend;

pub use engine::{round_to, PatternAssessment, RiskEngine, RiskPattern, RiskScores, Severity};
pub use recommend::{message_for, recommendations};
