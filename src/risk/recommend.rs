//! User-facing guidance per (pattern, severity).

use super::engine::{PatternAssessment, RiskPattern, Severity};

/// Fixed guidance text; `None` for Low.
pub fn message_for(pattern: RiskPattern, severity: Severity) -> Option<&'static str> {
    use RiskPattern::*;
    use Severity::*;

    let msg = match (pattern, severity) {
        (_, Low) => return None,

        (LossChasing, Moderate) => "We've noticed you sometimes try to recover losses quickly. It's okay to take breaks — not every loss needs to be chased.",
        (LossChasing, High) => "It looks like you're often trying to win back losses. Consider setting limits or stepping away for a bit.",
        (LossChasing, ExtremelyHigh) => "You may be chasing losses too often. Please consider using our support tools to stay in control.",

        (FluctuatingWagers, Moderate) => "Your bet sizes vary a lot. Try setting a comfortable betting amount that works for you.",
        (FluctuatingWagers, High) => "We’ve seen big ups and downs in how much you bet. Keeping things consistent may help you stay in control.",
        (FluctuatingWagers, ExtremelyHigh) => "You’re placing bets that change dramatically. Consider setting bet limits or using our budgeting tools.",

        (ImpulsiveTransactions, Moderate) => "You’ve placed several quick bets in short periods. Taking a moment to think between bets can help you stay in control.",
        (ImpulsiveTransactions, High) => "You seem to be betting quite impulsively. Consider using our tools to set timeouts or reminders.",
        (ImpulsiveTransactions, ExtremelyHigh) => "You’re placing many bets in rapid succession. We recommend pausing and using our support features.",

        (BingeGambling, Moderate) => "You’ve had some long playing sessions. Remember to take regular breaks — your wellbeing comes first.",
        (BingeGambling, High) => "You’re playing for extended periods without many breaks. Taking short rests can improve your experience.",
        (BingeGambling, ExtremelyHigh) => "You’ve spent a lot of time gambling in long bursts. Consider using our session limit features to help you take breaks.",

        (MonetaryConsumption, Moderate) => "Your spending is starting to go up. Consider reviewing your budget to make sure you're comfortable.",
        (MonetaryConsumption, High) => "You’ve been spending more than usual. Our tools can help you set spending limits and stay in control.",
        (MonetaryConsumption, ExtremelyHigh) => "We’ve noticed very high spending on your account. Please consider setting strong limits or reaching out for support.",
    };
    Some(msg)
}

/// Messages in the order the assessments are given.
pub fn recommendations(assessments: &[PatternAssessment]) -> Vec<String> {
    assessments
        .iter()
        .filter_map(|a| message_for(a.pattern, a.severity))
        .map(String::from)
        .collect()
}
