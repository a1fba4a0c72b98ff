//! The deterministic evaluators and their shared vote shape.
//!
//! Each evaluator answers the same question — should this application be
//! approved? — from a different angle:
//!
//! - [`RulesEvaluator`]: soft weighted policy checks, signed tally.
//! - [`GateEvaluator`]: hard limits with veto power.
//!
//! The third voter, the AI judgment evaluator, lives in the runtime crate
//! because it suspends on an external call; it produces the same
//! [`Vote`] shape.

mod gate;
mod rules;

pub use gate::GateEvaluator;
pub use rules::RulesEvaluator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A binary underwriting decision. There is no middle ground: a
/// three-voter ensemble of binary votes always resolves by majority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn is_approve(self) -> bool {
        matches!(self, Decision::Approve)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => f.write_str("APPROVE"),
            Decision::Reject => f.write_str("REJECT"),
        }
    }
}

/// One evaluator's ballot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub decision: Decision,
    /// In 0.0..=1.0.
    pub confidence: f64,
    /// Human-readable justification, most decision-relevant first.
    pub reasons: Vec<String>,
    /// Only the gate sets this; a veto forces REJECT regardless of the
    /// other two ballots.
    #[serde(default)]
    pub veto: bool,
}

impl Vote {
    pub fn approve(confidence: f64, reasons: Vec<String>) -> Self {
        Self {
            decision: Decision::Approve,
            confidence: confidence.clamp(0.0, 1.0),
            reasons,
            veto: false,
        }
    }

    pub fn reject(confidence: f64, reasons: Vec<String>) -> Self {
        Self {
            decision: Decision::Reject,
            confidence: confidence.clamp(0.0, 1.0),
            reasons,
            veto: false,
        }
    }
}

/// Format a fraction as a whole percentage for reason strings.
pub(crate) fn pct(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}
