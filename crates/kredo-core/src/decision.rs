//! Decision synthesis: three ballots in, one recommendation out.
//!
//! The synthesizer resolves the ensemble by simple majority, then blends
//! the confidences of the voters that agree with the outcome into a
//! single figure. A gate veto short-circuits the majority: the decision
//! is REJECT no matter how the other two voted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::DerivedMetrics;
use crate::evaluators::{Decision, Vote};

/// Relative influence of each voter on the blended confidence. The
/// weights only shape confidence; the decision itself is one voter, one
/// vote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorWeights {
    pub gate: f64,
    pub rules: f64,
    pub judgment: f64,
}

impl Default for EvaluatorWeights {
    fn default() -> Self {
        Self {
            gate: 0.35,
            rules: 0.40,
            judgment: 0.25,
        }
    }
}

/// The three ballots, in synthesis order.
#[derive(Debug, Clone)]
pub struct VoteSet {
    pub gate: Vote,
    pub rules: Vote,
    pub judgment: Vote,
}

impl VoteSet {
    fn ballots(&self) -> [&Vote; 3] {
        [&self.gate, &self.rules, &self.judgment]
    }
}

/// The metrics the recommendation was grounded in, echoed back to the
/// caller for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFactors {
    pub derived: DerivedFactors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedFactors {
    pub dti: f64,
    pub ltv: f64,
    pub fico_score: f64,
}

/// The final underwriting recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub decision: Decision,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub key_factors: KeyFactors,
    pub summary: String,
    pub decided_at: DateTime<Utc>,
}

/// Blends the ensemble's votes into a [`Recommendation`].
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    weights: EvaluatorWeights,
}

impl Synthesizer {
    pub fn new(weights: EvaluatorWeights) -> Self {
        Self { weights }
    }

    pub fn synthesize(&self, votes: &VoteSet, metrics: DerivedMetrics, fico: f64) -> Recommendation {
        let vetoed = votes.ballots().iter().any(|v| v.veto);
        let approvals = votes
            .ballots()
            .iter()
            .filter(|v| v.decision.is_approve())
            .count();

        let decision = if vetoed || approvals < 2 {
            Decision::Reject
        } else {
            Decision::Approve
        };

        let mut confidence = self.agreeing_confidence(votes, decision);
        if vetoed {
            // A veto is at least as certain as the gate that cast it.
            confidence = confidence.max(votes.gate.confidence);
        }

        let reasons = merge_reasons(votes);
        let summary = build_summary(decision, confidence, &reasons);

        Recommendation {
            decision,
            confidence,
            reasons,
            key_factors: KeyFactors {
                derived: DerivedFactors {
                    dti: metrics.dti,
                    ltv: metrics.ltv,
                    fico_score: fico,
                },
            },
            summary,
            decided_at: Utc::now(),
        }
    }

    /// Weighted mean confidence over the voters that agree with the
    /// outcome, renormalized over their weights.
    fn agreeing_confidence(&self, votes: &VoteSet, decision: Decision) -> f64 {
        let weighted = [
            (&votes.gate, self.weights.gate),
            (&votes.rules, self.weights.rules),
            (&votes.judgment, self.weights.judgment),
        ];
        let (sum, total) = weighted
            .iter()
            .filter(|(v, _)| v.decision == decision)
            .fold((0.0, 0.0), |(s, t), (v, w)| (s + v.confidence * w, t + w));
        if total > 0.0 {
            (sum / total).clamp(0.0, 1.0)
        } else {
            // Unreachable under majority voting, but keep a sane figure.
            0.5
        }
    }
}

/// Concatenate reasons in synthesis order, dropping exact duplicates
/// while keeping the first occurrence.
fn merge_reasons(votes: &VoteSet) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for vote in votes.ballots() {
        for reason in &vote.reasons {
            if !merged.iter().any(|r| r == reason) {
                merged.push(reason.clone());
            }
        }
    }
    merged
}

fn confidence_band(confidence: f64) -> &'static str {
    if confidence >= 0.8 {
        "high"
    } else if confidence >= 0.6 {
        "moderate"
    } else {
        "low"
    }
}

fn build_summary(decision: Decision, confidence: f64, reasons: &[String]) -> String {
    let mut summary = format!(
        "{} with {} confidence ({:.0}%).",
        decision,
        confidence_band(confidence),
        confidence * 100.0
    );

    for reason in reasons.iter().take(2) {
        summary.push(' ');
        summary.push_str(reason);
        summary.push('.');
    }

    if decision == Decision::Reject {
        summary.push_str(
            " Consider a larger down payment, a longer tenor to reduce the \
             monthly installment, or improving the credit profile before \
             reapplying.",
        );
    }

    summary.push_str(
        " Note: installments on floating-rate products can rise after the \
         fixed period ends; figures here assume the quoted installment.",
    );
    summary
}
