//! Soft weighted policy rules.
//!
//! Unlike the gate, no single check here can sink an application. Each
//! check contributes a signed weight proportional to how far the metric
//! sits from its internal reference, and the signed tally decides the
//! vote. A stellar score can carry a stretched DTI, and vice versa.

use super::{pct, Vote};
use crate::application::LoanApplication;
use crate::policy::PolicyLimits;
use crate::scoring::CreditScore;

/// Score deviations are normalized over this band: 150 points away from
/// the target minimum saturates the check.
const SCORE_BAND: f64 = 150.0;

const SCORE_WEIGHT: f64 = 0.5;
const DTI_WEIGHT: f64 = 0.3;
const LTV_WEIGHT: f64 = 0.2;

/// Weighted-criteria evaluator over score, DTI, and LTV.
#[derive(Debug, Clone)]
pub struct RulesEvaluator {
    limits: PolicyLimits,
}

impl RulesEvaluator {
    pub fn new(limits: PolicyLimits) -> Self {
        Self { limits }
    }

    /// Produce a soft vote. Total: every check always runs and always
    /// emits a reason naming the metric, its value, and the reference.
    pub fn evaluate(&self, score: &CreditScore, loan: &LoanApplication) -> Vote {
        let derived = loan.derived();

        let mut checks = vec![
            Check::new(
                SCORE_WEIGHT,
                (score.score - self.limits.min_score) / SCORE_BAND,
                format!(
                    "credit score {:.0} against the target minimum of {:.0}",
                    score.score, self.limits.min_score
                ),
            ),
            Check::new(
                DTI_WEIGHT,
                (self.limits.max_dti - derived.dti) / self.limits.max_dti,
                format!(
                    "debt-to-income ratio {} against the internal reference of {}",
                    pct(derived.dti),
                    pct(self.limits.max_dti)
                ),
            ),
            Check::new(
                LTV_WEIGHT,
                (self.limits.max_ltv - derived.ltv) / self.limits.max_ltv,
                format!(
                    "loan-to-value ratio {} against the internal reference of {}",
                    pct(derived.ltv),
                    pct(self.limits.max_ltv)
                ),
            ),
        ];

        // Most decision-relevant reasons first.
        checks.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let tally: f64 = checks.iter().map(|c| c.contribution).sum();
        let reasons = checks.into_iter().map(|c| c.reason).collect();
        let confidence = (0.5 + tally.abs() / 2.0).clamp(0.0, 1.0);

        if tally >= 0.0 {
            Vote::approve(confidence, reasons)
        } else {
            Vote::reject(confidence, reasons)
        }
    }
}

struct Check {
    contribution: f64,
    reason: String,
}

impl Check {
    fn new(weight: f64, deviation: f64, metric: String) -> Self {
        let contribution = weight * deviation.clamp(-1.0, 1.0);
        let direction = if contribution >= 0.0 {
            "supports approval"
        } else {
            "weighs against approval"
        };
        Self {
            contribution,
            reason: format!("{metric} {direction}"),
        }
    }
}
