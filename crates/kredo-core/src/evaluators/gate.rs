//! Hard-limit gate.
//!
//! The gate checks the absolute ceilings an application must clear
//! regardless of how the other voters lean. A breach produces a vetoing
//! REJECT that overrides the majority. All breached limits are reported,
//! not just the first one found.

use super::{pct, Vote};
use crate::application::LoanApplication;
use crate::policy::PolicyLimits;
use crate::profile::CreditProfile;
use crate::scoring::CreditScore;

/// Veto-capable evaluator over the hard policy ceilings.
#[derive(Debug, Clone)]
pub struct GateEvaluator {
    limits: PolicyLimits,
}

impl GateEvaluator {
    pub fn new(limits: PolicyLimits) -> Self {
        Self { limits }
    }

    /// Check every hard limit. The profile is optional because callers
    /// that only have a precomputed score cannot check bankruptcy.
    pub fn evaluate(
        &self,
        score: &CreditScore,
        loan: &LoanApplication,
        profile: Option<&CreditProfile>,
    ) -> Vote {
        let derived = loan.derived();
        let mut violations = Vec::new();

        if derived.dti > self.limits.hard_max_dti {
            violations.push(format!(
                "debt-to-income ratio {} exceeds the absolute ceiling of {}",
                pct(derived.dti),
                pct(self.limits.hard_max_dti)
            ));
        }
        if derived.ltv > self.limits.hard_max_ltv {
            violations.push(format!(
                "loan-to-value ratio {} exceeds the absolute ceiling of {}",
                pct(derived.ltv),
                pct(self.limits.hard_max_ltv)
            ));
        }
        if score.score < self.limits.score_floor {
            violations.push(format!(
                "credit score {:.0} is below the absolute floor of {:.0}",
                score.score, self.limits.score_floor
            ));
        }
        if profile.map(|p| p.has_bankruptcy).unwrap_or(false) {
            violations.push("bankruptcy on record".to_string());
        }

        if !violations.is_empty() {
            let mut vote = Vote::reject(1.0, violations);
            vote.veto = true;
            return vote;
        }

        // Confidence scales with the tightest remaining headroom; an
        // application scraping past every ceiling gets a lukewarm 0.5.
        let headroom = [
            (self.limits.hard_max_dti - derived.dti) / self.limits.hard_max_dti,
            (self.limits.hard_max_ltv - derived.ltv) / self.limits.hard_max_ltv,
            (score.score - self.limits.score_floor) / (850.0 - self.limits.score_floor),
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min)
        .clamp(0.0, 1.0);

        Vote::approve(
            0.5 + 0.45 * headroom,
            vec!["all hard limits cleared".to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::Decision;
    use crate::scoring::ScoringEngine;

    fn evaluator() -> GateEvaluator {
        GateEvaluator::new(PolicyLimits::default())
    }

    fn score_of(score: f64) -> CreditScore {
        let mut s = ScoringEngine::new().compute(&CreditProfile::default());
        s.score = score;
        s
    }

    fn loan(dti: f64, ltv: f64) -> LoanApplication {
        LoanApplication {
            property_value: 1_000_000.0,
            loan_amount: ltv * 1_000_000.0,
            monthly_installment: dti * 10_000.0,
            monthly_income: 10_000.0,
            ltv_ratio: None,
        }
    }

    #[test]
    fn clean_application_passes() {
        let vote = evaluator().evaluate(&score_of(805.0), &loan(1.65, 0.85), None);
        assert_eq!(vote.decision, Decision::Approve);
        assert!(!vote.veto);
        assert!((0.5..=0.95).contains(&vote.confidence));
    }

    #[test]
    fn ltv_breach_vetoes() {
        let vote = evaluator().evaluate(&score_of(805.0), &loan(0.30, 0.95), None);
        assert_eq!(vote.decision, Decision::Reject);
        assert!(vote.veto);
        assert_eq!(vote.confidence, 1.0);
        assert!(vote.reasons[0].contains("loan-to-value"));
    }

    #[test]
    fn score_floor_breach_vetoes() {
        let vote = evaluator().evaluate(&score_of(600.0), &loan(0.30, 0.80), None);
        assert!(vote.veto);
        assert!(vote.reasons[0].contains("floor"));
    }

    #[test]
    fn bankruptcy_on_profile_vetoes() {
        let profile = CreditProfile {
            has_bankruptcy: true,
            ..CreditProfile::default()
        };
        let vote = evaluator().evaluate(&score_of(805.0), &loan(0.30, 0.80), Some(&profile));
        assert!(vote.veto);
        assert!(vote.reasons.iter().any(|r| r.contains("bankruptcy")));
    }

    #[test]
    fn all_breaches_are_reported() {
        let profile = CreditProfile {
            has_bankruptcy: true,
            ..CreditProfile::default()
        };
        let vote = evaluator().evaluate(&score_of(400.0), &loan(2.5, 1.2), Some(&profile));
        assert!(vote.veto);
        assert_eq!(vote.reasons.len(), 4);
    }

    #[test]
    fn tighter_headroom_lowers_confidence() {
        let roomy = evaluator().evaluate(&score_of(850.0), &loan(0.10, 0.20), None);
        let tight = evaluator().evaluate(&score_of(655.0), &loan(1.9, 0.89), None);
        assert!(roomy.confidence > tight.confidence);
        assert!(tight.confidence >= 0.5);
    }
}
