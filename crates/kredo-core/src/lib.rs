//! # kredo-core
//!
//! Deterministic credit scoring and underwriting evaluation engine.
//!
//! This crate provides the offline half of Kredo, answering:
//! - What is this borrower's credit score, and why?
//! - Does the application clear the hard policy limits?
//! - How do the weighted policy rules lean?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same profile and application always produce the
//!    same score and votes
//! 2. **No network calls**: The AI judgment voter lives in `kredo-runtime`
//! 3. **Traceable**: Every vote carries human-readable reasons
//! 4. **Educational**: The score is FICO-like, not a real bureau score
//!
//! ## Example
//!
//! ```rust,ignore
//! use kredo_core::{CreditProfile, ScoringEngine, RulesEvaluator, PolicyLimits};
//!
//! let profile = CreditProfile::default();
//! let score = ScoringEngine::new().compute(&profile);
//!
//! let rules = RulesEvaluator::new(PolicyLimits::default());
//! let vote = rules.evaluate(&score, &loan);
//! println!("{}: {:?}", vote.decision, vote.reasons);
//! ```

pub mod application;
pub mod decision;
pub mod error;
pub mod evaluators;
pub mod policy;
pub mod profile;
pub mod scoring;
pub mod store;

// Re-export main types at crate root
pub use application::{
    ApplicationData, DerivedMetrics, KprApplication, LoanApplication, RecommendationRequest,
    UserInfo,
};
pub use decision::{
    DerivedFactors, EvaluatorWeights, KeyFactors, Recommendation, Synthesizer, VoteSet,
};
pub use error::InputError;
pub use evaluators::{Decision, GateEvaluator, RulesEvaluator, Vote};
pub use policy::{PolicyError, PolicyLimits};
pub use profile::{dummy_profile, CreditProfile, ProfileUpdate};
pub use scoring::{CreditScore, Factor, ScoringEngine};
pub use store::{MemoryProfileStore, ProfileStore};

#[cfg(test)]
mod tests {
    use super::*;

    // End-to-end over the deterministic half: score a strong profile,
    // run both evaluators, synthesize with an agreeing third ballot.
    #[test]
    fn deterministic_pipeline_approves_a_strong_case() {
        let profile = CreditProfile {
            late_30: 1,
            months_since_last_delinquency: Some(30.0),
            revolving_utilization: 0.08,
            installment_balance_ratio: 0.45,
            total_accounts: 9,
            age_oldest_acct_years: 12.0,
            avg_age_years: 6.0,
            has_mortgage: true,
            ..CreditProfile::default()
        };
        let score = ScoringEngine::new().compute(&profile);
        assert_eq!(score.score, 805.0);

        let loan = LoanApplication {
            property_value: 2_100_000_000.0,
            loan_amount: 1_785_000_000.0,
            monthly_installment: 16_500_000.0,
            monthly_income: 10_000_000.0,
            ltv_ratio: None,
        };
        loan.validate().unwrap();

        let limits = PolicyLimits::default();
        let gate = GateEvaluator::new(limits.clone()).evaluate(&score, &loan, Some(&profile));
        let rules = RulesEvaluator::new(limits).evaluate(&score, &loan);
        assert!(gate.decision.is_approve());
        assert!(rules.decision.is_approve());

        let judgment = Vote::approve(0.7, vec!["income supports the installment".into()]);
        let rec = Synthesizer::default().synthesize(
            &VoteSet {
                gate,
                rules,
                judgment,
            },
            loan.derived(),
            score.score,
        );
        assert_eq!(rec.decision, Decision::Approve);
        assert!((0.0..=1.0).contains(&rec.confidence));
        assert_eq!(rec.key_factors.derived.fico_score, 805.0);
    }
}
