//! The ensemble decider.
//!
//! Wires the full recommendation flow together:
//! 1. Validate the application's figures
//! 2. Resolve the borrower profile and score it (unless a precomputed
//!    score came with the request)
//! 3. Fan out to the three voters: gate, rules, and AI judgment
//! 4. Synthesize the ballots into one recommendation

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use kredo_core::{
    CreditProfile, CreditScore, GateEvaluator, InputError, PolicyLimits, ProfileStore,
    Recommendation, RecommendationRequest, RulesEvaluator, ScoringEngine, Synthesizer, VoteSet,
};

use crate::judgment::JudgmentEvaluator;
use crate::providers::{JudgeConfig, JudgeProvider};

#[derive(Error, Debug)]
pub enum EnsembleError {
    #[error("invalid application: {0}")]
    Input(#[from] InputError),
}

/// A recommendation plus provenance about how it was produced.
#[derive(Debug, Clone)]
pub struct RecommendationOutcome {
    pub recommendation: Recommendation,
    /// The score the voters saw, precomputed or derived here.
    pub credit_score: CreditScore,
    /// Judge model that answered, when one did.
    pub model: Option<String>,
    /// True when the judgment ballot was a fallback.
    pub judgment_degraded: bool,
}

/// Runs the three-voter underwriting ensemble.
pub struct EnsembleDecider {
    scoring: ScoringEngine,
    gate: GateEvaluator,
    rules: RulesEvaluator,
    judgment: JudgmentEvaluator,
    synthesizer: Synthesizer,
    store: Arc<dyn ProfileStore>,
}

impl EnsembleDecider {
    pub fn new(
        provider: Arc<dyn JudgeProvider>,
        judge_config: JudgeConfig,
        limits: PolicyLimits,
        store: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            scoring: ScoringEngine::new(),
            gate: GateEvaluator::new(limits.clone()),
            rules: RulesEvaluator::new(limits),
            judgment: JudgmentEvaluator::new(provider, judge_config),
            synthesizer: Synthesizer::default(),
            store,
        }
    }

    /// Produce a recommendation for one application.
    pub async fn decide(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationOutcome, EnsembleError> {
        let loan = request.loan();
        loan.validate()?;
        let metrics = loan.derived();

        // A known user gets their stored (or seeded) profile; anonymous
        // requests with a precomputed score skip the profile entirely.
        let profile: Option<CreditProfile> = request
            .kpr_application
            .data
            .user_info
            .user_id
            .as_deref()
            .map(|uid| self.store.resolve(uid));

        let credit_score = match &request.credit_score {
            Some(score) => score.clone(),
            None => {
                let scored = profile.clone().unwrap_or_default();
                self.scoring.compute(&scored)
            }
        };

        let gate = self.gate.evaluate(&credit_score, &loan, profile.as_ref());
        let rules = self.rules.evaluate(&credit_score, &loan);
        let judgment = self
            .judgment
            .evaluate(
                &credit_score,
                metrics,
                profile.as_ref(),
                Some(rules.decision),
            )
            .await;

        let recommendation = self.synthesizer.synthesize(
            &VoteSet {
                gate,
                rules,
                judgment: judgment.vote,
            },
            metrics,
            credit_score.score,
        );

        info!(
            decision = %recommendation.decision,
            confidence = recommendation.confidence,
            degraded = judgment.degraded,
            model = judgment.model.as_deref().unwrap_or("none"),
            "ensemble decision"
        );

        Ok(RecommendationOutcome {
            recommendation,
            credit_score,
            model: judgment.model,
            judgment_degraded: judgment.degraded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::StaticJudge;
    use kredo_core::{
        ApplicationData, Decision, KprApplication, MemoryProfileStore, ProfileUpdate, UserInfo,
    };

    const APPROVING_VERDICT: &str =
        "{\"recommendation\": \"APPROVE\", \"confidence\": 0.8, \
         \"reasons\": [\"income supports the installment\"]}";

    fn decider(provider: impl JudgeProvider + 'static) -> EnsembleDecider {
        EnsembleDecider::new(
            Arc::new(provider),
            JudgeConfig::default(),
            PolicyLimits::default(),
            Arc::new(MemoryProfileStore::new()),
        )
    }

    fn request(user_id: Option<&str>) -> RecommendationRequest {
        RecommendationRequest {
            kpr_application: KprApplication {
                data: ApplicationData {
                    property_value: 2_100_000_000.0,
                    loan_amount: 1_785_000_000.0,
                    monthly_installment: 16_500_000.0,
                    user_info: UserInfo {
                        monthly_income: 10_000_000.0,
                        user_id: user_id.map(str::to_string),
                    },
                    ltv_ratio: None,
                },
            },
            credit_score: None,
        }
    }

    fn strong_profile_update() -> ProfileUpdate {
        ProfileUpdate {
            late_30: Some(1),
            late_60: Some(0),
            late_90p: Some(0),
            has_collection: Some(false),
            has_bankruptcy: Some(false),
            months_since_last_delinquency: Some(30.0),
            revolving_utilization: Some(0.08),
            installment_balance_ratio: Some(0.45),
            total_accounts: Some(9),
            age_oldest_acct_years: Some(12.0),
            avg_age_years: Some(6.0),
            hard_inquiries_12m: Some(0),
            new_accounts_12m: Some(0),
            has_mortgage: Some(true),
            has_installment: Some(true),
            has_revolving: Some(true),
            has_student_or_auto: Some(false),
        }
    }

    #[tokio::test]
    async fn reference_case_approves_end_to_end() {
        let decider = decider(StaticJudge::canned(APPROVING_VERDICT));
        decider
            .store
            .upsert("U1", &strong_profile_update())
            .unwrap();

        let outcome = decider.decide(&request(Some("U1"))).await.unwrap();
        assert_eq!(outcome.credit_score.score, 805.0);
        assert_eq!(outcome.recommendation.decision, Decision::Approve);
        assert_eq!(outcome.model.as_deref(), Some("static"));
        assert!(!outcome.judgment_degraded);
        assert_eq!(outcome.recommendation.key_factors.derived.fico_score, 805.0);
        assert!((outcome.recommendation.key_factors.derived.dti - 1.65).abs() < 1e-9);
    }

    #[tokio::test]
    async fn judge_outage_does_not_flip_a_clear_case() {
        let decider = decider(StaticJudge::failing("upstream down"));
        decider
            .store
            .upsert("U1", &strong_profile_update())
            .unwrap();

        let outcome = decider.decide(&request(Some("U1"))).await.unwrap();
        assert_eq!(outcome.recommendation.decision, Decision::Approve);
        assert!(outcome.judgment_degraded);
        assert!(outcome.model.is_none());
        assert!(outcome
            .recommendation
            .reasons
            .iter()
            .any(|r| r.contains("unavailable")));
    }

    #[tokio::test]
    async fn dissenting_judge_is_outvoted() {
        let decider = decider(StaticJudge::canned(
            "{\"recommendation\": \"REJECT\", \"confidence\": 0.9, \
             \"reasons\": [\"installment looks heavy\"]}",
        ));
        decider
            .store
            .upsert("U1", &strong_profile_update())
            .unwrap();

        let outcome = decider.decide(&request(Some("U1"))).await.unwrap();
        // Gate and rules both approve the strong case; 2-1 wins.
        assert_eq!(outcome.recommendation.decision, Decision::Approve);
    }

    #[tokio::test]
    async fn bankruptcy_vetoes_despite_agreeing_judge() {
        let decider = decider(StaticJudge::canned(APPROVING_VERDICT));
        let mut update = strong_profile_update();
        update.has_bankruptcy = Some(true);
        decider.store.upsert("U1", &update).unwrap();

        let outcome = decider.decide(&request(Some("U1"))).await.unwrap();
        assert_eq!(outcome.recommendation.decision, Decision::Reject);
        assert!(outcome
            .recommendation
            .reasons
            .iter()
            .any(|r| r.contains("bankruptcy")));
    }

    #[tokio::test]
    async fn precomputed_score_is_used_as_is() {
        let decider = decider(StaticJudge::canned(APPROVING_VERDICT));

        let mut req = request(None);
        let profile = strong_profile_update().apply(&CreditProfile::default());
        req.credit_score = Some(ScoringEngine::new().compute(&profile));

        let outcome = decider.decide(&req).await.unwrap();
        assert_eq!(outcome.credit_score.score, 805.0);
        assert_eq!(outcome.recommendation.decision, Decision::Approve);
    }

    #[tokio::test]
    async fn invalid_application_is_rejected_up_front() {
        let decider = decider(StaticJudge::canned(APPROVING_VERDICT));
        let mut req = request(Some("U1"));
        req.kpr_application.data.user_info.monthly_income = 0.0;

        assert!(matches!(
            decider.decide(&req).await,
            Err(EnsembleError::Input(_))
        ));
    }

    #[tokio::test]
    async fn anonymous_request_without_score_uses_neutral_profile() {
        let decider = decider(StaticJudge::canned(APPROVING_VERDICT));
        let outcome = decider.decide(&request(None)).await.unwrap();

        // The neutral default profile scores deterministically.
        let expected = ScoringEngine::new().compute(&CreditProfile::default());
        assert_eq!(outcome.credit_score.score, expected.score);
    }
}
