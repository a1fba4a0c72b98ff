//! Prompt construction for the AI judgment evaluator.
//!
//! The prompt is built in three layers:
//! 1. Role framing (shared, stable) - the model is an underwriter
//!    casting one ballot, not the final decision maker
//! 2. Output contract - the exact JSON shape the evaluator will parse
//! 3. Dynamic content - derived ratios, the score breakdown, and the
//!    borrower profile

use kredo_core::{CreditProfile, CreditScore, DerivedMetrics};

/// Role framing for the judgment ballot.
///
/// The framing matters: the model is one voter of three, its verdict can
/// be outvoted, and it must not invent figures beyond what it is given.
pub const JUDGE_ROLE_PROMPT: &str = r#"
You are a senior mortgage underwriter casting one ballot in a three-voter
underwriting ensemble. Two deterministic voters evaluate the same case;
your ballot covers holistic judgment the fixed rules cannot.

Your verdict is only "APPROVE" or "REJECT". You do not set conditions,
request documents, or defer. Use only the figures provided below; do not
invent or assume numbers that are not present.

Respond with ONLY a JSON object, no other text, matching exactly:
{
  "recommendation": "APPROVE" or "REJECT",
  "confidence": number between 0 and 1,
  "reasons": ["short plain-language justification", "..."]
}

When you cite a number (DTI, LTV, score), briefly say what it means for
the borrower's ability to service the loan.
"#;

/// Assemble the full judgment prompt for one application.
pub fn build_judgment_prompt(
    score: &CreditScore,
    metrics: DerivedMetrics,
    profile: Option<&CreditProfile>,
) -> String {
    let mut prompt = String::from(JUDGE_ROLE_PROMPT.trim_start());

    prompt.push_str("\n\nDerived figures:\n");
    prompt.push_str(&format!("- dti = {:.4}\n", metrics.dti));
    prompt.push_str(&format!("- ltv = {:.4}\n", metrics.ltv));
    prompt.push_str(&format!("- credit_score = {:.0}\n", score.score));

    prompt.push_str("\n[SCORE_JSON]\n");
    prompt.push_str(&serde_json::to_string(score).unwrap_or_default());

    if let Some(profile) = profile {
        prompt.push_str("\n\n[PROFILE_JSON]\n");
        prompt.push_str(&serde_json::to_string(profile).unwrap_or_default());
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use kredo_core::ScoringEngine;

    fn sample() -> (CreditScore, DerivedMetrics) {
        let score = ScoringEngine::new().compute(&CreditProfile::default());
        let metrics = DerivedMetrics {
            dti: 1.65,
            ltv: 0.85,
        };
        (score, metrics)
    }

    #[test]
    fn role_prompt_pins_the_output_contract() {
        assert!(JUDGE_ROLE_PROMPT.contains("\"recommendation\""));
        assert!(JUDGE_ROLE_PROMPT.contains("\"confidence\""));
        assert!(JUDGE_ROLE_PROMPT.contains("\"reasons\""));
        assert!(JUDGE_ROLE_PROMPT.contains("ONLY a JSON object"));
    }

    #[test]
    fn prompt_carries_derived_figures() {
        let (score, metrics) = sample();
        let prompt = build_judgment_prompt(&score, metrics, None);
        assert!(prompt.contains("dti = 1.6500"));
        assert!(prompt.contains("ltv = 0.8500"));
        assert!(prompt.contains("[SCORE_JSON]"));
        assert!(!prompt.contains("[PROFILE_JSON]"));
    }

    #[test]
    fn prompt_includes_profile_when_given() {
        let (score, metrics) = sample();
        let profile = CreditProfile::default();
        let prompt = build_judgment_prompt(&score, metrics, Some(&profile));
        assert!(prompt.contains("[PROFILE_JSON]"));
        assert!(prompt.contains("revolving_utilization"));
    }

    #[test]
    fn identical_inputs_build_identical_prompts() {
        let (score, metrics) = sample();
        assert_eq!(
            build_judgment_prompt(&score, metrics, None),
            build_judgment_prompt(&score, metrics, None)
        );
    }
}
