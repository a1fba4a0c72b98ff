//! The AI judgment evaluator.
//!
//! Third voter of the ensemble. Asks a judge provider for a verdict,
//! parses JSON out of whatever text comes back, validates it against a
//! schema, and turns it into the same [`Vote`] shape the deterministic
//! evaluators produce.
//!
//! The evaluator never fails: on provider errors, timeouts, or
//! unparseable output it degrades to a neutral ballot that mirrors the
//! rules evaluator's lean, so the ensemble always has three votes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use jsonschema::Validator;
use lazy_static::lazy_static;
use moka::future::Cache;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use kredo_core::{CreditProfile, CreditScore, Decision, DerivedMetrics, Vote};

use crate::prompts::build_judgment_prompt;
use crate::providers::{JudgeConfig, JudgeProvider};

lazy_static! {
    static ref FENCED_JSON: Regex =
        Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("valid regex");
    static ref FENCED_PLAIN: Regex = Regex::new(r"(?s)```\s*(\{.*?\})\s*```").expect("valid regex");
}

/// Pull a JSON object out of free-form model output.
///
/// Tries fenced ```json blocks first, then bare fenced blocks, then the
/// outermost brace span. Returns the first fragment that parses.
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    for pattern in [&*FENCED_JSON, &*FENCED_PLAIN] {
        for capture in pattern.captures_iter(text) {
            if let Ok(value) = serde_json::from_str(&capture[1]) {
                return Some(value);
            }
        }
    }

    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if last > first {
        serde_json::from_str(&text[first..=last]).ok()
    } else {
        None
    }
}

/// Shape of a well-formed verdict.
fn verdict_schema() -> &'static Validator {
    static SCHEMA: OnceLock<Validator> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "recommendation": { "type": "string" },
                "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
                "reasons": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["recommendation"]
        });
        jsonschema::validator_for(&schema).expect("verdict schema is valid")
    })
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    recommendation: String,
    confidence: Option<f64>,
    #[serde(default)]
    reasons: Vec<String>,
}

/// One judgment ballot plus provenance.
#[derive(Debug, Clone)]
pub struct JudgmentOutcome {
    pub vote: Vote,
    /// Model that produced the verdict; `None` when degraded.
    pub model: Option<String>,
    /// True when the ballot is a fallback rather than a model verdict.
    pub degraded: bool,
}

/// Asks the judge provider for the third ballot.
pub struct JudgmentEvaluator {
    provider: Arc<dyn JudgeProvider>,
    config: JudgeConfig,
    cache: Cache<u64, (Vote, String)>,
}

impl JudgmentEvaluator {
    pub fn new(provider: Arc<dyn JudgeProvider>, config: JudgeConfig) -> Self {
        Self {
            provider,
            config,
            cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(std::time::Duration::from_secs(3600))
                .build(),
        }
    }

    /// Obtain the judgment ballot for one application.
    ///
    /// `rules_hint` is the deterministic rules evaluator's decision; the
    /// degraded fallback mirrors it so an outage never flips an otherwise
    /// clear case.
    pub async fn evaluate(
        &self,
        score: &CreditScore,
        metrics: DerivedMetrics,
        profile: Option<&CreditProfile>,
        rules_hint: Option<Decision>,
    ) -> JudgmentOutcome {
        let prompt = build_judgment_prompt(score, metrics, profile);
        let key = prompt_key(&prompt);

        if let Some((vote, model)) = self.cache.get(&key).await {
            debug!(model, "judgment served from cache");
            return JudgmentOutcome {
                vote,
                model: Some(model),
                degraded: false,
            };
        }

        let response =
            match tokio::time::timeout(self.config.timeout, self.provider.judge(&prompt, &self.config))
                .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!(provider = self.provider.name(), error = %e, "judge call failed");
                    return self.degraded(rules_hint);
                }
                Err(_) => {
                    warn!(
                        provider = self.provider.name(),
                        timeout = ?self.config.timeout,
                        "judge call timed out"
                    );
                    return self.degraded(rules_hint);
                }
            };

        match parse_verdict(&response.content) {
            Some(vote) => {
                self.cache.insert(key, (vote.clone(), response.model.clone())).await;
                JudgmentOutcome {
                    vote,
                    model: Some(response.model),
                    degraded: false,
                }
            }
            None => {
                warn!(
                    provider = self.provider.name(),
                    "judge returned no parseable verdict"
                );
                self.degraded(rules_hint)
            }
        }
    }

    fn degraded(&self, rules_hint: Option<Decision>) -> JudgmentOutcome {
        let reasons = vec![
            "automated judgment unavailable; deferring to the deterministic checks".to_string(),
        ];
        let vote = match rules_hint {
            Some(Decision::Reject) => Vote::reject(0.5, reasons),
            _ => Vote::approve(0.5, reasons),
        };
        JudgmentOutcome {
            vote,
            model: None,
            degraded: true,
        }
    }
}

/// Parse and validate a verdict out of raw model text.
fn parse_verdict(content: &str) -> Option<Vote> {
    let value = extract_json(content)?;
    if !verdict_schema().is_valid(&value) {
        return None;
    }
    let raw: RawVerdict = serde_json::from_value(value).ok()?;

    // Anything that is not an explicit APPROVE is a REJECT.
    let decision = if raw.recommendation.trim().eq_ignore_ascii_case("APPROVE") {
        Decision::Approve
    } else {
        Decision::Reject
    };
    let confidence = raw.confidence.unwrap_or(0.7);

    Some(match decision {
        Decision::Approve => Vote::approve(confidence, raw.reasons),
        Decision::Reject => Vote::reject(confidence, raw.reasons),
    })
}

fn prompt_key(prompt: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    prompt.hash(&mut hasher);
    hasher.finish()
}
