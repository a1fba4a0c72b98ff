//! # kredo-runtime
//!
//! AI-assisted judgment and the ensemble decider for Kredo.
//!
//! `kredo-core` is fully deterministic and never touches the network.
//! This crate adds the third voter, a model-backed judgment evaluator,
//! and the [`EnsembleDecider`] that runs the whole recommendation flow.
//!
//! ## Resilience
//!
//! The judgment voter degrades instead of failing: provider errors,
//! timeouts, and unparseable output all fall back to a neutral ballot
//! that mirrors the deterministic rules vote. A recommendation is always
//! produced.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kredo_core::{MemoryProfileStore, PolicyLimits};
//! use kredo_runtime::{EnsembleDecider, GeminiJudge, JudgeConfig};
//!
//! let provider = Arc::new(GeminiJudge::from_env()?);
//! let decider = EnsembleDecider::new(
//!     provider,
//!     JudgeConfig::default().with_env_overrides(),
//!     PolicyLimits::default().with_env_overrides(),
//!     Arc::new(MemoryProfileStore::new()),
//! );
//!
//! let outcome = decider.decide(&request).await?;
//! println!("{}", outcome.recommendation.summary);
//! ```

pub mod ensemble;
pub mod judgment;
pub mod prompts;
pub mod providers;

pub use ensemble::{EnsembleDecider, EnsembleError, RecommendationOutcome};
pub use judgment::{extract_json, JudgmentEvaluator, JudgmentOutcome};
pub use providers::{
    ApiCredential, CredentialSource, GeminiJudge, JudgeConfig, JudgeProvider, JudgeResponse,
    ProviderError, StaticJudge, GEMINI_API_KEY_ENV,
};
