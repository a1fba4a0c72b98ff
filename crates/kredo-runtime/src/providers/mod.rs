//! AI judge provider abstractions.
//!
//! This module defines the trait for the model backing the judgment
//! evaluator and ships the Gemini implementation plus a static test
//! double.
//!
//! ## Security
//!
//! All providers use the [`secrets`] module for credential handling. See
//! [`ApiCredential`] for the patterns.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

mod gemini;
pub mod secrets;

pub use gemini::{GeminiJudge, GEMINI_API_KEY_ENV};
pub use secrets::{ApiCredential, CredentialSource};

/// Errors from judge providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Model returned no usable text")]
    EmptyResponse,
}

/// Configuration for a judgment request.
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Primary model to ask.
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature; kept low so verdicts stay stable
    pub temperature: f32,

    /// End-to-end deadline for one judgment
    pub timeout: Duration,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            model: "models/gemini-2.5-flash-lite".to_string(),
            max_tokens: 512,
            temperature: 0.3,
            timeout: Duration::from_secs(15),
        }
    }
}

impl JudgeConfig {
    /// Apply `GEMINI_MODEL`, `TEMPERATURE`, `MAX_OUTPUT_TOKENS`, and
    /// `JUDGE_TIMEOUT` environment overrides.
    ///
    /// `JUDGE_TIMEOUT` accepts humantime strings such as `10s` or `1m`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                self.model = model.trim().to_string();
            }
        }
        if let Some(temperature) = env_parse::<f32>("TEMPERATURE") {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = env_parse::<u32>("MAX_OUTPUT_TOKENS") {
            self.max_tokens = max_tokens;
        }
        if let Some(timeout) = std::env::var("JUDGE_TIMEOUT")
            .ok()
            .and_then(|v| humantime::parse_duration(v.trim()).ok())
        {
            self.timeout = timeout;
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Raw response from a judge provider.
#[derive(Debug, Clone)]
pub struct JudgeResponse {
    /// Generated text, expected to contain a JSON verdict
    pub content: String,

    /// Model that actually answered (fallback chains may differ from the
    /// one requested)
    pub model: String,
}

/// Provider abstraction allows swapping judge backends.
///
/// This is the ONLY place where model calls are made. The deterministic
/// evaluators and the synthesizer never touch it.
#[async_trait]
pub trait JudgeProvider: Send + Sync {
    /// Ask the model for an underwriting verdict on the given prompt.
    async fn judge(&self, prompt: &str, config: &JudgeConfig)
        -> Result<JudgeResponse, ProviderError>;

    /// Check if the provider is usable.
    async fn health_check(&self) -> bool;

    /// Provider name for logs and metrics.
    fn name(&self) -> &str;
}

/// A canned provider for tests and offline runs.
///
/// Returns a fixed response or a fixed error, never touching the network.
pub struct StaticJudge {
    response: Result<String, &'static str>,
    model: String,
}

impl StaticJudge {
    /// A provider that always answers with `content`.
    pub fn canned(content: impl Into<String>) -> Self {
        Self {
            response: Ok(content.into()),
            model: "static".to_string(),
        }
    }

    /// A provider that always fails.
    pub fn failing(message: &'static str) -> Self {
        Self {
            response: Err(message),
            model: "static".to_string(),
        }
    }
}

#[async_trait]
impl JudgeProvider for StaticJudge {
    async fn judge(
        &self,
        _prompt: &str,
        _config: &JudgeConfig,
    ) -> Result<JudgeResponse, ProviderError> {
        match &self.response {
            Ok(content) => Ok(JudgeResponse {
                content: content.clone(),
                model: self.model.clone(),
            }),
            Err(message) => Err(ProviderError::HttpError((*message).to_string())),
        }
    }

    async fn health_check(&self) -> bool {
        self.response.is_ok()
    }

    fn name(&self) -> &str {
        "static"
    }
}
