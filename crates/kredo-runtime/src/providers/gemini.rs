//! Gemini judge provider.
//!
//! Calls the `generateContent` REST endpoint, walking a fallback model
//! chain when the primary model errors or is rate limited.
//!
//! ## Security
//!
//! The API key is held in an [`ApiCredential`]: it cannot leak through
//! `Debug` output and is only exposed when the request header is set.

use super::{
    secrets::{ApiCredential, CredentialSource},
    JudgeConfig, JudgeProvider, JudgeResponse, ProviderError,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Primary environment variable for the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Accepted as a fallback for the key, matching Google's own tooling.
const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// CSV of models to try after the configured one fails.
const FALLBACK_MODELS_ENV: &str = "FALLBACK_MODELS";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini-backed judge.
pub struct GeminiJudge {
    credential: ApiCredential,
    base_url: String,
    fallback_models: Vec<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiJudge")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("fallback_models", &self.fallback_models)
            .finish()
    }
}

impl GeminiJudge {
    /// Create a provider with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(ApiCredential::new(
            api_key,
            CredentialSource::Programmatic,
            "Gemini API key",
        ))
    }

    /// Create a provider from `GEMINI_API_KEY` (or `GOOGLE_API_KEY`),
    /// reading the fallback model chain from `FALLBACK_MODELS`.
    pub fn from_env() -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_env(GEMINI_API_KEY_ENV, "Gemini API key")
            .or_else(|_| ApiCredential::from_env(GOOGLE_API_KEY_ENV, "Gemini API key"))
            .map_err(|_| {
                ProviderError::NotConfigured(format!(
                    "Gemini API key required: set {} or {}",
                    GEMINI_API_KEY_ENV, GOOGLE_API_KEY_ENV
                ))
            })?;

        let mut judge = Self::with_credential(credential);
        if let Ok(csv) = std::env::var(FALLBACK_MODELS_ENV) {
            judge.fallback_models = parse_model_csv(&csv);
        }
        Ok(judge)
    }

    fn with_credential(credential: ApiCredential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            fallback_models: Vec::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Set a custom API endpoint, mainly for tests.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the models to try after the configured one fails.
    pub fn with_fallback_models(mut self, models: Vec<String>) -> Self {
        self.fallback_models = models;
        self
    }

    async fn call_model(
        &self,
        model: &str,
        prompt: &str,
        config: &JudgeConfig,
    ) -> Result<JudgeResponse, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_tokens,
            },
        };

        // Credential exposed only here, at the point of use.
        let response = self
            .client
            .post(format!("{}/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", self.credential.expose())
            .header("content-type", "application/json")
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let message = response
                .json::<GeminiError>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let content = body.text();
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(JudgeResponse {
            content,
            model: model.to_string(),
        })
    }
}

fn parse_model_csv(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl JudgeProvider for GeminiJudge {
    async fn judge(
        &self,
        prompt: &str,
        config: &JudgeConfig,
    ) -> Result<JudgeResponse, ProviderError> {
        let mut last_error = None;

        for model in std::iter::once(config.model.as_str())
            .chain(self.fallback_models.iter().map(String::as_str))
        {
            match self.call_model(model, prompt, config).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(model, error = %e, "judge model failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ProviderError::EmptyResponse))
    }

    async fn health_check(&self) -> bool {
        !self.credential.is_empty()
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Gemini API request format.
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GenerateContentResponse {
    /// Concatenate text across every candidate and part; some responses
    /// split the answer over multiple parts.
    fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}
