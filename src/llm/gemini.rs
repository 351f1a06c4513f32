//! Google Gemini `generateContent` backend

use crate::llm::backend::{BackendError, GenerationBackend, GenerationConfig, ModelCandidate};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Connection settings for [`GeminiBackend`].
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Applied to every candidate call separately.
    pub timeout: Duration,
}

pub struct GeminiBackend {
    settings: GeminiSettings,
    http: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl From<&GenerationConfig> for WireGenerationConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiBackend {
    /// The API key is read from `settings.api_key_env` on every call.
    pub fn new(settings: GeminiSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
            api_key: None,
        }
    }

    pub fn with_api_key(settings: GeminiSettings, api_key: String) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
            api_key: Some(api_key),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        let base = self.settings.base_url.trim_end_matches('/');
        format!("{}/models/{}:generateContent", base, model)
    }

    fn resolve_api_key(&self) -> Result<String, BackendError> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        std::env::var(&self.settings.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                BackendError::NotConfigured(format!("set the {} env var", self.settings.api_key_env))
            })
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, candidate: &ModelCandidate, prompt: &str) -> Result<String, BackendError> {
        let api_key = self.resolve_api_key()?;
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: (&candidate.generation).into(),
        };

        debug!(
            "POST {} (prompt {} chars)",
            self.endpoint(&candidate.model),
            prompt.chars().count()
        );

        let response = self
            .http
            .post(self.endpoint(&candidate.model))
            .header("x-goog-api-key", api_key)
            .timeout(self.settings.timeout)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &candidate.model, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("failed to parse response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(text)
    }
}

fn map_transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::RequestFailed(err.to_string())
    }
}

/// Map a non-success HTTP status (and its body) to a backend failure.
fn classify_status(status: u16, model: &str, body: &str) -> BackendError {
    if status == 429 || is_quota_exhausted(body) {
        warn!("Gemini quota exhausted for model {}", model);
        return BackendError::QuotaExceeded(
            extract_error_message(body).unwrap_or_else(|| format!("HTTP {}", status)),
        );
    }

    match status {
        403 | 404 => BackendError::ModelNotFound(format!(
            "model '{}': {}",
            model,
            extract_error_message(body).unwrap_or_else(|| format!("HTTP {}", status))
        )),
        _ => BackendError::RequestFailed(format!(
            "HTTP {}: {}",
            status,
            extract_error_message(body).unwrap_or_else(|| body.to_string())
        )),
    }
}

fn is_quota_exhausted(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("resource_exhausted") || lower.contains("quota exceeded")
}

/// `{"error": {"message": "..."}}`
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(String::from)
}
