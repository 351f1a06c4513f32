//! Remote generation backend contract and failure classification

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling parameters sent with every generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    /// Nucleus-sampling cutoff.
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

/// One entry of the ordered failover list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCandidate {
    /// Display name; also used in logs and attempt summaries.
    pub name: String,
    /// Backend model identifier.
    pub model: String,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl ModelCandidate {
    pub fn new(model: &str) -> Self {
        Self {
            name: model.to_string(),
            model: model.to_string(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Why a single generation call failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Account-wide quota or rate limit spent.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The model does not exist or the caller may not use it.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// No credentials available for the backend.
    #[error("backend not configured: {0}")]
    NotConfigured(String),

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("empty response")]
    EmptyResponse,
}

/// What the failover loop does after a failed candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailoverAction {
    /// Stop the whole loop; no other candidate is tried.
    Abort,
    /// Move on to the next candidate.
    Skip,
}

/// Total mapping from a backend failure to the failover decision.
pub fn classify(err: &BackendError) -> FailoverAction {
    match err {
        BackendError::QuotaExceeded(_) => FailoverAction::Abort,
        BackendError::ModelNotFound(_)
        | BackendError::NotConfigured(_)
        | BackendError::Timeout
        | BackendError::RequestFailed(_)
        | BackendError::InvalidResponse(_)
        | BackendError::EmptyResponse => FailoverAction::Skip,
    }
}

/// A remote text-generation service.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Generate text for `prompt` with the candidate's model and parameters.
    async fn generate(
        &self,
        candidate: &ModelCandidate,
        prompt: &str,
    ) -> std::result::Result<String, BackendError>;
}
