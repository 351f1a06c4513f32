//! Ordered failover across model candidates
//!
//! A single linear pass: the first candidate that returns non-empty text wins,
//! a quota failure aborts the whole pass, anything else moves on.

use crate::error::{AtsError, Result};
use crate::llm::backend::{classify, BackendError, FailoverAction, GenerationBackend, ModelCandidate};
use log::{debug, info, warn};
use std::sync::Arc;

/// Text produced by the candidate that answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub candidate: String,
}

pub struct FailoverClient {
    backend: Arc<dyn GenerationBackend>,
    candidates: Vec<ModelCandidate>,
}

impl FailoverClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, candidates: Vec<ModelCandidate>) -> Self {
        Self {
            backend,
            candidates,
        }
    }

    /// Try each candidate in order until one produces text.
    pub async fn call_online(&self, prompt: &str) -> Result<Generation> {
        if self.candidates.is_empty() {
            warn!("No model candidates configured, nothing to try");
            return Err(AtsError::AllCandidatesExhausted { attempts: Vec::new() });
        }

        let total = self.candidates.len();
        let mut attempts = Vec::new();

        for (idx, candidate) in self.candidates.iter().enumerate() {
            debug!(
                "Calling {} candidate {} ({}/{})",
                self.backend.name(),
                candidate.name,
                idx + 1,
                total
            );

            let err = match self.backend.generate(candidate, prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!("Model candidate {} produced a response", candidate.name);
                    return Ok(Generation {
                        text,
                        candidate: candidate.name.clone(),
                    });
                }
                Ok(_) => BackendError::EmptyResponse,
                Err(err) => err,
            };

            match classify(&err) {
                FailoverAction::Abort => {
                    warn!(
                        "Model candidate {} hit the quota limit, aborting failover: {}",
                        candidate.name, err
                    );
                    return Err(AtsError::QuotaExceeded(format!("{}: {}", candidate.name, err)));
                }
                FailoverAction::Skip => {
                    warn!(
                        "Model candidate {} failed ({}/{}), trying next: {}",
                        candidate.name,
                        idx + 1,
                        total,
                        err
                    );
                    attempts.push(format!("{}: {}", candidate.name, err));
                }
            }
        }

        Err(AtsError::AllCandidatesExhausted { attempts })
    }
}

impl std::fmt::Debug for FailoverClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.candidates.iter().map(|c| c.name.as_str()).collect();
        f.debug_struct("FailoverClient")
            .field("backend", &self.backend.name())
            .field("candidates", &names)
            .finish()
    }
}
