//! Error handling for the ATS analyzer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing upload or a job description that is too short.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The document could not be turned into usable text.
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    /// The backend account quota is spent. Ends the failover pass.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("All model candidates failed: {}", attempts.join("; "))]
    AllCandidatesExhausted { attempts: Vec<String> },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),
}

pub type Result<T> = std::result::Result<T, AtsError>;

impl AtsError {
    /// Short cause shown to the user when the workflow returns to upload.
    pub fn user_message(&self) -> String {
        match self {
            AtsError::Validation(msg) | AtsError::Extraction(msg) => msg.clone(),
            AtsError::QuotaExceeded(_) => {
                "The model quota is exhausted. Try again later or use offline mode.".to_string()
            }
            AtsError::AllCandidatesExhausted { .. } => {
                "No model candidate produced an analysis.".to_string()
            }
            other => other.to_string(),
        }
    }
}
