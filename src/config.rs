//! Configuration management for the ATS analyzer

use crate::error::{AtsError, Result};
use crate::llm::backend::ModelCandidate;
use crate::llm::gemini::{GeminiSettings, DEFAULT_BASE_URL};
use crate::llm::prompts::PromptTemplates;
use crate::processing::types::{ModePolicy, MIN_JOB_DESCRIPTION_CHARS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Model candidates tried in order when no config file overrides them.
pub const DEFAULT_CANDIDATES: [&str; 4] = [
    "gemini-2.5-pro",
    "gemini-2.5-pro-latest",
    "gemini-2.5-flash",
    "gemini-2.5-flash-latest",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key. The key itself
    /// is never stored in the config file.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub candidates: Vec<ModelCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub default_mode: ModePolicy,
    pub min_job_chars: usize,
    pub resume_prompt_chars: usize,
    pub job_prompt_chars: usize,
    pub progress: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
    /// Flat plain-text export.
    Text,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                api_key_env: "GEMINI_API_KEY".to_string(),
                timeout_secs: 60,
                candidates: DEFAULT_CANDIDATES
                    .iter()
                    .map(|model| ModelCandidate::new(model))
                    .collect(),
            },
            analysis: AnalysisConfig {
                default_mode: ModePolicy::Auto,
                min_job_chars: MIN_JOB_DESCRIPTION_CHARS,
                resume_prompt_chars: 4000,
                job_prompt_chars: 2500,
                progress: true,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            AtsError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AtsError::Configuration(format!("Failed to serialize config: {}", e)))
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("ats-analyzer")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.backend.timeout_secs == 0 {
            return Err(AtsError::Configuration(
                "backend.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.backend.api_key_env.trim().is_empty() {
            return Err(AtsError::Configuration(
                "backend.api_key_env must name an environment variable".to_string(),
            ));
        }
        Ok(())
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            base_url: self.backend.base_url.clone(),
            api_key_env: self.backend.api_key_env.clone(),
            timeout: Duration::from_secs(self.backend.timeout_secs),
        }
    }

    pub fn prompt_templates(&self) -> PromptTemplates {
        PromptTemplates::with_limits(
            self.analysis.resume_prompt_chars,
            self.analysis.job_prompt_chars,
        )
    }
}
