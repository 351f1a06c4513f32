//! Core data model shared by the scorers, the parser and the workflow

use crate::error::{AtsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum job description length, counted in characters after trimming.
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;

/// Upper bound on the number of missing terms carried by a result.
pub const MAX_MISSING_TERMS: usize = 12;

/// How the analysis is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModePolicy {
    /// Online first, silent offline fallback on any online failure.
    #[default]
    Auto,
    OnlineOnly,
    OfflineOnly,
}

impl ModePolicy {
    pub fn parse(value: &str) -> std::result::Result<Self, String> {
        match value.to_lowercase().as_str() {
            "auto" => Ok(ModePolicy::Auto),
            "online" | "online-only" | "online_only" => Ok(ModePolicy::OnlineOnly),
            "offline" | "offline-only" | "offline_only" => Ok(ModePolicy::OfflineOnly),
            _ => Err(format!(
                "Invalid analysis mode: {}. Supported: auto, online, offline",
                value
            )),
        }
    }
}

impl fmt::Display for ModePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModePolicy::Auto => write!(f, "auto"),
            ModePolicy::OnlineOnly => write!(f, "online only"),
            ModePolicy::OfflineOnly => write!(f, "offline only"),
        }
    }
}

/// Which engine actually produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeUsed {
    Online,
    Offline,
}

impl fmt::Display for ModeUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeUsed::Online => write!(f, "Online"),
            ModeUsed::Offline => write!(f, "Offline"),
        }
    }
}

/// The four fixed breakdown dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreDimension {
    KeywordMatch,
    SkillsAlignment,
    ExperienceRelevance,
    FormatStructure,
}

impl ScoreDimension {
    pub const ALL: [ScoreDimension; 4] = [
        ScoreDimension::KeywordMatch,
        ScoreDimension::SkillsAlignment,
        ScoreDimension::ExperienceRelevance,
        ScoreDimension::FormatStructure,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScoreDimension::KeywordMatch => "Keyword Match",
            ScoreDimension::SkillsAlignment => "Skills Alignment",
            ScoreDimension::ExperienceRelevance => "Experience Relevance",
            ScoreDimension::FormatStructure => "Format & Structure",
        }
    }
}

impl fmt::Display for ScoreDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sub-scores as percentages; `None` means the value is unknown.
///
/// Struct fields rather than a map, so all four keys are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub keyword_match: Option<u8>,
    pub skills_alignment: Option<u8>,
    pub experience_relevance: Option<u8>,
    pub format_structure: Option<u8>,
}

impl ScoreBreakdown {
    pub fn get(&self, dimension: ScoreDimension) -> Option<u8> {
        match dimension {
            ScoreDimension::KeywordMatch => self.keyword_match,
            ScoreDimension::SkillsAlignment => self.skills_alignment,
            ScoreDimension::ExperienceRelevance => self.experience_relevance,
            ScoreDimension::FormatStructure => self.format_structure,
        }
    }

    pub fn set(&mut self, dimension: ScoreDimension, value: Option<u8>) {
        let slot = match dimension {
            ScoreDimension::KeywordMatch => &mut self.keyword_match,
            ScoreDimension::SkillsAlignment => &mut self.skills_alignment,
            ScoreDimension::ExperienceRelevance => &mut self.experience_relevance,
            ScoreDimension::FormatStructure => &mut self.format_structure,
        };
        *slot = value;
    }

    /// Dimension/value pairs in their fixed display order.
    pub fn entries(&self) -> [(ScoreDimension, Option<u8>); 4] {
        ScoreDimension::ALL.map(|d| (d, self.get(d)))
    }
}

/// Render an optional percentage the way every formatter shows it.
pub fn format_score(score: Option<u8>) -> String {
    match score {
        Some(value) => format!("{}%", value),
        None => "unknown".to_string(),
    }
}

/// A validated analysis request. Only obtainable through [`AnalysisRequest::new`]
/// or [`AnalysisRequest::with_min_job_chars`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    resume_text: String,
    job_text: String,
    mode: ModePolicy,
}

impl AnalysisRequest {
    pub fn new(resume_text: Option<String>, job_text: &str, mode: ModePolicy) -> Result<Self> {
        Self::with_min_job_chars(resume_text, job_text, mode, MIN_JOB_DESCRIPTION_CHARS)
    }

    pub fn with_min_job_chars(
        resume_text: Option<String>,
        job_text: &str,
        mode: ModePolicy,
        min_job_chars: usize,
    ) -> Result<Self> {
        let resume_text = match resume_text {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                return Err(AtsError::Validation(
                    "Please upload a resume with extractable text".to_string(),
                ))
            }
        };

        if job_text.trim().chars().count() < min_job_chars {
            return Err(AtsError::Validation(format!(
                "Please paste a valid job description (at least {} characters)",
                min_job_chars
            )));
        }

        Ok(Self {
            resume_text,
            job_text: job_text.to_string(),
            mode,
        })
    }

    pub fn resume_text(&self) -> &str {
        &self.resume_text
    }

    pub fn job_text(&self) -> &str {
        &self.job_text
    }

    pub fn mode(&self) -> ModePolicy {
        self.mode
    }
}

/// Outcome of one completed analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_score: Option<u8>,
    pub breakdown: ScoreBreakdown,
    pub missing_terms: Vec<String>,
    pub recommendations: Vec<String>,
    /// Raw model output for online results, empty for offline ones.
    pub narrative: String,
    pub mode_used: ModeUsed,
    /// Candidate that answered, for online results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}
