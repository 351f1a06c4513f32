//! Report payload built from a completed analysis

use crate::processing::tokenizer::truncate_chars;
use crate::processing::types::{AnalysisRequest, AnalysisResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Characters of resume and job text echoed into exported reports.
pub const EXCERPT_CHARS: usize = 1000;

/// Characters of resume text shown in the detailed preview.
pub const PREVIEW_CHARS: usize = 800;

/// Everything a formatter needs to render one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub verdict: Verdict,
    pub result: AnalysisResult,
    pub metadata: ReportMetadata,
    /// First [`EXCERPT_CHARS`] characters of the resume text.
    pub resume_excerpt: String,
    /// First [`EXCERPT_CHARS`] characters of the job description.
    pub job_excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub analyzer_version: String,
    pub resume_source: String,
    pub job_source: String,
    pub processing_time_ms: u64,
}

/// Where the inputs came from, for report metadata.
#[derive(Debug, Clone, Default)]
pub struct ReportSources {
    pub resume_source: String,
    pub job_source: String,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Excellent,
    VeryGood,
    Good,
    Fair,
    BelowAverage,
    Poor,
    /// The model answered without a parseable overall score.
    Unavailable,
}

impl Verdict {
    pub fn from_score(score: Option<u8>) -> Self {
        match score {
            Some(90..=100) => Verdict::Excellent,
            Some(80..=89) => Verdict::VeryGood,
            Some(70..=79) => Verdict::Good,
            Some(60..=69) => Verdict::Fair,
            Some(50..=59) => Verdict::BelowAverage,
            Some(_) => Verdict::Poor,
            None => Verdict::Unavailable,
        }
    }

    /// Short badge text.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Excellent => "EXCELLENT",
            Verdict::VeryGood => "VERY GOOD",
            Verdict::Good => "GOOD",
            Verdict::Fair => "FAIR",
            Verdict::BelowAverage => "BELOW AVG",
            Verdict::Poor => "POOR",
            Verdict::Unavailable => "N/A",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Verdict::Excellent => "Excellent match - strong candidate for this role",
            Verdict::VeryGood => "Very good match - minor improvements could help",
            Verdict::Good => "Good match - some targeted improvements recommended",
            Verdict::Fair => "Fair match - several improvements needed",
            Verdict::BelowAverage => "Below average match - significant improvements required",
            Verdict::Poor => "Poor match - major revisions needed",
            Verdict::Unavailable => "Score unavailable - see the full analysis below",
        }
    }
}

impl AnalysisReport {
    pub fn new(request: &AnalysisRequest, result: &AnalysisResult, sources: ReportSources) -> Self {
        Self {
            verdict: Verdict::from_score(result.overall_score),
            result: result.clone(),
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                analyzer_version: env!("CARGO_PKG_VERSION").to_string(),
                resume_source: sources.resume_source,
                job_source: sources.job_source,
                processing_time_ms: sources.processing_time_ms,
            },
            resume_excerpt: truncate_chars(request.resume_text(), EXCERPT_CHARS).to_string(),
            job_excerpt: truncate_chars(request.job_text(), EXCERPT_CHARS).to_string(),
        }
    }

    pub fn generated_at_display(&self) -> String {
        self.metadata
            .generated_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
    }

    /// Name of the answering model, or the offline scorer.
    pub fn engine_label(&self) -> &str {
        self.result.model.as_deref().unwrap_or("offline lexical scorer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::types::{ModePolicy, ModeUsed, ScoreBreakdown};

    #[test]
    fn verdict_bands() {
        assert_eq!(Verdict::from_score(Some(100)), Verdict::Excellent);
        assert_eq!(Verdict::from_score(Some(90)), Verdict::Excellent);
        assert_eq!(Verdict::from_score(Some(89)), Verdict::VeryGood);
        assert_eq!(Verdict::from_score(Some(70)), Verdict::Good);
        assert_eq!(Verdict::from_score(Some(60)), Verdict::Fair);
        assert_eq!(Verdict::from_score(Some(59)), Verdict::BelowAverage);
        assert_eq!(Verdict::from_score(Some(0)), Verdict::Poor);
        assert_eq!(Verdict::from_score(None), Verdict::Unavailable);
    }

    #[test]
    fn excerpts_are_truncated() {
        let resume = "r".repeat(1500);
        let job = format!("{} job", "j".repeat(60));
        let request = AnalysisRequest::new(Some(resume), &job, ModePolicy::OfflineOnly).unwrap();
        let result = AnalysisResult {
            overall_score: Some(42),
            breakdown: ScoreBreakdown::default(),
            missing_terms: vec![],
            recommendations: vec![],
            narrative: String::new(),
            mode_used: ModeUsed::Offline,
            model: None,
        };

        let report = AnalysisReport::new(&request, &result, ReportSources::default());
        assert_eq!(report.resume_excerpt.chars().count(), EXCERPT_CHARS);
        assert_eq!(report.job_excerpt, job);
        assert_eq!(report.verdict, Verdict::Poor);
        assert_eq!(report.engine_label(), "offline lexical scorer");
    }
}
