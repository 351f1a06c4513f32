//! Analysis engine: online analysis through the failover client, offline scoring locally

use crate::error::Result;
use crate::llm::failover::FailoverClient;
use crate::llm::prompts::PromptTemplates;
use crate::processing::ats_scorer::score_offline;
use crate::processing::result_parser::parse_online_result;
use crate::processing::types::{AnalysisRequest, AnalysisResult, ModeUsed};
use std::time::Instant;

/// Produces [`AnalysisResult`]s for validated requests.
pub struct AnalysisEngine {
    client: FailoverClient,
    prompts: PromptTemplates,
}

impl AnalysisEngine {
    pub fn new(client: FailoverClient, prompts: PromptTemplates) -> Self {
        Self { client, prompts }
    }

    /// Ask the remote models; structured fields are best-effort extractions.
    pub async fn analyze_online(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let start_time = Instant::now();
        let prompt = self
            .prompts
            .render_ats_analysis(request.resume_text(), request.job_text());

        let generation = self.client.call_online(&prompt).await?;
        let parsed = parse_online_result(&generation.text);

        log::info!(
            "Online analysis by {} finished in {}ms",
            generation.candidate,
            start_time.elapsed().as_millis()
        );

        Ok(AnalysisResult {
            overall_score: parsed.overall_score,
            breakdown: parsed.breakdown,
            missing_terms: parsed.missing_terms,
            recommendations: parsed.recommendations,
            narrative: parsed.narrative,
            mode_used: ModeUsed::Online,
            model: Some(generation.candidate),
        })
    }

    /// Deterministic local scoring. Never fails.
    pub fn analyze_offline(&self, request: &AnalysisRequest) -> AnalysisResult {
        let score = score_offline(request.resume_text(), request.job_text());

        AnalysisResult {
            overall_score: Some(score.overall_score),
            breakdown: score.breakdown,
            missing_terms: score.missing_terms,
            recommendations: score.recommendations,
            narrative: String::new(),
            mode_used: ModeUsed::Offline,
            model: None,
        }
    }
}
