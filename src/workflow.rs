//! Upload → Analyzing → Result workflow
//!
//! The workflow is a value: every transition consumes it and returns the next
//! one. Calling a transition from the wrong state logs a warning and returns the
//! workflow unchanged.

use crate::error::AtsError;
use crate::output::report::{AnalysisReport, ReportSources};
use crate::processing::analyzer::AnalysisEngine;
use crate::processing::types::{
    AnalysisRequest, AnalysisResult, ModePolicy, MIN_JOB_DESCRIPTION_CHARS,
};
use log::{debug, info, warn};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Upload,
    Analyzing,
    Result,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Upload => write!(f, "upload"),
            WorkflowState::Analyzing => write!(f, "analyzing"),
            WorkflowState::Result => write!(f, "result"),
        }
    }
}

/// User input collected in the upload state.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Extracted resume text, `None` when nothing usable was uploaded.
    pub resume_text: Option<String>,
    pub job_text: String,
    pub mode: ModePolicy,
}

#[derive(Debug)]
pub enum Workflow {
    Upload { error: Option<AtsError> },
    Analyzing { request: AnalysisRequest },
    Result {
        request: AnalysisRequest,
        result: AnalysisResult,
    },
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub fn new() -> Self {
        Workflow::Upload { error: None }
    }

    pub fn state(&self) -> WorkflowState {
        match self {
            Workflow::Upload { .. } => WorkflowState::Upload,
            Workflow::Analyzing { .. } => WorkflowState::Analyzing,
            Workflow::Result { .. } => WorkflowState::Result,
        }
    }

    /// Error that sent the workflow back to upload, if any.
    pub fn error(&self) -> Option<&AtsError> {
        match self {
            Workflow::Upload { error } => error.as_ref(),
            _ => None,
        }
    }

    pub fn request(&self) -> Option<&AnalysisRequest> {
        match self {
            Workflow::Analyzing { request } | Workflow::Result { request, .. } => Some(request),
            Workflow::Upload { .. } => None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Workflow::Result { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Take the error out of a failed workflow.
    pub fn into_error(self) -> Option<AtsError> {
        match self {
            Workflow::Upload { error } => error,
            _ => None,
        }
    }

    /// Report payload for a completed analysis.
    pub fn report(&self, sources: ReportSources) -> Option<AnalysisReport> {
        match self {
            Workflow::Result { request, result } => Some(AnalysisReport::new(request, result, sources)),
            _ => None,
        }
    }

    /// Validate the submission and move to analyzing.
    pub fn submit(self, submission: Submission) -> Self {
        self.submit_with_min_job_chars(submission, MIN_JOB_DESCRIPTION_CHARS)
    }

    pub fn submit_with_min_job_chars(self, submission: Submission, min_job_chars: usize) -> Self {
        if !matches!(self, Workflow::Upload { .. }) {
            warn!("Ignoring submission in {} state", self.state());
            return self;
        }

        match AnalysisRequest::with_min_job_chars(
            submission.resume_text,
            &submission.job_text,
            submission.mode,
            min_job_chars,
        ) {
            Ok(request) => {
                info!("Request accepted, analyzing in {} mode", request.mode());
                Workflow::Analyzing { request }
            }
            Err(err) => {
                info!("Submission rejected: {}", err);
                Workflow::Upload { error: Some(err) }
            }
        }
    }

    /// Record an upload-side failure (for example unreadable documents).
    pub fn reject(self, error: AtsError) -> Self {
        match self {
            Workflow::Upload { .. } => {
                info!("Upload rejected: {}", error);
                Workflow::Upload { error: Some(error) }
            }
            other => {
                warn!("Ignoring upload failure in {} state: {}", other.state(), error);
                other
            }
        }
    }

    /// Run the analysis according to the request's mode policy.
    pub async fn analyze(self, engine: &AnalysisEngine) -> Self {
        let request = match self {
            Workflow::Analyzing { request } => request,
            other => {
                warn!("Nothing to analyze in {} state", other.state());
                return other;
            }
        };

        let result = match request.mode() {
            ModePolicy::OfflineOnly => Ok(engine.analyze_offline(&request)),
            ModePolicy::OnlineOnly => engine.analyze_online(&request).await,
            ModePolicy::Auto => match engine.analyze_online(&request).await {
                Ok(result) => Ok(result),
                Err(err) => {
                    info!("Online analysis unavailable, using offline scorer: {}", err);
                    Ok(engine.analyze_offline(&request))
                }
            },
        };

        match result {
            Ok(result) => {
                debug!("Analysis completed in {} mode", result.mode_used);
                Workflow::Result { request, result }
            }
            Err(err) => {
                warn!("Analysis failed, returning to upload: {}", err);
                Workflow::Upload { error: Some(err) }
            }
        }
    }

    /// Discard the request and result and start over.
    pub fn reset(self) -> Self {
        debug!("Resetting workflow from {} state", self.state());
        Workflow::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::backend::BackendError;
    use crate::llm::failover::testing::{candidates, ScriptedBackend};
    use crate::llm::failover::FailoverClient;
    use crate::llm::prompts::PromptTemplates;
    use crate::processing::types::ModeUsed;
    use std::sync::Arc;

    const RESUME: &str = "Data engineer: Python, SQL, Airflow, dbt.";
    const JOB: &str = "We are hiring a data engineer with Python, SQL and AWS experience.";

    fn engine(outcomes: Vec<(&str, std::result::Result<String, BackendError>)>) -> AnalysisEngine {
        let models: Vec<&str> = outcomes.iter().map(|(m, _)| *m).collect();
        let client = FailoverClient::new(Arc::new(ScriptedBackend::new(outcomes.clone())), candidates(&models));
        AnalysisEngine::new(client, PromptTemplates::default())
    }

    fn submission(mode: ModePolicy) -> Submission {
        Submission {
            resume_text: Some(RESUME.to_string()),
            job_text: JOB.to_string(),
            mode,
        }
    }

    #[test]
    fn starts_in_upload() {
        let workflow = Workflow::new();
        assert_eq!(workflow.state(), WorkflowState::Upload);
        assert!(workflow.error().is_none());
    }

    #[test]
    fn short_job_text_stays_in_upload() {
        let workflow = Workflow::new().submit(Submission {
            job_text: "too short".into(),
            ..submission(ModePolicy::Auto)
        });

        assert_eq!(workflow.state(), WorkflowState::Upload);
        assert!(matches!(workflow.error(), Some(AtsError::Validation(_))));
        assert!(workflow.request().is_none());
    }

    #[test]
    fn extraction_failure_stays_in_upload() {
        let workflow = Workflow::new().reject(AtsError::Extraction("image-based PDF".into()));
        assert_eq!(workflow.state(), WorkflowState::Upload);
        assert!(matches!(workflow.error(), Some(AtsError::Extraction(_))));
    }

    #[tokio::test]
    async fn offline_only_always_reaches_result() {
        let engine = engine(vec![("m", Ok("ATS Score: 99%".into()))]);
        let workflow = Workflow::new()
            .submit(submission(ModePolicy::OfflineOnly))
            .analyze(&engine)
            .await;

        assert_eq!(workflow.state(), WorkflowState::Result);
        let result = workflow.result().unwrap();
        assert_eq!(result.mode_used, ModeUsed::Offline);
        assert!(result.narrative.is_empty());
        assert!(workflow.report(ReportSources::default()).is_some());
    }

    #[tokio::test]
    async fn online_only_success_reaches_result() {
        let engine = engine(vec![("m", Ok("**ATS Score: 82%**\nGood match.".into()))]);
        let workflow = Workflow::new()
            .submit(submission(ModePolicy::OnlineOnly))
            .analyze(&engine)
            .await;

        let result = workflow.result().unwrap();
        assert_eq!(result.mode_used, ModeUsed::Online);
        assert_eq!(result.overall_score, Some(82));
    }

    #[tokio::test]
    async fn online_only_failure_returns_to_upload() {
        let engine = engine(vec![
            ("a", Err(BackendError::QuotaExceeded("429".into()))),
            ("b", Ok("ATS Score: 50%".into())),
        ]);
        let workflow = Workflow::new()
            .submit(submission(ModePolicy::OnlineOnly))
            .analyze(&engine)
            .await;

        assert_eq!(workflow.state(), WorkflowState::Upload);
        assert!(workflow.result().is_none());
        assert!(workflow.report(ReportSources::default()).is_none());
        assert!(matches!(workflow.into_error(), Some(AtsError::QuotaExceeded(_))));
    }

    #[tokio::test]
    async fn online_only_exhaustion_returns_to_upload() {
        let engine = engine(vec![("a", Err(BackendError::Timeout))]);
        let workflow = Workflow::new()
            .submit(submission(ModePolicy::OnlineOnly))
            .analyze(&engine)
            .await;

        assert_eq!(workflow.state(), WorkflowState::Upload);
        assert!(matches!(
            workflow.error(),
            Some(AtsError::AllCandidatesExhausted { .. })
        ));
    }

    #[tokio::test]
    async fn auto_falls_back_to_offline_on_any_failure() {
        let failures = vec![
            BackendError::QuotaExceeded("429".into()),
            BackendError::ModelNotFound("gone".into()),
            BackendError::Timeout,
            BackendError::EmptyResponse,
        ];

        for failure in failures {
            let engine = engine(vec![("m", Err(failure))]);
            let workflow = Workflow::new()
                .submit(submission(ModePolicy::Auto))
                .analyze(&engine)
                .await;

            assert_eq!(workflow.state(), WorkflowState::Result);
            let result = workflow.result().unwrap();
            assert_eq!(result.mode_used, ModeUsed::Offline);
            assert!(result.overall_score.is_some());
        }
    }

    #[tokio::test]
    async fn reset_discards_everything() {
        let engine = engine(vec![]);
        let workflow = Workflow::new()
            .submit(submission(ModePolicy::OfflineOnly))
            .analyze(&engine)
            .await
            .reset();

        assert_eq!(workflow.state(), WorkflowState::Upload);
        assert!(workflow.request().is_none());
        assert!(workflow.result().is_none());
        assert!(workflow.error().is_none());
    }

    #[tokio::test]
    async fn analyze_outside_analyzing_is_a_no_op() {
        let engine = engine(vec![]);
        let workflow = Workflow::new().analyze(&engine).await;
        assert_eq!(workflow.state(), WorkflowState::Upload);
    }

    #[tokio::test]
    async fn submit_is_ignored_in_result_state() {
        let engine = engine(vec![]);
        let workflow = Workflow::new()
            .submit(submission(ModePolicy::OfflineOnly))
            .analyze(&engine)
            .await
            .submit(submission(ModePolicy::Auto));
        assert_eq!(workflow.state(), WorkflowState::Result);
    }
}
