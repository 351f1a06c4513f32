//! Analysis prompt sent to the remote models

use crate::processing::tokenizer::truncate_chars;

/// Prompt template and the input limits applied when rendering it.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub ats_analysis: String,
    pub resume_char_limit: usize,
    pub job_char_limit: usize,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            ats_analysis: ATS_ANALYSIS_TEMPLATE.to_string(),
            resume_char_limit: 4000,
            job_char_limit: 2500,
        }
    }
}

impl PromptTemplates {
    pub fn with_limits(resume_char_limit: usize, job_char_limit: usize) -> Self {
        Self {
            resume_char_limit,
            job_char_limit,
            ..Self::default()
        }
    }

    /// Render the analysis prompt with truncated resume and job text.
    pub fn render_ats_analysis(&self, resume_text: &str, job_text: &str) -> String {
        let resume = truncate_chars(resume_text, self.resume_char_limit);
        let job = truncate_chars(job_text, self.job_char_limit);

        log::debug!(
            "Rendering prompt with {} resume chars and {} job chars",
            resume.chars().count(),
            job.chars().count()
        );

        fill_placeholders(&self.ats_analysis, resume, job)
    }
}

/// Substitute `{resume}` and `{job}` in one left-to-right pass so that
/// placeholder text inside the inserted documents is left alone.
fn fill_placeholders(template: &str, resume: &str, job: &str) -> String {
    let mut rendered = String::with_capacity(template.len() + resume.len() + job.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{resume}") {
            rendered.push_str(resume);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{job}") {
            rendered.push_str(job);
            rest = after;
        } else {
            rendered.push('{');
            rest = &tail[1..];
        }
    }

    rendered.push_str(rest);
    rendered
}

const ATS_ANALYSIS_TEMPLATE: &str = r#"You are an expert ATS (Applicant Tracking System) analyzer.

CRITICAL:
Start your response EXACTLY with:
ATS Score: [NUMBER]%

<RESUME>
{resume}
</RESUME>

<JOB DESCRIPTION>
{job}
</JOB DESCRIPTION>

Then provide these sections, each under its own level-two Markdown heading:

## Score Breakdown
- Keyword Match: [NUMBER]%
- Skills Alignment: [NUMBER]%
- Experience Relevance: [NUMBER]%
- Format & Structure: [NUMBER]%

## Key Strengths
## Critical Gaps
## Resume Improvements
(one bullet per improvement)
## Keywords to Add
(one keyword per bullet)
## Overall Assessment

Reference the actual resume content above, not generic advice."#;
