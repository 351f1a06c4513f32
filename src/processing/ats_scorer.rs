//! Offline ATS scoring over token sets
//!
//! Fully deterministic: the same two texts always produce the same score,
//! breakdown and missing-term list.

use crate::processing::tokenizer::{token_set, tokenize};
use crate::processing::types::{ScoreBreakdown, MAX_MISSING_TERMS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// No structural analysis is performed; this dimension is a fixed value.
pub const FORMAT_STRUCTURE_SCORE: u8 = 75;

const SKILLS_BONUS: u32 = 10;
const EXPERIENCE_BONUS: u32 = 5;

// Weights in percent: keyword 35, skills 30, experience 20, format 15.
const WEIGHTS: [u32; 4] = [35, 30, 20, 15];

/// Generic guidance attached to every offline result.
pub const OFFLINE_RECOMMENDATIONS: [&str; 5] = [
    "Add the missing keywords from the job description where they honestly describe your experience",
    "Quantify achievements with concrete numbers, percentages and outcomes",
    "Start bullet points with strong action verbs",
    "Align your terminology with the wording used in the job posting",
    "Remove content that is not relevant to this role",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineScore {
    pub breakdown: ScoreBreakdown,
    pub overall_score: u8,
    pub missing_terms: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Score a resume against a job description using token-set overlap.
pub fn score_offline(resume_text: &str, job_text: &str) -> OfflineScore {
    let resume_tokens = token_set(resume_text);
    let job_tokens = token_set(job_text);

    let common = resume_tokens.intersection(&job_tokens).count();
    let keyword_match = keyword_match(common, job_tokens.len());
    let skills_alignment = (keyword_match + SKILLS_BONUS).min(100);
    let experience_relevance = (keyword_match + EXPERIENCE_BONUS).min(100);
    let format_structure = FORMAT_STRUCTURE_SCORE as u32;

    let weighted = [
        keyword_match,
        skills_alignment,
        experience_relevance,
        format_structure,
    ]
    .iter()
    .zip(WEIGHTS.iter())
    .map(|(score, weight)| score * weight)
    .sum::<u32>();
    // Integer division is the floor of the weighted percentage sum.
    let overall_score = (weighted / 100) as u8;

    log::debug!(
        "Offline score: {} common of {} job tokens, keyword match {}%, overall {}%",
        common,
        job_tokens.len(),
        keyword_match,
        overall_score
    );

    OfflineScore {
        breakdown: ScoreBreakdown {
            keyword_match: Some(keyword_match as u8),
            skills_alignment: Some(skills_alignment as u8),
            experience_relevance: Some(experience_relevance as u8),
            format_structure: Some(format_structure as u8),
        },
        overall_score,
        missing_terms: missing_terms(job_text, &resume_tokens),
        recommendations: OFFLINE_RECOMMENDATIONS
            .iter()
            .map(|r| r.to_string())
            .collect(),
    }
}

/// `floor(100 * common / max(job, 1))`; an empty job set scores 0.
fn keyword_match(common: usize, job_token_count: usize) -> u32 {
    (100 * common / job_token_count.max(1)) as u32
}

/// Job tokens absent from the resume, in first-occurrence order in the job text.
fn missing_terms(job_text: &str, resume_tokens: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(job_text)
        .into_iter()
        .filter(|token| !resume_tokens.contains(token))
        .filter(|token| seen.insert(token.clone()))
        .take(MAX_MISSING_TERMS)
        .collect()
}
