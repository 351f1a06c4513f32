//! Best-effort extraction of scores from free-form model output
//!
//! Every field is matched independently and may be missing. A miss is not an
//! error: the raw text is always kept as the narrative.

use crate::processing::types::{ScoreBreakdown, ScoreDimension, MAX_MISSING_TERMS};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Structured fields pulled out of one model response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedResult {
    pub overall_score: Option<u8>,
    pub breakdown: ScoreBreakdown,
    pub missing_terms: Vec<String>,
    pub recommendations: Vec<String>,
    pub narrative: String,
}

struct Patterns {
    overall: Regex,
    dimensions: [(ScoreDimension, Regex); 4],
    marked_heading: Regex,
    plain_heading: Regex,
    list_item: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Label, then only emphasis/colon/dash noise, then NN%.
        let score = |label: &str| {
            Regex::new(&format!(r"(?i){}[ \t*_:\-]*(\d{{1,3}})\s*%", label))
                .expect("Invalid score regex")
        };
        Patterns {
            overall: score(r"ATS\s*Score"),
            dimensions: [
                (ScoreDimension::KeywordMatch, score(r"Keyword\s*Match(?:ing)?")),
                (ScoreDimension::SkillsAlignment, score(r"Skills?\s*Alignment")),
                (ScoreDimension::ExperienceRelevance, score(r"Experience\s*Relevance")),
                (
                    ScoreDimension::FormatStructure,
                    score(r"Format(?:ting)?\s*(?:&|and|/)?\s*Structure"),
                ),
            ],
            marked_heading: Regex::new(
                r"^\s*(?:#{1,6}\s*(?:\d+[.)]\s*)?(.+?)|(?:\*\*|__)\s*(?:\d+[.)]\s*)?(.+?)(?:\*\*|__)\s*:?)\s*$",
            )
            .expect("Invalid heading regex"),
            plain_heading: Regex::new(r"^\s*(?:\d+[.)]\s*)?([A-Za-z][A-Za-z &/'-]*?)\s*:?\s*$")
                .expect("Invalid heading regex"),
            list_item: Regex::new(r"^\s*(?:[-*•+]|\d+[.)])\s+(.+?)\s*$")
                .expect("Invalid list item regex"),
        }
    })
}

/// Parse a percentage capture, discarding anything outside 0..=100.
fn capture_percent(regex: &Regex, text: &str) -> Option<u8> {
    regex
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .filter(|value| *value <= 100)
}

/// Parse a model response into typed fields.
pub fn parse_online_result(raw: &str) -> ParsedResult {
    let patterns = patterns();

    let overall_score = capture_percent(&patterns.overall, raw);

    let mut breakdown = ScoreBreakdown::default();
    for (dimension, regex) in &patterns.dimensions {
        breakdown.set(*dimension, capture_percent(regex, raw));
    }

    let mut seen = HashSet::new();
    let missing_terms = section_items(raw, "keywords to add")
        .into_iter()
        .flat_map(|item| {
            item.split(',')
                .map(|term| clean_item(term).to_lowercase())
                .collect::<Vec<_>>()
        })
        .filter(|term| !term.is_empty())
        .filter(|term| seen.insert(term.clone()))
        .take(MAX_MISSING_TERMS)
        .collect();

    let recommendations = section_items(raw, "resume improvements")
        .into_iter()
        .map(|item| clean_item(&item).to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if overall_score.is_none() {
        log::debug!("No ATS score label found in model response");
    }

    ParsedResult {
        overall_score,
        breakdown,
        missing_terms,
        recommendations,
        narrative: raw.to_string(),
    }
}

/// Section titles the prompt asks for. Bare lines only count as headings when
/// they name one of these.
const SECTION_TITLES: [&str; 6] = [
    "score breakdown",
    "key strengths",
    "critical gaps",
    "resume improvements",
    "keywords to add",
    "overall assessment",
];

/// Lowercased heading title of `line`, if the line is a heading.
fn heading_title(line: &str) -> Option<String> {
    let patterns = patterns();

    if let Some(caps) = patterns.marked_heading.captures(line) {
        let title = caps.get(1).or_else(|| caps.get(2))?.as_str();
        return Some(
            title
                .trim_end_matches(|c: char| c == ':' || c == '*' || c == '_' || c == '#' || c.is_whitespace())
                .to_lowercase(),
        );
    }

    let title = patterns.plain_heading.captures(line)?.get(1)?.as_str().to_lowercase();
    SECTION_TITLES.contains(&title.as_str()).then_some(title)
}

/// List items under the heading whose title contains `title`, up to the next heading.
fn section_items(raw: &str, title: &str) -> Vec<String> {
    let patterns = patterns();
    let mut items = Vec::new();
    let mut inside = false;

    for line in raw.lines() {
        if let Some(item) = patterns.list_item.captures(line).and_then(|c| c.get(1)) {
            if inside {
                items.push(item.as_str().to_string());
            }
            continue;
        }
        if let Some(heading) = heading_title(line) {
            if inside && !heading.contains(title) {
                break;
            }
            inside = heading.contains(title);
        }
    }

    items
}

fn clean_item(item: &str) -> &str {
    item.trim()
        .trim_matches(|c: char| c == '*' || c == '_' || c == '`' || c == '.')
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "**ATS Score: 82%**

## Score Breakdown
- **Keyword Match:** 78%
- Skills Alignment: 85%
- Experience Relevance - 80%
- Format & Structure: 90%

## Key Strengths
- Solid Python background

## Resume Improvements
1. Quantify the data pipeline work.
2. Move the skills section to the top

## Keywords to Add
- Kubernetes, Terraform
- `Airflow`
- kubernetes

## Overall Assessment
Good fit overall.";

    #[test]
    fn test_overall_score_with_emphasis() {
        let parsed = parse_online_result("**ATS Score: 82%**\nThe resume is strong.");
        assert_eq!(parsed.overall_score, Some(82));
    }

    #[test]
    fn missing_label_leaves_score_unknown() {
        let raw = "The candidate looks promising, roughly 70% aligned.";
        let parsed = parse_online_result(raw);
        assert_eq!(parsed.overall_score, None);
        assert_eq!(parsed.narrative, raw);
        assert_eq!(parsed.breakdown, ScoreBreakdown::default());
    }

    #[test]
    fn label_match_is_case_insensitive_and_first_wins() {
        let parsed = parse_online_result("ats score : 64 %\nATS Score: 90%");
        assert_eq!(parsed.overall_score, Some(64));
    }

    #[test]
    fn bold_label_with_value_outside_markup() {
        let parsed = parse_online_result("**ATS Score:** 77%");
        assert_eq!(parsed.overall_score, Some(77));
    }

    #[test]
    fn out_of_range_score_is_discarded() {
        let parsed = parse_online_result("ATS Score: 150%");
        assert_eq!(parsed.overall_score, None);
    }

    #[test]
    fn test_breakdown_extraction() {
        let parsed = parse_online_result(SAMPLE);
        assert_eq!(parsed.overall_score, Some(82));
        assert_eq!(parsed.breakdown.keyword_match, Some(78));
        assert_eq!(parsed.breakdown.skills_alignment, Some(85));
        assert_eq!(parsed.breakdown.experience_relevance, Some(80));
        assert_eq!(parsed.breakdown.format_structure, Some(90));
    }

    #[test]
    fn sub_scores_are_independent() {
        let parsed = parse_online_result("Skills Alignment: 60%\nnothing else here");
        assert_eq!(parsed.breakdown.skills_alignment, Some(60));
        assert_eq!(parsed.breakdown.keyword_match, None);
        assert_eq!(parsed.breakdown.experience_relevance, None);
        assert_eq!(parsed.breakdown.format_structure, None);
    }

    #[test]
    fn test_sections_extraction() {
        let parsed = parse_online_result(SAMPLE);
        assert_eq!(parsed.missing_terms, vec!["kubernetes", "terraform", "airflow"]);
        assert_eq!(
            parsed.recommendations,
            vec![
                "Quantify the data pipeline work",
                "Move the skills section to the top"
            ]
        );
    }

    #[test]
    fn prose_mentioning_the_label_is_not_a_score() {
        let parsed = parse_online_result("Your ATS score could rise by 15% with edits.\nATS Score: 62%");
        assert_eq!(parsed.overall_score, Some(62));

        let parsed = parse_online_result("Keyword match is weak, about 40% of terms.\nKeyword Match: 55%");
        assert_eq!(parsed.breakdown.keyword_match, Some(55));
    }

    #[test]
    fn lead_in_sentence_stays_inside_section() {
        let raw = "## Keywords to Add\nConsider adding these keywords:\n- Kubernetes\n- Terraform\n\n## Overall Assessment\n- Not a keyword";
        let parsed = parse_online_result(raw);
        assert_eq!(parsed.missing_terms, vec!["kubernetes", "terraform"]);
    }

    #[test]
    fn bold_and_bare_section_titles_are_headings() {
        let raw = "**Resume Improvements**\nA few edits:\n- Add metrics\nKeywords to Add:\n- GraphQL";
        let parsed = parse_online_result(raw);
        assert_eq!(parsed.recommendations, vec!["Add metrics"]);
        assert_eq!(parsed.missing_terms, vec!["graphql"]);
    }

    #[test]
    fn narrative_is_kept_verbatim() {
        let parsed = parse_online_result(SAMPLE);
        assert_eq!(parsed.narrative, SAMPLE);
    }
}
