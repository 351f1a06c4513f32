//! Output formatters for the analysis report

use crate::config::OutputFormat;
use crate::error::{AtsError, Result};
use crate::output::report::{AnalysisReport, Verdict, EXCERPT_CHARS, PREVIEW_CHARS};
use crate::processing::tokenizer::preview;
use crate::processing::types::{format_score, ModeUsed};
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting analysis reports
pub trait OutputFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Colored terminal output
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

/// Flat plain-text export in a fixed section order.
pub struct TextFormatter;

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
    text_formatter: TextFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>ATS Analysis Report</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container { background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        .header { text-align: center; margin-bottom: 30px; border-bottom: 3px solid #007acc; padding-bottom: 20px; }
        .score-badge { display: inline-block; padding: 8px 16px; border-radius: 20px; font-weight: bold; color: white; margin-left: 10px; }
        .score-excellent { background: #28a745; }
        .score-good { background: #17a2b8; }
        .score-fair { background: #ffc107; color: #000; }
        .score-poor { background: #dc3545; }
        .score-unknown { background: #6c757d; }
        .section h2 { color: #007acc; border-bottom: 2px solid #e9ecef; padding-bottom: 10px; }
        .score-breakdown { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 15px; margin: 20px 0; }
        .score-item { background: #f8f9fa; padding: 15px; border-radius: 6px; border-left: 4px solid #007acc; }
        .terms code { background: #fff3cd; padding: 2px 6px; border-radius: 4px; margin-right: 4px; }
        pre { white-space: pre-wrap; background: #f8f9fa; padding: 15px; border-radius: 6px; }
        .metadata { background: #e9ecef; padding: 15px; border-radius: 6px; margin-top: 30px; font-size: 0.9em; color: #6c757d; }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>ATS Analysis Report</h1>
            <p>Generated: {{ generated_at }} | Mode: {{ mode }} | Engine: {{ engine }}</p>
        </div>

        <div class="section">
            <h2>Summary</h2>
            <h3>ATS Score: {{ overall_score }} <span class="score-badge {{ score_class }}">{{ score_label }}</span></h3>
            <p><strong>Verdict:</strong> {{ verdict }}</p>

            <div class="score-breakdown">
                {% for (label, score) in breakdown %}
                <div class="score-item">
                    <h4>{{ label }}</h4>
                    <p><strong>{{ score }}</strong></p>
                </div>
                {% endfor %}
            </div>
        </div>

        {% if has_missing_terms %}
        <div class="section terms">
            <h2>Missing Keywords</h2>
            <p>{% for term in missing_terms %}<code>{{ term }}</code>{% endfor %}</p>
        </div>
        {% endif %}

        {% if has_recommendations %}
        <div class="section">
            <h2>Recommendations</h2>
            <ul>
                {% for recommendation in recommendations %}
                <li>{{ recommendation }}</li>
                {% endfor %}
            </ul>
        </div>
        {% endif %}

        {% if has_narrative %}
        <div class="section">
            <h2>Full Analysis</h2>
            <pre>{{ narrative }}</pre>
        </div>
        {% endif %}

        <div class="metadata">
            <p><strong>Generated by ATS Analyzer v{{ version }}</strong> in {{ processing_time }}ms</p>
            <p><strong>Resume:</strong> {{ resume_source }} | <strong>Job:</strong> {{ job_source }}</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    generated_at: String,
    mode: String,
    engine: String,
    overall_score: String,
    score_class: &'static str,
    score_label: &'static str,
    verdict: &'static str,
    breakdown: Vec<(&'static str, String)>,
    missing_terms: Vec<String>,
    has_missing_terms: bool,
    recommendations: Vec<String>,
    has_recommendations: bool,
    narrative: String,
    has_narrative: bool,
    version: String,
    processing_time: u64,
    resume_source: String,
    job_source: String,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            3 => "▒",
            _ => "░",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            3 => Color::Yellow,
            _ => Color::White,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, verdict: Verdict) -> String {
        let color = match verdict {
            Verdict::Excellent => Color::Green,
            Verdict::VeryGood => Color::BrightGreen,
            Verdict::Good => Color::Yellow,
            Verdict::Fair => Color::BrightYellow,
            Verdict::BelowAverage => Color::Red,
            Verdict::Poor => Color::BrightRed,
            Verdict::Unavailable => Color::BrightBlack,
        };

        if self.use_colors {
            format!("[{}]", verdict.label().color(color).bold())
        } else {
            format!("[{}]", verdict.label())
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let result = &report.result;
        let mut output = String::new();

        output.push_str(&self.format_header("📊 ATS ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {} | Mode: {} | Engine: {}\n",
            report.generated_at_display(),
            result.mode_used,
            report.engine_label()
        ));

        output.push_str(&self.format_header("Summary", 2));
        output.push_str(&format!(
            "ATS Score: {} {}\n",
            format_score(result.overall_score),
            self.format_score_badge(report.verdict)
        ));
        output.push_str(&format!(
            "Verdict: {}\n",
            self.colorize(report.verdict.description(), Color::Cyan)
        ));

        output.push_str(&self.format_header("Score Breakdown", 3));
        for (dimension, score) in result.breakdown.entries() {
            output.push_str(&format!("  {:<22} {}\n", dimension.label(), format_score(score)));
        }

        if !result.missing_terms.is_empty() {
            output.push_str(&self.format_header("🔍 Missing Keywords", 3));
            output.push_str(&format!(
                "  {}\n",
                self.colorize(&result.missing_terms.join(", "), Color::Yellow)
            ));
        }

        if !result.recommendations.is_empty() {
            output.push_str(&self.format_header("📋 Recommendations", 3));
            for (i, recommendation) in result.recommendations.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, recommendation));
            }
        }

        if result.mode_used == ModeUsed::Online && !result.narrative.is_empty() {
            output.push_str(&self.format_header("🤖 Full Analysis", 2));
            output.push_str(result.narrative.trim_end());
            output.push('\n');
        }

        if self.detailed {
            output.push_str(&self.format_header("Resume Preview", 3));
            output.push_str(&preview(&report.resume_excerpt, PREVIEW_CHARS));
            output.push('\n');
            output.push_str(&format!(
                "\nResume: {} | Job: {} | Processing time: {}ms\n",
                report.metadata.resume_source,
                report.metadata.job_source,
                report.metadata.processing_time_ms
            ));
        }

        output.push_str(&format!(
            "\n{} Generated by ATS Analyzer v{}\n",
            self.colorize("ℹ️", Color::Blue),
            report.metadata.analyzer_version
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &AnalysisReport) -> HtmlTemplate {
        let result = &report.result;
        let score_class = match report.verdict {
            Verdict::Excellent => "score-excellent",
            Verdict::VeryGood | Verdict::Good => "score-good",
            Verdict::Fair => "score-fair",
            Verdict::BelowAverage | Verdict::Poor => "score-poor",
            Verdict::Unavailable => "score-unknown",
        };

        HtmlTemplate {
            include_styles: self.include_styles,
            generated_at: report.generated_at_display(),
            mode: result.mode_used.to_string(),
            engine: report.engine_label().to_string(),
            overall_score: format_score(result.overall_score),
            score_class,
            score_label: report.verdict.label(),
            verdict: report.verdict.description(),
            breakdown: result
                .breakdown
                .entries()
                .iter()
                .map(|(dimension, score)| (dimension.label(), format_score(*score)))
                .collect(),
            missing_terms: result.missing_terms.clone(),
            has_missing_terms: !result.missing_terms.is_empty(),
            recommendations: result.recommendations.clone(),
            has_recommendations: !result.recommendations.is_empty(),
            narrative: result.narrative.clone(),
            has_narrative: !result.narrative.is_empty(),
            version: report.metadata.analyzer_version.clone(),
            processing_time: report.metadata.processing_time_ms,
            resume_source: report.metadata.resume_source.clone(),
            job_source: report.metadata.job_source.clone(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| AtsError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_score_badge(verdict: Verdict) -> &'static str {
        match verdict {
            Verdict::Excellent => "🟢 Excellent",
            Verdict::VeryGood => "🟡 Very Good",
            Verdict::Good => "🟠 Good",
            Verdict::Fair => "🔴 Fair",
            Verdict::BelowAverage => "🔴 Below Average",
            Verdict::Poor => "🔴 Poor",
            Verdict::Unavailable => "⚪ Unavailable",
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let result = &report.result;
        let mut output = String::new();

        output.push_str("# 📊 ATS Analysis Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Mode:** {} | **Engine:** {}\n",
                report.generated_at_display(),
                result.mode_used,
                report.engine_label()
            ));
            output.push_str(&format!(
                "**Resume:** `{}` | **Job:** `{}`\n\n",
                report.metadata.resume_source, report.metadata.job_source
            ));
        }

        output.push_str("## Summary\n\n");
        output.push_str(&format!(
            "**ATS Score:** {} {}\n\n",
            format_score(result.overall_score),
            Self::markdown_score_badge(report.verdict)
        ));
        output.push_str(&format!("**Verdict:** {}\n\n", report.verdict.description()));

        output.push_str("### Score Breakdown\n\n");
        output.push_str("| Dimension | Score |\n");
        output.push_str("|-----------|-------|\n");
        for (dimension, score) in result.breakdown.entries() {
            output.push_str(&format!("| {} | {} |\n", dimension.label(), format_score(score)));
        }
        output.push('\n');

        if !result.missing_terms.is_empty() {
            output.push_str("## 🔍 Missing Keywords\n\n");
            output.push_str(&format!("`{}`\n\n", result.missing_terms.join("`, `")));
        }

        if !result.recommendations.is_empty() {
            output.push_str("## 📋 Recommendations\n\n");
            for recommendation in &result.recommendations {
                output.push_str(&format!("- {}\n", recommendation));
            }
            output.push('\n');
        }

        if !result.narrative.is_empty() {
            output.push_str("## 🤖 Full Analysis\n\n");
            output.push_str(result.narrative.trim_end());
            output.push_str("\n\n");
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!(
                "*Generated by ATS Analyzer v{} in {}ms*\n",
                report.metadata.analyzer_version, report.metadata.processing_time_ms
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl OutputFormatter for TextFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let result = &report.result;
        let mut content = String::new();

        content.push_str("ATS ANALYSIS REPORT\n");
        content.push_str(&format!("Overall ATS Score: {}\n", format_score(result.overall_score)));
        content.push_str(&format!("Generated: {}\n", report.generated_at_display()));
        content.push_str(&"=".repeat(50));
        content.push('\n');

        for (dimension, score) in result.breakdown.entries() {
            content.push_str(&format!("{}: {}\n", dimension.label(), format_score(score)));
        }
        content.push('\n');

        match result.mode_used {
            ModeUsed::Online => {
                content.push_str("ANALYSIS\n");
                content.push_str(&"-".repeat(20));
                content.push('\n');
                content.push_str(result.narrative.trim_end());
                content.push_str("\n\n");
            }
            ModeUsed::Offline => {
                content.push_str("MISSING KEYWORDS\n");
                content.push_str(&"-".repeat(20));
                content.push('\n');
                for term in &result.missing_terms {
                    content.push_str(&format!("- {}\n", term));
                }
                content.push('\n');

                content.push_str("RECOMMENDATIONS\n");
                content.push_str(&"-".repeat(20));
                content.push('\n');
                for recommendation in &result.recommendations {
                    content.push_str(&format!("- {}\n", recommendation));
                }
                content.push('\n');
            }
        }

        content.push_str(&format!("RESUME (first {} characters)\n", EXCERPT_CHARS));
        content.push_str(&"-".repeat(20));
        content.push('\n');
        content.push_str(&report.resume_excerpt);
        content.push_str("\n\n");

        content.push_str(&format!("JOB DESCRIPTION (first {} characters)\n", EXCERPT_CHARS));
        content.push_str(&"-".repeat(20));
        content.push('\n');
        content.push_str(&report.job_excerpt);
        content.push('\n');

        Ok(content)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Text
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
            html_formatter: HtmlFormatter::new(true),
            text_formatter: TextFormatter,
        }
    }

    pub fn generate_report(&self, report: &AnalysisReport, format: &OutputFormat) -> Result<String> {
        let formatter: &dyn OutputFormatter = match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
            OutputFormat::Html => &self.html_formatter,
            OutputFormat::Text => &self.text_formatter,
        };
        debug_assert_eq!(formatter.supports_format(), *format);
        formatter.format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console | OutputFormat::Text => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
    };

    format!("{}_ats_report{}.{}", base_name, timestamp_suffix, extension)
}
