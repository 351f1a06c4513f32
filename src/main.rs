//! ATS analyzer: score a resume against a job description

use ats_analyzer::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use ats_analyzer::config::{Config, OutputFormat};
use ats_analyzer::error::{AtsError, Result};
use ats_analyzer::input::file_detector::SUPPORTED_EXTENSIONS;
use ats_analyzer::input::InputManager;
use ats_analyzer::llm::failover::FailoverClient;
use ats_analyzer::llm::gemini::GeminiBackend;
use ats_analyzer::output::{save_report_to_file, suggest_filename, ReportGenerator, ReportSources};
use ats_analyzer::processing::analyzer::AnalysisEngine;
use ats_analyzer::processing::types::ModePolicy;
use ats_analyzer::workflow::{Submission, Workflow, WorkflowState};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job,
            job_text,
            mode,
            output,
            save,
            detailed,
        } => {
            let options = AnalyzeOptions {
                mode: mode.unwrap_or(config.analysis.default_mode),
                format: output.unwrap_or(config.output.format),
                detailed: detailed || config.output.detailed,
                save,
            };
            run_analysis(&config, &resume, job.as_deref(), job_text, options).await
        }

        Commands::Models { action } => match action {
            ModelAction::List => {
                println!("🤖 Model candidates (tried in order)\n");
                for (i, candidate) in config.backend.candidates.iter().enumerate() {
                    let generation = &candidate.generation;
                    println!("  {}. {} ({})", i + 1, candidate.name, candidate.model);
                    println!(
                        "     temperature {} | top_p {} | top_k {} | max_output_tokens {}",
                        generation.temperature,
                        generation.top_p,
                        generation.top_k,
                        generation.max_output_tokens
                    );
                }

                let key_status = if std::env::var(&config.backend.api_key_env).is_ok() {
                    "✅ set"
                } else {
                    "⚠️  not set (online analysis will be skipped)"
                };
                println!("\nEndpoint: {}", config.backend.base_url);
                println!("API key (${}): {}", config.backend.api_key_env, key_status);
                println!("Timeout per candidate: {}s", config.backend.timeout_secs);
                Ok(())
            }
        },

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration ({})\n", path.display());
                    println!("{}", config.to_toml()?);
                }

                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    Config::default().save_to(&path)?;
                    println!("✅ Configuration reset: {}", path.display());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
            Ok(())
        }
    }
}

struct AnalyzeOptions {
    mode: ModePolicy,
    format: OutputFormat,
    detailed: bool,
    save: Option<PathBuf>,
}

async fn run_analysis(
    config: &Config,
    resume: &Path,
    job: Option<&Path>,
    job_text: Option<String>,
    options: AnalyzeOptions,
) -> Result<()> {
    let start_time = Instant::now();
    info!("Starting ATS analysis in {} mode", options.mode);

    cli::validate_file_extension(resume, &SUPPORTED_EXTENSIONS)
        .map_err(|e| AtsError::InvalidInput(format!("Resume file: {}", e)))?;

    let mut input_manager = InputManager::new();
    let mut workflow = Workflow::new();

    let resume_text = match input_manager.extract_text(resume).await {
        Ok(text) => Some(text),
        Err(e @ AtsError::Extraction(_)) => {
            workflow = workflow.reject(e);
            None
        }
        Err(e) => return Err(e),
    };

    let (job_text, job_source) = match (job, job_text) {
        (Some(path), _) => (
            input_manager.extract_text(path).await?,
            path.display().to_string(),
        ),
        (None, Some(text)) => (text, "inline text".to_string()),
        (None, None) => {
            return Err(AtsError::InvalidInput(
                "Provide a job description with --job or --job-text".to_string(),
            ))
        }
    };

    if workflow.error().is_none() {
        if let Some(text) = &resume_text {
            debug!(
                "Resume: {} characters, job description: {} characters",
                text.chars().count(),
                job_text.chars().count()
            );
        }

        workflow = workflow.submit_with_min_job_chars(
            Submission {
                resume_text,
                job_text,
                mode: options.mode,
            },
            config.analysis.min_job_chars,
        );
    }

    if workflow.state() == WorkflowState::Analyzing {
        let engine = build_engine(config);
        let spinner = config
            .analysis
            .progress
            .then(|| spinner(&format!("Analyzing ({})...", options.mode)));

        workflow = workflow.analyze(&engine).await;

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
    }

    let sources = ReportSources {
        resume_source: resume.display().to_string(),
        job_source,
        processing_time_ms: start_time.elapsed().as_millis() as u64,
    };

    let report = match workflow.report(sources) {
        Some(report) => report,
        None => {
            let err = workflow.into_error().unwrap_or_else(|| {
                AtsError::AnalysisFailed("analysis did not complete".to_string())
            });
            println!("❌ {}", err.user_message());
            return Err(err);
        }
    };

    let use_colors = config.output.color_output && options.save.is_none();
    let generator = ReportGenerator::with_options(use_colors, options.detailed);
    let content = generator.generate_report(&report, &options.format)?;

    match options.save {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(suggest_filename(
                    &options.format,
                    &resume.to_string_lossy(),
                    true,
                ))
            } else {
                path
            };
            save_report_to_file(&content, &path)?;
            println!("💾 Report saved to {}", path.display());
        }
        None => println!("{}", content),
    }

    info!(
        "Analysis finished in {}ms ({})",
        start_time.elapsed().as_millis(),
        report.result.mode_used
    );
    Ok(())
}

fn build_engine(config: &Config) -> AnalysisEngine {
    let backend = GeminiBackend::new(config.gemini_settings());
    let client = FailoverClient::new(Arc::new(backend), config.backend.candidates.clone());
    AnalysisEngine::new(client, config.prompt_templates())
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
