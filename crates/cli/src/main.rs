//! CLI tool that explains each slide of a PowerPoint deck with a language
//! model and writes the explanations to JSON.

mod config;
mod pipeline;
mod watch;

use anyhow::{Context, Result};
use clap::Parser;
use config::AppConfig;
use explainer_llm::{ExplanationDispatcher, LlmConfig, OpenAiExplainer};
use pipeline::Pipeline;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// Explain every slide of a PowerPoint deck with a language model.
#[derive(Parser, Debug)]
#[command(name = "slide-explain")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input presentation file(s) (.pptx)
    #[arg(required_unless_present = "watch")]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the JSON to stdout instead of writing a file
    #[arg(short, long)]
    print: bool,

    /// API key for the language model
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    base_url: Option<String>,

    /// Model name
    #[arg(short, long)]
    model: Option<String>,

    /// Seconds to wait for each slide's explanation
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Maximum requests in flight at once
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Retries after a rate-limit rejection (HTTP 429)
    #[arg(long)]
    rate_limit_retries: Option<u32>,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watch a directory and explain new decks as they appear
    #[arg(short, long, value_name = "DIR", conflicts_with_all = ["input", "print"])]
    watch: Option<PathBuf>,

    /// Polling interval for --watch, in seconds
    #[arg(long, default_value = "10")]
    interval: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Apply command-line overrides on top of file settings.
    fn apply_to(&self, llm: &mut LlmConfig) {
        if let Some(key) = &self.api_key {
            llm.api_key = Some(key.clone());
        }
        if let Some(url) = &self.base_url {
            llm.base_url = url.clone();
        }
        if let Some(model) = &self.model {
            llm.model = model.clone();
        }
        if let Some(timeout) = self.timeout {
            llm.timeout_secs = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            llm.max_concurrency = concurrency;
        }
        if let Some(retries) = self.rate_limit_retries {
            llm.rate_limit_retries = retries;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every input was processed.
async fn run(args: Args) -> Result<bool> {
    let mut settings = AppConfig::load(args.config.as_deref())?;
    args.apply_to(&mut settings.llm);

    if settings.llm.api_key.as_deref().unwrap_or("").is_empty() {
        log::warn!("No API key configured; requests will be sent without credentials");
    }

    let explainer = Arc::new(OpenAiExplainer::from_config(&settings.llm));
    let dispatcher = ExplanationDispatcher::new(explainer, &settings.llm);
    let output_dir = args.output.clone().or(settings.output_dir.clone());
    let pipeline = Pipeline::new(dispatcher, output_dir);

    if let Some(dir) = &args.watch {
        watch::watch(dir, &pipeline, Duration::from_secs(args.interval.max(1))).await?;
        return Ok(true);
    }

    let mut all_ok = true;
    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        let outcome = if args.print {
            print_report(&pipeline, input_path).await
        } else {
            pipeline.process_to_file(input_path).await.map(|path| {
                if args.verbose {
                    eprintln!("Written to: {}", path.display());
                }
            })
        };

        if let Err(e) = outcome {
            eprintln!("Error processing {}: {:#}", input_path.display(), e);
            all_ok = false;
        }
    }

    Ok(all_ok)
}

async fn print_report(pipeline: &Pipeline, input_path: &std::path::Path) -> Result<()> {
    let report = pipeline.explain_file(input_path).await?;
    let json = report.to_json()?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json).context("Failed to write to stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_are_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_input_or_watch_required() {
        assert!(Args::try_parse_from(["slide-explain"]).is_err());
        assert!(Args::try_parse_from(["slide-explain", "deck.pptx"]).is_ok());
        assert!(Args::try_parse_from(["slide-explain", "--watch", "uploads"]).is_ok());
        assert!(Args::try_parse_from(["slide-explain", "--watch", "uploads", "deck.pptx"]).is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let args = Args::try_parse_from([
            "slide-explain",
            "deck.pptx",
            "--api-key",
            "sk-flag",
            "--base-url",
            "http://localhost:11434",
            "-m",
            "llama3",
            "-t",
            "5",
            "-j",
            "2",
            "--rate-limit-retries",
            "3",
        ])
        .unwrap();

        let mut llm = LlmConfig::default();
        args.apply_to(&mut llm);

        assert_eq!(llm.api_key.as_deref(), Some("sk-flag"));
        assert_eq!(llm.base_url, "http://localhost:11434");
        assert_eq!(llm.model, "llama3");
        assert_eq!(llm.timeout_secs, 5);
        assert_eq!(llm.max_concurrency, 2);
        assert_eq!(llm.rate_limit_retries, 3);
    }

    #[test]
    fn test_unset_flags_keep_settings() {
        let args = Args::try_parse_from(["slide-explain", "deck.pptx"]).unwrap();
        let mut llm = LlmConfig {
            model: "from-file".into(),
            timeout_secs: 42,
            ..LlmConfig::default()
        };
        let before_key = llm.api_key.clone();
        args.apply_to(&mut llm);

        assert_eq!(llm.model, "from-file");
        assert_eq!(llm.timeout_secs, 42);
        // The key may come from OPENAI_API_KEY in the test environment.
        if std::env::var_os("OPENAI_API_KEY").is_none() {
            assert_eq!(llm.api_key, before_key);
        }
    }
}
