mod display;

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use spinscope_core::Thresholds;
use spinscope_engine::{
    AnalysisContext, AnalysisError, AnalyzeOptions, EngineConfig, analyze, compare,
};
use tracing::Level;

const MIN_TEXT_CHARS: usize = 10;
const MAX_TEXT_CHARS: usize = 10_000;

#[derive(Parser, Debug)]
#[command(name = "spinscope", version)]
#[command(about = "Score text for propaganda and manipulation techniques")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Groq API key.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, global = true)]
    groq_api_key: Option<String>,

    /// OpenRouter API key.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true, global = true)]
    openrouter_api_key: Option<String>,

    /// Per-call provider timeout in seconds.
    #[arg(long, default_value_t = 10, global = true)]
    timeout_secs: u64,

    /// Do not register the offline provider.
    #[arg(long, global = true)]
    no_local_provider: bool,

    /// Directory holding an ONNX sentiment model (`onnx` builds only).
    #[arg(long, env = "SPINSCOPE_SENTIMENT_MODEL", global = true)]
    sentiment_model: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one text (argument, --file, or stdin).
    Analyze {
        text: Option<String>,

        /// Read the text from a file.
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        #[command(flatten)]
        scoring: ScoringArgs,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Compare 2 to 5 texts side by side.
    Compare {
        /// A text to compare (repeat 2 to 5 times).
        #[arg(long = "text", required = true)]
        texts: Vec<String>,

        /// Label for the text in the same position.
        #[arg(long = "label")]
        labels: Vec<String>,

        #[command(flatten)]
        scoring: ScoringArgs,

        #[arg(long)]
        json: bool,
    },
    /// Show configured providers and their availability.
    Providers {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct ScoringArgs {
    /// Skip external providers and score deterministically.
    #[arg(long)]
    no_external: bool,

    /// Low/medium risk boundary.
    #[arg(long, requires = "medium")]
    low: Option<f64>,

    /// Medium/high risk boundary.
    #[arg(long, requires = "low")]
    medium: Option<f64>,
}

impl ScoringArgs {
    fn options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            use_external: !self.no_external,
            thresholds: match (self.low, self.medium) {
                (Some(low), Some(medium)) => Some(Thresholds { low, medium }),
                _ => None,
            },
        }
    }
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            groq_api_key: self.groq_api_key.clone(),
            openrouter_api_key: self.openrouter_api_key.clone(),
            provider_timeout: Duration::from_secs(self.timeout_secs.max(1)),
            local_provider: !self.no_local_provider,
            sentiment_model_dir: self.sentiment_model.clone(),
            ..EngineConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("spinscope v{}", env!("CARGO_PKG_VERSION"));

    let ctx = AnalysisContext::from_config(&cli.engine_config());

    match &cli.command {
        Command::Analyze {
            text,
            file,
            scoring,
            json,
        } => {
            let text = read_input(text.as_deref(), file.as_deref())?;
            validate_text(&text)?;

            let result = analyze(&ctx, &text, &scoring.options())
                .await
                .or_else(|e| fail(e, *json))?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                display::print_analysis(&result);
            }
        }
        Command::Compare {
            texts,
            labels,
            scoring,
            json,
        } => {
            for (i, text) in texts.iter().enumerate() {
                validate_text(text).with_context(|| format!("text {}", i + 1))?;
            }

            let report = compare(&ctx, texts, labels, &scoring.options())
                .await
                .or_else(|e| fail(e, *json))?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::print_comparison(&report);
            }
        }
        Command::Providers { json } => {
            let health = ctx.gateway.health();
            if *json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                display::print_health(&health);
            }
        }
    }

    Ok(())
}

/// With `--json`, engine errors go to stdout as a `{kind, message}` report
/// and the process exits with status 1.
fn fail<T>(err: AnalysisError, json: bool) -> anyhow::Result<T> {
    if json {
        println!("{}", serde_json::to_string_pretty(&err.report())?);
        std::process::exit(1);
    }
    Err(err.into())
}

/// Text from the argument, a file, or stdin, in that order.
fn read_input(text: Option<&str>, file: Option<&std::path::Path>) -> anyhow::Result<String> {
    if let Some(text) = text
        && text != "-"
    {
        return Ok(text.to_string());
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading text from stdin")?;
    Ok(buf)
}

fn validate_text(text: &str) -> anyhow::Result<()> {
    let chars = text.trim().chars().count();
    anyhow::ensure!(chars > 0, "no text provided");
    anyhow::ensure!(
        chars >= MIN_TEXT_CHARS,
        "text too short: {chars} characters (minimum {MIN_TEXT_CHARS})"
    );
    anyhow::ensure!(
        chars <= MAX_TEXT_CHARS,
        "text too long: {chars} characters (maximum {MAX_TEXT_CHARS})"
    );
    Ok(())
}
