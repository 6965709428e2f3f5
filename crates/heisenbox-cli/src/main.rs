//! heisenbox CLI - score candidates from the command line.
//!
//! ## Commands
//!
//! - `evaluate`: run one candidate through the sandboxed harness
//! - `extract`: show what the extractor would make of raw input

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use heisenbox_harness::{extract, CandidateInput, Evaluator, HarnessConfig};

#[derive(Parser)]
#[command(name = "heisenbox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sandboxed evaluation harness for evolved wave-function candidates", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one candidate in an isolated runner process
    Evaluate {
        /// Path to a candidate source file
        #[arg(short, long, conflicts_with = "text")]
        input: Option<PathBuf>,

        /// Inline candidate source (may be markdown-fenced)
        #[arg(short, long)]
        text: Option<String>,

        /// Wall-clock budget in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// Runner binary override (default: heisenbox-runner next to this executable)
        #[arg(long)]
        runner: Option<PathBuf>,

        /// Pretty-print the result JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Show what the extractor reduces raw input to
    Extract {
        /// Path to the raw input file
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    match cli.command {
        Commands::Evaluate {
            input,
            text,
            timeout_secs,
            runner,
            pretty,
        } => {
            let candidate = match (input, text) {
                (Some(path), None) => CandidateInput::SourcePath(path),
                (None, Some(text)) => CandidateInput::SourceText(text),
                _ => bail!("exactly one of --input or --text is required"),
            };

            let evaluator = Evaluator::new(HarnessConfig {
                timeout: Duration::from_secs(timeout_secs),
                runner,
                ..HarnessConfig::default()
            });
            let result = evaluator.evaluate(candidate).await;

            let rendered = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{rendered}");
        }

        Commands::Extract { input } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let extracted = extract(&raw);
            eprintln!(
                "strategy: {:?}, digest: {}",
                extracted.strategy,
                extracted.digest()
            );
            println!("{}", extracted.code);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
