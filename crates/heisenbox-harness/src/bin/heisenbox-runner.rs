//! Isolated evaluation runner.
//!
//! Spawned by the sandbox, one process per candidate. Loads the candidate
//! document from `--source`, runs the scoring pipeline, and writes the
//! `ScoreResult` JSON to `--result`. Every catchable fault is written as an
//! error result before exiting 0; only a hard crash or an external kill
//! leaves no artifact behind.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use heisenbox_core::{
    score, CandidateSpec, EvalError, EvaluationGrid, ScoreErrorKind, ScoreResult, ScoringConfig,
};

#[derive(Parser)]
#[command(name = "heisenbox-runner")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scores one candidate in isolation; internal to heisenbox", long_about = None)]
struct Args {
    /// Path to the candidate source document.
    #[arg(long)]
    source: PathBuf,

    /// Path to write the score result JSON to.
    #[arg(long)]
    result: PathBuf,

    /// Scoring configuration as inline JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<String>,
}

fn main() {
    let args = Args::parse();
    let result = run(&args);
    if let Err(e) = write_result(&args.result, &result) {
        eprintln!("heisenbox-runner: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> ScoreResult {
    // The config comes from the parent, not the candidate; a bad one is a
    // protocol fault, reported with the default sentinel.
    let config = match &args.config {
        None => ScoringConfig::default(),
        Some(raw) => match serde_json::from_str::<ScoringConfig>(raw) {
            Ok(config) => config,
            Err(e) => {
                return ScoreResult::failure(
                    ScoreErrorKind::Protocol,
                    format!("scoring config is undecodable: {e}"),
                    ScoringConfig::default().max_penalty,
                );
            }
        },
    };
    if let Err(msg) = config.validate() {
        return ScoreResult::failure(
            ScoreErrorKind::Protocol,
            format!("invalid scoring config: {msg}"),
            ScoringConfig::default().max_penalty,
        );
    }

    match load_and_score(args, &config) {
        Ok(result) => result,
        Err(e) => ScoreResult::failure(e.kind(), e.to_string(), config.max_penalty),
    }
}

fn load_and_score(args: &Args, config: &ScoringConfig) -> Result<ScoreResult, EvalError> {
    let raw = std::fs::read_to_string(&args.source)?;
    let spec: CandidateSpec = serde_json::from_str(&raw)?;
    let grid = EvaluationGrid::new(config);
    Ok(score(&spec, &grid, config))
}

fn write_result(path: &std::path::Path, result: &ScoreResult) -> anyhow::Result<()> {
    let payload = serde_json::to_string(result).context("encoding score result")?;
    std::fs::write(path, payload)
        .with_context(|| format!("writing score result to {}", path.display()))?;
    Ok(())
}
