//! The evaluation façade: the single public entry point.
//!
//! Normalizes heterogeneous candidate input, drives extraction, persists the
//! candidate to a scratch file, delegates to the process sandbox, and maps
//! every failure onto the unified result taxonomy. Nothing escapes to the
//! caller as an error or panic; the scratch file is deleted on every path.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::info;
use uuid::Uuid;

use heisenbox_core::{CandidateSpec, ScoreErrorKind, ScoreResult, ScoringConfig};

use crate::extract::extract;
use crate::sandbox::{run_isolated, SandboxConfig};

/// A candidate in any of the forms the evolution loop produces.
#[derive(Debug, Clone)]
pub enum CandidateInput {
    /// Inline source text, possibly wrapped in prose or a markdown fence.
    SourceText(String),

    /// Path to a candidate document on disk.
    SourcePath(PathBuf),

    /// An already-parsed candidate; its backing source is materialized by
    /// re-serialization.
    Spec(CandidateSpec),
}

/// Harness-level configuration.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Wall-clock budget per evaluation.
    pub timeout: Duration,

    /// Runner binary override. Defaults to `heisenbox-runner` next to the
    /// current executable.
    pub runner: Option<PathBuf>,

    /// Scratch directory override. Defaults to the system temp directory.
    pub scratch_dir: Option<PathBuf>,

    /// Scoring constants forwarded into the isolated process.
    pub scoring: ScoringConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            runner: None,
            scratch_dir: None,
            scoring: ScoringConfig::default(),
        }
    }
}

/// Evaluates candidates in isolated runner processes.
///
/// Calls are independent; an `Evaluator` may be shared and called
/// concurrently, since every call owns its scratch and result files.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: HarnessConfig,
}

/// Keeps the candidate source alive for the duration of one evaluation.
/// Scratch sources delete themselves when this drops.
enum SourceHolder {
    Scratch(NamedTempFile),
    Borrowed(PathBuf),
}

impl SourceHolder {
    fn path(&self) -> &Path {
        match self {
            SourceHolder::Scratch(file) => file.path(),
            SourceHolder::Borrowed(path) => path,
        }
    }
}

impl Evaluator {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Evaluator with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(HarnessConfig::default())
    }

    /// Evaluate one candidate.
    ///
    /// Always returns a well-formed [`ScoreResult`]; failures carry the
    /// sentinel score and an error descriptor, never an exception.
    pub async fn evaluate(&self, input: CandidateInput) -> ScoreResult {
        let eval_id = Uuid::new_v4();
        let sentinel = self.config.scoring.max_penalty;
        let scratch_dir = self
            .config
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        // Normalize the input into a loadable source file.
        let mut digest = None;
        let holder = match input {
            CandidateInput::SourceText(text) => {
                let extracted = extract(&text);
                if extracted.code.is_empty() {
                    return ScoreResult::failure(
                        ScoreErrorKind::Extraction,
                        "input reduced to empty candidate source",
                        sentinel,
                    );
                }
                let d = extracted.digest();
                info!(
                    event = "eval.extracted",
                    eval_id = %eval_id,
                    strategy = ?extracted.strategy,
                    source_digest = %d,
                );
                digest = Some(d);
                match persist(&extracted.code, &scratch_dir) {
                    Ok(file) => SourceHolder::Scratch(file),
                    Err(e) => {
                        return ScoreResult::failure(
                            ScoreErrorKind::Load,
                            format!("could not persist candidate source: {e}"),
                            sentinel,
                        )
                    }
                }
            }
            CandidateInput::SourcePath(path) => {
                if !path.exists() {
                    return ScoreResult::failure(
                        ScoreErrorKind::Load,
                        format!("candidate source not found: {}", path.display()),
                        sentinel,
                    );
                }
                SourceHolder::Borrowed(path)
            }
            CandidateInput::Spec(spec) => {
                let serialized = match serde_json::to_string(&spec) {
                    Ok(s) => s,
                    Err(e) => {
                        return ScoreResult::failure(
                            ScoreErrorKind::Load,
                            format!("candidate spec has no loadable source form: {e}"),
                            sentinel,
                        )
                    }
                };
                match persist(&serialized, &scratch_dir) {
                    Ok(file) => SourceHolder::Scratch(file),
                    Err(e) => {
                        return ScoreResult::failure(
                            ScoreErrorKind::Load,
                            format!("could not persist candidate source: {e}"),
                            sentinel,
                        )
                    }
                }
            }
        };

        let sandbox = SandboxConfig {
            runner: self.runner_path(),
            timeout: self.config.timeout,
            scratch_dir,
            scoring: self.config.scoring.clone(),
        };

        info!(event = "eval.started", eval_id = %eval_id);
        let mut result = run_isolated(holder.path(), &sandbox).await;
        if result.source_digest.is_none() {
            result.source_digest = digest;
        }
        info!(
            event = "eval.finished",
            eval_id = %eval_id,
            combined_score = result.combined_score,
            success = result.is_success(),
        );
        result
        // holder drops here; scratch sources are removed on every path.
    }

    fn runner_path(&self) -> PathBuf {
        if let Some(runner) = &self.config.runner {
            return runner.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("heisenbox-runner")))
            .unwrap_or_else(|| PathBuf::from("heisenbox-runner"))
    }
}

fn persist(code: &str, scratch_dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("heisenbox-src-")
        .suffix(".json")
        .tempfile_in(scratch_dir)?;
    file.write_all(code.as_bytes())?;
    file.flush()?;
    Ok(file)
}
