//! Process-level isolation for candidate evaluation.
//!
//! The runner executes in a separate OS process so that a candidate that
//! hangs, corrupts process state, or hard-crashes cannot affect the caller.
//! The parent spawns the runner with a unique result path, waits under a
//! wall-clock timeout, and classifies the outcome; the child is force-killed
//! on expiry (`kill_on_drop`), since a busy loop never cooperates with
//! cancellation.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use heisenbox_core::{ScoreErrorKind, ScoreResult, ScoringConfig};

use crate::scratch::ResultArtifact;

/// Everything the sandbox needs to run one isolated evaluation.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Path to the `heisenbox-runner` binary.
    pub runner: PathBuf,

    /// Wall-clock budget for the child process.
    pub timeout: Duration,

    /// Directory for result artifacts.
    pub scratch_dir: PathBuf,

    /// Scoring constants forwarded to the runner.
    pub scoring: ScoringConfig,
}

/// Cap on stderr carried into a crash message.
const STDERR_EXCERPT_LEN: usize = 2000;

/// Run the candidate source at `source` in an isolated runner process.
///
/// Every outcome is classified into a [`ScoreResult`]; this function never
/// returns an error and never leaves the result artifact behind.
pub async fn run_isolated(source: &Path, config: &SandboxConfig) -> ScoreResult {
    let sentinel = config.scoring.max_penalty;
    let fail = |kind, msg: String| ScoreResult::failure(kind, msg, sentinel);

    // Guard is held to the end of the function; the artifact is removed on
    // every branch, including the untrusted one a killed child may have
    // partially written.
    let artifact = ResultArtifact::reserve(&config.scratch_dir);

    if let Err(msg) = config.scoring.validate() {
        return fail(
            ScoreErrorKind::Protocol,
            format!("invalid scoring config: {msg}"),
        );
    }

    let scoring_json = match serde_json::to_string(&config.scoring) {
        Ok(s) => s,
        Err(e) => {
            return fail(
                ScoreErrorKind::Protocol,
                format!("could not encode scoring config: {e}"),
            )
        }
    };

    debug!(
        runner = %config.runner.display(),
        source = %source.display(),
        timeout_ms = config.timeout.as_millis() as u64,
        "spawning runner"
    );

    let spawned = Command::new(&config.runner)
        .arg("--source")
        .arg(source)
        .arg("--result")
        .arg(artifact.path())
        .arg("--config")
        .arg(&scoring_json)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match spawned {
        Ok(child) => child,
        Err(e) => {
            return fail(
                ScoreErrorKind::Crash,
                format!("failed to spawn runner {}: {e}", config.runner.display()),
            )
        }
    };

    let output = match tokio::time::timeout(config.timeout, child.wait_with_output()).await {
        Err(_elapsed) => {
            // Dropping the wait future kills the child. Whatever it may have
            // written after the deadline is not trusted; the guard removes it.
            warn!(
                timeout_ms = config.timeout.as_millis() as u64,
                "runner exceeded wall-clock budget, killed"
            );
            return fail(
                ScoreErrorKind::Timeout,
                format!(
                    "evaluation exceeded {:.1}s wall-clock budget",
                    config.timeout.as_secs_f64()
                ),
            );
        }
        Ok(Err(e)) => {
            return fail(
                ScoreErrorKind::Crash,
                format!("failed waiting for runner: {e}"),
            )
        }
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT_LEN).collect();
        return fail(
            ScoreErrorKind::Crash,
            format!("runner exited with status {code}: {excerpt}"),
        );
    }

    if !artifact.exists() {
        return fail(
            ScoreErrorKind::Protocol,
            "runner exited cleanly but produced no result file".to_string(),
        );
    }

    let payload = match tokio::fs::read_to_string(artifact.path()).await {
        Ok(p) => p,
        Err(e) => {
            return fail(
                ScoreErrorKind::Protocol,
                format!("could not read result file: {e}"),
            )
        }
    };

    match serde_json::from_str::<ScoreResult>(&payload) {
        Ok(result) => result,
        Err(e) => fail(
            ScoreErrorKind::Protocol,
            format!("result file is not a valid score result: {e}"),
        ),
    }
}
