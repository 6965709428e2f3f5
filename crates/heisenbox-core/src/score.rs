//! The unified result shape and error taxonomy.
//!
//! `ScoreResult` is the only type that crosses the process boundary and the
//! only type handed back to the caller. Every failure anywhere in the harness
//! collapses into one of the [`ScoreErrorKind`] categories with the sentinel
//! score, so the evolution loop can always rank results without inspecting
//! why a candidate was unusable.

use serde::{Deserialize, Serialize};

/// Failure categories spanning both sides of the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreErrorKind {
    /// Input could not be reduced to any plausible candidate source.
    Extraction,

    /// Candidate source could not be located or decoded in the runner.
    Load,

    /// Child process exceeded the wall-clock budget and was killed.
    Timeout,

    /// Child process exited with a non-zero status before producing a result.
    Crash,

    /// Child exited cleanly but the result artifact is missing or undecodable.
    Protocol,

    /// The scoring pipeline rejected the candidate's output (shape mismatch,
    /// non-finite values, degenerate norm). The expected case for bad
    /// candidates, not a systemic error.
    Evaluation,
}

impl std::fmt::Display for ScoreErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScoreErrorKind::Extraction => "extraction",
            ScoreErrorKind::Load => "load",
            ScoreErrorKind::Timeout => "timeout",
            ScoreErrorKind::Crash => "crash",
            ScoreErrorKind::Protocol => "protocol",
            ScoreErrorKind::Evaluation => "evaluation",
        };
        write!(f, "{s}")
    }
}

/// Error descriptor attached to failure results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreError {
    pub kind: ScoreErrorKind,
    pub message: String,
}

/// The outward-facing evaluation result.
///
/// Exactly one of two shapes: a valid numeric score with diagnostics, or the
/// sentinel score with a populated [`ScoreError`]. Use the constructors; they
/// keep that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Primary objective value. Lower is better; the configured sentinel
    /// (`max_penalty`) marks an unusable candidate.
    pub combined_score: f64,

    /// Position-space variance I1 (diagnostic, success only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_variance: Option<f64>,

    /// Frequency-space variance I2 (diagnostic, success only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_variance: Option<f64>,

    /// Second-derivative smoothness penalty actually applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoothness_penalty: Option<f64>,

    /// Structural complexity penalty actually applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity_penalty: Option<f64>,

    /// Sha256 hex digest of the evaluated source, when the harness knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_digest: Option<String>,

    /// Why the candidate was unusable (failure results only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ScoreError>,
}

impl ScoreResult {
    /// A successful score with both variance diagnostics.
    pub fn success(combined_score: f64, position_variance: f64, frequency_variance: f64) -> Self {
        Self {
            combined_score,
            position_variance: Some(position_variance),
            frequency_variance: Some(frequency_variance),
            smoothness_penalty: None,
            complexity_penalty: None,
            source_digest: None,
            error: None,
        }
    }

    /// A failure result carrying the sentinel score.
    pub fn failure(kind: ScoreErrorKind, message: impl Into<String>, sentinel: f64) -> Self {
        Self {
            combined_score: sentinel,
            position_variance: None,
            frequency_variance: None,
            smoothness_penalty: None,
            complexity_penalty: None,
            source_digest: None,
            error: Some(ScoreError {
                kind,
                message: message.into(),
            }),
        }
    }

    /// Attach the source digest (builder style).
    pub fn with_source_digest(mut self, digest: impl Into<String>) -> Self {
        self.source_digest = Some(digest.into());
        self
    }

    /// Whether this result carries a valid score rather than an error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The error kind, if this is a failure result.
    pub fn error_kind(&self) -> Option<ScoreErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// In-process evaluation errors, mapped onto the taxonomy via [`EvalError::kind`].
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("candidate source could not be read: {0}")]
    SourceUnreadable(#[from] std::io::Error),

    #[error("candidate spec is not a valid document: {0}")]
    SpecUndecodable(#[from] serde_json::Error),

    #[error("invalid candidate parameters: {0}")]
    InvalidParameters(String),

    #[error("candidate returned {actual} samples, grid has {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("candidate output contains non-finite values")]
    NonFinite,

    #[error("candidate output magnitude exceeds ceiling ({max:.3e} > {ceiling:.3e})")]
    AmplitudeExceeded { max: f64, ceiling: f64 },

    #[error("near-zero norm: candidate output is numerically degenerate")]
    NearZeroNorm,

    #[error("near-zero spectral norm after transform")]
    SpectralCollapse,
}

impl EvalError {
    /// Which taxonomy category this error reports as.
    pub fn kind(&self) -> ScoreErrorKind {
        match self {
            EvalError::SourceUnreadable(_) | EvalError::SpecUndecodable(_) => ScoreErrorKind::Load,
            _ => ScoreErrorKind::Evaluation,
        }
    }
}
