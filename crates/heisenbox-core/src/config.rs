//! Scoring configuration: the immutable constants of one evaluator variant.

use serde::{Deserialize, Serialize};

/// Configuration for the scoring pipeline.
///
/// Evaluator variants differ only in these constants (grid extent, target
/// bound, regularizer weights), so they are configuration rather than code.
/// The harness serializes this to JSON and hands it to the isolated runner
/// process on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Half-width L of the position domain [-L, L].
    pub half_width: f64,

    /// Number of grid samples N.
    pub samples: usize,

    /// Theoretical lower bound of the uncertainty product (1/4 for the
    /// Heisenberg product with angular-frequency variance).
    pub target: f64,

    /// Sentinel score for unusable candidates; also caps each sub-metric so
    /// downstream ranking never sees unbounded values.
    pub max_penalty: f64,

    /// Minimum L2 norm below which a candidate counts as degenerate.
    pub norm_floor: f64,

    /// Maximum allowed sample magnitude before a candidate is rejected as
    /// numerically unstable.
    pub amplitude_ceiling: f64,

    /// Weight of the second-derivative smoothness penalty (0 disables).
    pub smoothness_weight: f64,

    /// Weight of the per-parameter structural complexity penalty (0 disables).
    pub complexity_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            half_width: 5.0,
            samples: 512,
            target: 0.25,
            max_penalty: 50.0,
            norm_floor: 1e-15,
            amplitude_ceiling: 1e6,
            smoothness_weight: 0.0,
            complexity_weight: 0.0,
        }
    }
}

impl ScoringConfig {
    /// Grid spacing dx implied by the configured domain and sample count.
    /// Assumes a validated config; a single sample has no finite spacing.
    pub fn dx(&self) -> f64 {
        2.0 * self.half_width / (self.samples as f64 - 1.0)
    }

    /// Check the invariants the grid and pipeline assume.
    ///
    /// Called wherever a config crosses a trust boundary (sandbox spawn,
    /// runner decode), so a malformed config surfaces as a protocol fault
    /// instead of propagating infinities through the arithmetic.
    pub fn validate(&self) -> Result<(), String> {
        if self.samples < 2 {
            return Err(format!("samples must be at least 2, got {}", self.samples));
        }
        if !self.half_width.is_finite() || self.half_width <= 0.0 {
            return Err(format!(
                "half_width must be positive, got {}",
                self.half_width
            ));
        }
        if !self.max_penalty.is_finite() || self.max_penalty <= 0.0 {
            return Err(format!(
                "max_penalty must be positive, got {}",
                self.max_penalty
            ));
        }
        Ok(())
    }
}
