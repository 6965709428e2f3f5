//! The sampling grid shared by every scoring step.

use crate::config::ScoringConfig;

/// Immutable position/frequency sampling of the evaluation domain.
///
/// Positions are N equally spaced samples over [-L, L]. Frequencies are the
/// centered angular frequencies implied by a DFT of size N with that spacing,
/// i.e. xi_j = 2 pi (j - floor(N/2)) / (N dx), matching the bin order
/// produced by [`crate::spectral::fftshift`].
#[derive(Debug, Clone)]
pub struct EvaluationGrid {
    positions: Vec<f64>,
    frequencies: Vec<f64>,
    dx: f64,
    dxi: f64,
}

impl EvaluationGrid {
    /// Build the grid for a scoring configuration.
    pub fn new(config: &ScoringConfig) -> Self {
        let n = config.samples;
        let dx = config.dx();
        let half = n / 2;

        let positions = (0..n)
            .map(|i| -config.half_width + dx * i as f64)
            .collect();

        let dxi = 2.0 * std::f64::consts::PI / (n as f64 * dx);
        let frequencies = (0..n)
            .map(|j| dxi * (j as f64 - half as f64))
            .collect();

        Self {
            positions,
            frequencies,
            dx,
            dxi,
        }
    }

    /// Number of samples N.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position samples over [-L, L].
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Centered angular frequency samples.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Position spacing.
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Frequency spacing.
    pub fn dxi(&self) -> f64 {
        self.dxi
    }
}
