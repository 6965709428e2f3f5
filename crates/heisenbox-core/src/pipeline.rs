//! The scoring pipeline: validation, normalization, variance integrals,
//! objective assembly.
//!
//! Pure function of (candidate, grid, config); runs inside the isolated
//! runner process. Guards fire in order, before the guarded value feeds any
//! further arithmetic: shape, finiteness, amplitude, norm floor, then the
//! spectral norm floor as an independent second check.

use tracing::debug;

use crate::candidate::CandidateSpec;
use crate::config::ScoringConfig;
use crate::grid::EvaluationGrid;
use crate::score::{EvalError, ScoreResult};
use crate::spectral::{dft, fftshift, Complex};

/// Score a candidate against the uncertainty-product objective.
///
/// Never panics and never returns an error: any pipeline failure becomes a
/// sentinel-score [`ScoreResult`] with an `evaluation` (or `load`) descriptor.
pub fn score(spec: &CandidateSpec, grid: &EvaluationGrid, config: &ScoringConfig) -> ScoreResult {
    match score_inner(spec, grid, config) {
        Ok(result) => result,
        Err(e) => {
            debug!(family = spec.family(), error = %e, "candidate rejected");
            ScoreResult::failure(e.kind(), e.to_string(), config.max_penalty)
        }
    }
}

fn score_inner(
    spec: &CandidateSpec,
    grid: &EvaluationGrid,
    config: &ScoringConfig,
) -> Result<ScoreResult, EvalError> {
    // 1. Invoke the candidate on the grid positions.
    let mut vals = spec.evaluate_on(grid)?;

    // 2. Validate before any arithmetic uses the samples.
    if vals.len() != grid.len() {
        return Err(EvalError::ShapeMismatch {
            expected: grid.len(),
            actual: vals.len(),
        });
    }
    if !vals.iter().all(Complex::is_finite) {
        return Err(EvalError::NonFinite);
    }
    let max_abs = vals.iter().map(Complex::abs).fold(0.0_f64, f64::max);
    if max_abs > config.amplitude_ceiling {
        return Err(EvalError::AmplitudeExceeded {
            max: max_abs,
            ceiling: config.amplitude_ceiling,
        });
    }
    let norm = integrate(vals.iter().map(Complex::norm_sqr), grid.dx());
    if !norm.is_finite() || norm <= config.norm_floor {
        return Err(EvalError::NearZeroNorm);
    }

    // 3. Normalize to unit L2 norm so amplitude choices do not matter.
    let inv = 1.0 / norm.sqrt();
    for v in &mut vals {
        *v = v.scale(inv);
    }

    // 4. Position variance I1 = integral of x^2 |f|^2 dx.
    let i1 = integrate(
        grid.positions()
            .iter()
            .zip(&vals)
            .map(|(x, v)| x * x * v.norm_sqr()),
        grid.dx(),
    );

    // 5. Frequency variance from the centered spectral density.
    let i2 = frequency_variance(&vals, grid, config)?;

    // 6. Objective: cap the sub-metrics, then distance from the bound.
    let i1 = i1.min(config.max_penalty);
    let i2 = i2.min(config.max_penalty);
    let mut combined = (i1 * i2 - config.target).abs();

    // 7. Optional additive regularizers; each degrades to zero on its own
    //    numerical failure rather than aborting the score.
    let smoothness = if config.smoothness_weight > 0.0 {
        let raw = second_derivative_energy(&vals, grid.dx());
        let penalty = config.smoothness_weight * raw;
        Some(if penalty.is_finite() { penalty } else { 0.0 })
    } else {
        None
    };
    let complexity = if config.complexity_weight > 0.0 {
        Some(config.complexity_weight * spec.param_count() as f64)
    } else {
        None
    };
    combined += smoothness.unwrap_or(0.0) + complexity.unwrap_or(0.0);

    combined = combined.min(config.max_penalty);
    if !combined.is_finite() {
        combined = config.max_penalty;
    }

    let mut result = ScoreResult::success(combined, i1, i2);
    result.smoothness_penalty = smoothness;
    result.complexity_penalty = complexity;
    Ok(result)
}

/// Variance of the candidate's centered spectral density.
///
/// The DFT bins are scaled by dx / sqrt(2 pi) (the unitary continuous-FT
/// convention, so Parseval holds up to discretization error) and the density
/// is renormalized to integrate to 1, making the variance insensitive to any
/// residual convention drift. A collapsed spectral norm is an independent
/// failure path.
fn frequency_variance(
    normalized: &[Complex],
    grid: &EvaluationGrid,
    config: &ScoringConfig,
) -> Result<f64, EvalError> {
    let scale = grid.dx() / (2.0 * std::f64::consts::PI).sqrt();
    let spectrum: Vec<f64> = dft(normalized)
        .iter()
        .map(|bin| bin.scale(scale).norm_sqr())
        .collect();
    let density = fftshift(&spectrum);

    let total = integrate(density.iter().copied(), grid.dxi());
    if !total.is_finite() || total <= config.norm_floor {
        return Err(EvalError::SpectralCollapse);
    }

    let weighted = integrate(
        grid.frequencies()
            .iter()
            .zip(&density)
            .map(|(xi, p)| xi * xi * p),
        grid.dxi(),
    );
    Ok(weighted / total)
}

/// Trapezoidal integration over an equally spaced grid.
fn integrate(values: impl Iterator<Item = f64>, step: f64) -> f64 {
    let mut sum = 0.0;
    let mut first = None;
    let mut last = 0.0;
    for v in values {
        if first.is_none() {
            first = Some(v);
        }
        sum += v;
        last = v;
    }
    match first {
        Some(f) => (sum - 0.5 * (f + last)) * step,
        None => 0.0,
    }
}

/// Discrete second-derivative energy: integral of |f''|^2 dx over the
/// interior points, with f'' approximated by the central difference.
fn second_derivative_energy(vals: &[Complex], dx: f64) -> f64 {
    if vals.len() < 3 {
        return 0.0;
    }
    let inv_dx2 = 1.0 / (dx * dx);
    let energy: f64 = vals
        .windows(3)
        .map(|w| {
            let d2 = (w[0] + w[2] - w[1].scale(2.0)).scale(inv_dx2);
            d2.norm_sqr()
        })
        .sum();
    energy * dx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ScoreErrorKind;

    fn setup() -> (EvaluationGrid, ScoringConfig) {
        let config = ScoringConfig::default();
        let grid = EvaluationGrid::new(&config);
        (grid, config)
    }

    fn normalized_gaussian(grid: &EvaluationGrid, config: &ScoringConfig) -> Vec<Complex> {
        let spec = CandidateSpec::Gaussian {
            width: 1.0,
            center: 0.0,
        };
        let mut vals = spec.evaluate_on(grid).unwrap();
        let norm = integrate(vals.iter().map(Complex::norm_sqr), grid.dx());
        assert!(norm > config.norm_floor);
        let inv = 1.0 / norm.sqrt();
        for v in &mut vals {
            *v = v.scale(inv);
        }
        vals
    }

    #[test]
    fn test_normalization_is_unit() {
        let (grid, config) = setup();
        let vals = normalized_gaussian(&grid, &config);
        let norm = integrate(vals.iter().map(Complex::norm_sqr), grid.dx());
        assert!((norm - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_parseval_before_renormalization() {
        let (grid, _config) = setup();
        let vals = normalized_gaussian(&grid, &ScoringConfig::default());
        let scale = grid.dx() / (2.0 * std::f64::consts::PI).sqrt();
        let spectrum: Vec<f64> = dft(&vals)
            .iter()
            .map(|bin| bin.scale(scale).norm_sqr())
            .collect();
        let total = integrate(fftshift(&spectrum).iter().copied(), grid.dxi());
        // Unitary scaling means the spectral density already integrates to ~1.
        assert!((total - 1.0).abs() < 1e-6, "spectral norm was {total}");
    }

    #[test]
    fn test_gaussian_scores_near_bound() {
        let (grid, config) = setup();
        let spec = CandidateSpec::Gaussian {
            width: 1.0,
            center: 0.0,
        };
        let result = score(&spec, &grid, &config);
        assert!(result.is_success(), "unexpected error: {:?}", result.error);
        // The unit-width Gaussian saturates the uncertainty bound: both
        // variances are 1/2 and the product distance is ~0.
        let i1 = result.position_variance.unwrap();
        let i2 = result.frequency_variance.unwrap();
        assert!((i1 - 0.5).abs() < 1e-3, "I1 was {i1}");
        assert!((i2 - 0.5).abs() < 1e-3, "I2 was {i2}");
        assert!(result.combined_score < 1e-2);
        assert!(result.combined_score >= 0.0);
    }

    #[test]
    fn test_wide_gaussian_scores_worse_than_unit() {
        let (grid, config) = setup();
        let unit = score(
            &CandidateSpec::Gaussian {
                width: 1.0,
                center: 0.0,
            },
            &grid,
            &config,
        );
        let wide = score(
            &CandidateSpec::Gaussian {
                width: 1.8,
                center: 0.0,
            },
            &grid,
            &config,
        );
        assert!(unit.combined_score < wide.combined_score);
    }

    #[test]
    fn test_zero_samples_rejected_as_near_zero_norm() {
        let (grid, config) = setup();
        let spec = CandidateSpec::Samples {
            re: vec![0.0; grid.len()],
            im: None,
        };
        let result = score(&spec, &grid, &config);
        assert_eq!(result.error_kind(), Some(ScoreErrorKind::Evaluation));
        assert_eq!(result.combined_score, config.max_penalty);
        assert!(result.error.unwrap().message.contains("near-zero norm"));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let (grid, config) = setup();
        let spec = CandidateSpec::Samples {
            re: vec![1.0, 2.0, 3.0],
            im: None,
        };
        let result = score(&spec, &grid, &config);
        assert_eq!(result.error_kind(), Some(ScoreErrorKind::Evaluation));
        assert!(result.position_variance.is_none());
    }

    #[test]
    fn test_non_finite_samples_rejected() {
        let (grid, config) = setup();
        let mut re = vec![1.0; grid.len()];
        re[7] = f64::NAN;
        let spec = CandidateSpec::Samples { re, im: None };
        let result = score(&spec, &grid, &config);
        assert_eq!(result.error_kind(), Some(ScoreErrorKind::Evaluation));
        assert!(result.error.unwrap().message.contains("non-finite"));
    }

    #[test]
    fn test_amplitude_ceiling_rejected() {
        let (grid, config) = setup();
        let mut re = vec![1.0; grid.len()];
        re[0] = 1e9;
        let spec = CandidateSpec::Samples { re, im: None };
        let result = score(&spec, &grid, &config);
        assert_eq!(result.error_kind(), Some(ScoreErrorKind::Evaluation));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let (grid, config) = setup();
        let spec = CandidateSpec::Sech { width: 0.0 };
        let result = score(&spec, &grid, &config);
        assert_eq!(result.error_kind(), Some(ScoreErrorKind::Evaluation));
    }

    #[test]
    fn test_score_is_capped() {
        let (grid, config) = setup();
        // A very narrow boxcar has huge frequency spread; the combined score
        // must still be clipped to the sentinel ceiling.
        let spec = CandidateSpec::Boxcar { width: 0.05 };
        let result = score(&spec, &grid, &config);
        assert!(result.combined_score <= config.max_penalty);
        assert!(result.combined_score.is_finite());
    }

    #[test]
    fn test_smoothness_regularizer_penalizes_boxcar() {
        let (grid, mut config) = setup();
        config.smoothness_weight = 1e-4;
        let smooth = score(
            &CandidateSpec::Gaussian {
                width: 1.0,
                center: 0.0,
            },
            &grid,
            &config,
        );
        let rough = score(&CandidateSpec::Boxcar { width: 2.0 }, &grid, &config);
        let smooth_pen = smooth.smoothness_penalty.unwrap();
        let rough_pen = rough.smoothness_penalty.unwrap();
        assert!(smooth_pen < rough_pen, "{smooth_pen} vs {rough_pen}");
    }

    #[test]
    fn test_complexity_regularizer_counts_parameters() {
        let (grid, mut config) = setup();
        config.complexity_weight = 0.01;
        let result = score(
            &CandidateSpec::Gaussian {
                width: 1.0,
                center: 0.0,
            },
            &grid,
            &config,
        );
        assert_eq!(result.complexity_penalty, Some(0.02));
    }

    #[test]
    fn test_regularizers_absent_by_default() {
        let (grid, config) = setup();
        let result = score(
            &CandidateSpec::Gaussian {
                width: 1.0,
                center: 0.0,
            },
            &grid,
            &config,
        );
        assert!(result.smoothness_penalty.is_none());
        assert!(result.complexity_penalty.is_none());
    }

    #[test]
    fn test_integrate_trapezoid() {
        // Integral of x over [0, 1] with 11 samples.
        let vals = (0..11).map(|i| i as f64 * 0.1);
        let area = integrate(vals, 0.1);
        assert!((area - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_integrate_empty_is_zero() {
        assert_eq!(integrate(std::iter::empty(), 0.1), 0.0);
    }
}
