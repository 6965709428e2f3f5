//! The candidate contract: a closed set of analytic wave-function families.
//!
//! Instead of loading arbitrary code, the isolated runner accepts a small
//! tagged document selecting one family and its numeric parameters. Each
//! family is a pure function of its parameters; amplitude is irrelevant
//! because the pipeline normalizes before scoring.

use serde::{Deserialize, Serialize};

use crate::grid::EvaluationGrid;
use crate::score::EvalError;
use crate::spectral::Complex;

/// A candidate wave-function specification.
///
/// The `type` tag selects the family; unknown tags fail at deserialization
/// time, which the runner reports as a load failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CandidateSpec {
    /// exp(-(x - center)^2 / (2 width^2))
    Gaussian {
        width: f64,
        #[serde(default)]
        center: f64,
    },

    /// gamma / (x^2 + gamma^2)
    Lorentzian { gamma: f64 },

    /// sech(x / width)
    Sech { width: f64 },

    /// 1 on (-width/2, width/2), 0 elsewhere.
    Boxcar { width: f64 },

    /// H_n(x / width) exp(-x^2 / (2 width^2)), physicists' Hermite H_n.
    HermiteGaussian { order: u32, width: f64 },

    /// Raw complex samples; must match the grid length to score.
    Samples {
        re: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        im: Option<Vec<f64>>,
    },
}

impl CandidateSpec {
    /// Short family name, used in tracing output.
    pub fn family(&self) -> &'static str {
        match self {
            CandidateSpec::Gaussian { .. } => "gaussian",
            CandidateSpec::Lorentzian { .. } => "lorentzian",
            CandidateSpec::Sech { .. } => "sech",
            CandidateSpec::Boxcar { .. } => "boxcar",
            CandidateSpec::HermiteGaussian { .. } => "hermite_gaussian",
            CandidateSpec::Samples { .. } => "samples",
        }
    }

    /// Number of declared numeric parameters, for the complexity regularizer.
    pub fn param_count(&self) -> usize {
        match self {
            CandidateSpec::Gaussian { .. } => 2,
            CandidateSpec::Lorentzian { .. } => 1,
            CandidateSpec::Sech { .. } => 1,
            CandidateSpec::Boxcar { .. } => 1,
            CandidateSpec::HermiteGaussian { .. } => 2,
            CandidateSpec::Samples { .. } => 0,
        }
    }

    /// Sample the candidate on the grid positions.
    ///
    /// Analytic families validate their parameters here and always return
    /// exactly `grid.len()` samples; the `samples` family returns whatever
    /// was supplied, leaving the shape check to the pipeline.
    pub fn evaluate_on(&self, grid: &EvaluationGrid) -> Result<Vec<Complex>, EvalError> {
        self.validate()?;
        let xs = grid.positions();
        let vals = match self {
            CandidateSpec::Gaussian { width, center } => xs
                .iter()
                .map(|x| {
                    let u = (x - center) / width;
                    Complex::from((-0.5 * u * u).exp())
                })
                .collect(),

            CandidateSpec::Lorentzian { gamma } => xs
                .iter()
                .map(|x| Complex::from(gamma / (x * x + gamma * gamma)))
                .collect(),

            CandidateSpec::Sech { width } => xs
                .iter()
                .map(|x| Complex::from(1.0 / (x / width).cosh()))
                .collect(),

            CandidateSpec::Boxcar { width } => xs
                .iter()
                .map(|x| {
                    if x.abs() < width / 2.0 {
                        Complex::from(1.0)
                    } else {
                        Complex::ZERO
                    }
                })
                .collect(),

            CandidateSpec::HermiteGaussian { order, width } => xs
                .iter()
                .map(|x| {
                    let u = x / width;
                    Complex::from(hermite(*order, u) * (-0.5 * u * u).exp())
                })
                .collect(),

            CandidateSpec::Samples { re, im } => {
                let zeros;
                let im = match im {
                    Some(im) => im.as_slice(),
                    None => {
                        zeros = vec![0.0; re.len()];
                        zeros.as_slice()
                    }
                };
                re.iter()
                    .zip(im)
                    .map(|(&re, &im)| Complex::new(re, im))
                    .collect()
            }
        };
        Ok(vals)
    }

    fn validate(&self) -> Result<(), EvalError> {
        let err = |msg: String| Err(EvalError::InvalidParameters(msg));
        match self {
            CandidateSpec::Gaussian { width, center } => {
                if !width.is_finite() || *width <= 0.0 {
                    return err(format!("gaussian width must be positive, got {width}"));
                }
                if !center.is_finite() {
                    return err("gaussian center must be finite".into());
                }
            }
            CandidateSpec::Lorentzian { gamma } => {
                if !gamma.is_finite() || *gamma <= 0.0 {
                    return err(format!("lorentzian gamma must be positive, got {gamma}"));
                }
            }
            CandidateSpec::Sech { width } | CandidateSpec::Boxcar { width } => {
                if !width.is_finite() || *width <= 0.0 {
                    return err(format!("{} width must be positive, got {width}", self.family()));
                }
            }
            CandidateSpec::HermiteGaussian { order, width } => {
                if !width.is_finite() || *width <= 0.0 {
                    return err(format!("hermite width must be positive, got {width}"));
                }
                if *order > 32 {
                    return err(format!("hermite order {order} exceeds supported maximum 32"));
                }
            }
            CandidateSpec::Samples { re, im } => {
                if let Some(im) = im {
                    if im.len() != re.len() {
                        return err(format!(
                            "samples re/im length mismatch: {} vs {}",
                            re.len(),
                            im.len()
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Physicists' Hermite polynomial H_n(u) via the three-term recurrence.
fn hermite(n: u32, u: f64) -> f64 {
    match n {
        0 => 1.0,
        1 => 2.0 * u,
        _ => {
            let mut h_prev = 1.0;
            let mut h = 2.0 * u;
            for k in 1..n {
                let next = 2.0 * u * h - 2.0 * (k as f64) * h_prev;
                h_prev = h;
                h = next;
            }
            h
        }
    }
}
