//! heisenbox core: the scoring pipeline that runs inside the isolated
//! evaluation process, plus the result taxonomy shared with the harness.
//!
//! A candidate is a small JSON document selecting one of a closed set of
//! analytic wave-function families (or supplying raw samples). The pipeline
//! samples it on a fixed grid, normalizes it, and scores the uncertainty
//! product of its position-space and frequency-space variances against the
//! theoretical lower bound.

pub mod candidate;
pub mod config;
pub mod grid;
pub mod pipeline;
pub mod score;
pub mod spectral;

pub use candidate::CandidateSpec;
pub use config::ScoringConfig;
pub use grid::EvaluationGrid;
pub use pipeline::score;
pub use score::{EvalError, ScoreError, ScoreErrorKind, ScoreResult};
pub use spectral::Complex;
