//! heisenbox harness: turns unreliable candidate input into a scored result.
//!
//! The façade ([`Evaluator`]) accepts raw text (possibly markdown-fenced), a
//! file path, or an already-parsed [`heisenbox_core::CandidateSpec`]; extracts
//! a loadable candidate document; writes it to a uniquely named scratch file;
//! and hands it to the process sandbox, which runs the `heisenbox-runner`
//! binary under a wall-clock timeout and classifies every outcome into the
//! unified [`heisenbox_core::ScoreResult`] shape. Scratch files and result
//! artifacts are deleted on every exit path.
//!
//! # Modules
//!
//! - [`extract`] — best-effort candidate-source extraction with provenance
//! - [`scratch`] — uniquely named, RAII-guarded temporary artifacts
//! - [`sandbox`] — child-process spawn, bounded wait, outcome classification
//! - [`facade`]  — the single public entry point, `Evaluator::evaluate`

pub mod extract;
pub mod facade;
pub mod sandbox;
pub mod scratch;

pub use extract::{extract, ExtractedSource, ExtractionStrategy};
pub use facade::{CandidateInput, Evaluator, HarnessConfig};
pub use sandbox::{run_isolated, SandboxConfig};
pub use scratch::ResultArtifact;
