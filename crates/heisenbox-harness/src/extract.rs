//! Best-effort extraction of a candidate document from unreliable input.
//!
//! Generator output commonly wraps the candidate spec in prose or a markdown
//! code fence. Extraction is a heuristic, not a parser: it never fails, and
//! when nothing matches it degrades to returning the trimmed input verbatim.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Which heuristic produced the extracted source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Body of the first triple-backtick fenced block.
    FencedBlock,

    /// Suffix starting at the first line that opens a candidate document.
    DocumentStart,

    /// No heuristic matched; the whole input, trimmed.
    Verbatim,
}

/// Extracted candidate source plus provenance.
#[derive(Debug, Clone)]
pub struct ExtractedSource {
    pub code: String,
    pub strategy: ExtractionStrategy,
}

impl ExtractedSource {
    /// Sha256 hex digest of the extracted code, for logging and result
    /// provenance.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.code.as_bytes()))
    }
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Opening fence with optional language tag, captured body, closing fence.
        Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)```").expect("fence regex is valid")
    })
}

/// Reduce an arbitrary input blob to a best-effort candidate document.
///
/// Priority order: first fenced code block; else the suffix from the first
/// line that looks like a document start (`{` or `[` at column 0); else the
/// whole input trimmed.
pub fn extract(raw: &str) -> ExtractedSource {
    if let Some(caps) = fence_regex().captures(raw) {
        return ExtractedSource {
            code: caps[1].trim().to_string(),
            strategy: ExtractionStrategy::FencedBlock,
        };
    }

    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        if line.starts_with('{') || line.starts_with('[') {
            return ExtractedSource {
                code: raw[offset..].trim().to_string(),
                strategy: ExtractionStrategy::DocumentStart,
            };
        }
        offset += line.len();
    }

    ExtractedSource {
        code: raw.trim().to_string(),
        strategy: ExtractionStrategy::Verbatim,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_block_with_language_tag() {
        let raw = "Here is the candidate:\n```json\n{\"type\": \"gaussian\", \"width\": 1.0}\n```\nHope it helps!";
        let out = extract(raw);
        assert_eq!(out.strategy, ExtractionStrategy::FencedBlock);
        assert_eq!(out.code, "{\"type\": \"gaussian\", \"width\": 1.0}");
    }

    #[test]
    fn test_fenced_block_without_language_tag() {
        let raw = "```\n{\"type\": \"sech\", \"width\": 0.7}\n```";
        let out = extract(raw);
        assert_eq!(out.strategy, ExtractionStrategy::FencedBlock);
        assert_eq!(out.code, "{\"type\": \"sech\", \"width\": 0.7}");
    }

    #[test]
    fn test_first_fence_wins() {
        let raw = "```json\n{\"type\": \"boxcar\", \"width\": 2.0}\n```\nand also\n```json\n{\"type\": \"sech\", \"width\": 1.0}\n```";
        let out = extract(raw);
        assert_eq!(out.code, "{\"type\": \"boxcar\", \"width\": 2.0}");
    }

    #[test]
    fn test_document_start_after_prose() {
        let raw = "The improved candidate narrows the width slightly.\n{\"type\": \"gaussian\",\n \"width\": 0.95}\n";
        let out = extract(raw);
        assert_eq!(out.strategy, ExtractionStrategy::DocumentStart);
        assert!(out.code.starts_with('{'));
        assert!(out.code.ends_with('}'));
    }

    #[test]
    fn test_clean_input_is_idempotent() {
        let raw = "{\"type\": \"gaussian\", \"width\": 1.0}";
        let once = extract(raw);
        assert_eq!(once.strategy, ExtractionStrategy::DocumentStart);
        assert_eq!(once.code, raw);
        let twice = extract(&once.code);
        assert_eq!(twice.code, once.code);
    }

    #[test]
    fn test_no_match_degrades_to_verbatim() {
        let raw = "  nothing recognizable here  ";
        let out = extract(raw);
        assert_eq!(out.strategy, ExtractionStrategy::Verbatim);
        assert_eq!(out.code, "nothing recognizable here");
    }

    #[test]
    fn test_empty_input() {
        let out = extract("");
        assert_eq!(out.strategy, ExtractionStrategy::Verbatim);
        assert!(out.code.is_empty());
    }

    #[test]
    fn test_digest_is_stable_hex() {
        let a = extract("{\"type\": \"gaussian\", \"width\": 1.0}");
        let b = extract("{\"type\": \"gaussian\", \"width\": 1.0}");
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }
}
