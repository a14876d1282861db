//! Public result and settings types (§3, §9.3).
//!
//! `DetectSettings` is a plain `Clone` struct with a `Default` impl,
//! constructed once per call and threaded through the pipeline.

use crate::registry::EraFilter;

/// One detector verdict: `{encoding, confidence, language}` (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    /// Canonical registry name, or `None` for "confidently binary".
    pub encoding: Option<&'static str>,
    /// In `[0.0, 1.0]`.
    pub confidence: f32,
    /// ISO 639-1 language code, when known.
    pub language: Option<&'static str>,
}

impl DetectionResult {
    pub(crate) fn binary() -> Self {
        DetectionResult {
            encoding: None,
            confidence: crate::consts::BINARY_CONFIDENCE,
            language: None,
        }
    }

    pub(crate) fn fallback() -> Self {
        DetectionResult {
            encoding: Some("windows-1252"),
            confidence: crate::consts::FALLBACK_CONFIDENCE,
            language: None,
        }
    }

    pub(crate) fn certain(encoding: &'static str, language: Option<&'static str>) -> Self {
        DetectionResult {
            encoding: Some(encoding),
            confidence: crate::consts::CERTAIN_CONFIDENCE,
            language,
        }
    }
}

/// Which of the three §4.9 confusion-resolution strategies is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfusionStrategy {
    DistinguishingBigram,
    CategoryVote,
    #[default]
    Hybrid,
}

/// Caller-tunable knobs threaded through every `detect`/`detect_all` call.
#[derive(Debug, Clone)]
pub struct DetectSettings {
    pub encoding_era: EraFilter,
    pub confusion_strategy: ConfusionStrategy,
}

impl Default for DetectSettings {
    fn default() -> Self {
        DetectSettings {
            encoding_era: EraFilter::All,
            confusion_strategy: ConfusionStrategy::default(),
        }
    }
}
