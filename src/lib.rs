//! chardetect-rs
//! =============
//!
//! A character-encoding detector: given an opaque byte buffer, returns the
//! most likely text encoding, an optional ISO 639-1 language tag, and a
//! calibrated confidence. Detection runs through an ordered pipeline: BOM
//! sniffing, binary-data gating, escape-sequence probing, multi-byte
//! structural validation, single-byte bigram scoring, confusion-group
//! resolution, era-based tiebreaking, and language inference, so that each
//! concern has its own algorithm and failure mode instead of one monolithic
//! heuristic.
//!
//! # Library
//!
//! ```
//! use chardetect_rs::{detect, DetectSettings};
//!
//! let result = detect(b"Bonjour le monde", &DetectSettings::default());
//! assert!(result.encoding.is_some());
//! ```
//!
//! For streaming input, use [`Detector`]:
//!
//! ```
//! use chardetect_rs::Detector;
//!
//! let mut detector = Detector::default();
//! detector.feed(b"The quick brown ");
//! detector.feed(b"fox jumps over the lazy dog.");
//! let result = detector.close();
//! assert!(result.encoding.is_some());
//! ```
//!
//! # CLI
//!
//! A `chardetect` binary is included behind the `cli` feature:
//!
//! ```shell
//! cargo install chardetect-rs --features cli
//! chardetect some-file.txt
//! ```

mod bigram_scoring;
mod binary_gate;
mod bom;
pub mod confusion;
pub mod consts;
pub mod context;
pub mod entity;
pub mod error;
mod era_tiebreak;
mod escape;
mod fallback;
mod incremental;
mod language;
pub mod model;
mod pipeline;
pub mod registry;
pub mod singlebyte;
mod structural;
mod validity;

use std::fs::File;
use std::io::Read;
use std::path::Path;

pub use entity::{ConfusionStrategy, DetectSettings, DetectionResult};
pub use error::{DetectError, DetectResult};
pub use incremental::Detector;
pub use registry::{Era, EraFilter};

/// Runs the full detection pipeline and returns the single most likely
/// result (§3, §6).
pub fn detect(bytes: &[u8], settings: &DetectSettings) -> DetectionResult {
    pipeline::detect(bytes, settings)
}

/// Runs the full detection pipeline and returns every surviving candidate,
/// most likely first (§6).
pub fn detect_all(bytes: &[u8], settings: &DetectSettings) -> Vec<DetectionResult> {
    pipeline::detect_all(bytes, settings)
}

/// Reads `path` and runs [`detect`] on its contents.
pub fn detect_path(path: &Path, settings: &DetectSettings) -> DetectResult<DetectionResult> {
    let mut file = File::open(path).map_err(|source| DetectError::InputIo { path: path.to_owned(), source })?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).map_err(|source| DetectError::InputIo { path: path.to_owned(), source })?;
    Ok(detect(&buffer, settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_and_detect_all_agree_on_the_winner() {
        let settings = DetectSettings::default();
        let bytes = b"The quick brown fox jumps over the lazy dog.";
        let single = detect(bytes, &settings);
        let all = detect_all(bytes, &settings);
        assert_eq!(single.encoding, all[0].encoding);
    }

    #[test]
    fn detect_path_reports_missing_file_as_input_io_error() {
        let result = detect_path(Path::new("/nonexistent/path/for/chardetect-rs/tests"), &DetectSettings::default());
        assert!(matches!(result, Err(DetectError::InputIo { .. })));
    }
}
