//! Incremental front-end (§5 "Incremental front-end", §6 Library API).
//!
//! Accumulates chunks and flushes through the core pipeline on `close`.
//! Not thread-safe, since it owns a growing buffer, but distinct instances
//! in distinct threads are independent.

use crate::entity::{DetectSettings, DetectionResult};
use crate::pipeline;

pub struct Detector {
    buffer: Vec<u8>,
    settings: DetectSettings,
}

impl Detector {
    pub fn new(settings: DetectSettings) -> Self {
        Detector { buffer: Vec::new(), settings }
    }

    pub fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Runs the full pipeline over everything fed so far and returns the
    /// result, without clearing the buffer: a caller may `feed` more and
    /// `close` again.
    pub fn close(&mut self) -> DetectionResult {
        pipeline::detect(&self.buffer, &self.settings)
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl Default for Detector {
    fn default() -> Self {
        Detector::new(DetectSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feeding_in_chunks_matches_feeding_all_at_once() {
        let mut incremental = Detector::default();
        incremental.feed(b"The quick brown ");
        incremental.feed(b"fox jumps over the lazy dog.");
        let chunked = incremental.close();

        let whole = pipeline::detect(b"The quick brown fox jumps over the lazy dog.", &DetectSettings::default());
        assert_eq!(chunked.encoding, whole.encoding);
    }

    #[test]
    fn reset_clears_accumulated_bytes() {
        let mut detector = Detector::default();
        detector.feed(&[0xEF, 0xBB, 0xBF]);
        detector.reset();
        detector.feed(b"plain ascii");
        let result = detector.close();
        assert_ne!(result.encoding, Some("utf-8-sig"));
    }

    #[test]
    fn close_without_any_feed_is_the_empty_buffer_fallback() {
        let mut detector = Detector::default();
        let result = detector.close();
        assert_eq!(result.encoding, Some("windows-1252"));
        assert_eq!(result.confidence, 0.10);
    }
}
