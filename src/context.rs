//! Per-invocation scratch state (§3 Context, §5 "Per-invocation state").
//!
//! Owned exclusively by one `detect`/`detect_all` call and discarded at
//! return. Never shared across threads, unlike the three process-wide
//! caches in `model.rs`/`confusion.rs`/`registry.rs`.

use ahash::HashMap;

/// Structural evidence collected by the CJK gate and structural scoring
/// stages for one multi-byte candidate, memoised so later stages don't
/// re-scan the buffer. The denominator for these ratios is the buffer-wide
/// non-ASCII byte count, which is shape-independent and lives on `Context`
/// itself rather than being re-derived per shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralStats {
    pub valid_mb_bytes: usize,
    pub lead_byte_diversity: usize,
}

impl StructuralStats {
    pub fn structural_score(&self, total_non_ascii_bytes: usize) -> f32 {
        if total_non_ascii_bytes == 0 {
            0.0
        } else {
            self.valid_mb_bytes as f32 / total_non_ascii_bytes as f32
        }
    }
}

#[derive(Default)]
pub struct Context {
    /// `(encoding name, buffer length) -> structural stats`, reused between
    /// the CJK gate (§4.6) and structural scoring (§4.7).
    pub analysis_cache: HashMap<(&'static str, usize), StructuralStats>,
    /// Lazily computed; `None` until the CJK gate or structural scoring
    /// first needs it.
    non_ascii_count: Option<usize>,
    /// Populated by the CJK gate, reused by structural scoring (§4.7).
    pub mb_scores: HashMap<&'static str, f32>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn non_ascii_count(&mut self, bytes: &[u8]) -> usize {
        *self
            .non_ascii_count
            .get_or_insert_with(|| bytes.iter().filter(|&&b| b >= 0x80).count())
    }
}
