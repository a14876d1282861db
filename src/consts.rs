//! Tunable constants for the detection pipeline.
//!
//! Kept in one place so the numeric knobs referenced across stage modules
//! aren't scattered as magic numbers.

/// Above this fraction of C0 control bytes, the binary gate (§4.2) halts the
/// pipeline and reports "confidently binary".
pub const BINARY_GATE_CONTROL_RATIO: f32 = 0.01;

/// Confidence reported when the binary gate fires.
pub const BINARY_CONFIDENCE: f32 = 0.95;

/// Confidence reported by the universal fallback (§4.11).
pub const FALLBACK_CONFIDENCE: f32 = 0.10;

/// Confidence reported by BOM and escape-sequence short circuits.
pub const CERTAIN_CONFIDENCE: f32 = 1.0;

/// Minimum fraction of bytes that must participate in structurally valid
/// multi-byte sequences for a CJK-capable candidate to survive the CJK gate
/// (§4.6).
pub const CJK_GATE_MIN_STRUCTURAL_RATIO: f32 = 0.05;

/// Bigram score below which a single-byte candidate is not considered
/// "confident" and the universal fallback takes over instead (§7, open
/// question; resolved here, see DESIGN.md).
pub const BIGRAM_CONFIDENCE_THRESHOLD: f32 = 0.15;

/// Era tiebreak margin: an in-era candidate within this fraction of the
/// leader's score displaces an out-of-era leader (§4.10).
pub const ERA_TIEBREAK_MARGIN: f32 = 0.9;

/// Below this many bytes, bigram scoring is skipped entirely (§4.8).
pub const MIN_BYTES_FOR_BIGRAM: usize = 2;

/// Size of a bigram table: one entry per `(byte_hi << 8) | byte_lo`.
pub const BIGRAM_TABLE_SIZE: usize = 65_536;

/// Fixed-point scale used when packing/unpacking bigram log-probabilities
/// into the `u16` table entries of the on-disk model format (§6).
pub const FIXED_POINT_SCALE: f32 = 4096.0;

/// Version tag written to the head of `models.bin` (§6).
pub const MODEL_FORMAT_VERSION: u16 = 1;
