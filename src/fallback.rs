//! Stage 10: universal fallback (§4.11).
//!
//! Reached only when every candidate has been eliminated, or the best
//! survivor's score is below the confidence threshold. The empty-buffer
//! case and the general "nothing survived" case share the same result.

use crate::entity::DetectionResult;

/// `{windows-1252, 0.10, null}`, used both for the empty buffer (§4.1) and
/// the general non-binary, no-acceptable-candidate case (§4.11).
pub fn universal_fallback() -> DetectionResult {
    DetectionResult::fallback()
}
