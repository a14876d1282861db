//! Stage 9: era tiebreak (§4.10).
//!
//! Among ranked candidates, prefers one in the caller's requested era over
//! an out-of-era leader, but only when the in-era candidate is within the
//! margin of the leader's score. A clearly better out-of-era leader is
//! never displaced.

use crate::consts::ERA_TIEBREAK_MARGIN;
use crate::registry::{EncodingInfo, EraFilter};

/// A scored candidate ready for the final ranking pass.
pub struct RankedCandidate<'a> {
    pub info: &'a EncodingInfo,
    pub score: f32,
}

/// Applies the era tiebreak to an already-score-sorted (descending)
/// candidate list. Returns the index of the winner.
pub fn apply<'a>(candidates: &[RankedCandidate<'a>], era_filter: EraFilter) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    let EraFilter::Only(requested) = era_filter else {
        return Some(0);
    };
    if candidates[0].info.era == requested {
        return Some(0);
    }
    let leader_score = candidates[0].score;
    let threshold = leader_score * ERA_TIEBREAK_MARGIN;
    candidates
        .iter()
        .position(|c| c.info.era == requested && c.score >= threshold)
        .or(Some(0))
}
