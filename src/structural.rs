//! Stage 5 (CJK gate, §4.6) and Stage 6 (structural scoring, §4.7).
//!
//! Both stages share a single per-encoding byte-range table describing what
//! a "structurally valid multi-byte sequence" looks like for each of the
//! five candidate encodings: one pass over the buffer accumulating a ratio,
//! scoped to exactly the five CJK supersets named in §4.6, each described
//! by its own lead/trail byte ranges rather than a general mess heuristic.

use crate::context::{Context, StructuralStats};
use crate::consts::CJK_GATE_MIN_STRUCTURAL_RATIO;
use crate::registry::EncodingInfo;

/// One step of a lead-byte scan: how many trail bytes follow, and the valid
/// byte ranges for lead and trail positions.
struct MultiByteShape {
    name: &'static str,
    /// Returns the full sequence length (including the lead byte) if `lead`
    /// is a valid lead byte for this encoding, `None` if it is single-byte
    /// ASCII-passthrough (not counted) or definitely not a lead byte.
    classify_lead: fn(u8) -> Option<usize>,
    /// Whether `byte` is a legal continuation/trail byte at `pos` (1-based
    /// offset from the lead byte) within a sequence of `len` total bytes.
    is_valid_trail: fn(pos: usize, len: usize, byte: u8) -> bool,
}

fn gb18030_lead(b: u8) -> Option<usize> {
    // GB18030 lead bytes 0x81-0xFE; actual length (2 or 4) depends on the
    // second byte, but callers scan byte-by-byte so we report the minimum
    // admissible length and let `is_valid_trail` narrow it down.
    if (0x81..=0xFE).contains(&b) {
        Some(2)
    } else {
        None
    }
}
fn gb18030_trail(pos: usize, _len: usize, byte: u8) -> bool {
    match pos {
        1 => (0x30..=0x39).contains(&byte) || (0x40..=0xFE).contains(&byte) && byte != 0x7F,
        _ => (0x30..=0x39).contains(&byte),
    }
}

fn cp932_lead(b: u8) -> Option<usize> {
    if (0x81..=0x9F).contains(&b) || (0xE0..=0xFC).contains(&b) {
        Some(2)
    } else {
        None
    }
}
fn cp932_trail(_pos: usize, _len: usize, byte: u8) -> bool {
    (0x40..=0xFC).contains(&byte) && byte != 0x7F
}

fn big5_lead(b: u8) -> Option<usize> {
    if (0x81..=0xFE).contains(&b) {
        Some(2)
    } else {
        None
    }
}
fn big5_trail(_pos: usize, _len: usize, byte: u8) -> bool {
    (0x40..=0x7E).contains(&byte) || (0xA1..=0xFE).contains(&byte)
}

fn euc_jp_lead(b: u8) -> Option<usize> {
    if (0xA1..=0xFE).contains(&b) || b == 0x8E || b == 0x8F {
        Some(2)
    } else {
        None
    }
}
fn euc_jp_trail(_pos: usize, _len: usize, byte: u8) -> bool {
    (0xA1..=0xFE).contains(&byte)
}

fn euc_kr_lead(b: u8) -> Option<usize> {
    if (0xA1..=0xFE).contains(&b) {
        Some(2)
    } else {
        None
    }
}
fn euc_kr_trail(_pos: usize, _len: usize, byte: u8) -> bool {
    (0xA1..=0xFE).contains(&byte)
}

fn gbk_lead(b: u8) -> Option<usize> {
    if (0x81..=0xFE).contains(&b) {
        Some(2)
    } else {
        None
    }
}
fn gbk_trail(_pos: usize, _len: usize, byte: u8) -> bool {
    (0x40..=0xFE).contains(&byte) && byte != 0x7F
}

const SHAPES: &[MultiByteShape] = &[
    MultiByteShape { name: "gb18030", classify_lead: gb18030_lead, is_valid_trail: gb18030_trail },
    MultiByteShape { name: "gbk", classify_lead: gbk_lead, is_valid_trail: gbk_trail },
    MultiByteShape { name: "cp932", classify_lead: cp932_lead, is_valid_trail: cp932_trail },
    MultiByteShape { name: "big5", classify_lead: big5_lead, is_valid_trail: big5_trail },
    MultiByteShape { name: "euc-jp", classify_lead: euc_jp_lead, is_valid_trail: euc_jp_trail },
    MultiByteShape { name: "euc-kr", classify_lead: euc_kr_lead, is_valid_trail: euc_kr_trail },
];

fn shape_for(name: &str) -> Option<&'static MultiByteShape> {
    SHAPES.iter().find(|s| s.name == name)
}

/// `true` for the handful of CJK-superset encodings that go through the
/// CJK gate and structural scoring rather than bigram scoring (§4.6-§4.7).
/// Every other candidate, single-byte or not, is scored in stage 7 instead.
pub fn is_structurally_gated(name: &str) -> bool {
    shape_for(name).is_some()
}

/// Single pass over `bytes` computing lead-byte-diversity and valid
/// multi-byte byte counts for one shape. Non-ASCII byte totals live on
/// `Context::non_ascii_count`, not here, since that count is the same for
/// every shape scanning the same buffer.
fn scan(bytes: &[u8], shape: &MultiByteShape) -> StructuralStats {
    let mut stats = StructuralStats::default();
    let mut seen_leads = [false; 256];
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b < 0x80 {
            i += 1;
            continue;
        }
        if let Some(len) = (shape.classify_lead)(b) {
            if i + len <= bytes.len()
                && (1..len).all(|pos| (shape.is_valid_trail)(pos, len, bytes[i + pos]))
            {
                seen_leads[b as usize] = true;
                stats.valid_mb_bytes += len;
                i += len;
                continue;
            }
        }
        i += 1;
    }
    stats.lead_byte_diversity = seen_leads.iter().filter(|&&seen| seen).count();
    stats
}

fn stats_for<'a>(ctx: &'a mut Context, bytes: &[u8], name: &'static str) -> &'a StructuralStats {
    let key = (name, bytes.len());
    if !ctx.analysis_cache.contains_key(&key) {
        let stats = shape_for(name).map(|s| scan(bytes, s)).unwrap_or_default();
        ctx.analysis_cache.insert(key, stats);
    }
    &ctx.analysis_cache[&key]
}

/// Stage 5: drops each CJK-superset candidate whose structural-evidence
/// ratio falls below the minimum threshold. Records the survivors' scores
/// in `ctx.mb_scores` for stage 6 to reuse.
pub fn cjk_gate<'a>(
    ctx: &mut Context,
    bytes: &[u8],
    candidates: Vec<&'a EncodingInfo>,
) -> Vec<&'a EncodingInfo> {
    let total = ctx.non_ascii_count(bytes);
    candidates
        .into_iter()
        .filter(|info| {
            if shape_for(info.name).is_none() {
                return true; // not one of the gated encodings
            }
            let score = stats_for(ctx, bytes, info.name).structural_score(total);
            let passes = score >= CJK_GATE_MIN_STRUCTURAL_RATIO;
            if passes {
                ctx.mb_scores.insert(info.name, score);
            }
            passes
        })
        .collect()
}

/// Stage 6: combined structural score for a surviving multi-byte candidate,
/// folding the cached ratio, byte coverage, and lead-byte diversity into
/// one `[0,1]` figure.
pub fn structural_score(ctx: &mut Context, bytes: &[u8], info: &EncodingInfo) -> f32 {
    if shape_for(info.name).is_none() {
        return ctx.mb_scores.get(info.name).copied().unwrap_or(0.0);
    }
    let total = ctx.non_ascii_count(bytes);
    let stats = *stats_for(ctx, bytes, info.name);
    let base = stats.structural_score(total);
    let coverage = if total == 0 { 0.0 } else { stats.valid_mb_bytes as f32 / total as f32 };
    let diversity_bonus = (stats.lead_byte_diversity as f32 / 32.0).min(1.0);
    (0.5 * base + 0.35 * coverage + 0.15 * diversity_bonus).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    #[test]
    fn gb18030_chinese_text_passes_the_gate() {
        let mut ctx = Context::new();
        // 0xC4 0xE3 0xBA 0xC3 is valid GB-family bytes for "你好".
        let bytes = [0xC4, 0xE3, 0xBA, 0xC3];
        let gb18030 = registry::by_name("gb18030").unwrap();
        let survivors = cjk_gate(&mut ctx, &bytes, vec![gb18030]);
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn latin_text_fails_the_cjk_gate() {
        let mut ctx = Context::new();
        let bytes = b"plain latin text with \xE9 accented byte only";
        let gb18030 = registry::by_name("gb18030").unwrap();
        let survivors = cjk_gate(&mut ctx, bytes, vec![gb18030]);
        assert!(survivors.is_empty());
    }

    #[test]
    fn non_gated_encoding_passes_through_untouched() {
        let mut ctx = Context::new();
        let utf8 = registry::by_name("utf-8").unwrap();
        let survivors = cjk_gate(&mut ctx, b"hello", vec![utf8]);
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn structural_score_is_bounded() {
        let mut ctx = Context::new();
        let bytes = [0xC4, 0xE3, 0xBA, 0xC3];
        let gb18030 = registry::by_name("gb18030").unwrap();
        let score = structural_score(&mut ctx, &bytes, gb18030);
        assert!((0.0..=1.0).contains(&score));
        assert!(score > 0.5);
    }

    #[test]
    fn gbk_is_structurally_gated_and_scores_chinese_text() {
        assert!(is_structurally_gated("gbk"));
        let mut ctx = Context::new();
        let bytes = [0xC4, 0xE3, 0xBA, 0xC3];
        let gbk = registry::by_name("gbk").unwrap();
        let survivors = cjk_gate(&mut ctx, &bytes, vec![gbk]);
        assert_eq!(survivors.len(), 1);
        let score = structural_score(&mut ctx, &bytes, gbk);
        assert!(score > 0.5);
    }

    #[test]
    fn utf8_is_not_structurally_gated() {
        assert!(!is_structurally_gated("utf-8"));
        assert!(!is_structurally_gated("utf-8-sig"));
    }
}
