//! Stage 2: escape-sequence probe (§4.3).
//!
//! Deterministic, regex-free for the ESC-designator family (plain byte
//! scanning is both simpler and faster than a regex over raw, possibly
//! non-UTF-8 bytes) and regex-based for UTF-7's `+<base64>-` shift
//! sequences.

use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::entity::DetectionResult;

/// `ESC ( ... ` / `ESC $ ...` designators that select ISO-2022-JP.
const ISO2022_JP_DESIGNATORS: &[&[u8]] = &[
    b"\x1b(B", b"\x1b(J", b"\x1b(I", b"\x1b$@", b"\x1b$B", b"\x1b$(D", b"\x1b.A", b"\x1b.F",
];
const ISO2022_KR_DESIGNATORS: &[&[u8]] = &[b"\x1b$)C"];
const ISO2022_CN_DESIGNATORS: &[&[u8]] = &[b"\x1b$)A", b"\x1b$)G", b"\x1b$*H", b"\x1b$)E"];

fn contains_any(bytes: &[u8], needles: &[&[u8]]) -> bool {
    needles.iter().any(|n| windows_contains(bytes, n))
}

fn windows_contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn detect_hz(bytes: &[u8]) -> bool {
    if let Some(start) = find(bytes, b"~{") {
        return find(&bytes[start + 2..], b"~}").is_some();
    }
    false
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
}

static UTF7_SHIFT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+([A-Za-z0-9+/]+)-").unwrap());

/// Modified base64 alphabet used by UTF-7 (identical to standard base64,
/// just without padding).
fn base64_value(b: u8) -> Option<u8> {
    match b {
        b'A'..=b'Z' => Some(b - b'A'),
        b'a'..=b'z' => Some(b - b'a' + 26),
        b'0'..=b'9' => Some(b - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Decodes a UTF-7 shifted run into UTF-16 code units and validates that
/// the bit-padding and surrogate structure are legal. A malformed sequence
/// simply fails to validate; per §4.3 this is not a hard error, just a
/// non-match.
fn validates_as_utf7_payload(payload: &[u8]) -> bool {
    let mut bits: u32 = 0;
    let mut bit_count: u32 = 0;
    let mut units: Vec<u16> = Vec::new();

    for &b in payload {
        let Some(v) = base64_value(b) else { return false };
        bits = (bits << 6) | v as u32;
        bit_count += 6;
        if bit_count >= 16 {
            bit_count -= 16;
            let unit = (bits >> bit_count) as u16;
            units.push(unit);
        }
    }
    // Remaining bits must be zero padding (at most 5 bits can remain from a
    // 6-bit sextet boundary never aligning exactly with 16-bit units).
    if bit_count >= 6 {
        return false;
    }
    let leftover_mask = (1u32 << bit_count) - 1;
    if bits & leftover_mask != 0 {
        return false;
    }
    if units.is_empty() {
        return false;
    }
    // Validate surrogate pairing.
    let mut i = 0;
    while i < units.len() {
        let u = units[i];
        if (0xD800..=0xDBFF).contains(&u) {
            if i + 1 >= units.len() || !(0xDC00..=0xDFFF).contains(&units[i + 1]) {
                return false;
            }
            i += 2;
        } else if (0xDC00..=0xDFFF).contains(&u) {
            return false;
        } else {
            i += 1;
        }
    }
    true
}

fn detect_utf7(bytes: &[u8]) -> bool {
    for m in UTF7_SHIFT.find_iter(bytes) {
        // `+-` alone (empty payload) is the literal '+', never UTF-7.
        let full = m.as_bytes();
        let payload = &full[1..full.len() - 1];
        if payload.is_empty() {
            continue;
        }
        if validates_as_utf7_payload(payload) {
            return true;
        }
    }
    false
}

/// Runs the escape probe. Returns `Some` on a positive, unambiguous match.
pub fn probe(bytes: &[u8]) -> Option<DetectionResult> {
    if contains_any(bytes, ISO2022_JP_DESIGNATORS) {
        return Some(DetectionResult::certain("iso-2022-jp", Some("ja")));
    }
    if contains_any(bytes, ISO2022_KR_DESIGNATORS) {
        return Some(DetectionResult::certain("iso-2022-kr", Some("ko")));
    }
    if contains_any(bytes, ISO2022_CN_DESIGNATORS) {
        return Some(DetectionResult::certain("iso-2022-cn", Some("zh")));
    }
    if detect_hz(bytes) {
        return Some(DetectionResult::certain("hz-gb-2312", Some("zh")));
    }
    if detect_utf7(bytes) {
        return Some(DetectionResult::certain("utf-7", None));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso2022_jp_hello() {
        let bytes = [0x1B, 0x24, 0x42, 0x30, 0x6C, 0x1B, 0x28, 0x42];
        let r = probe(&bytes).unwrap();
        assert_eq!(r.encoding, Some("iso-2022-jp"));
        assert_eq!(r.language, Some("ja"));
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn iso2022_kr_designator() {
        let mut bytes = b"\x1b$)C".to_vec();
        bytes.extend_from_slice(b"hello");
        let r = probe(&bytes).unwrap();
        assert_eq!(r.encoding, Some("iso-2022-kr"));
    }

    #[test]
    fn hz_framing() {
        let bytes = b"plain ~{some hz bytes~} plain";
        let r = probe(bytes).unwrap();
        assert_eq!(r.encoding, Some("hz-gb-2312"));
    }

    #[test]
    fn utf7_zhong() {
        // UTF-7 encoding of the single character 中 (U+4E2D).
        let bytes = b"+Ti0-";
        let r = probe(bytes).unwrap();
        assert_eq!(r.encoding, Some("utf-7"));
        assert_eq!(r.language, None);
    }

    #[test]
    fn bare_plus_minus_is_not_utf7() {
        assert!(probe(b"a +- b").is_none());
    }

    #[test]
    fn plain_ascii_does_not_match_anything() {
        assert!(probe(b"just some regular text, nothing escaped").is_none());
    }

    #[test]
    fn malformed_base64_does_not_panic_or_match() {
        assert!(probe(b"+***-").is_none());
    }
}
