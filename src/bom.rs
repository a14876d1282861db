//! Stage 0: BOM sniff (§4.1).
//!
//! Deterministic prefix match, longest/most-specific signature first so a
//! UTF-32LE buffer (`FF FE 00 00`) is never mistaken for UTF-16LE (`FF FE`).
//! Returns a full `DetectionResult` directly since a BOM hit always
//! short-circuits the pipeline (§4.1).

use crate::entity::DetectionResult;

const SIGNATURES: &[(&[u8], &str)] = &[
    (&[0x00, 0x00, 0xFE, 0xFF], "utf-32be"),
    (&[0xFF, 0xFE, 0x00, 0x00], "utf-32le"),
    (&[0xEF, 0xBB, 0xBF], "utf-8-sig"),
    (&[0xFE, 0xFF], "utf-16be"),
    (&[0xFF, 0xFE], "utf-16le"),
];

/// Returns `Some` when `bytes` begins with a recognised byte-order mark.
pub fn sniff(bytes: &[u8]) -> Option<DetectionResult> {
    for (sig, name) in SIGNATURES {
        if bytes.starts_with(sig) {
            return Some(DetectionResult::certain(name, None));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_sig_wins_over_nothing() {
        let r = sniff(&[0xEF, 0xBB, 0xBF, 0x68, 0x69]).unwrap();
        assert_eq!(r.encoding, Some("utf-8-sig"));
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn utf32le_not_confused_with_utf16le() {
        let r = sniff(&[0xFF, 0xFE, 0x00, 0x00]).unwrap();
        assert_eq!(r.encoding, Some("utf-32le"));
    }

    #[test]
    fn utf16le_hello() {
        let r = sniff(&[0xFF, 0xFE, 0x68, 0x00, 0x69, 0x00]).unwrap();
        assert_eq!(r.encoding, Some("utf-16le"));
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn no_bom() {
        assert!(sniff(b"hello").is_none());
    }

    #[test]
    fn empty_buffer_has_no_bom() {
        assert!(sniff(&[]).is_none());
    }
}
