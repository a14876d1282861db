//! Stage 11: three-tier language fill (§4.12).

use std::borrow::Cow;

use crate::model::STORE;
use crate::registry::{Decoder, EncodingInfo};

/// Decodes `bytes` under `info`'s encoding into a UTF-8 string, for tier 3's
/// re-encode-then-score step. `None` when the encoding cannot decode at all
/// (escape-only family; validity filter should already have eliminated
/// these, but this stays total rather than unreachable).
fn decode_to_utf8(info: &EncodingInfo, bytes: &[u8]) -> Option<String> {
    match &info.decoder {
        Decoder::Ascii => std::str::from_utf8(bytes).ok().map(str::to_owned),
        Decoder::Whatwg(enc) => {
            let (cow, had_errors) = enc.decode_without_bom_handling(bytes);
            if had_errors {
                None
            } else {
                Some(cow.into_owned())
            }
        }
        Decoder::SingleByte(table) => {
            let mut out = String::with_capacity(bytes.len());
            for &b in bytes {
                out.push(table.decode_byte(b)?);
            }
            Some(out)
        }
        Decoder::Utf32 { .. } | Decoder::EscapeOnly => None,
    }
}

fn best_utf8_language(utf8_bytes: &[u8]) -> Option<&'static str> {
    let mut best_score = 0.0f32;
    let mut best_lang = None;
    for &lang in STORE.languages_for("utf-8") {
        if let Some(table) = STORE.table("utf-8", lang) {
            let score = table.score(utf8_bytes);
            if score > best_score {
                best_score = score;
                best_lang = Some(lang);
            }
        }
    }
    best_lang
}

/// Resolves the language for the chosen encoding, per the three tiers.
/// `bigram_best` is whatever stage 7 already recorded for this encoding, if
/// anything.
pub fn fill_language(
    info: &EncodingInfo,
    bytes: &[u8],
    bigram_best: Option<&'static str>,
) -> Option<&'static str> {
    if info.languages.len() == 1 {
        return Some(info.languages[0]);
    }
    if bigram_best.is_some() {
        return bigram_best;
    }

    let utf8_bytes: Cow<[u8]> = if info.name == "utf-8" {
        Cow::Borrowed(bytes)
    } else {
        match decode_to_utf8(info, bytes) {
            Some(s) => Cow::Owned(s.into_bytes()),
            None => return None,
        }
    };
    best_utf8_language(&utf8_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    #[test]
    fn tier1_single_language_encoding_short_circuits() {
        let koi8_r = registry::by_name("koi8-r").unwrap();
        assert_eq!(fill_language(koi8_r, b"anything", None), Some("ru"));
    }

    #[test]
    fn tier2_uses_bigram_recorded_language() {
        let windows_1252 = registry::by_name("windows-1252").unwrap();
        assert_eq!(fill_language(windows_1252, b"irrelevant", Some("fr")), Some("fr"));
    }

    #[test]
    fn tier3_scores_utf8_directly() {
        let utf8 = registry::by_name("utf-8").unwrap();
        let result = fill_language(utf8, "le chat noir traverse la rue".as_bytes(), None);
        assert!(result.is_some());
    }

    #[test]
    fn tier3_reencodes_non_utf8_before_scoring() {
        let windows_1252 = registry::by_name("windows-1252").unwrap();
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode("le chat noir traverse la rue");
        let result = fill_language(windows_1252, &bytes, None);
        assert!(result.is_some());
    }
}
