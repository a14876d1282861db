//! Stage 7: bigram scoring for every candidate the CJK gate doesn't claim
//! (single-byte encodings, `ascii`, and `utf-8`/`utf-8-sig`), plus UTF-8's
//! own language attribution (§4.8).
//!
//! Scores every surviving candidate against each of its registered
//! languages' models in the Model Store, keeping the best `(score,
//! language)` pair per encoding.

use crate::model::STORE;
use crate::registry::{Decoder, EncodingInfo};

/// Best `(score, language)` for one encoding across all of its language
/// variants. `language` is `None` when the store has no model at all for
/// this encoding (falls through to tier 3 language fill, §4.12).
#[derive(Debug, Clone, Copy)]
pub struct BigramScore {
    pub score: f32,
    pub language: Option<&'static str>,
}

/// Scores one single-byte (or UTF-8) candidate against all its language
/// models, returning the best match. `utf-8-sig` shares `utf-8`'s models,
/// since it is UTF-8 with a three-byte BOM prefix and the store only keeps
/// one set of tables for the pair.
pub fn score_candidate(bytes: &[u8], info: &EncodingInfo) -> BigramScore {
    if !matches!(info.decoder, Decoder::SingleByte(_) | Decoder::Whatwg(_) | Decoder::Ascii) {
        return BigramScore { score: 0.0, language: None };
    }
    let model_name = if info.name == "utf-8-sig" { "utf-8" } else { info.name };
    let mut best_score = 0.0f32;
    let mut best_lang = None;
    for &lang in STORE.languages_for(model_name) {
        if let Some(table) = STORE.table(model_name, lang) {
            let score = table.score(bytes);
            if score > best_score {
                best_score = score;
                best_lang = Some(lang);
            }
        }
    }
    BigramScore { score: best_score, language: best_lang }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    #[test]
    fn english_text_scores_higher_under_utf8_than_random_bytes() {
        let utf8 = registry::by_name("utf-8").unwrap();
        let english = score_candidate(b"the quick brown fox jumps over the lazy dog", utf8);
        let random = score_candidate(&[0x01, 0x13, 0x42, 0x07, 0x91, 0xAB], utf8);
        assert!(english.score >= random.score);
    }

    #[test]
    fn utf8_attributes_a_language() {
        let utf8 = registry::by_name("utf-8").unwrap();
        let result = score_candidate("le renard brun saute par dessus le chien".as_bytes(), utf8);
        assert!(result.language.is_some());
    }

    #[test]
    fn encoding_with_no_model_scores_zero() {
        let windows_1258 = registry::by_name("windows-1258").unwrap();
        let result = score_candidate(b"mot vietnamien quelconque", windows_1258);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.language, None);
    }

    #[test]
    fn utf8_sig_shares_utf8s_models() {
        let utf8 = registry::by_name("utf-8").unwrap();
        let utf8_sig = registry::by_name("utf-8-sig").unwrap();
        let bytes = b"the quick brown fox jumps over the lazy dog";
        assert_eq!(score_candidate(bytes, utf8).score, score_candidate(bytes, utf8_sig).score);
    }

    #[test]
    fn gbk_scores_zero_without_a_trained_model() {
        let gbk = registry::by_name("gbk").unwrap();
        let result = score_candidate(b"plain ascii filler text here", gbk);
        assert_eq!(result.score, 0.0);
    }
}
