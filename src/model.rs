//! Bigram Model + Model Store (§3, §6), scoring shape an accumulate-then-
//! normalise dense per-byte-pair table rather than a character-class mess
//! detector.
//!
//! A `BigramTable` is a dense 65,536-entry table of fixed-point
//! log-probability-like weights indexed by `(hi << 8) | lo`, plus its
//! precomputed L2 norm for cosine-style scoring (§3, §4.8). The `ModelStore`
//! is the process-wide, load-once map from `(encoding, language)` to table,
//! built by default from small embedded seed corpora rather than a
//! checked-in binary blob. The training pipeline that would produce a real
//! `models.bin` is out of scope (§1), but the binary layout itself (§6) is
//! still fully implemented below so a model file produced by that external
//! pipeline can be loaded.

use std::io::{BufReader, Read, Write};
use std::path::Path;

use ahash::HashMap;
use once_cell::sync::Lazy;

use crate::consts::{BIGRAM_TABLE_SIZE, FIXED_POINT_SCALE, MODEL_FORMAT_VERSION};
use crate::error::{DetectError, DetectResult};

pub struct BigramTable {
    pub weights: Box<[u16; BIGRAM_TABLE_SIZE]>,
    pub norm: f32,
}

impl BigramTable {
    fn from_weights(weights: Box<[u16; BIGRAM_TABLE_SIZE]>) -> Self {
        let norm = l2_norm(&weights);
        BigramTable { weights, norm }
    }

    /// Builds a table from raw byte-pair frequency counts over a training
    /// corpus, scaling into the fixed-point range used by the wire format.
    fn from_corpus(bytes: &[u8]) -> Self {
        let mut counts = [0u32; BIGRAM_TABLE_SIZE];
        for pair in bytes.windows(2) {
            let idx = ((pair[0] as usize) << 8) | pair[1] as usize;
            counts[idx] = counts[idx].saturating_add(1);
        }
        let max = counts.iter().copied().max().unwrap_or(0).max(1);
        let mut weights = Box::new([0u16; BIGRAM_TABLE_SIZE]);
        for (w, &c) in weights.iter_mut().zip(counts.iter()) {
            *w = ((c as f32 / max as f32) * FIXED_POINT_SCALE) as u16;
        }
        BigramTable::from_weights(weights)
    }

    /// Cosine-style score of `bytes` against this table, in `[0,1]`. Inputs
    /// shorter than two bytes score zero (callers skip this stage entirely
    /// per §4.8; this just makes the function total).
    ///
    /// Builds a sparse count vector over the input's bigram pairs first, the
    /// same way `from_corpus` builds its training counts, so the dot
    /// product and the input's own L2 norm are both taken over actual
    /// per-pair counts rather than treating every occurrence as weight 1.
    pub fn score(&self, bytes: &[u8]) -> f32 {
        if bytes.len() < crate::consts::MIN_BYTES_FOR_BIGRAM {
            return 0.0;
        }
        let mut counts: HashMap<usize, u32> = HashMap::default();
        for pair in bytes.windows(2) {
            let idx = ((pair[0] as usize) << 8) | pair[1] as usize;
            *counts.entry(idx).or_insert(0) += 1;
        }
        let mut dot = 0.0f64;
        let mut input_sq = 0.0f64;
        for (idx, count) in &counts {
            let c = *count as f64;
            dot += self.weights[*idx] as f64 * c;
            input_sq += c * c;
        }
        let input_norm = input_sq.sqrt();
        if input_norm <= 0.0 || self.norm <= 0.0 {
            return 0.0;
        }
        ((dot / (input_norm * self.norm as f64)) as f32).clamp(0.0, 1.0)
    }
}

fn l2_norm(weights: &[u16; BIGRAM_TABLE_SIZE]) -> f32 {
    let sum_sq: f64 = weights.iter().map(|&w| (w as f64) * (w as f64)).sum();
    sum_sq.sqrt() as f32
}

/// `(encoding, language) -> table` plus the reverse encoding-to-languages
/// index, built exactly once (§5).
pub struct ModelStore {
    tables: HashMap<(&'static str, &'static str), BigramTable>,
    languages_by_encoding: HashMap<&'static str, Vec<&'static str>>,
}

impl ModelStore {
    pub fn table<'a>(&'a self, encoding: &'static str, language: &'static str) -> Option<&'a BigramTable> {
        self.tables.get(&(encoding, language))
    }

    pub fn languages_for(&self, encoding: &str) -> &[&'static str] {
        self.languages_by_encoding
            .get(encoding)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn insert(&mut self, encoding: &'static str, language: &'static str, table: BigramTable) {
        self.languages_by_encoding.entry(encoding).or_default().push(language);
        self.tables.insert((encoding, language), table);
    }

    /// Serialises to the §6 bigram-section wire format.
    pub fn write_to<W: Write>(&self, mut out: W) -> DetectResult<()> {
        let mut entries: Vec<_> = self.tables.iter().collect();
        entries.sort_by_key(|(&(enc, lang), _)| (enc, lang));

        write_u16(&mut out, MODEL_FORMAT_VERSION)?;
        write_u16(&mut out, entries.len() as u16)?;
        for (&(enc, lang), table) in entries {
            write_u8(&mut out, lang.len() as u8)?;
            out.write_all(lang.as_bytes()).map_err(io_err)?;
            write_u8(&mut out, enc.len() as u8)?;
            out.write_all(enc.as_bytes()).map_err(io_err)?;
            let table_bytes = (BIGRAM_TABLE_SIZE * 2) as u32;
            write_u32(&mut out, table_bytes)?;
            for &w in table.weights.iter() {
                write_u16(&mut out, w)?;
            }
        }
        Ok(())
    }

    /// Deserialises a §6 bigram section produced by an external training
    /// pipeline. Encoding/language names not present in the registry are
    /// kept as-is; callers consult them by string key regardless.
    pub fn read_from<R: Read>(mut input: R) -> DetectResult<ModelStore> {
        let version = read_u16(&mut input)?;
        if version != MODEL_FORMAT_VERSION {
            return Err(DetectError::ModelFormat(format!(
                "unsupported model format version {version}"
            )));
        }
        let num_models = read_u16(&mut input)?;
        let mut store = ModelStore {
            tables: HashMap::default(),
            languages_by_encoding: HashMap::default(),
        };
        for _ in 0..num_models {
            let lang_len = read_u8(&mut input)? as usize;
            let lang = read_string(&mut input, lang_len)?;
            let enc_len = read_u8(&mut input)? as usize;
            let enc = read_string(&mut input, enc_len)?;
            let table_bytes = read_u32(&mut input)? as usize;
            if table_bytes != BIGRAM_TABLE_SIZE * 2 {
                return Err(DetectError::ModelFormat(format!(
                    "unexpected table size {table_bytes} for {enc}/{lang}"
                )));
            }
            let mut weights = Box::new([0u16; BIGRAM_TABLE_SIZE]);
            for w in weights.iter_mut() {
                *w = read_u16(&mut input)?;
            }
            let table = BigramTable::from_weights(weights);
            let enc_static: &'static str = leak_known_name(&enc);
            let lang_static: &'static str = leak_known_name(&lang);
            store.insert(enc_static, lang_static, table);
        }
        Ok(store)
    }

    /// Opens `path` and parses it as a §6 bigram-section file. File-open
    /// failures are reported as [`DetectError::ModelIo`], distinct from the
    /// [`DetectError::ModelFormat`] errors [`ModelStore::read_from`] raises
    /// for a file that opens fine but doesn't parse.
    pub fn load_from_path(path: &Path) -> DetectResult<ModelStore> {
        let file = std::fs::File::open(path)
            .map_err(|source| DetectError::ModelIo { path: path.to_owned(), source })?;
        ModelStore::read_from(BufReader::new(file))
    }
}

/// Interns a runtime string as `'static` by matching it against the frozen
/// registry's canonical names and language codes first (the overwhelmingly
/// common case), falling back to leaking the allocation for anything novel
/// a future model file might introduce. Leaking is bounded by the number of
/// distinct models in a file loaded once per process.
fn leak_known_name(s: &str) -> &'static str {
    for info in crate::registry::ALL {
        if info.name == s {
            return info.name;
        }
        for &lang in info.languages {
            if lang == s {
                return lang;
            }
        }
    }
    Box::leak(s.to_owned().into_boxed_str())
}

fn io_err(e: std::io::Error) -> DetectError {
    DetectError::ModelFormat(e.to_string())
}

fn write_u8<W: Write>(w: &mut W, v: u8) -> DetectResult<()> {
    w.write_all(&[v]).map_err(io_err)
}
fn write_u16<W: Write>(w: &mut W, v: u16) -> DetectResult<()> {
    w.write_all(&v.to_be_bytes()).map_err(io_err)
}
fn write_u32<W: Write>(w: &mut W, v: u32) -> DetectResult<()> {
    w.write_all(&v.to_be_bytes()).map_err(io_err)
}
fn read_u8<R: Read>(r: &mut R) -> DetectResult<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf).map_err(io_err)?;
    Ok(buf[0])
}
fn read_u16<R: Read>(r: &mut R) -> DetectResult<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf).map_err(io_err)?;
    Ok(u16::from_be_bytes(buf))
}
fn read_u32<R: Read>(r: &mut R) -> DetectResult<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(io_err)?;
    Ok(u32::from_be_bytes(buf))
}
fn read_string<R: Read>(r: &mut R, len: usize) -> DetectResult<String> {
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).map_err(io_err)?;
    String::from_utf8(buf).map_err(|e| DetectError::ModelFormat(e.to_string()))
}

/// Tiny embedded seed corpora, one per `(encoding, language)` pair the
/// default model store ships with. Real-world-shaped but deliberately
/// compact; a production deployment would load a far larger `models.bin`
/// produced by the out-of-scope training pipeline via [`ModelStore::read_from`].
mod seed_corpus {
    pub const EN: &str = include_str!("../corpus/en.txt");
    pub const FR: &str = include_str!("../corpus/fr.txt");
    pub const DE: &str = include_str!("../corpus/de.txt");
    pub const RU: &str = include_str!("../corpus/ru.txt");
    pub const EL: &str = include_str!("../corpus/el.txt");
    pub const TR: &str = include_str!("../corpus/tr.txt");
    pub const PL: &str = include_str!("../corpus/pl.txt");
    pub const TG: &str = include_str!("../corpus/tg.txt");
}

fn build_default_store() -> ModelStore {
    let mut store = ModelStore { tables: HashMap::default(), languages_by_encoding: HashMap::default() };

    // UTF-8: train directly on UTF-8 text, one model per language, used
    // both for UTF-8 scoring and as the tier-3 language-fill models (§4.12).
    for (lang, text) in [
        ("en", seed_corpus::EN),
        ("fr", seed_corpus::FR),
        ("de", seed_corpus::DE),
        ("ru", seed_corpus::RU),
        ("el", seed_corpus::EL),
        ("tr", seed_corpus::TR),
        ("pl", seed_corpus::PL),
        ("tg", seed_corpus::TG),
    ] {
        store.insert("utf-8", lang, BigramTable::from_corpus(text.as_bytes()));
    }

    // Single-byte encodings: re-encode the matching-language corpus into
    // each encoding's byte space via its registry decoder/table.
    add_single_byte(&mut store, "windows-1251", "ru", seed_corpus::RU);
    add_single_byte(&mut store, "koi8-r", "ru", seed_corpus::RU);
    add_single_byte(&mut store, "iso-8859-5", "ru", seed_corpus::RU);
    add_single_byte(&mut store, "ibm866", "ru", seed_corpus::RU);
    add_single_byte(&mut store, "windows-1253", "el", seed_corpus::EL);
    add_single_byte(&mut store, "iso-8859-7", "el", seed_corpus::EL);
    add_single_byte(&mut store, "windows-1254", "tr", seed_corpus::TR);
    add_single_byte(&mut store, "iso-8859-2", "pl", seed_corpus::PL);
    add_single_byte(&mut store, "windows-1250", "pl", seed_corpus::PL);
    add_single_byte(&mut store, "koi8-t", "tg", seed_corpus::TG);
    add_single_byte(&mut store, "windows-1252", "fr", seed_corpus::FR);
    add_single_byte(&mut store, "windows-1252", "de", seed_corpus::DE);
    add_single_byte(&mut store, "iso-8859-15", "fr", seed_corpus::FR);
    add_single_byte(&mut store, "cp037", "de", seed_corpus::DE);
    add_single_byte(&mut store, "cp850", "fr", seed_corpus::FR);
    add_single_byte(&mut store, "cp858", "fr", seed_corpus::FR);

    store
}

/// Re-encodes a UTF-8 corpus into `encoding`'s byte space using either
/// `encoding_rs` or the hand-rolled single-byte table, skipping characters
/// the target encoding cannot represent, then trains a table on the result.
fn add_single_byte(store: &mut ModelStore, encoding: &'static str, language: &'static str, corpus: &str) {
    let Some(info) = crate::registry::by_name(encoding) else { return };
    let encoded: Vec<u8> = match &info.decoder {
        crate::registry::Decoder::Whatwg(enc) => {
            let (bytes, _, _) = enc.encode(corpus);
            bytes.into_owned()
        }
        crate::registry::Decoder::SingleByte(table) => {
            corpus.chars().filter_map(|c| table.encode_char(c)).collect()
        }
        _ => return,
    };
    if encoded.len() < 2 {
        return;
    }
    store.insert(encoding, language, BigramTable::from_corpus(&encoded));
}

pub static STORE: Lazy<ModelStore> = Lazy::new(build_default_store);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_scores_zero() {
        let table = BigramTable::from_corpus(b"hello world hello world");
        assert_eq!(table.score(b"h"), 0.0);
        assert_eq!(table.score(b""), 0.0);
    }

    #[test]
    fn matching_text_scores_higher_than_unrelated_bytes() {
        let table = BigramTable::from_corpus("the quick brown fox jumps over the lazy dog".repeat(20).as_bytes());
        let matching = table.score(b"the quick brown fox");
        let unrelated = table.score(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert!(matching > unrelated);
    }

    #[test]
    fn score_is_bounded() {
        let table = BigramTable::from_corpus(b"abcabcabcabc");
        assert!((0.0..=1.0).contains(&table.score(b"abcabc")));
    }

    #[test]
    fn round_trips_through_wire_format() {
        let mut store = ModelStore { tables: HashMap::default(), languages_by_encoding: HashMap::default() };
        store.insert("utf-8", "en", BigramTable::from_corpus(b"hello world, this is english text"));
        let mut buf = Vec::new();
        store.write_to(&mut buf).unwrap();
        let loaded = ModelStore::read_from(&buf[..]).unwrap();
        let original = store.table("utf-8", "en").unwrap();
        let round_tripped = loaded.table("utf-8", "en").unwrap();
        assert_eq!(original.weights, round_tripped.weights);
    }

    #[test]
    fn rejects_wrong_version() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&99u16.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        assert!(ModelStore::read_from(&buf[..]).is_err());
    }

    #[test]
    fn load_from_path_reports_missing_file_as_model_io_error() {
        let path = std::path::Path::new("/nonexistent/path/for/chardetect-rs/model/tests");
        let result = ModelStore::load_from_path(path);
        assert!(matches!(result, Err(DetectError::ModelIo { .. })));
    }

    #[test]
    fn load_from_path_round_trips_a_written_file() {
        let mut store = ModelStore { tables: HashMap::default(), languages_by_encoding: HashMap::default() };
        store.insert("utf-8", "en", BigramTable::from_corpus(b"hello world, this is english text"));
        let file = tempfile::NamedTempFile::new().unwrap();
        store.write_to(std::fs::File::create(file.path()).unwrap()).unwrap();
        let loaded = ModelStore::load_from_path(file.path()).unwrap();
        assert_eq!(loaded.table("utf-8", "en").unwrap().weights, store.table("utf-8", "en").unwrap().weights);
    }

    #[test]
    fn default_store_has_utf8_english() {
        assert!(STORE.table("utf-8", "en").is_some());
    }

    #[test]
    fn default_store_has_single_byte_russian_variants() {
        assert!(STORE.table("koi8-r", "ru").is_some());
        assert!(STORE.table("windows-1251", "ru").is_some());
    }
}
