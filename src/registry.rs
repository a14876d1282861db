//! The frozen Encoding Registry (§3, §4.4).
//!
//! A fixed slice of immutable records plus a `Lazy` name-to-record map.
//! Most entries back onto `encoding_rs`, but the registry also carries a
//! handful of single-byte code pages `encoding_rs` does not implement
//! (EBCDIC cp037, DOS cp850/cp858, KOI8-T) using small hand-rolled lookup
//! tables, since the confusion-group and mainframe-era scenarios (§8,
//! scenarios 8-9) name them explicitly.

use ahash::HashMap;
use once_cell::sync::Lazy;

use crate::singlebyte;

/// Encoding era: both a candidate filter and an era-tiebreak preference
/// order (§2, §4.10). Declaration order is the tiebreak preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Era {
    ModernWeb,
    LegacyIso,
    LegacyRegional,
    Dos,
    LegacyMac,
    Mainframe,
}

impl Era {
    pub fn all() -> &'static [Era] {
        &[
            Era::ModernWeb,
            Era::LegacyIso,
            Era::LegacyRegional,
            Era::Dos,
            Era::LegacyMac,
            Era::Mainframe,
        ]
    }

    pub fn parse(s: &str) -> Option<Era> {
        match s.to_ascii_lowercase().as_str() {
            "modern_web" | "modern-web" => Some(Era::ModernWeb),
            "legacy_iso" | "legacy-iso" => Some(Era::LegacyIso),
            "legacy_regional" | "legacy-regional" => Some(Era::LegacyRegional),
            "dos" => Some(Era::Dos),
            "legacy_mac" | "legacy-mac" => Some(Era::LegacyMac),
            "mainframe" => Some(Era::Mainframe),
            _ => None,
        }
    }
}

/// The caller's requested era set (§4.4): either every era, or a single one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraFilter {
    All,
    Only(Era),
}

impl Default for EraFilter {
    fn default() -> Self {
        EraFilter::All
    }
}

impl EraFilter {
    pub fn matches(&self, era: Era) -> bool {
        match self {
            EraFilter::All => true,
            EraFilter::Only(e) => *e == era,
        }
    }

    /// Parses a CLI-facing era string: `"all"` (case-insensitive) or any
    /// name [`Era::parse`] accepts. Returns [`DetectError::UnknownEra`] for
    /// anything else, carrying the original string back to the caller.
    pub fn parse_filter(s: &str) -> crate::error::DetectResult<EraFilter> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(EraFilter::All);
        }
        Era::parse(s)
            .map(EraFilter::Only)
            .ok_or_else(|| crate::error::DetectError::UnknownEra(s.to_string()))
    }
}

/// How a registry entry is actually decoded. `Whatwg` covers the bulk of the
/// registry via `encoding_rs`; the other variants are this crate's
/// additions for code pages `encoding_rs` omits, plus the escape-sequence
/// family that the escape probe (§4.3) normally resolves before the
/// registry is ever consulted.
pub enum Decoder {
    Ascii,
    Whatwg(&'static encoding_rs::Encoding),
    SingleByte(&'static singlebyte::SingleByteTable),
    Utf32 { big_endian: bool },
    /// ISO-2022-KR / ISO-2022-CN / HZ-GB-2312 / UTF-7: detected exclusively
    /// by the escape probe. Full decoding is out of scope (§1 non-goals);
    /// the validity filter treats these as always-invalid so they never
    /// resurface past stage 4 if the escape probe missed them.
    EscapeOnly,
}

pub struct EncodingInfo {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub era: Era,
    pub is_multi_byte: bool,
    pub languages: &'static [&'static str],
    pub decoder: Decoder,
}

impl std::fmt::Debug for EncodingInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodingInfo")
            .field("name", &self.name)
            .field("era", &self.era)
            .finish()
    }
}

impl PartialEq for EncodingInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for EncodingInfo {}

impl std::hash::Hash for EncodingInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

macro_rules! enc {
    ($name:expr, $aliases:expr, $era:expr, $mb:expr, $langs:expr, $dec:expr) => {
        EncodingInfo {
            name: $name,
            aliases: $aliases,
            era: $era,
            is_multi_byte: $mb,
            languages: $langs,
            decoder: $dec,
        }
    };
}

pub static ALL: &[EncodingInfo] = &[
    enc!("ascii", &["ascii", "us-ascii"], Era::ModernWeb, false, &[], Decoder::Ascii),
    enc!("utf-8", &["utf-8", "utf8"], Era::ModernWeb, true, &[], Decoder::Whatwg(encoding_rs::UTF_8)),
    enc!(
        "utf-8-sig",
        &["utf-8-sig"],
        Era::ModernWeb,
        true,
        &[],
        Decoder::Whatwg(encoding_rs::UTF_8)
    ),
    enc!(
        "utf-16be",
        &["utf-16be", "unicodefffe"],
        Era::ModernWeb,
        true,
        &[],
        Decoder::Whatwg(encoding_rs::UTF_16BE)
    ),
    enc!(
        "utf-16le",
        &["utf-16le", "utf-16", "unicode"],
        Era::ModernWeb,
        true,
        &[],
        Decoder::Whatwg(encoding_rs::UTF_16LE)
    ),
    enc!(
        "utf-32be",
        &["utf-32be"],
        Era::ModernWeb,
        true,
        &[],
        Decoder::Utf32 { big_endian: true }
    ),
    enc!(
        "utf-32le",
        &["utf-32le", "utf-32"],
        Era::ModernWeb,
        true,
        &[],
        Decoder::Utf32 { big_endian: false }
    ),
    enc!(
        "windows-1250",
        &["cp1250", "windows-1250", "x-cp1250"],
        Era::ModernWeb,
        false,
        &["pl", "cs", "sk", "hu", "ro", "hr", "sl"],
        Decoder::Whatwg(encoding_rs::WINDOWS_1250)
    ),
    enc!(
        "windows-1251",
        &["cp1251", "windows-1251", "x-cp1251"],
        Era::ModernWeb,
        false,
        &["ru", "bg", "sr", "uk"],
        Decoder::Whatwg(encoding_rs::WINDOWS_1251)
    ),
    enc!(
        "windows-1252",
        &["cp1252", "windows-1252", "iso-8859-1", "l1", "latin1"],
        Era::ModernWeb,
        false,
        &[],
        Decoder::Whatwg(encoding_rs::WINDOWS_1252)
    ),
    enc!(
        "windows-1253",
        &["cp1253", "windows-1253"],
        Era::ModernWeb,
        false,
        &["el"],
        Decoder::Whatwg(encoding_rs::WINDOWS_1253)
    ),
    enc!(
        "windows-1254",
        &["cp1254", "windows-1254", "iso-8859-9"],
        Era::ModernWeb,
        false,
        &["tr"],
        Decoder::Whatwg(encoding_rs::WINDOWS_1254)
    ),
    enc!(
        "windows-1255",
        &["cp1255", "windows-1255"],
        Era::ModernWeb,
        false,
        &["he"],
        Decoder::Whatwg(encoding_rs::WINDOWS_1255)
    ),
    enc!(
        "windows-1256",
        &["cp1256", "windows-1256"],
        Era::ModernWeb,
        false,
        &["ar"],
        Decoder::Whatwg(encoding_rs::WINDOWS_1256)
    ),
    enc!(
        "windows-1257",
        &["cp1257", "windows-1257"],
        Era::ModernWeb,
        false,
        &["lt", "lv", "et"],
        Decoder::Whatwg(encoding_rs::WINDOWS_1257)
    ),
    enc!(
        "windows-1258",
        &["cp1258", "windows-1258"],
        Era::ModernWeb,
        false,
        &["vi"],
        Decoder::Whatwg(encoding_rs::WINDOWS_1258)
    ),
    enc!(
        "windows-874",
        &["windows-874", "dos-874", "iso-8859-11", "tis-620", "cp874"],
        Era::LegacyRegional,
        false,
        &["th"],
        Decoder::Whatwg(encoding_rs::WINDOWS_874)
    ),
    enc!(
        "iso-8859-2",
        &["iso-8859-2", "latin2", "l2"],
        Era::LegacyIso,
        false,
        &["pl", "cs", "sk", "hu", "hr", "sl"],
        Decoder::Whatwg(encoding_rs::ISO_8859_2)
    ),
    enc!(
        "iso-8859-3",
        &["iso-8859-3", "latin3", "l3"],
        Era::LegacyIso,
        false,
        &[],
        Decoder::Whatwg(encoding_rs::ISO_8859_3)
    ),
    enc!(
        "iso-8859-4",
        &["iso-8859-4", "latin4", "l4"],
        Era::LegacyIso,
        false,
        &["et", "lv", "lt"],
        Decoder::Whatwg(encoding_rs::ISO_8859_4)
    ),
    enc!(
        "iso-8859-5",
        &["iso-8859-5", "cyrillic"],
        Era::LegacyIso,
        false,
        &["ru", "uk", "bg", "sr"],
        Decoder::Whatwg(encoding_rs::ISO_8859_5)
    ),
    enc!(
        "iso-8859-6",
        &["iso-8859-6", "arabic"],
        Era::LegacyIso,
        false,
        &["ar"],
        Decoder::Whatwg(encoding_rs::ISO_8859_6)
    ),
    enc!(
        "iso-8859-7",
        &["iso-8859-7", "greek"],
        Era::LegacyIso,
        false,
        &["el"],
        Decoder::Whatwg(encoding_rs::ISO_8859_7)
    ),
    enc!(
        "iso-8859-8",
        &["iso-8859-8", "hebrew"],
        Era::LegacyIso,
        false,
        &["he"],
        Decoder::Whatwg(encoding_rs::ISO_8859_8)
    ),
    enc!(
        "iso-8859-10",
        &["iso-8859-10", "latin6", "l6"],
        Era::LegacyIso,
        false,
        &[],
        Decoder::Whatwg(encoding_rs::ISO_8859_10)
    ),
    enc!(
        "iso-8859-13",
        &["iso-8859-13"],
        Era::LegacyIso,
        false,
        &["lt", "lv"],
        Decoder::Whatwg(encoding_rs::ISO_8859_13)
    ),
    enc!(
        "iso-8859-14",
        &["iso-8859-14"],
        Era::LegacyIso,
        false,
        &[],
        Decoder::Whatwg(encoding_rs::ISO_8859_14)
    ),
    enc!(
        "iso-8859-15",
        &["iso-8859-15", "latin9", "l9"],
        Era::LegacyIso,
        false,
        &["fr", "fi", "et"],
        Decoder::Whatwg(encoding_rs::ISO_8859_15)
    ),
    enc!(
        "iso-8859-16",
        &["iso-8859-16"],
        Era::LegacyIso,
        false,
        &["ro"],
        Decoder::Whatwg(encoding_rs::ISO_8859_16)
    ),
    enc!(
        "koi8-r",
        &["koi8-r", "koi8"],
        Era::LegacyRegional,
        false,
        &["ru"],
        Decoder::Whatwg(encoding_rs::KOI8_R)
    ),
    enc!(
        "koi8-u",
        &["koi8-u"],
        Era::LegacyRegional,
        false,
        &["uk"],
        Decoder::Whatwg(encoding_rs::KOI8_U)
    ),
    enc!(
        "koi8-t",
        &["koi8-t"],
        Era::LegacyRegional,
        false,
        &["tg"],
        Decoder::SingleByte(&singlebyte::KOI8_T)
    ),
    enc!(
        "ibm866",
        &["ibm866", "cp866"],
        Era::Dos,
        false,
        &["ru"],
        Decoder::Whatwg(encoding_rs::IBM866)
    ),
    enc!(
        "cp850",
        &["cp850", "ibm850"],
        Era::Dos,
        false,
        &[],
        Decoder::SingleByte(&singlebyte::CP850)
    ),
    enc!(
        "cp858",
        &["cp858", "ibm858"],
        Era::Dos,
        false,
        &[],
        Decoder::SingleByte(&singlebyte::CP858)
    ),
    enc!(
        "macintosh",
        &["macintosh", "mac", "x-mac-roman"],
        Era::LegacyMac,
        false,
        &[],
        Decoder::Whatwg(encoding_rs::MACINTOSH)
    ),
    enc!(
        "x-mac-cyrillic",
        &["x-mac-cyrillic"],
        Era::LegacyMac,
        false,
        &["ru"],
        Decoder::Whatwg(encoding_rs::X_MAC_CYRILLIC)
    ),
    enc!(
        "cp037",
        &["cp037", "ibm037", "ebcdic-cp-us"],
        Era::Mainframe,
        false,
        &["de"],
        Decoder::SingleByte(&singlebyte::CP037)
    ),
    enc!(
        "gbk",
        &["gbk", "gb2312", "chinese"],
        Era::LegacyRegional,
        true,
        &["zh"],
        Decoder::Whatwg(encoding_rs::GBK)
    ),
    enc!(
        "gb18030",
        &["gb18030"],
        Era::LegacyRegional,
        true,
        &["zh"],
        Decoder::Whatwg(encoding_rs::GB18030)
    ),
    enc!(
        "big5",
        &["big5", "big5-hkscs", "cn-big5"],
        Era::LegacyRegional,
        true,
        &["zh"],
        Decoder::Whatwg(encoding_rs::BIG5)
    ),
    enc!(
        "euc-jp",
        &["euc-jp"],
        Era::LegacyRegional,
        true,
        &["ja"],
        Decoder::Whatwg(encoding_rs::EUC_JP)
    ),
    enc!(
        "cp932",
        &["cp932", "shift_jis", "sjis", "ms932", "windows-31j"],
        Era::LegacyRegional,
        true,
        &["ja"],
        Decoder::Whatwg(encoding_rs::SHIFT_JIS)
    ),
    enc!(
        "iso-2022-jp",
        &["iso-2022-jp"],
        Era::LegacyRegional,
        true,
        &["ja"],
        Decoder::Whatwg(encoding_rs::ISO_2022_JP)
    ),
    enc!(
        "iso-2022-kr",
        &["iso-2022-kr"],
        Era::LegacyRegional,
        true,
        &["ko"],
        Decoder::EscapeOnly
    ),
    enc!(
        "iso-2022-cn",
        &["iso-2022-cn"],
        Era::LegacyRegional,
        true,
        &["zh"],
        Decoder::EscapeOnly
    ),
    enc!(
        "hz-gb-2312",
        &["hz-gb-2312", "hz"],
        Era::LegacyRegional,
        true,
        &["zh"],
        Decoder::EscapeOnly
    ),
    enc!(
        "utf-7",
        &["utf-7"],
        Era::LegacyRegional,
        true,
        &[],
        Decoder::EscapeOnly
    ),
    enc!(
        "cp949",
        &["cp949", "windows-949"],
        Era::LegacyRegional,
        true,
        &["ko"],
        Decoder::Whatwg(encoding_rs::EUC_KR)
    ),
    enc!(
        "euc-kr",
        &["euc-kr"],
        Era::LegacyRegional,
        true,
        &["ko"],
        Decoder::Whatwg(encoding_rs::EUC_KR)
    ),
];

pub static BY_NAME: Lazy<HashMap<&'static str, &'static EncodingInfo>> = Lazy::new(|| {
    let mut map = HashMap::default();
    for info in ALL {
        for &alias in info.aliases {
            map.insert(alias, info);
        }
    }
    map
});

pub fn by_name(name: &str) -> Option<&'static EncodingInfo> {
    BY_NAME.get(name).copied().or_else(|| {
        let lowered = name.to_ascii_lowercase();
        if lowered != name {
            BY_NAME.get(lowered.as_str()).copied()
        } else {
            None
        }
    })
}

/// Candidate filter (§4.4): all registry entries whose era matches the
/// caller's request, excluding the BOM-only UTF transforms (those are
/// resolved exclusively by the BOM sniffer and the escape-only family
/// (resolved exclusively by the escape probe).
pub fn candidates_for_era(filter: EraFilter) -> Vec<&'static EncodingInfo> {
    ALL.iter()
        .filter(|e| filter.matches(e.era))
        .filter(|e| !matches!(e.decoder, Decoder::EscapeOnly))
        .filter(|e| !matches!(e.name, "utf-8-sig" | "utf-16be" | "utf-16le" | "utf-32be" | "utf-32le"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectError;

    #[test]
    fn parse_filter_accepts_all_case_insensitively() {
        assert_eq!(EraFilter::parse_filter("ALL").unwrap(), EraFilter::All);
        assert_eq!(EraFilter::parse_filter("all").unwrap(), EraFilter::All);
    }

    #[test]
    fn parse_filter_accepts_a_known_era_name() {
        assert_eq!(EraFilter::parse_filter("dos").unwrap(), EraFilter::Only(Era::Dos));
        assert_eq!(EraFilter::parse_filter("legacy-mac").unwrap(), EraFilter::Only(Era::LegacyMac));
    }

    #[test]
    fn parse_filter_rejects_an_unknown_era_name() {
        let err = EraFilter::parse_filter("atlantean").unwrap_err();
        assert!(matches!(err, DetectError::UnknownEra(s) if s == "atlantean"));
    }

    #[test]
    fn by_name_is_case_insensitive() {
        assert_eq!(by_name("UTF-8").unwrap().name, "utf-8");
    }
}
