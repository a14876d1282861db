//! Confusion Graph (§3, §4.9) and its three resolution strategies, plus two
//! registry-specific nudges kept alongside it.
//!
//! The graph is computed once at process start by comparing every
//! single-byte encoding's full byte-to-codepoint mapping against every
//! other's: a pair whose mappings agree on more than 80% of byte values
//! forms an edge, and connected components are the confusion groups. This
//! keeps the graph in sync with whatever `registry.rs` actually ships,
//! rather than hand-maintaining a list that would drift as encodings are
//! added or removed.

use ahash::HashMap;
use icu_properties::{maps, GeneralCategory};
use once_cell::sync::Lazy;

use crate::entity::ConfusionStrategy;
use crate::model::STORE;
use crate::registry::{self, Decoder, EncodingInfo};

fn byte_to_char(info: &EncodingInfo, b: u8) -> Option<char> {
    match &info.decoder {
        Decoder::Whatwg(enc) => {
            let bytes = [b];
            let (cow, had_errors) = enc.decode_without_bom_handling(&bytes);
            if had_errors {
                None
            } else {
                cow.chars().next()
            }
        }
        Decoder::SingleByte(table) => table.decode_byte(b),
        _ => None,
    }
}

fn single_byte_candidates() -> Vec<&'static EncodingInfo> {
    registry::ALL
        .iter()
        .filter(|e| !e.is_multi_byte && !matches!(e.decoder, Decoder::EscapeOnly | Decoder::Ascii))
        .collect()
}

fn agreement_fraction(a: &EncodingInfo, b: &EncodingInfo) -> f32 {
    let agree = (0u16..=255).filter(|&b8| byte_to_char(a, b8 as u8) == byte_to_char(b, b8 as u8)).count();
    agree as f32 / 256.0
}

fn distinguishing_bytes(a: &EncodingInfo, b: &EncodingInfo) -> Vec<u8> {
    (0u16..=255)
        .filter(|&b8| byte_to_char(a, b8 as u8) != byte_to_char(b, b8 as u8))
        .map(|b8| b8 as u8)
        .collect()
}

pub struct ConfusionGraph {
    groups: Vec<Vec<&'static str>>,
    group_of: HashMap<&'static str, usize>,
    distinguishing: HashMap<(&'static str, &'static str), Vec<u8>>,
}

impl ConfusionGraph {
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.group_of.get(name).copied()
    }

    pub fn same_group(&self, a: &str, b: &str) -> bool {
        match (self.group_index(a), self.group_index(b)) {
            (Some(ga), Some(gb)) => ga == gb,
            _ => false,
        }
    }

    fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn distinguishing_bytes_for<'a>(&'a self, a: &'static str, b: &'static str) -> &'a [u8] {
        self.distinguishing.get(&Self::pair_key(a, b)).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Serialises the confusion section of the §6 model file format.
    pub fn write_to<W: std::io::Write>(&self, mut out: W) -> crate::error::DetectResult<()> {
        let io = |e: std::io::Error| crate::error::DetectError::ModelFormat(e.to_string());

        out.write_all(&(self.groups.len() as u16).to_be_bytes()).map_err(io)?;
        for group in &self.groups {
            out.write_all(&[group.len() as u8]).map_err(io)?;
            for &name in group {
                out.write_all(&[name.len() as u8]).map_err(io)?;
                out.write_all(name.as_bytes()).map_err(io)?;
            }

            let mut pairs: Vec<(u8, u8, &Vec<u8>)> = Vec::new();
            for i in 0..group.len() {
                for j in (i + 1)..group.len() {
                    if let Some(dist) = self.distinguishing.get(&Self::pair_key(group[i], group[j])) {
                        pairs.push((i as u8, j as u8, dist));
                    }
                }
            }
            out.write_all(&(pairs.len() as u16).to_be_bytes()).map_err(io)?;
            for (enc1_idx, enc2_idx, dist) in pairs {
                out.write_all(&[enc1_idx, enc2_idx]).map_err(io)?;
                out.write_all(&[dist.len() as u8]).map_err(io)?;
                let enc1 = registry::by_name(group[enc1_idx as usize]).unwrap();
                let enc2 = registry::by_name(group[enc2_idx as usize]).unwrap();
                for &byte in dist {
                    let cat1 = byte_to_char(enc1, byte).map(category_rank).unwrap_or(0);
                    let cat2 = byte_to_char(enc2, byte).map(category_rank).unwrap_or(0);
                    out.write_all(&[byte, cat1, cat2]).map_err(io)?;
                }
            }
        }
        Ok(())
    }
}

fn build_graph() -> ConfusionGraph {
    let members = single_byte_candidates();
    let mut parent: Vec<usize> = (0..members.len()).collect();

    fn find(parent: &mut [usize], x: usize) -> usize {
        if parent[x] != x {
            parent[x] = find(parent, parent[x]);
        }
        parent[x]
    }
    fn union(parent: &mut [usize], a: usize, b: usize) {
        let ra = find(parent, a);
        let rb = find(parent, b);
        if ra != rb {
            parent[ra] = rb;
        }
    }

    let mut distinguishing = HashMap::default();
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            let frac = agreement_fraction(members[i], members[j]);
            if frac > 0.8 {
                union(&mut parent, i, j);
            }
            let dist = distinguishing_bytes(members[i], members[j]);
            let key = ConfusionGraph::pair_key(members[i].name, members[j].name);
            distinguishing.insert(key, dist);
        }
    }

    let mut roots: HashMap<usize, usize> = HashMap::default();
    let mut groups: Vec<Vec<&'static str>> = Vec::new();
    let mut group_of = HashMap::default();
    for i in 0..members.len() {
        let root = find(&mut parent, i);
        let group_idx = *roots.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[group_idx].push(members[i].name);
        group_of.insert(members[i].name, group_idx);
    }

    ConfusionGraph { groups, group_of, distinguishing }
}

pub static GRAPH: Lazy<ConfusionGraph> = Lazy::new(build_graph);

fn category_rank(c: char) -> u8 {
    use GeneralCategory::*;
    match maps::general_category().get(c) {
        UppercaseLetter | LowercaseLetter | TitlecaseLetter | ModifierLetter | OtherLetter => 4,
        DecimalNumber | LetterNumber | OtherNumber => 3,
        ConnectorPunctuation | DashPunctuation | OpenPunctuation | ClosePunctuation
        | InitialPunctuation | FinalPunctuation | OtherPunctuation => 2,
        MathSymbol | CurrencySymbol | ModifierSymbol | OtherSymbol => 1,
        _ => 0,
    }
}

/// Strategy 1: re-score restricted to bigrams touching a distinguishing
/// byte position.
fn distinguishing_bigram_rescore(bytes: &[u8], dist: &[u8], info: &EncodingInfo) -> f32 {
    let is_dist = |b: u8| dist.contains(&b);
    let relevant: Vec<u8> = bytes
        .windows(2)
        .filter(|w| is_dist(w[0]) || is_dist(w[1]))
        .flat_map(|w| w.iter().copied())
        .collect();
    if relevant.len() < crate::consts::MIN_BYTES_FOR_BIGRAM {
        return 0.0;
    }
    let mut best = 0.0f32;
    for &lang in STORE.languages_for(info.name) {
        if let Some(table) = STORE.table(info.name, lang) {
            best = best.max(table.score(&relevant));
        }
    }
    best
}

/// Strategy 2: vote using the Unicode general category each side assigns to
/// every distinguishing byte actually present in the buffer.
fn category_vote(bytes: &[u8], dist: &[u8], a: &EncodingInfo, b: &EncodingInfo) -> Option<&'static str> {
    let mut votes_a = 0i32;
    let mut votes_b = 0i32;
    let present: std::collections::HashSet<u8> = bytes.iter().copied().filter(|b8| dist.contains(b8)).collect();
    for &byte in &present {
        let ca = byte_to_char(a, byte);
        let cb = byte_to_char(b, byte);
        let ra = ca.map(category_rank).unwrap_or(0);
        let rb = cb.map(category_rank).unwrap_or(0);
        match ra.cmp(&rb) {
            std::cmp::Ordering::Greater => votes_a += 1,
            std::cmp::Ordering::Less => votes_b += 1,
            std::cmp::Ordering::Equal => {}
        }
    }
    match votes_a.cmp(&votes_b) {
        std::cmp::Ordering::Greater => Some(a.name),
        std::cmp::Ordering::Less => Some(b.name),
        std::cmp::Ordering::Equal => None,
    }
}

/// Resolves a confusion-group collision between the top two candidates,
/// returning the winning encoding's canonical name (§4.9). Callers must
/// already have established that `a` and `b` share a confusion group.
pub fn resolve(strategy: ConfusionStrategy, bytes: &[u8], a: &EncodingInfo, b: &EncodingInfo) -> &'static str {
    let dist = GRAPH.distinguishing_bytes_for(a.name, b.name).to_vec();

    let bigram_winner = || {
        let score_a = distinguishing_bigram_rescore(bytes, &dist, a);
        let score_b = distinguishing_bigram_rescore(bytes, &dist, b);
        if score_a >= score_b {
            a.name
        } else {
            b.name
        }
    };

    match strategy {
        ConfusionStrategy::DistinguishingBigram => bigram_winner(),
        ConfusionStrategy::CategoryVote => category_vote(bytes, &dist, a, b).unwrap_or_else(bigram_winner),
        ConfusionStrategy::Hybrid => {
            let bigram = bigram_winner();
            match category_vote(bytes, &dist, a, b) {
                Some(vote) if vote == bigram => bigram,
                _ => bigram,
            }
        }
    }
}

/// Legacy helper: drops `iso-8859-10`, `iso-8859-14`, and `windows-1254`
/// unless a byte unique to that encoding (relative to `windows-1252`, the
/// common default) actually appears in the buffer.
pub fn demote_niche_latin<'a>(bytes: &[u8], candidates: Vec<&'a EncodingInfo>) -> Vec<&'a EncodingInfo> {
    static NICHE: &[&str] = &["iso-8859-10", "iso-8859-14", "windows-1254"];
    let windows_1252 = registry::by_name("windows-1252").unwrap();
    candidates
        .into_iter()
        .filter(|info| {
            if !NICHE.contains(&info.name) {
                return true;
            }
            bytes.iter().any(|&b| b >= 0x80 && byte_to_char(info, b) != byte_to_char(windows_1252, b))
        })
        .collect()
}

/// Legacy helper: when both `koi8-r` and `koi8-t` survive and a Tajik-only
/// byte position (0x80-0x85 in `koi8-t`) appears in the buffer, drop
/// `koi8-r` in favour of `koi8-t`.
pub fn promote_koi8_t<'a>(bytes: &[u8], candidates: Vec<&'a EncodingInfo>) -> Vec<&'a EncodingInfo> {
    let has_koi8_r = candidates.iter().any(|c| c.name == "koi8-r");
    let has_koi8_t = candidates.iter().any(|c| c.name == "koi8-t");
    if !(has_koi8_r && has_koi8_t) {
        return candidates;
    }
    let tajik_specific = bytes.iter().any(|&b| (0x80..=0x85).contains(&b));
    if !tajik_specific {
        return candidates;
    }
    candidates.into_iter().filter(|c| c.name != "koi8-r").collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cp850_and_cp858_share_a_confusion_group() {
        assert!(GRAPH.same_group("cp850", "cp858"));
    }

    #[test]
    fn utf8_like_encodings_are_not_grouped_with_single_byte_ones() {
        assert!(!GRAPH.same_group("windows-1252", "koi8-r"));
    }

    #[test]
    fn cp850_cp858_distinguishing_byte_is_0xd5() {
        let dist = GRAPH.distinguishing_bytes_for("cp850", "cp858");
        assert!(dist.contains(&0xD5));
    }

    #[test]
    fn resolve_picks_cp858_when_euro_sign_present() {
        let cp850 = registry::by_name("cp850").unwrap();
        let cp858 = registry::by_name("cp858").unwrap();
        let bytes = [b'p', b'r', b'i', b'x', 0xD5];
        let winner = resolve(ConfusionStrategy::CategoryVote, &bytes, cp850, cp858);
        assert_eq!(winner, "cp858");
    }

    #[test]
    fn promote_koi8_t_drops_koi8_r_when_tajik_bytes_present() {
        let koi8_r = registry::by_name("koi8-r").unwrap();
        let koi8_t = registry::by_name("koi8-t").unwrap();
        let bytes = [0x80, 0xC1];
        let survivors = promote_koi8_t(&bytes, vec![koi8_r, koi8_t]);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].name, "koi8-t");
    }

    #[test]
    fn promote_koi8_t_is_a_no_op_without_tajik_bytes() {
        let koi8_r = registry::by_name("koi8-r").unwrap();
        let koi8_t = registry::by_name("koi8-t").unwrap();
        let bytes = [0xC1, 0xC2];
        let survivors = promote_koi8_t(&bytes, vec![koi8_r, koi8_t]);
        assert_eq!(survivors.len(), 2);
    }

    #[test]
    fn demote_niche_latin_drops_windows_1254_without_turkish_bytes() {
        let w1254 = registry::by_name("windows-1254").unwrap();
        let survivors = demote_niche_latin(b"plain ascii text", vec![w1254]);
        assert!(survivors.is_empty());
    }

    #[test]
    fn graph_serialises_without_error() {
        let mut buf = Vec::new();
        GRAPH.write_to(&mut buf).unwrap();
        assert!(!buf.is_empty());
    }
}
