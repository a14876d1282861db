//! Stage 4: validity filter (§4.5).
//!
//! Drops every remaining candidate that cannot decode the buffer without
//! errors. This is the cheapest possible rejection test before the more
//! expensive structural and bigram stages run, so it is written as a single
//! pass per candidate rather than anything incremental.

use crate::registry::{Decoder, EncodingInfo};

/// `true` if `bytes` decodes under `info`'s encoding without a single
/// malformed-sequence or unmapped-byte error.
pub fn is_valid(bytes: &[u8], info: &EncodingInfo) -> bool {
    match &info.decoder {
        Decoder::Ascii => bytes.iter().all(|&b| b < 0x80),
        Decoder::Whatwg(enc) => {
            let (_, had_errors) = enc.decode_without_bom_handling(bytes);
            !had_errors
        }
        Decoder::SingleByte(table) => bytes.iter().all(|&b| table.decode_byte(b).is_some()),
        Decoder::Utf32 { big_endian } => is_valid_utf32(bytes, *big_endian),
        // Resolved exclusively by the escape probe; never reached here.
        Decoder::EscapeOnly => false,
    }
}

fn is_valid_utf32(bytes: &[u8], big_endian: bool) -> bool {
    if bytes.len() % 4 != 0 {
        return false;
    }
    bytes.chunks_exact(4).all(|chunk| {
        let word = if big_endian {
            u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
        } else {
            u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
        };
        char::from_u32(word).is_some()
    })
}

/// Applies the validity filter to a candidate list, preserving order.
pub fn filter_valid<'a>(bytes: &[u8], candidates: Vec<&'a EncodingInfo>) -> Vec<&'a EncodingInfo> {
    candidates.into_iter().filter(|info| is_valid(bytes, info)).collect()
}
