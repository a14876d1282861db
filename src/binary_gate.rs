//! Stage 1: binary gate (§4.2).
//!
//! Counts bytes in the "common control byte" set, excluding TAB/LF/CR, and
//! halts the pipeline with a confident binary verdict once they exceed 1%
//! of the buffer. A single feed-then-ratio pass, kept as a plain function
//! since it only ever runs once per call, not per character.

pub fn is_control_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1F)
}

/// `true` if the buffer should be declared binary and the pipeline halted.
pub fn is_binary(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let control_count = bytes.iter().filter(|&&b| is_control_byte(b)).count();
    (control_count as f32 / bytes.len() as f32) > crate::consts::BINARY_GATE_CONTROL_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mostly_control_bytes_trip_the_gate() {
        let data: Vec<u8> = std::iter::repeat([0xFF, 0x00]).take(512).flatten().collect();
        assert!(is_binary(&data));
    }

    #[test]
    fn plain_text_does_not_trip_the_gate() {
        assert!(!is_binary(b"the quick brown fox jumps over the lazy dog"));
    }

    #[test]
    fn tabs_newlines_and_crs_are_not_control_bytes() {
        assert!(!is_binary(b"line one\r\nline two\tindented\r\n"));
    }

    #[test]
    fn empty_buffer_is_not_binary() {
        assert!(!is_binary(&[]));
    }

    #[test]
    fn exactly_at_threshold_does_not_trip() {
        // 1 control byte in 100 is exactly 1%, which must NOT exceed the
        // threshold (the gate fires only when the ratio is strictly > 1%).
        let mut data = vec![b'a'; 100];
        data[0] = 0x01;
        assert!(!is_binary(&data));
    }
}
