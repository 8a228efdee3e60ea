// Fixed Huffman code lengths (RFC 1951, Section 3.2.6).

use super::{FIXED_LIT_LEN_CODES, MAX_DISTANCE_CODES};

/// Literal/length code lengths of a fixed-Huffman block.
///
/// | symbols | length |
/// |---------|--------|
/// | 0-143   | 8      |
/// | 144-255 | 9      |
/// | 256-279 | 7      |
/// | 280-287 | 8      |
pub const FIXED_LIT_LEN_LENGTHS: [u8; FIXED_LIT_LEN_CODES] = build_lit_len_lengths();

/// Distance code lengths of a fixed-Huffman block.
pub const FIXED_DISTANCE_LENGTHS: [u8; MAX_DISTANCE_CODES] = [5; MAX_DISTANCE_CODES];

const fn build_lit_len_lengths() -> [u8; FIXED_LIT_LEN_CODES] {
    let mut lens = [0u8; FIXED_LIT_LEN_CODES];
    let mut i = 0;
    while i < FIXED_LIT_LEN_CODES {
        lens[i] = match i {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
        i += 1;
    }
    lens
}
