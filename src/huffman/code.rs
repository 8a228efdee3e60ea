// Canonical Huffman code assignment (RFC 1951, Section 3.2.2).
//
// Given one bit length per symbol, codes are handed out in ascending
// (length, symbol) order. Each code is stored bit-reversed because DEFLATE
// packs Huffman codes starting from their most-significant bit into an
// LSB-first stream.

use log::warn;

use crate::error::{InvalidInput, Result};

/// Longest code length DEFLATE allows.
pub const MAX_HUFFMAN_BITS: u8 = 15;

/// Largest alphabet any table holds (the fixed literal/length alphabet).
pub const MAX_ALPHABET_SIZE: usize = 288;

/// Reverse the low `width` bits of `value`. Bits above `width` are dropped.
#[inline]
pub fn bit_reverse(value: u16, width: u8) -> u16 {
    if width == 0 {
        return 0;
    }
    debug_assert!(width <= 16);
    value.reverse_bits() >> (16 - u32::from(width))
}

/// A symbol paired with its bit-reversed canonical code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeAssignment {
    pub code: u16,
    pub symbol: u16,
}

/// Assigns canonical codes into a reusable scratch list.
///
/// The list is allocated once at `MAX_ALPHABET_SIZE` capacity and cleared
/// on every call.
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    assignments: Vec<CodeAssignment>,
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeBuilder {
    pub fn new() -> Self {
        Self {
            assignments: Vec::with_capacity(MAX_ALPHABET_SIZE),
        }
    }

    /// Assign canonical codes for `lens` and return the longest length in
    /// use (0 when every length is zero).
    ///
    /// An all-zero array is legal: a block made only of literals has no
    /// distance codes. Incomplete codes are accepted. Lengths that claim
    /// more code space than exists (Kraft sum above one) are rejected at
    /// the first length that runs out.
    pub fn assign(&mut self, lens: &[u8]) -> Result<u8> {
        let mut len_count = [0u32; MAX_HUFFMAN_BITS as usize + 1];
        let mut next_code = [0u32; MAX_HUFFMAN_BITS as usize + 1];

        for &len in lens {
            if len > MAX_HUFFMAN_BITS {
                return Err(InvalidInput::CodeLengthTooLong(len).into());
            }
            len_count[len as usize] += 1;
        }

        let max_bits = (1..=MAX_HUFFMAN_BITS)
            .rev()
            .find(|&bits| len_count[bits as usize] != 0)
            .unwrap_or(0);

        if lens.len() == len_count[0] as usize {
            warn!("no non-zero lengths in a Huffman code length array");
        }

        // Unused code space at each length, in units of that length's codes.
        let mut left = 1i64;
        for length in 1..=max_bits {
            let count = len_count[length as usize];
            left = (left << 1) - i64::from(count);
            if left < 0 {
                return Err(InvalidInput::Oversubscribed { length, count }.into());
            }
        }

        let mut code = 0u32;
        len_count[0] = 0;
        for bits in 1..=MAX_HUFFMAN_BITS as usize {
            code = (code + len_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        self.assignments.clear();
        for (symbol, &len) in lens.iter().enumerate() {
            if len == 0 {
                continue;
            }
            self.assignments.push(CodeAssignment {
                code: bit_reverse(next_code[len as usize] as u16, len),
                symbol: symbol as u16,
            });
            next_code[len as usize] += 1;
        }
        Ok(max_bits)
    }

    /// Assignments from the last successful `assign`, in symbol order until
    /// a table builder re-sorts them.
    pub fn assignments(&self) -> &[CodeAssignment] {
        &self.assignments
    }

    pub(crate) fn assignments_mut(&mut self) -> &mut [CodeAssignment] {
        &mut self.assignments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn reverse_small_widths() {
        assert_eq!(bit_reverse(0b1, 1), 0b1);
        assert_eq!(bit_reverse(0b110, 3), 0b011);
        assert_eq!(bit_reverse(0b1000_0000, 8), 0b0000_0001);
        assert_eq!(bit_reverse(0b1_0000_0000_0000_01, 15), 0b1_0000_0000_0000_01);
        assert_eq!(bit_reverse(0x7FFF, 0), 0);
        // Bits above the width are ignored.
        assert_eq!(bit_reverse(0b1111_0001, 4), 0b1000);
    }

    #[test]
    fn rfc1951_example_codes() {
        // RFC 1951 3.2.2: lengths (3, 3, 3, 3, 3, 2, 4, 4) for A..H give
        // 010, 011, 100, 101, 110, 00, 1110, 1111.
        let lens = [3, 3, 3, 3, 3, 2, 4, 4];
        let mut cb = CodeBuilder::new();
        let max_bits = cb.assign(&lens).unwrap();
        assert_eq!(max_bits, 4);

        let expected: [(u16, u8); 8] = [
            (0b010, 3),
            (0b011, 3),
            (0b100, 3),
            (0b101, 3),
            (0b110, 3),
            (0b00, 2),
            (0b1110, 4),
            (0b1111, 4),
        ];
        let got = cb.assignments();
        assert_eq!(got.len(), 8);
        for (i, (&(code, len), a)) in expected.iter().zip(got).enumerate() {
            assert_eq!(a.symbol as usize, i);
            assert_eq!(a.code, bit_reverse(code, len), "symbol {i}");
        }
    }

    #[test]
    fn zero_lengths_are_skipped() {
        let lens = [0, 1, 0, 1];
        let mut cb = CodeBuilder::new();
        assert_eq!(cb.assign(&lens).unwrap(), 1);
        let symbols: Vec<u16> = cb.assignments().iter().map(|a| a.symbol).collect();
        assert_eq!(symbols, vec![1, 3]);
        assert_eq!(cb.assignments()[0].code, 0);
        assert_eq!(cb.assignments()[1].code, 1);
    }

    #[test]
    fn empty_alphabet_is_not_an_error() {
        let mut cb = CodeBuilder::new();
        assert_eq!(cb.assign(&[0; 30]).unwrap(), 0);
        assert!(cb.assignments().is_empty());
        assert_eq!(cb.assign(&[]).unwrap(), 0);
    }

    #[test]
    fn oversubscribed_lengths_fail() {
        let mut cb = CodeBuilder::new();
        let err = cb.assign(&[1, 1, 1]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidInput(InvalidInput::Oversubscribed {
                length: 1,
                count: 3
            })
        );

        let mut lens = vec![0u8; 20];
        lens[..9].fill(3);
        assert!(matches!(
            cb.assign(&lens),
            Err(Error::InvalidInput(InvalidInput::Oversubscribed {
                length: 3,
                count: 9
            }))
        ));
    }

    #[test]
    fn overfull_lengths_fail_at_first_exhausted_length() {
        // Two one-bit codes fill the space; a two-bit code has nowhere to go.
        let mut cb = CodeBuilder::new();
        assert_eq!(
            cb.assign(&[1, 1, 2]),
            Err(Error::InvalidInput(InvalidInput::Oversubscribed {
                length: 2,
                count: 1
            }))
        );
        // Every per-length count fits, the sum does not.
        assert_eq!(
            cb.assign(&[2, 2, 2, 3, 3, 3]),
            Err(Error::InvalidInput(InvalidInput::Oversubscribed {
                length: 3,
                count: 3
            }))
        );
        assert_eq!(cb.assign(&[2, 2, 2, 3, 3]).unwrap(), 3);
    }

    #[test]
    fn incomplete_codes_are_accepted() {
        // A single one-bit code leaves half the code space unused.
        let mut cb = CodeBuilder::new();
        assert_eq!(cb.assign(&[0, 0, 1]).unwrap(), 1);
        assert_eq!(cb.assignments(), &[CodeAssignment { code: 0, symbol: 2 }]);
    }

    #[test]
    fn overlong_length_is_rejected() {
        let mut cb = CodeBuilder::new();
        assert_eq!(
            cb.assign(&[16, 1]),
            Err(Error::InvalidInput(InvalidInput::CodeLengthTooLong(16)))
        );
    }
}
