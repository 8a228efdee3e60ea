// Flat constant-time Huffman decode table.
//
// The table is indexed by `max_bits` bits of lookahead. A code of length L
// owns its exact slot plus every slot that has the code in its low L bits,
// i.e. 2^(max_bits - L) slots in total.

use log::trace;

use super::code::{CodeBuilder, MAX_HUFFMAN_BITS};
use crate::error::{InvalidInput, Result};

/// Marks a slot as holding a symbol.
const VALID: u16 = 0x8000;

/// Lookahead-indexed symbol table for one alphabet.
///
/// Storage is sized once for the longest code the alphabet may ever use and
/// only the `2^max_bits` prefix is rewritten by each build. The default
/// table has no storage and matches nothing.
#[derive(Debug, Clone, Default)]
pub struct DecodeTable {
    slots: Vec<u16>,
    max_bits: u8,
}

impl DecodeTable {
    /// Allocate a table able to hold codes up to `capacity_bits` long.
    pub fn with_capacity_bits(capacity_bits: u8) -> Self {
        debug_assert!(capacity_bits <= MAX_HUFFMAN_BITS);
        Self {
            slots: vec![0; 1 << capacity_bits],
            max_bits: 0,
        }
    }

    /// Whether storage has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Longest code in the current table; also the lookahead width.
    pub fn max_bits(&self) -> u8 {
        self.max_bits
    }

    /// Rebuild the table from `lens`.
    ///
    /// Codes are placed longest first, and the stable sort keeps equal
    /// lengths in ascending symbol order. A longer code claims its exact
    /// slot unconditionally; padded slots are only filled when still empty.
    /// Slots no code reaches in an incomplete code stay empty.
    pub fn build(&mut self, lens: &[u8], codes: &mut CodeBuilder) -> Result<u8> {
        let max_bits = codes.assign(lens)?;
        let used = 1usize << max_bits;
        if used > self.slots.len() {
            return Err(InvalidInput::CodeLengthTooLong(max_bits).into());
        }

        let assignments = codes.assignments_mut();
        assignments.sort_by(|a, b| lens[b.symbol as usize].cmp(&lens[a.symbol as usize]));

        self.slots[..used].fill(0);
        for a in assignments.iter() {
            let len = lens[a.symbol as usize];
            let entry = a.symbol | VALID;
            self.slots[a.code as usize] = entry;
            for pad in 1..1usize << (max_bits - len) {
                let slot = &mut self.slots[(pad << len) | a.code as usize];
                if *slot & VALID == 0 {
                    *slot = entry;
                }
            }
        }

        self.max_bits = max_bits;
        trace!(
            "decode table: {} codes, max_bits {max_bits}",
            assignments.len()
        );
        Ok(max_bits)
    }

    /// Symbol stored under `bits`, or `None` if no code matches.
    ///
    /// `bits` holds `max_bits` bits of lookahead; higher bits are ignored.
    #[inline]
    pub fn lookup(&self, bits: u32) -> Option<u16> {
        let mask = (1u32 << self.max_bits) - 1;
        let entry = self.slots.get((bits & mask) as usize).copied()?;
        (entry & VALID != 0).then_some(entry & !VALID)
    }
}
