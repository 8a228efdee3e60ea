// Per-symbol Huffman code table used when writing.

use super::code::CodeBuilder;
use crate::error::Result;

/// Maps each symbol to its bit-reversed canonical code.
///
/// Symbols with a zero length hold 0; callers must check the symbol's
/// length before trusting its entry.
#[derive(Debug, Clone, Default)]
pub struct EncodeTable {
    codes: Vec<u16>,
}

impl EncodeTable {
    /// Allocate a table for an alphabet of `size` symbols.
    pub fn with_size(size: usize) -> Self {
        Self {
            codes: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Rebuild from `lens` and return the longest code length.
    ///
    /// Only symbols below the table size are recorded; lengths produced by
    /// a run-length overshoot past the alphabet end are dropped here.
    pub fn build(&mut self, lens: &[u8], codes: &mut CodeBuilder) -> Result<u8> {
        let max_bits = codes.assign(lens)?;
        let assignments = codes.assignments_mut();
        assignments.sort_by_key(|a| a.symbol);

        let mut next = assignments.iter().peekable();
        for (symbol, slot) in self.codes.iter_mut().enumerate() {
            *slot = match next.next_if(|a| a.symbol as usize == symbol) {
                Some(a) => a.code,
                None => 0,
            };
        }
        Ok(max_bits)
    }

    /// Code for `symbol`; `None` if the symbol is outside the table.
    #[inline]
    pub fn code(&self, symbol: usize) -> Option<u16> {
        self.codes.get(symbol).copied()
    }
}
