// Huffman table engine.
//
// `HuffmanTable` owns every length array, decode table and encode table a
// DEFLATE block needs, plus the scratch list used to assign codes. Storage
// is reused across builds:
//
//   1. `HuffmanTable::new()` allocates nothing.
//   2. The first build (or an explicit `reserve()`) sizes every container to
//      its maximum extent: 2^15-slot decode tables for literal/length and
//      distance, 2^7 slots for the code-length alphabet, and encode tables
//      for 288/30/19 symbols.
//   3. Later builds only rewrite the parts they use.
//
// `reset()` returns the engine to step 1. One engine serves one caller at a
// time; use separate engines for parallel work.

use log::debug;

use super::code::{CodeBuilder, MAX_HUFFMAN_BITS};
use super::decode_table::DecodeTable;
use super::encode_table::EncodeTable;
use super::fixed::{FIXED_DISTANCE_LENGTHS, FIXED_LIT_LEN_LENGTHS};
use super::{FIXED_LIT_LEN_CODES, MAX_DISTANCE_CODES, NUM_CODE_LENGTH_CODES};
use crate::error::{InvalidInput, Result};

/// Longest code in the code-length alphabet (lengths are 3-bit fields).
const CODE_LENGTH_MAX_BITS: u8 = 7;

/// Which table set the engine currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loaded {
    /// Fixed tables, both directions.
    Fixed,
    /// Decode tables from a parsed dynamic header.
    DynamicDecode,
    /// Encode tables from a puff-form dynamic header.
    DynamicEncode,
}

impl Loaded {
    pub fn can_decode(self) -> bool {
        matches!(self, Self::Fixed | Self::DynamicDecode)
    }

    pub fn can_encode(self) -> bool {
        matches!(self, Self::Fixed | Self::DynamicEncode)
    }
}

/// Canonical Huffman tables for one DEFLATE block.
#[derive(Debug, Clone, Default)]
pub struct HuffmanTable {
    pub(super) codes: CodeBuilder,

    pub(super) code_lens: Vec<u8>,
    pub(super) lit_len_lens: Vec<u8>,
    pub(super) distance_lens: Vec<u8>,

    pub(super) code_decode: DecodeTable,
    pub(super) lit_len_decode: DecodeTable,
    pub(super) distance_decode: DecodeTable,

    pub(super) code_encode: EncodeTable,
    pub(super) lit_len_encode: EncodeTable,
    pub(super) distance_encode: EncodeTable,

    pub(super) loaded: Option<Loaded>,
}

impl HuffmanTable {
    /// Create an engine with no storage. Containers are sized on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Size all containers to their maximum extent. Idempotent.
    pub fn reserve(&mut self) {
        if self.code_decode.is_empty() {
            self.code_decode = DecodeTable::with_capacity_bits(CODE_LENGTH_MAX_BITS);
        }
        if self.lit_len_decode.is_empty() {
            self.lit_len_decode = DecodeTable::with_capacity_bits(MAX_HUFFMAN_BITS);
        }
        if self.distance_decode.is_empty() {
            self.distance_decode = DecodeTable::with_capacity_bits(MAX_HUFFMAN_BITS);
        }
        if self.code_encode.is_empty() {
            self.code_encode = EncodeTable::with_size(NUM_CODE_LENGTH_CODES);
        }
        if self.lit_len_encode.is_empty() {
            self.lit_len_encode = EncodeTable::with_size(FIXED_LIT_LEN_CODES);
        }
        if self.distance_encode.is_empty() {
            self.distance_encode = EncodeTable::with_size(MAX_DISTANCE_CODES);
        }
        if self.code_lens.len() != NUM_CODE_LENGTH_CODES {
            self.code_lens = vec![0; NUM_CODE_LENGTH_CODES];
        }
    }

    /// Drop all storage and forget the loaded tables.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The table set currently held, if the last build succeeded.
    pub fn loaded(&self) -> Option<Loaded> {
        self.loaded
    }

    /// Build the fixed literal/length and distance tables.
    ///
    /// Does nothing if the fixed tables are already loaded.
    pub fn build_fixed_table(&mut self) -> Result<()> {
        if self.loaded == Some(Loaded::Fixed) {
            return Ok(());
        }
        self.loaded = None;
        self.reserve();

        self.lit_len_lens.clear();
        self.lit_len_lens.extend_from_slice(&FIXED_LIT_LEN_LENGTHS);
        self.distance_lens.clear();
        self.distance_lens.extend_from_slice(&FIXED_DISTANCE_LENGTHS);

        self.lit_len_decode.build(&self.lit_len_lens, &mut self.codes)?;
        self.distance_decode.build(&self.distance_lens, &mut self.codes)?;
        self.lit_len_encode.build(&self.lit_len_lens, &mut self.codes)?;
        self.distance_encode.build(&self.distance_lens, &mut self.codes)?;

        debug!(
            "fixed tables built: lit/len max_bits {}, distance max_bits {}",
            self.lit_len_decode.max_bits(),
            self.distance_decode.max_bits()
        );
        self.loaded = Some(Loaded::Fixed);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Symbol accessors
    // -----------------------------------------------------------------------

    /// Decode a literal/length symbol from `lit_len_max_bits()` bits of
    /// lookahead. Returns the symbol and the number of bits its code uses.
    ///
    /// The decode accessors need fixed or dynamic decode tables loaded and
    /// the encode accessors fixed or dynamic encode tables; otherwise they
    /// fail with `TablesNotLoaded`.
    pub fn lit_len_alphabet(&self, bits: u32) -> Result<(u16, u8)> {
        self.require(Loaded::can_decode, "decode")?;
        lookup_symbol(&self.lit_len_decode, &self.lit_len_lens, bits)
    }

    /// Decode a distance symbol from `distance_max_bits()` bits of lookahead.
    pub fn distance_alphabet(&self, bits: u32) -> Result<(u16, u8)> {
        self.require(Loaded::can_decode, "decode")?;
        lookup_symbol(&self.distance_decode, &self.distance_lens, bits)
    }

    /// Code and bit count for writing a literal/length symbol.
    pub fn lit_len_huffman(&self, symbol: usize) -> Result<(u16, u8)> {
        self.require(Loaded::can_encode, "encode")?;
        lookup_code(&self.lit_len_encode, &self.lit_len_lens, symbol)
    }

    /// Code and bit count for writing a distance symbol.
    pub fn distance_huffman(&self, symbol: usize) -> Result<(u16, u8)> {
        self.require(Loaded::can_encode, "encode")?;
        lookup_code(&self.distance_encode, &self.distance_lens, symbol)
    }

    fn require(&self, direction: fn(Loaded) -> bool, name: &'static str) -> Result<()> {
        if self.loaded.is_some_and(direction) {
            Ok(())
        } else {
            Err(InvalidInput::TablesNotLoaded(name).into())
        }
    }

    pub fn lit_len_max_bits(&self) -> u8 {
        self.lit_len_decode.max_bits()
    }

    pub fn distance_max_bits(&self) -> u8 {
        self.distance_decode.max_bits()
    }

    pub fn code_max_bits(&self) -> u8 {
        self.code_decode.max_bits()
    }

    pub fn lit_len_lengths(&self) -> &[u8] {
        &self.lit_len_lens
    }

    /// Distance code lengths of the loaded table. After a dynamic build this
    /// includes any run-length overshoot past the declared count.
    pub fn distance_lengths(&self) -> &[u8] {
        &self.distance_lens
    }

    /// Code-length alphabet lengths in symbol order (empty before the first
    /// build).
    pub fn code_lengths(&self) -> &[u8] {
        &self.code_lens
    }
}

fn lookup_symbol(table: &DecodeTable, lens: &[u8], bits: u32) -> Result<(u16, u8)> {
    let symbol = table.lookup(bits).ok_or(InvalidInput::UnknownCode)?;
    let len = lens.get(symbol as usize).copied().ok_or(InvalidInput::UnknownCode)?;
    Ok((symbol, len))
}

fn lookup_code(table: &EncodeTable, lens: &[u8], symbol: usize) -> Result<(u16, u8)> {
    match (table.code(symbol), lens.get(symbol)) {
        (Some(code), Some(&len)) if len != 0 => Ok((code, len)),
        _ => Err(InvalidInput::UnusedSymbol(symbol).into()),
    }
}
