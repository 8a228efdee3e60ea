// Error taxonomy shared by the table engine, the bit I/O layer and the
// deflate framing helpers.
//
// Every failure is one of three mutually exclusive kinds: the input ran out,
// the output ran out, or the input is structurally invalid. The invalid case
// carries a detail value naming the violation.

use thiserror::Error;

use crate::deflate::BlockType;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by table building and header transcoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The bit stream or puff buffer ended before the required data.
    #[error("insufficient input")]
    InsufficientInput,
    /// The caller-supplied output buffer or bit sink is too small.
    #[error("insufficient output")]
    InsufficientOutput,
    /// The input violates the DEFLATE or puff-form structure.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
}

impl Error {
    /// Whether this is an [`Error::InvalidInput`] of any detail.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Structural violations reported as [`Error::InvalidInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidInput {
    /// The lengths claim more code space than exists; `count` codes of
    /// `length` bits are where it ran out.
    #[error("oversubscribed code lengths: {count} codes of length {length}")]
    Oversubscribed { length: u8, count: u32 },
    /// A code length above the 15-bit DEFLATE maximum.
    #[error("code length {0} exceeds the 15-bit maximum")]
    CodeLengthTooLong(u8),
    /// HLIT/HDIST/HCLEN describe alphabets larger than DEFLATE allows.
    #[error("alphabet sizes out of range: {lit_len} lit/len, {distance} distance, {codes} code lengths")]
    AlphabetSize {
        lit_len: usize,
        distance: usize,
        codes: usize,
    },
    /// A raw header field does not fit its bit width.
    #[error("header field {value} does not fit in {width} bits")]
    HeaderField { value: u8, width: u8 },
    /// An odd code-length count left a non-zero low nibble in the last
    /// packed byte.
    #[error("non-zero padding nibble {0:#x} after the last code length")]
    PaddingNibble(u8),
    /// Repeat-previous (code 16) appeared before any length was produced.
    #[error("repeat of previous code length at the start of an alphabet")]
    RepeatWithoutPrevious,
    /// The lookahead bits do not match any code in the table.
    #[error("no Huffman code matches the input bits")]
    UnknownCode,
    /// A decoded code-length symbol outside 0..=18.
    #[error("invalid code-length symbol {0}")]
    InvalidSymbol(u16),
    /// A puff-form run-length token above 155.
    #[error("invalid run-length token {0}")]
    InvalidToken(u8),
    /// A symbol was queried that has no code in the current table.
    #[error("symbol {0} has no Huffman code")]
    UnusedSymbol(usize),
    /// The puff buffer holds bytes beyond the encoded header.
    #[error("header consumed {consumed} of {len} puff bytes")]
    TrailingBytes { consumed: usize, len: usize },
    /// BTYPE 3 is reserved.
    #[error("reserved block type {0}")]
    InvalidBlockType(u8),
    /// The block to transcode does not carry a dynamic Huffman header.
    #[error("expected a dynamic block, found {0}")]
    NotDynamicBlock(BlockType),
    /// A zlib or gzip wrapper that cannot be parsed.
    #[error("invalid container: {0}")]
    InvalidContainer(&'static str),
    /// A symbol accessor was used without tables for its direction.
    #[error("no {0} tables are loaded")]
    TablesNotLoaded(&'static str),
}
