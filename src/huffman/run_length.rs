// Run-length coding of code-length arrays (RFC 1951, Section 3.2.7).
//
// Both main alphabets of a dynamic header are sent as a sequence of
// code-length-alphabet symbols. In puff form every symbol becomes one token
// byte with its extra bits folded in:
//
//   0..=15    literal code length
//   16..=19   repeat the previous length 3..=6 times   (symbol 16, 2 bits)
//   20..=27   repeat zero 3..=10 times                  (symbol 17, 3 bits)
//   28..=155  repeat zero 11..=138 times                (symbol 18, 7 bits)

use super::decode_table::DecodeTable;
use super::encode_table::EncodeTable;
use crate::bits::{BitRead, BitWrite};
use crate::error::{Error, InvalidInput, Result};

const REPEAT_PREVIOUS_BASE: u8 = 16;
const REPEAT_ZERO_BASE: u8 = 20;
const REPEAT_ZERO_LONG_BASE: u8 = 28;
const MAX_TOKEN: u8 = 155;

/// What a run-length token stands for, with its run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A literal code length, 0..=15.
    Length(u8),
    /// Repeat the previous length 3..=6 times.
    RepeatPrevious(u8),
    /// Repeat length zero 3..=10 times.
    RepeatZero(u8),
    /// Repeat length zero 11..=138 times.
    RepeatZeroLong(u8),
}

/// One run-length token of a code-length array.
///
/// Only built by `from_byte` and `from_symbol`, so every run length is in
/// range for its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLengthToken(TokenKind);

impl RunLengthToken {
    /// Parse a puff-form token byte.
    pub fn from_byte(byte: u8) -> Result<Self> {
        Ok(Self(match byte {
            0..=15 => TokenKind::Length(byte),
            16..=19 => TokenKind::RepeatPrevious(byte - REPEAT_PREVIOUS_BASE + 3),
            20..=27 => TokenKind::RepeatZero(byte - REPEAT_ZERO_BASE + 3),
            28..=MAX_TOKEN => TokenKind::RepeatZeroLong(byte - REPEAT_ZERO_LONG_BASE + 11),
            _ => return Err(InvalidInput::InvalidToken(byte).into()),
        }))
    }

    /// Build a token from a code-length-alphabet symbol and its extra bits.
    /// Extra bits above the symbol's field width are ignored.
    pub fn from_symbol(symbol: u16, extra: u32) -> Result<Self> {
        let extra = extra as u8;
        Ok(Self(match symbol {
            0..=15 => TokenKind::Length(symbol as u8),
            16 => TokenKind::RepeatPrevious(3 + (extra & 0x03)),
            17 => TokenKind::RepeatZero(3 + (extra & 0x07)),
            18 => TokenKind::RepeatZeroLong(11 + (extra & 0x7F)),
            _ => return Err(InvalidInput::InvalidSymbol(symbol).into()),
        }))
    }

    pub fn kind(self) -> TokenKind {
        self.0
    }

    /// Puff-form byte of this token.
    pub fn to_byte(self) -> u8 {
        match self.0 {
            TokenKind::Length(len) => len,
            TokenKind::RepeatPrevious(n) => REPEAT_PREVIOUS_BASE + n - 3,
            TokenKind::RepeatZero(n) => REPEAT_ZERO_BASE + n - 3,
            TokenKind::RepeatZeroLong(n) => REPEAT_ZERO_LONG_BASE + n - 11,
        }
    }

    /// Code-length-alphabet symbol carrying this token.
    pub fn symbol(self) -> u16 {
        match self.0 {
            TokenKind::Length(len) => u16::from(len),
            TokenKind::RepeatPrevious(_) => 16,
            TokenKind::RepeatZero(_) => 17,
            TokenKind::RepeatZeroLong(_) => 18,
        }
    }

    /// Width of the extra-bit field following the symbol's code.
    pub fn extra_bits(self) -> u32 {
        match self.0 {
            TokenKind::Length(_) => 0,
            TokenKind::RepeatPrevious(_) => 2,
            TokenKind::RepeatZero(_) => 3,
            TokenKind::RepeatZeroLong(_) => 7,
        }
    }

    /// Value of the extra-bit field.
    pub fn extra(self) -> u32 {
        match self.0 {
            TokenKind::Length(_) => 0,
            TokenKind::RepeatPrevious(n) | TokenKind::RepeatZero(n) => u32::from(n - 3),
            TokenKind::RepeatZeroLong(n) => u32::from(n - 11),
        }
    }

    /// Number of code lengths this token produces.
    pub fn repeat(self) -> usize {
        match self.0 {
            TokenKind::Length(_) => 1,
            TokenKind::RepeatPrevious(n) | TokenKind::RepeatZero(n) | TokenKind::RepeatZeroLong(n) => {
                n as usize
            }
        }
    }

    /// Append the lengths this token stands for.
    pub fn expand(self, lens: &mut Vec<u8>) -> Result<()> {
        let value = match self.0 {
            TokenKind::Length(len) => len,
            TokenKind::RepeatPrevious(_) => {
                *lens.last().ok_or(InvalidInput::RepeatWithoutPrevious)?
            }
            TokenKind::RepeatZero(_) | TokenKind::RepeatZeroLong(_) => 0,
        };
        lens.resize(lens.len() + self.repeat(), value);
        Ok(())
    }
}

/// Extra-bit width following a code-length-alphabet symbol.
fn symbol_extra_bits(symbol: u16) -> Option<u32> {
    match symbol {
        0..=15 => Some(0),
        16 => Some(2),
        17 => Some(3),
        18 => Some(7),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Bit stream -> puff tokens
// ---------------------------------------------------------------------------

/// Decode code lengths from `br` until at least `target` lengths exist.
///
/// `code_table`/`code_lens` describe the code-length alphabet. `lens` is
/// cleared and receives every decoded length, including any overshoot past
/// `target` from a final repeat. One token byte per symbol goes to `out`;
/// the number of bytes written is returned.
pub fn read_code_lengths<R: BitRead + ?Sized>(
    br: &mut R,
    code_table: &DecodeTable,
    code_lens: &[u8],
    target: usize,
    lens: &mut Vec<u8>,
    out: &mut [u8],
) -> Result<usize> {
    let max_bits = u32::from(code_table.max_bits());
    let mut index = 0;
    lens.clear();
    while lens.len() < target {
        br.cache_bits(max_bits)?;
        let symbol = code_table
            .lookup(br.read_bits(max_bits))
            .ok_or(InvalidInput::UnknownCode)?;
        if index >= out.len() {
            return Err(Error::InsufficientOutput);
        }
        br.drop_bits(u32::from(code_lens[symbol as usize]));

        let width = symbol_extra_bits(symbol).ok_or(InvalidInput::InvalidSymbol(symbol))?;
        if symbol == 16 && lens.is_empty() {
            return Err(InvalidInput::RepeatWithoutPrevious.into());
        }
        br.cache_bits(width)?;
        let extra = br.read_bits(width);
        br.drop_bits(width);

        let token = RunLengthToken::from_symbol(symbol, extra)?;
        out[index] = token.to_byte();
        index += 1;
        token.expand(lens)?;
    }
    Ok(index)
}

// ---------------------------------------------------------------------------
// Puff tokens -> bit stream
// ---------------------------------------------------------------------------

/// Encode puff tokens from `tokens` until at least `target` lengths exist.
///
/// Mirror of [`read_code_lengths`]: writes each token's code and extra bits
/// to `bw` and returns the number of token bytes consumed.
pub fn write_code_lengths<W: BitWrite + ?Sized>(
    bw: &mut W,
    code_table: &EncodeTable,
    code_lens: &[u8],
    tokens: &[u8],
    target: usize,
    lens: &mut Vec<u8>,
) -> Result<usize> {
    let mut index = 0;
    lens.clear();
    while lens.len() < target {
        let &byte = tokens.get(index).ok_or(Error::InsufficientInput)?;
        index += 1;
        let token = RunLengthToken::from_byte(byte)?;
        let symbol = token.symbol() as usize;

        let nbits = code_lens[symbol];
        let code = code_table
            .code(symbol)
            .filter(|_| nbits != 0)
            .ok_or(InvalidInput::UnusedSymbol(symbol))?;
        if matches!(token.kind(), TokenKind::RepeatPrevious(_)) && lens.is_empty() {
            return Err(InvalidInput::RepeatWithoutPrevious.into());
        }

        bw.write_bits(u32::from(nbits), u32::from(code))?;
        bw.write_bits(token.extra_bits(), token.extra())?;
        token.expand(lens)?;
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{BufferBitReader, BufferBitWriter};
    use crate::huffman::code::CodeBuilder;

    /// Code-length alphabet where every symbol has a 5-bit code except 18,
    /// which has none.
    fn flat_code_lens() -> [u8; 19] {
        let mut lens = [5u8; 19];
        lens[18] = 0;
        lens
    }

    fn tables(code_lens: &[u8]) -> (DecodeTable, EncodeTable) {
        let mut codes = CodeBuilder::new();
        let mut dec = DecodeTable::with_capacity_bits(7);
        let mut enc = EncodeTable::with_size(19);
        dec.build(code_lens, &mut codes).unwrap();
        enc.build(code_lens, &mut codes).unwrap();
        (dec, enc)
    }

    fn kind(byte: u8) -> TokenKind {
        RunLengthToken::from_byte(byte).unwrap().kind()
    }

    #[test]
    fn token_bytes_cover_all_ranges() {
        assert_eq!(kind(0), TokenKind::Length(0));
        assert_eq!(kind(15), TokenKind::Length(15));
        assert_eq!(kind(16), TokenKind::RepeatPrevious(3));
        assert_eq!(kind(19), TokenKind::RepeatPrevious(6));
        assert_eq!(kind(20), TokenKind::RepeatZero(3));
        assert_eq!(kind(27), TokenKind::RepeatZero(10));
        assert_eq!(kind(28), TokenKind::RepeatZeroLong(11));
        assert_eq!(kind(155), TokenKind::RepeatZeroLong(138));
        assert_eq!(
            RunLengthToken::from_byte(156),
            Err(Error::InvalidInput(InvalidInput::InvalidToken(156)))
        );
        for byte in 0..=MAX_TOKEN {
            let t = RunLengthToken::from_byte(byte).unwrap();
            assert_eq!(t.to_byte(), byte);
            assert!(t.extra() < 1 << t.extra_bits());
        }
    }

    #[test]
    fn token_extra_fields() {
        let t = RunLengthToken::from_symbol(18, 127).unwrap();
        assert_eq!(t.kind(), TokenKind::RepeatZeroLong(138));
        assert_eq!(t.to_byte(), 155);
        assert_eq!((t.symbol(), t.extra_bits(), t.extra()), (18, 7, 127));

        let t = RunLengthToken::from_symbol(16, 0).unwrap();
        assert_eq!(t.to_byte(), 16);
        assert_eq!(t.repeat(), 3);
        assert!(RunLengthToken::from_symbol(19, 0).is_err());
    }

    #[test]
    fn oversized_extra_bits_stay_in_range() {
        // Bits above the field width never produce an out-of-range run.
        for (symbol, extra) in [(16, 0xFF), (17, 0xFFFF_FFFF), (18, 0x1FF)] {
            let t = RunLengthToken::from_symbol(symbol, extra).unwrap();
            assert_eq!(RunLengthToken::from_byte(t.to_byte()).unwrap(), t);
            assert!(t.extra() < 1 << t.extra_bits());
        }
        let t = RunLengthToken::from_symbol(17, 0xFF).unwrap();
        assert_eq!(t.kind(), TokenKind::RepeatZero(10));
    }

    #[test]
    fn expand_repeats() {
        let mut lens = vec![7];
        RunLengthToken::from_byte(16).unwrap().expand(&mut lens).unwrap();
        assert_eq!(lens, vec![7, 7, 7, 7]);
        RunLengthToken::from_byte(155).unwrap().expand(&mut lens).unwrap();
        assert_eq!(lens.len(), 142);
        assert!(lens[4..].iter().all(|&l| l == 0));

        let mut empty = Vec::new();
        assert_eq!(
            RunLengthToken::from_byte(16).unwrap().expand(&mut empty),
            Err(Error::InvalidInput(InvalidInput::RepeatWithoutPrevious))
        );
    }

    #[test]
    fn encode_then_decode_tokens() {
        let mut code_lens = [0u8; 19];
        code_lens[5] = 2;
        code_lens[8] = 2;
        code_lens[16] = 3;
        code_lens[17] = 3;
        code_lens[18] = 2;
        let (dec, enc) = tables(&code_lens);
        // 8, repeat x3, zero x4, 5, zero x11 -> 20 lengths.
        let tokens = [8u8, 16, 21, 5, 28];

        let mut bits = [0u8; 16];
        let mut bw = BufferBitWriter::new(&mut bits);
        let mut lens = Vec::new();
        let consumed =
            write_code_lengths(&mut bw, &enc, &code_lens, &tokens, 20, &mut lens).unwrap();
        assert_eq!(consumed, tokens.len());
        assert_eq!(lens.len(), 20);
        let written = bw.finish().unwrap().to_vec();

        let mut br = BufferBitReader::new(&written);
        let mut out = [0u8; 8];
        let mut decoded = Vec::new();
        let n = read_code_lengths(&mut br, &dec, &code_lens, 20, &mut decoded, &mut out).unwrap();
        assert_eq!(&out[..n], &tokens);
        assert_eq!(decoded, lens);
        assert_eq!(&decoded[..7], &[8, 8, 8, 8, 0, 0, 0]);
    }

    #[test]
    fn overshoot_is_kept() {
        let code_lens = flat_code_lens();
        let (_, enc) = tables(&code_lens);
        let mut bits = [0u8; 8];
        let mut bw = BufferBitWriter::new(&mut bits);
        let mut lens = Vec::new();
        // Target 2, but a zero run of 10 is accepted.
        let consumed =
            write_code_lengths(&mut bw, &enc, &code_lens, &[1, 27], 2, &mut lens).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(lens.len(), 11);
    }

    #[test]
    fn repeat_previous_first_is_rejected_both_ways() {
        let code_lens = flat_code_lens();
        let (dec, enc) = tables(&code_lens);

        let mut bits = [0u8; 8];
        let mut bw = BufferBitWriter::new(&mut bits);
        let mut lens = Vec::new();
        assert_eq!(
            write_code_lengths(&mut bw, &enc, &code_lens, &[16], 5, &mut lens),
            Err(Error::InvalidInput(InvalidInput::RepeatWithoutPrevious))
        );
        assert_eq!(bw.bits_written(), 0);

        // Symbol 16 followed by its 2 extra bits.
        let mut bits = [0u8; 8];
        let mut bw = BufferBitWriter::new(&mut bits);
        bw.write_bits(5, u32::from(enc.code(16).unwrap())).unwrap();
        bw.write_bits(2, 0).unwrap();
        let stream = bw.finish().unwrap().to_vec();
        let mut br = BufferBitReader::new(&stream);
        let mut out = [0u8; 4];
        assert_eq!(
            read_code_lengths(&mut br, &dec, &code_lens, 5, &mut lens, &mut out),
            Err(Error::InvalidInput(InvalidInput::RepeatWithoutPrevious))
        );
    }

    #[test]
    fn symbol_without_code_is_rejected() {
        let code_lens = flat_code_lens();
        let (_, enc) = tables(&code_lens);
        let mut bits = [0u8; 8];
        let mut bw = BufferBitWriter::new(&mut bits);
        let mut lens = Vec::new();
        assert_eq!(
            write_code_lengths(&mut bw, &enc, &code_lens, &[40], 20, &mut lens),
            Err(Error::InvalidInput(InvalidInput::UnusedSymbol(18)))
        );
    }

    #[test]
    fn decode_resource_errors() {
        let code_lens = flat_code_lens();
        let (dec, enc) = tables(&code_lens);
        let mut bits = [0u8; 8];
        let mut bw = BufferBitWriter::new(&mut bits);
        let mut lens = Vec::new();
        write_code_lengths(&mut bw, &enc, &code_lens, &[3, 3, 3], 3, &mut lens).unwrap();
        let stream = bw.finish().unwrap().to_vec();

        let mut br = BufferBitReader::new(&stream);
        let mut out = [0u8; 2];
        assert_eq!(
            read_code_lengths(&mut br, &dec, &code_lens, 3, &mut lens, &mut out),
            Err(Error::InsufficientOutput)
        );

        let mut br = BufferBitReader::new(&stream);
        let mut out = [0u8; 8];
        assert_eq!(
            read_code_lengths(&mut br, &dec, &code_lens, 4, &mut lens, &mut out),
            Err(Error::InsufficientInput)
        );
    }

    #[test]
    fn encode_resource_errors() {
        let code_lens = flat_code_lens();
        let (_, enc) = tables(&code_lens);
        let mut lens = Vec::new();

        let mut bits = [0u8; 8];
        let mut bw = BufferBitWriter::new(&mut bits);
        assert_eq!(
            write_code_lengths(&mut bw, &enc, &code_lens, &[3, 3], 3, &mut lens),
            Err(Error::InsufficientInput)
        );

        let mut bits = [0u8; 1];
        let mut bw = BufferBitWriter::new(&mut bits);
        assert_eq!(
            write_code_lengths(&mut bw, &enc, &code_lens, &[3, 3, 3], 3, &mut lens),
            Err(Error::InsufficientOutput)
        );
    }
}
