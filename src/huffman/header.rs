// Dynamic block header <-> puff buffer transcoding (RFC 1951, Section 3.2.7).
//
// Puff buffer layout:
//
//   byte 0        HLIT  (num_lit_len - 257)
//   byte 1        HDIST (num_distance - 1)
//   byte 2        HCLEN (num_codes - 4)
//   next ceil(num_codes / 2) bytes
//                 3-bit code-length-alphabet lengths in permutation order,
//                 two per byte, high nibble first; an odd count leaves the
//                 last low nibble zero
//   then          run-length tokens for the lit/len lengths followed by the
//                 distance lengths, as one sequence: a repeat may start in
//                 the lit/len lengths and end in the distance lengths
//
// Decoding a header and encoding the resulting buffer reproduces the input
// bits exactly.

use log::debug;

use super::run_length::{read_code_lengths, write_code_lengths};
use super::table::{HuffmanTable, Loaded};
use super::{MAX_DISTANCE_CODES, MAX_LIT_LEN_CODES, NUM_CODE_LENGTH_CODES};
use crate::bits::{BitRead, BitWrite};
use crate::error::{Error, InvalidInput, Result};

/// Order in which code-length-alphabet lengths are sent.
pub const CODE_LENGTH_ORDER: [usize; NUM_CODE_LENGTH_CODES] =
    [16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15];

/// Bytes of the fixed HLIT/HDIST/HCLEN prefix in puff form.
const FIELD_BYTES: usize = 3;

/// Bits of the HLIT/HDIST/HCLEN prefix in the stream.
const FIELD_BITS: u32 = 14;

/// Alphabet sizes declared by a dynamic header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderCounts {
    pub num_lit_len: usize,
    pub num_distance: usize,
    pub num_codes: usize,
}

impl HeaderCounts {
    /// Validate raw HLIT/HDIST/HCLEN values and derive the alphabet sizes.
    pub fn from_fields(hlit: u8, hdist: u8, hclen: u8) -> Result<Self> {
        for (value, width) in [(hlit, 5), (hdist, 5), (hclen, 4)] {
            if value >> width != 0 {
                return Err(InvalidInput::HeaderField { value, width }.into());
            }
        }
        let counts = Self {
            num_lit_len: usize::from(hlit) + 257,
            num_distance: usize::from(hdist) + 1,
            num_codes: usize::from(hclen) + 4,
        };
        if counts.num_lit_len > MAX_LIT_LEN_CODES
            || counts.num_distance > MAX_DISTANCE_CODES
            || counts.num_codes > NUM_CODE_LENGTH_CODES
        {
            return Err(InvalidInput::AlphabetSize {
                lit_len: counts.num_lit_len,
                distance: counts.num_distance,
                codes: counts.num_codes,
            }
            .into());
        }
        Ok(counts)
    }

    /// The raw HLIT/HDIST/HCLEN values.
    pub fn fields(&self) -> (u8, u8, u8) {
        (
            (self.num_lit_len - 257) as u8,
            (self.num_distance - 1) as u8,
            (self.num_codes - 4) as u8,
        )
    }

    /// Bytes holding the packed code-length-alphabet lengths.
    pub fn packed_len(&self) -> usize {
        self.num_codes.div_ceil(2)
    }
}

impl HuffmanTable {
    /// Parse a dynamic block header from `br` and build the decode tables.
    ///
    /// The header is written to `buffer` in puff form; the number of bytes
    /// written is returned. `br` must be positioned just after the 3-bit
    /// block header. On failure no table set is loaded.
    pub fn build_dynamic_table_decode<R: BitRead + ?Sized>(
        &mut self,
        br: &mut R,
        buffer: &mut [u8],
    ) -> Result<usize> {
        self.loaded = None;
        self.reserve();

        if buffer.len() < FIELD_BYTES {
            return Err(Error::InsufficientOutput);
        }
        br.cache_bits(FIELD_BITS)?;
        let mut fields = [0u8; FIELD_BYTES];
        for (field, width) in fields.iter_mut().zip([5, 5, 4]) {
            *field = br.read_bits(width) as u8;
            br.drop_bits(width);
        }
        buffer[..FIELD_BYTES].copy_from_slice(&fields);
        let [hlit, hdist, hclen] = fields;
        let counts = HeaderCounts::from_fields(hlit, hdist, hclen)?;
        debug!(
            "dynamic header: {} lit/len, {} distance, {} code-length codes",
            counts.num_lit_len, counts.num_distance, counts.num_codes
        );

        let mut index = FIELD_BYTES;
        let packed = counts.packed_len();
        if buffer.len() - index < packed {
            return Err(Error::InsufficientOutput);
        }
        self.code_lens.fill(0);
        for (i, &symbol) in CODE_LENGTH_ORDER[..counts.num_codes].iter().enumerate() {
            br.cache_bits(3)?;
            let len = br.read_bits(3) as u8;
            br.drop_bits(3);
            self.code_lens[symbol] = len;
            let byte = &mut buffer[index + i / 2];
            if i % 2 == 0 {
                *byte = len << 4;
            } else {
                *byte |= len;
            }
        }
        index += packed;
        self.code_decode.build(&self.code_lens, &mut self.codes)?;

        index += read_code_lengths(
            br,
            &self.code_decode,
            &self.code_lens,
            counts.num_lit_len + counts.num_distance,
            &mut self.lit_len_lens,
            &mut buffer[index..],
        )?;
        self.split_lengths(counts.num_lit_len);
        self.lit_len_decode.build(&self.lit_len_lens, &mut self.codes)?;
        self.distance_decode
            .build(&self.distance_lens, &mut self.codes)?;

        debug!(
            "dynamic header decoded: {index} puff bytes, lit/len max_bits {}, distance max_bits {}",
            self.lit_len_decode.max_bits(),
            self.distance_decode.max_bits()
        );
        self.loaded = Some(Loaded::DynamicDecode);
        Ok(index)
    }

    /// Write the dynamic block header described by the puff-form `buffer`
    /// to `bw` and build the encode tables.
    ///
    /// The whole buffer must be one header: leftover bytes are rejected.
    /// Header fields, packed lengths and the code-length code itself are
    /// validated before any bit is written. On failure no table set is
    /// loaded.
    pub fn build_dynamic_table_encode<W: BitWrite + ?Sized>(
        &mut self,
        buffer: &[u8],
        bw: &mut W,
    ) -> Result<()> {
        self.loaded = None;
        self.reserve();

        let &[hlit, hdist, hclen, ref rest @ ..] = buffer else {
            return Err(Error::InsufficientInput);
        };
        let counts = HeaderCounts::from_fields(hlit, hdist, hclen)?;
        let packed = counts.packed_len();
        let nibbles = rest.get(..packed).ok_or(Error::InsufficientInput)?;

        self.code_lens.fill(0);
        for (i, &symbol) in CODE_LENGTH_ORDER[..counts.num_codes].iter().enumerate() {
            let byte = nibbles[i / 2];
            let len = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };
            if len > 7 {
                return Err(InvalidInput::HeaderField {
                    value: len,
                    width: 3,
                }
                .into());
            }
            self.code_lens[symbol] = len;
        }
        if counts.num_codes % 2 == 1 {
            let pad = nibbles[packed - 1] & 0x0F;
            if pad != 0 {
                return Err(InvalidInput::PaddingNibble(pad).into());
            }
        }
        self.code_encode.build(&self.code_lens, &mut self.codes)?;
        debug!(
            "dynamic header: {} lit/len, {} distance, {} code-length codes",
            counts.num_lit_len, counts.num_distance, counts.num_codes
        );

        bw.write_bits(5, u32::from(hlit))?;
        bw.write_bits(5, u32::from(hdist))?;
        bw.write_bits(4, u32::from(hclen))?;
        for &symbol in &CODE_LENGTH_ORDER[..counts.num_codes] {
            bw.write_bits(3, u32::from(self.code_lens[symbol]))?;
        }

        let mut index = FIELD_BYTES + packed;
        index += write_code_lengths(
            bw,
            &self.code_encode,
            &self.code_lens,
            &buffer[index..],
            counts.num_lit_len + counts.num_distance,
            &mut self.lit_len_lens,
        )?;
        self.split_lengths(counts.num_lit_len);
        self.lit_len_encode.build(&self.lit_len_lens, &mut self.codes)?;
        self.distance_encode
            .build(&self.distance_lens, &mut self.codes)?;

        if index != buffer.len() {
            return Err(InvalidInput::TrailingBytes {
                consumed: index,
                len: buffer.len(),
            }
            .into());
        }
        debug!("dynamic header encoded: {} bits", bw.bits_written());
        self.loaded = Some(Loaded::DynamicEncode);
        Ok(())
    }

    /// Move the lengths past the lit/len alphabet from `lit_len_lens` into
    /// `distance_lens`.
    fn split_lengths(&mut self, num_lit_len: usize) {
        self.distance_lens.clear();
        self.distance_lens
            .extend_from_slice(&self.lit_len_lens[num_lit_len..]);
        self.lit_len_lens.truncate(num_lit_len);
    }
}
