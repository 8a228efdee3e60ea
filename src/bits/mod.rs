// Bit-level stream access for the table engine.
//
// The engine never touches bytes directly: it reads through `BitRead` and
// writes through `BitWrite`. Both follow DEFLATE's LSB-first bit order.
//
// - `reader` - `BufferBitReader`, a `BitRead` over an in-memory slice
// - `writer` - `BufferBitWriter`, a fixed-capacity `BitWrite` over a slice

pub mod reader;
pub mod writer;

pub use reader::BufferBitReader;
pub use writer::BufferBitWriter;

use crate::error::Result;

/// Source of LSB-first bits.
///
/// `read_bits` and `drop_bits` may only touch bits made available by a
/// successful `cache_bits` call; at most 32 bits are cached at once.
pub trait BitRead {
    /// Make at least `nbits` bits available for reading.
    ///
    /// Fails with `Error::InsufficientInput` if the stream holds fewer bits.
    fn cache_bits(&mut self, nbits: u32) -> Result<()>;

    /// Peek at the next `nbits` cached bits without consuming them.
    fn read_bits(&self, nbits: u32) -> u32;

    /// Consume `nbits` cached bits.
    fn drop_bits(&mut self, nbits: u32);

    /// Number of input bytes consumed so far. A partially consumed byte
    /// counts as consumed.
    fn offset(&self) -> usize;

    /// Bits left in the stream, including cached ones.
    fn bits_remaining(&self) -> usize;

    /// Drop the bits up to the next byte boundary.
    fn skip_boundary_bits(&mut self);
}

/// Sink of LSB-first bits.
pub trait BitWrite {
    /// Append the low `nbits` bits of `bits`.
    ///
    /// Fails with `Error::InsufficientOutput` before writing anything if
    /// the sink cannot hold them.
    fn write_bits(&mut self, nbits: u32, bits: u32) -> Result<()>;

    /// Pad to the next byte boundary using the low bits of `bits`.
    fn write_boundary_bits(&mut self, bits: u8) -> Result<()>;

    /// Pad any partial byte with zero bits and push it out.
    fn flush(&mut self) -> Result<()>;

    /// Number of bytes produced so far, counting a partial byte.
    fn size(&self) -> usize;

    /// Number of bits written so far.
    fn bits_written(&self) -> usize;
}

/// Mask selecting the low `nbits` bits (`nbits <= 32`).
#[inline]
pub(crate) fn low_mask(nbits: u32) -> u64 {
    (1u64 << nbits) - 1
}
