// LSB-first bit writer into a caller-owned, fixed-capacity byte slice.

use super::{BitWrite, low_mask};
use crate::error::{Error, Result};

/// `BitWrite` implementation that fills a borrowed buffer.
///
/// Capacity is checked before each write, so a failed `write_bits` leaves
/// the buffer and the pending bits exactly as they were.
#[derive(Debug)]
pub struct BufferBitWriter<'a> {
    out: &'a mut [u8],
    /// Next byte to write.
    index: usize,
    holder: u64,
    held_bits: u32,
}

impl<'a> BufferBitWriter<'a> {
    pub fn new(out: &'a mut [u8]) -> Self {
        Self {
            out,
            index: 0,
            holder: 0,
            held_bits: 0,
        }
    }

    /// Flush and return the written prefix of the buffer.
    pub fn finish(mut self) -> Result<&'a [u8]> {
        self.flush()?;
        let Self { out, index, .. } = self;
        Ok(&out[..index])
    }
}

impl BitWrite for BufferBitWriter<'_> {
    #[inline]
    fn write_bits(&mut self, nbits: u32, bits: u32) -> Result<()> {
        debug_assert!(nbits <= 32);
        let pending = (self.held_bits + nbits).div_ceil(8) as usize;
        if self.index + pending > self.out.len() {
            return Err(Error::InsufficientOutput);
        }
        self.holder |= (u64::from(bits) & low_mask(nbits)) << self.held_bits;
        self.held_bits += nbits;
        while self.held_bits >= 8 {
            self.out[self.index] = self.holder as u8;
            self.index += 1;
            self.holder >>= 8;
            self.held_bits -= 8;
        }
        Ok(())
    }

    fn write_boundary_bits(&mut self, bits: u8) -> Result<()> {
        let pad = (8 - self.held_bits % 8) % 8;
        self.write_bits(pad, u32::from(bits))
    }

    fn flush(&mut self) -> Result<()> {
        self.write_boundary_bits(0)
    }

    fn size(&self) -> usize {
        self.index + self.held_bits.div_ceil(8) as usize
    }

    fn bits_written(&self) -> usize {
        self.index * 8 + self.held_bits as usize
    }
}
