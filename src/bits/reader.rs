// LSB-first bit reader over a borrowed byte slice.

use super::{BitRead, low_mask};
use crate::error::{Error, Result};

/// `BitRead` implementation backed by an in-memory buffer.
#[derive(Debug, Clone)]
pub struct BufferBitReader<'a> {
    data: &'a [u8],
    /// Next byte to pull into the cache.
    index: usize,
    cache: u64,
    cached_bits: u32,
}

impl<'a> BufferBitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            index: 0,
            cache: 0,
            cached_bits: 0,
        }
    }

    /// Number of bits consumed so far.
    pub fn bits_consumed(&self) -> usize {
        self.index * 8 - self.cached_bits as usize
    }
}

impl BitRead for BufferBitReader<'_> {
    #[inline]
    fn cache_bits(&mut self, nbits: u32) -> Result<()> {
        debug_assert!(nbits <= 32);
        if self.bits_remaining() < nbits as usize {
            return Err(Error::InsufficientInput);
        }
        while self.cached_bits < nbits {
            self.cache |= u64::from(self.data[self.index]) << self.cached_bits;
            self.index += 1;
            self.cached_bits += 8;
        }
        Ok(())
    }

    #[inline]
    fn read_bits(&self, nbits: u32) -> u32 {
        debug_assert!(nbits <= self.cached_bits);
        (self.cache & low_mask(nbits)) as u32
    }

    #[inline]
    fn drop_bits(&mut self, nbits: u32) {
        debug_assert!(nbits <= self.cached_bits);
        self.cache >>= nbits;
        self.cached_bits -= nbits;
    }

    fn offset(&self) -> usize {
        self.index - (self.cached_bits / 8) as usize
    }

    fn bits_remaining(&self) -> usize {
        (self.data.len() - self.index) * 8 + self.cached_bits as usize
    }

    fn skip_boundary_bits(&mut self) {
        let partial = self.cached_bits % 8;
        self.drop_bits(partial);
    }
}
