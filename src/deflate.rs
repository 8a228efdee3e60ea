// DEFLATE block framing and zlib/gzip container headers (RFC 1950-1952).
//
// Only what is needed to reach the first dynamic Huffman header of a stream:
// the 3-bit block header and the wrapper in front of the raw DEFLATE data.
// Trailers (Adler-32, CRC-32, ISIZE) are never inspected.

use std::fmt;

use crate::bits::{BitRead, BitWrite};
use crate::error::{Error, InvalidInput, Result};

// ---------------------------------------------------------------------------
// Block header
// ---------------------------------------------------------------------------

/// BTYPE field of a DEFLATE block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Uncompressed,
    Fixed,
    Dynamic,
}

impl BlockType {
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0 => Ok(Self::Uncompressed),
            1 => Ok(Self::Fixed),
            2 => Ok(Self::Dynamic),
            _ => Err(InvalidInput::InvalidBlockType(bits).into()),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Uncompressed => 0,
            Self::Fixed => 1,
            Self::Dynamic => 2,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uncompressed => "Uncompressed",
            Self::Fixed => "Fixed",
            Self::Dynamic => "Dynamic",
        })
    }
}

/// The 3-bit header in front of every DEFLATE block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// BFINAL: this is the last block of the stream.
    pub is_final: bool,
    pub block_type: BlockType,
}

impl BlockHeader {
    pub fn read<R: BitRead + ?Sized>(br: &mut R) -> Result<Self> {
        br.cache_bits(3)?;
        let is_final = br.read_bits(1) == 1;
        br.drop_bits(1);
        let btype = br.read_bits(2) as u8;
        br.drop_bits(2);
        Ok(Self {
            is_final,
            block_type: BlockType::from_bits(btype)?,
        })
    }

    pub fn write<W: BitWrite + ?Sized>(&self, bw: &mut W) -> Result<()> {
        bw.write_bits(1, u32::from(self.is_final))?;
        bw.write_bits(2, u32::from(self.block_type.bits()))
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Wrapper around a raw DEFLATE stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    /// Bare DEFLATE data.
    #[default]
    Raw,
    /// RFC 1950 zlib stream.
    Zlib,
    /// RFC 1952 gzip member.
    Gzip,
}

const CM_DEFLATE: u8 = 8;

const ZLIB_FDICT: u8 = 1 << 5;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const GZIP_FHCRC: u8 = 1 << 1;
const GZIP_FEXTRA: u8 = 1 << 2;
const GZIP_FNAME: u8 = 1 << 3;
const GZIP_FCOMMENT: u8 = 1 << 4;
const GZIP_RESERVED: u8 = 0xE0;
/// ID1 ID2 CM FLG MTIME(4) XFL OS
const GZIP_FIXED_HEADER: usize = 10;

/// Return the raw DEFLATE data behind `container`'s header.
///
/// Truncated headers are `InsufficientInput`; malformed ones are
/// `InvalidInput`.
pub fn strip_container(data: &[u8], container: Container) -> Result<&[u8]> {
    match container {
        Container::Raw => Ok(data),
        Container::Zlib => strip_zlib(data),
        Container::Gzip => strip_gzip(data),
    }
}

fn strip_zlib(data: &[u8]) -> Result<&[u8]> {
    let [cmf, flg, rest @ ..] = data else {
        return Err(Error::InsufficientInput);
    };
    if ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 != 0 {
        return Err(InvalidInput::InvalidContainer("zlib header check failed").into());
    }
    if cmf & 0x0F != CM_DEFLATE || cmf >> 4 > 7 {
        return Err(InvalidInput::InvalidContainer("zlib method is not deflate").into());
    }
    if flg & ZLIB_FDICT != 0 {
        return Err(InvalidInput::InvalidContainer("zlib preset dictionary").into());
    }
    Ok(rest)
}

fn strip_gzip(data: &[u8]) -> Result<&[u8]> {
    if data.len() < GZIP_FIXED_HEADER {
        return Err(Error::InsufficientInput);
    }
    if data[..2] != GZIP_MAGIC {
        return Err(InvalidInput::InvalidContainer("bad gzip magic").into());
    }
    if data[2] != CM_DEFLATE {
        return Err(InvalidInput::InvalidContainer("gzip method is not deflate").into());
    }
    let flags = data[3];
    if flags & GZIP_RESERVED != 0 {
        return Err(InvalidInput::InvalidContainer("reserved gzip flags set").into());
    }

    let mut rest = &data[GZIP_FIXED_HEADER..];
    if flags & GZIP_FEXTRA != 0 {
        let [lo, hi, tail @ ..] = rest else {
            return Err(Error::InsufficientInput);
        };
        let xlen = usize::from(u16::from_le_bytes([*lo, *hi]));
        rest = tail.get(xlen..).ok_or(Error::InsufficientInput)?;
    }
    if flags & GZIP_FNAME != 0 {
        rest = skip_zero_terminated(rest)?;
    }
    if flags & GZIP_FCOMMENT != 0 {
        rest = skip_zero_terminated(rest)?;
    }
    if flags & GZIP_FHCRC != 0 {
        rest = rest.get(2..).ok_or(Error::InsufficientInput)?;
    }
    Ok(rest)
}

fn skip_zero_terminated(data: &[u8]) -> Result<&[u8]> {
    let end = data
        .iter()
        .position(|&b| b == 0)
        .ok_or(Error::InsufficientInput)?;
    Ok(&data[end + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{BufferBitReader, BufferBitWriter};

    #[test]
    fn block_header_round_trip() {
        let mut buf = [0u8; 1];
        let mut bw = BufferBitWriter::new(&mut buf);
        BlockHeader {
            is_final: true,
            block_type: BlockType::Dynamic,
        }
        .write(&mut bw)
        .unwrap();
        assert_eq!(bw.finish().unwrap(), &[0b101]);

        let mut br = BufferBitReader::new(&[0b101]);
        let header = BlockHeader::read(&mut br).unwrap();
        assert!(header.is_final);
        assert_eq!(header.block_type, BlockType::Dynamic);
        assert_eq!(header.block_type.to_string(), "Dynamic");
    }

    #[test]
    fn reserved_block_type_is_invalid() {
        let mut br = BufferBitReader::new(&[0b110]);
        assert_eq!(
            BlockHeader::read(&mut br),
            Err(Error::InvalidInput(InvalidInput::InvalidBlockType(3)))
        );
        assert_eq!(
            BlockHeader::read(&mut BufferBitReader::new(&[])),
            Err(Error::InsufficientInput)
        );
    }

    #[test]
    fn zlib_header() {
        assert_eq!(strip_container(&[0x78, 0x9C, 1, 2], Container::Zlib).unwrap(), &[1, 2]);
        assert_eq!(strip_container(&[0x78, 0x01], Container::Zlib).unwrap(), &[] as &[u8]);
        assert!(
            strip_container(&[0x78, 0x9D], Container::Zlib)
                .unwrap_err()
                .is_invalid_input()
        );
        // FDICT set, check bits valid.
        assert_eq!(
            strip_container(&[0x78, 0xBB], Container::Zlib),
            Err(Error::InvalidInput(InvalidInput::InvalidContainer(
                "zlib preset dictionary"
            )))
        );
        assert_eq!(strip_container(&[0x78], Container::Zlib), Err(Error::InsufficientInput));
    }

    #[test]
    fn gzip_header_with_optional_fields() {
        let mut member = vec![0x1F, 0x8B, 8, GZIP_FEXTRA | GZIP_FNAME | GZIP_FCOMMENT | GZIP_FHCRC];
        member.extend_from_slice(&[0, 0, 0, 0, 0, 3]);
        member.extend_from_slice(&[2, 0, 0xAA, 0xBB]);
        member.extend_from_slice(b"name\0");
        member.extend_from_slice(b"comment\0");
        member.extend_from_slice(&[0x12, 0x34]);
        member.extend_from_slice(&[7, 8, 9]);
        assert_eq!(strip_container(&member, Container::Gzip).unwrap(), &[7, 8, 9]);

        // Unterminated name.
        assert_eq!(
            strip_container(&member[..14], Container::Gzip),
            Err(Error::InsufficientInput)
        );
    }

    #[test]
    fn gzip_rejects_bad_magic_and_method() {
        let mut member = vec![0x1F, 0x8C, 8, 0, 0, 0, 0, 0, 0, 3];
        assert!(
            strip_container(&member, Container::Gzip)
                .unwrap_err()
                .is_invalid_input()
        );
        member[1] = 0x8B;
        member[2] = 7;
        assert!(
            strip_container(&member, Container::Gzip)
                .unwrap_err()
                .is_invalid_input()
        );
        assert_eq!(
            strip_container(&member[..9], Container::Gzip),
            Err(Error::InsufficientInput)
        );
    }

    #[test]
    fn raw_passes_through() {
        assert_eq!(strip_container(&[1, 2, 3], Container::Raw).unwrap(), &[1, 2, 3]);
    }
}
