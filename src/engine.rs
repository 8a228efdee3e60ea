// Header transcoding engine: ties container stripping, block framing and
// the Huffman table engine together.
//
// Provides whole-buffer APIs over the first block of a DEFLATE stream:
//   - `puff_header` reads the block header and turns its dynamic Huffman
//     header into puff form
//   - `huff_header` turns a puff buffer back into block header bits
//   - `verify_header` does both and checks the bits match the input

use log::debug;

use crate::bits::{BitWrite, BufferBitReader, BufferBitWriter};
use crate::deflate::{BlockHeader, BlockType, Container, strip_container};
use crate::error::{InvalidInput, Result};
use crate::huffman::{HuffmanTable, MAX_DISTANCE_CODES, MAX_LIT_LEN_CODES, NUM_CODE_LENGTH_CODES};

// ---------------------------------------------------------------------------
// Size limits
// ---------------------------------------------------------------------------

/// Largest puff buffer a dynamic header can produce: the three count bytes,
/// the packed code-length lengths and one token per length.
pub const MAX_PUFF_HEADER_SIZE: usize =
    3 + NUM_CODE_LENGTH_CODES.div_ceil(2) + MAX_LIT_LEN_CODES + MAX_DISTANCE_CODES;

/// Largest encoded block header in bits: BFINAL/BTYPE, the count fields,
/// the 3-bit code-length lengths and one 7-bit code plus 7 extra bits per
/// length.
pub const MAX_HEADER_BITS: usize =
    3 + 14 + NUM_CODE_LENGTH_CODES * 3 + (MAX_LIT_LEN_CODES + MAX_DISTANCE_CODES) * 14;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The first block header of a stream in puff form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuffedHeader {
    pub block: BlockHeader,
    /// Puff-form dynamic Huffman header.
    pub puff: Vec<u8>,
    /// Stream bits covered, including the 3-bit block header.
    pub bits: usize,
    /// Bytes of container header before the DEFLATE data.
    pub container_len: usize,
}

/// A block header re-encoded from puff form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffedHeader {
    /// Encoded bits, zero-padded to a byte boundary.
    pub bytes: Vec<u8>,
    /// Bits written before padding.
    pub bits: usize,
}

/// Outcome of `verify_header`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub header: PuffedHeader,
    /// Whether re-encoding reproduced every header bit.
    pub matches: bool,
}

// ---------------------------------------------------------------------------
// Transcoding
// ---------------------------------------------------------------------------

/// Puff the Huffman header of the first block in `data`.
///
/// The block must be a dynamic one; any other type is `InvalidInput`.
pub fn puff_header(
    ht: &mut HuffmanTable,
    data: &[u8],
    container: Container,
) -> Result<PuffedHeader> {
    let deflate = strip_container(data, container)?;
    let container_len = data.len() - deflate.len();

    let mut br = BufferBitReader::new(deflate);
    let block = BlockHeader::read(&mut br)?;
    if block.block_type != BlockType::Dynamic {
        return Err(InvalidInput::NotDynamicBlock(block.block_type).into());
    }

    let mut puff = vec![0u8; MAX_PUFF_HEADER_SIZE];
    let len = ht.build_dynamic_table_decode(&mut br, &mut puff)?;
    puff.truncate(len);
    let bits = br.bits_consumed();
    debug!("puffed {bits} header bits into {len} bytes");

    Ok(PuffedHeader {
        block,
        puff,
        bits,
        container_len,
    })
}

/// Encode a puff buffer as a dynamic block header.
pub fn huff_header(ht: &mut HuffmanTable, puff: &[u8], is_final: bool) -> Result<HuffedHeader> {
    let mut bytes = vec![0u8; MAX_HEADER_BITS.div_ceil(8)];
    let mut bw = BufferBitWriter::new(&mut bytes);
    BlockHeader {
        is_final,
        block_type: BlockType::Dynamic,
    }
    .write(&mut bw)?;
    ht.build_dynamic_table_encode(puff, &mut bw)?;
    let bits = bw.bits_written();
    let len = bw.finish()?.len();
    bytes.truncate(len);
    debug!("huffed {} puff bytes into {bits} header bits", puff.len());
    Ok(HuffedHeader { bytes, bits })
}

/// Puff then huff the first block header of `data` and compare the bits.
pub fn verify_header(
    ht: &mut HuffmanTable,
    data: &[u8],
    container: Container,
) -> Result<Verification> {
    let header = puff_header(ht, data, container)?;
    let huffed = huff_header(ht, &header.puff, header.block.is_final)?;
    let original = &data[header.container_len..];
    let matches =
        huffed.bits == header.bits && bits_equal(original, &huffed.bytes, header.bits);
    if !matches {
        debug!(
            "header mismatch: {} bits read, {} bits written",
            header.bits, huffed.bits
        );
    }
    Ok(Verification { header, matches })
}

/// Whether the first `nbits` LSB-first bits of `a` and `b` agree.
fn bits_equal(a: &[u8], b: &[u8], nbits: usize) -> bool {
    let full = nbits / 8;
    let rem = nbits % 8;
    let needed = nbits.div_ceil(8);
    if a.len() < needed || b.len() < needed {
        return false;
    }
    a[..full] == b[..full] && (rem == 0 || (a[full] ^ b[full]) & ((1u8 << rem) - 1) == 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
