//! Oxipuff: canonical Huffman tables and DEFLATE (RFC 1951) dynamic header
//! transcoding in Rust.
//!
//! The crate provides:
//! - A reusable Huffman table engine (`huffman`) that builds fixed and
//!   dynamic decode/encode tables
//! - Lossless conversion between a dynamic block header's bits and its
//!   compact byte form, the "puff" buffer (`huffman::header`)
//! - LSB-first bit I/O (`bits`) and block/container framing (`deflate`)
//! - Whole-buffer helpers for the first block of a stream (`engine`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use oxipuff::bits::{BufferBitReader, BufferBitWriter};
//! use oxipuff::huffman::HuffmanTable;
//!
//! // Bits of a dynamic Huffman header, just after the 3-bit block header.
//! let header_bits: &[u8] = &[/* ... */];
//!
//! let mut table = HuffmanTable::new();
//! let mut puff = [0u8; 512];
//! let mut reader = BufferBitReader::new(header_bits);
//! let len = table.build_dynamic_table_decode(&mut reader, &mut puff).unwrap();
//!
//! let mut bits = [0u8; 1024];
//! let mut writer = BufferBitWriter::new(&mut bits);
//! table.build_dynamic_table_encode(&puff[..len], &mut writer).unwrap();
//! ```

pub mod bits;
pub mod deflate;
pub mod engine;
pub mod error;
pub mod huffman;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, InvalidInput, Result};
pub use huffman::HuffmanTable;
