// Canonical Huffman tables and the DEFLATE dynamic header codec.
//
// # Modules
//
// - `code`         - canonical code assignment and bit reversal
// - `decode_table` - flat lookahead-indexed decode tables
// - `encode_table` - per-symbol code tables for writing
// - `fixed`        - the RFC 1951 fixed code lengths
// - `run_length`   - run-length coding of code-length arrays (puff tokens)
// - `header`       - dynamic header <-> puff buffer transcoding
// - `table`        - `HuffmanTable`, the engine owning all of the above

pub mod code;
pub mod decode_table;
pub mod encode_table;
pub mod fixed;
pub mod header;
pub mod run_length;
pub mod table;

pub use code::{CodeAssignment, CodeBuilder, MAX_HUFFMAN_BITS, bit_reverse};
pub use decode_table::DecodeTable;
pub use encode_table::EncodeTable;
pub use header::{CODE_LENGTH_ORDER, HeaderCounts};
pub use run_length::{RunLengthToken, TokenKind};
pub use table::{HuffmanTable, Loaded};

/// Literal/length symbols a dynamic block may describe (256 literals, end
/// of block, 29 length codes).
pub const MAX_LIT_LEN_CODES: usize = 286;

/// Literal/length symbols in the fixed alphabet, including the two unused
/// codes 286 and 287.
pub const FIXED_LIT_LEN_CODES: usize = 288;

/// Distance symbols.
pub const MAX_DISTANCE_CODES: usize = 30;

/// Symbols in the code-length alphabet.
pub const NUM_CODE_LENGTH_CODES: usize = 19;
