//! DEFLATE (RFC 1951) format constants and symbol tables.

pub mod tables;
pub mod tokens;

pub use tokens::{Token, TokenBuf};

/// Minimum encodable match length
pub const MIN_MATCH: usize = 3;

/// Maximum encodable match length
pub const MAX_MATCH: usize = 258;

/// LZ77 sliding window (maximum back-reference distance)
pub const WINDOW_SIZE: usize = 32768;

/// Literal/length alphabet size (0-255 literals, 256 EOB, 257-285 lengths)
pub const NUM_LITLEN_SYMBOLS: usize = 286;

/// Distance alphabet size
pub const NUM_DIST_SYMBOLS: usize = 30;

/// Code length alphabet size (lengths 0-15 plus repeat codes 16-18)
pub const NUM_CODELEN_SYMBOLS: usize = 19;

/// End-of-block symbol
pub const EOB: usize = 256;

/// Maximum code length for the literal/length and distance trees
pub const MAX_CODE_BITS: u8 = 15;

/// Maximum code length for the code length tree
pub const MAX_CODELEN_BITS: u8 = 7;

/// Maximum payload of a single stored block (16-bit LEN field)
pub const MAX_STORED_LEN: usize = 65535;
