//! Zlib stream framing (RFC 1950).

use std::io::Write;

use crate::error::Result;

/// CMF: CM = 8 (DEFLATE), CINFO = 7 (32 KiB window)
pub const ZLIB_CMF: u8 = 0x78;

/// FLG: fastest compression hint, no preset dictionary, FCHECK making
/// CMF*256 + FLG divisible by 31
pub const ZLIB_FLG: u8 = 0x01;

/// Write the 2-byte stream header
pub fn write_header<W: Write>(writer: &mut W) -> Result<usize> {
    writer.write_all(&[ZLIB_CMF, ZLIB_FLG])?;
    Ok(2)
}

/// Write the Adler-32 trailer, big-endian
pub fn write_trailer<W: Write>(writer: &mut W, adler32: u32) -> Result<usize> {
    writer.write_all(&adler32.to_be_bytes())?;
    Ok(4)
}
