//! Gzip member framing (RFC 1952).

use std::io::Write;

use crate::error::Result;

/// Gzip magic bytes
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Fixed 10-byte member header: magic, DEFLATE method, no flags, zero mtime,
/// no extra flags, unknown OS.
pub const GZIP_HEADER: [u8; 10] = [
    0x1f, 0x8b, // magic
    0x08, // compression method (DEFLATE)
    0x00, // flags
    0x00, 0x00, 0x00, 0x00, // mtime
    0x00, // extra flags
    0xff, // OS (unknown)
];

/// Write the member header; returns bytes written
pub fn write_header<W: Write>(writer: &mut W) -> Result<usize> {
    writer.write_all(&GZIP_HEADER)?;
    Ok(GZIP_HEADER.len())
}

/// Write the 8-byte trailer: CRC32 then ISIZE (input size mod 2^32), both
/// little-endian.
pub fn write_trailer<W: Write>(writer: &mut W, crc32: u32, input_size: u64) -> Result<usize> {
    writer.write_all(&crc32.to_le_bytes())?;
    writer.write_all(&((input_size & 0xFFFF_FFFF) as u32).to_le_bytes())?;
    Ok(8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fields() {
        let mut out = Vec::new();
        let n = write_header(&mut out).unwrap();
        assert_eq!(n, 10);
        assert_eq!(out[0..2], GZIP_MAGIC);
        assert_eq!(out[2], 0x08); // DEFLATE
        assert_eq!(out[3], 0x00); // no flags
        assert_eq!(out[9], 0xff); // OS
    }

    #[test]
    fn test_trailer_layout() {
        let mut out = Vec::new();
        let n = write_trailer(&mut out, 0x78563412, 4096).unwrap();
        assert_eq!(n, 8);
        assert_eq!(out, vec![0x12, 0x34, 0x56, 0x78, 0x00, 0x10, 0x00, 0x00]);
    }

    #[test]
    fn test_isize_wraps_mod_2_32() {
        let mut out = Vec::new();
        write_trailer(&mut out, 0, (1u64 << 32) + 5).unwrap();
        assert_eq!(&out[4..], &5u32.to_le_bytes());
    }
}
