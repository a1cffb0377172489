//! Container packing: gzip/zlib/raw framing around the concatenated block
//! payloads.

pub mod gzip;
pub mod zlib;

use std::io::Write;

use crate::checksum::ChecksumKind;
use crate::error::Result;

/// Final empty stored block ending every DEFLATE stream: BFINAL = 1,
/// BTYPE = 00, LEN = 0, NLEN = 0xFFFF. Workers never mark their own blocks
/// final; this terminator does it for the whole member.
pub const STREAM_TERMINATOR: [u8; 5] = [0x01, 0x00, 0x00, 0xFF, 0xFF];

/// Output framing format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContainerFormat {
    /// RFC 1952 member with CRC32 + ISIZE trailer
    #[default]
    Gzip,
    /// RFC 1950 stream with Adler-32 trailer
    Zlib,
    /// Bare DEFLATE, no header or trailer
    Raw,
}

impl ContainerFormat {
    /// Checksum algorithm the trailer requires, if any
    pub fn checksum_kind(&self) -> Option<ChecksumKind> {
        match self {
            ContainerFormat::Gzip => Some(ChecksumKind::Crc32),
            ContainerFormat::Zlib => Some(ChecksumKind::Adler32),
            ContainerFormat::Raw => None,
        }
    }

    /// Write the stream header; returns bytes written
    pub fn write_header<W: Write>(&self, writer: &mut W) -> Result<usize> {
        match self {
            ContainerFormat::Gzip => gzip::write_header(writer),
            ContainerFormat::Zlib => zlib::write_header(writer),
            ContainerFormat::Raw => Ok(0),
        }
    }

    /// Write the stream terminator and trailer; returns bytes written
    pub fn write_trailer<W: Write>(
        &self,
        writer: &mut W,
        checksum: u32,
        input_size: u64,
    ) -> Result<usize> {
        writer.write_all(&STREAM_TERMINATOR)?;
        let trailer = match self {
            ContainerFormat::Gzip => gzip::write_trailer(writer, checksum, input_size)?,
            ContainerFormat::Zlib => zlib::write_trailer(writer, checksum)?,
            ContainerFormat::Raw => 0,
        };
        Ok(STREAM_TERMINATOR.len() + trailer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_checksum_selection() {
        assert_eq!(ContainerFormat::Gzip.checksum_kind(), Some(ChecksumKind::Crc32));
        assert_eq!(ContainerFormat::Zlib.checksum_kind(), Some(ChecksumKind::Adler32));
        assert_eq!(ContainerFormat::Raw.checksum_kind(), None);
    }

    #[test]
    fn test_empty_gzip_member_decodes() {
        let mut out = Vec::new();
        ContainerFormat::Gzip.write_header(&mut out).unwrap();
        ContainerFormat::Gzip.write_trailer(&mut out, 0, 0).unwrap();

        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(&out[..]).read_to_end(&mut decoded).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_empty_zlib_stream_decodes() {
        let mut out = Vec::new();
        ContainerFormat::Zlib.write_header(&mut out).unwrap();
        // Adler-32 of the empty stream is 1
        ContainerFormat::Zlib.write_trailer(&mut out, 1, 0).unwrap();

        let mut decoded = Vec::new();
        flate2::read::ZlibDecoder::new(&out[..]).read_to_end(&mut decoded).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_raw_format_is_bare() {
        let mut out = Vec::new();
        ContainerFormat::Raw.write_header(&mut out).unwrap();
        ContainerFormat::Raw.write_trailer(&mut out, 0, 0).unwrap();
        assert_eq!(out, STREAM_TERMINATOR);
    }
}
