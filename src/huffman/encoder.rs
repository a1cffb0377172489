//! DEFLATE block emission.
//!
//! Every compressed block is written with BFINAL = 0 and followed by an empty
//! stored block that realigns the stream to a byte boundary, so block payloads
//! from independent workers concatenate byte-for-byte. The container packer
//! terminates each member with a final empty stored block instead.

use crate::bits::BitWriter;
use crate::deflate::tables::{distance_symbol, length_symbol, CODE_LENGTH_ORDER};
use crate::deflate::{Token, EOB, MAX_STORED_LEN};
use crate::error::Result;
use crate::huffman::tables::{fixed_dist_table, fixed_litlen_table};
use crate::huffman::treegen::{CodeTable, DynamicTables};

/// Encodes token streams into DEFLATE block payloads.
/// Fixed code tables are built once and shared across blocks.
pub struct BlockEncoder {
    fixed_litlen: CodeTable,
    fixed_dist: CodeTable,
}

impl BlockEncoder {
    pub fn new() -> Self {
        Self { fixed_litlen: fixed_litlen_table(), fixed_dist: fixed_dist_table() }
    }

    /// Encode a block with per-block dynamic Huffman tables (BTYPE = 10)
    pub fn encode_dynamic(&self, tokens: &[Token], tables: &DynamicTables) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(tokens.len().max(256));

        writer.write_bit(false); // BFINAL
        writer.write_bits(0b10, 2); // BTYPE = dynamic
        write_dynamic_header(&mut writer, tables);
        write_tokens(&mut writer, tokens, &tables.litlen, &tables.dist)?;
        write_eob(&mut writer, &tables.litlen);
        write_sync_block(&mut writer);

        Ok(writer.finish())
    }

    /// Encode a block with the format's fixed tables (BTYPE = 01)
    pub fn encode_fixed(&self, tokens: &[Token]) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(tokens.len().max(256));

        writer.write_bit(false); // BFINAL
        writer.write_bits(0b01, 2); // BTYPE = fixed
        write_tokens(&mut writer, tokens, &self.fixed_litlen, &self.fixed_dist)?;
        write_eob(&mut writer, &self.fixed_litlen);
        write_sync_block(&mut writer);

        Ok(writer.finish())
    }

    /// Emit raw bytes as stored block(s) (BTYPE = 00), splitting at the
    /// 16-bit LEN field's span. Already byte-aligned, so no sync block.
    pub fn encode_stored(data: &[u8]) -> Vec<u8> {
        let mut writer = BitWriter::with_capacity(data.len() + 8);
        for chunk in data.chunks(MAX_STORED_LEN) {
            writer.write_bits(0b00_0, 3); // BFINAL = 0, BTYPE = stored
            writer.align_to_byte();
            writer.write_u16_le(chunk.len() as u16);
            writer.write_u16_le(!(chunk.len() as u16));
            writer.write_bytes(chunk);
        }
        writer.finish()
    }

    /// Bytes a stored-block rendition of `len` payload bytes would occupy
    pub fn stored_size(len: usize) -> usize {
        let blocks = ((len + MAX_STORED_LEN - 1) / MAX_STORED_LEN).max(1);
        len + 5 * blocks
    }
}

impl Default for BlockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Dynamic block header (RFC 1951 section 3.2.7): HLIT/HDIST/HCLEN, the code
/// length code lengths in their fixed transmission order, then the RLE-coded
/// literal/length and distance length sequences.
fn write_dynamic_header(writer: &mut BitWriter, tables: &DynamicTables) {
    let hlit = tables.litlen.lengths.len() - 257;
    let hdist = tables.dist.lengths.len() - 1;

    writer.write_bits(hlit as u32, 5);
    writer.write_bits(hdist as u32, 5);
    writer.write_bits((tables.hclen - 4) as u32, 4);

    for &sym in CODE_LENGTH_ORDER.iter().take(tables.hclen) {
        writer.write_bits(u32::from(tables.codelen.lengths[sym]), 3);
    }

    for &(sym, extra) in &tables.rle {
        let idx = sym as usize;
        writer.write_code(tables.codelen.codes[idx], tables.codelen.lengths[idx]);
        match sym {
            16 => writer.write_bits(u32::from(extra), 2),
            17 => writer.write_bits(u32::from(extra), 3),
            18 => writer.write_bits(u32::from(extra), 7),
            _ => {}
        }
    }
}

/// Replace each token with its codeword(s) plus extra bits
fn write_tokens(
    writer: &mut BitWriter,
    tokens: &[Token],
    litlen: &CodeTable,
    dist: &CodeTable,
) -> Result<()> {
    for token in tokens {
        match *token {
            Token::Literal(byte) => {
                let idx = byte as usize;
                writer.write_code(litlen.codes[idx], litlen.lengths[idx]);
            }
            Token::Match { length, distance } => {
                let (len_code, len_extra, len_bits) = length_symbol(length)?;
                let idx = len_code as usize;
                writer.write_code(litlen.codes[idx], litlen.lengths[idx]);
                if len_bits > 0 {
                    writer.write_bits(u32::from(len_extra), len_bits);
                }

                let (dist_code, dist_extra, dist_bits) = distance_symbol(distance)?;
                let idx = dist_code as usize;
                writer.write_code(dist.codes[idx], dist.lengths[idx]);
                if dist_bits > 0 {
                    writer.write_bits(u32::from(dist_extra), dist_bits);
                }
            }
        }
    }
    Ok(())
}

fn write_eob(writer: &mut BitWriter, litlen: &CodeTable) {
    writer.write_code(litlen.codes[EOB], litlen.lengths[EOB]);
}

/// Empty non-final stored block: forces byte alignment so the next block
/// (written by whichever worker owns it) starts on a byte boundary.
fn write_sync_block(writer: &mut BitWriter) {
    writer.write_bits(0b00_0, 3);
    writer.align_to_byte();
    writer.write_u16_le(0);
    writer.write_u16_le(0xFFFF);
}
