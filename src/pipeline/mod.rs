//! Compression pipelines: per-block stage plumbing shared by the
//! single-threaded and multicore schedulers.

pub mod parallel;
pub mod single;

pub use parallel::ParallelCompressor;
pub use single::SingleThreadedCompressor;

use std::io::{self, Read};

use crate::deflate::TokenBuf;
use crate::error::Result;
use crate::huffman::treegen::DynamicTables;
use crate::huffman::{BlockEncoder, FrequencyTables};
use crate::lz77::{tokenize_block, MatchFinder};
use crate::CompressionLevel;

/// I/O buffer size for the reader/writer wrappers
pub(crate) const IO_BUFFER_SIZE: usize = 128 * 1024;

/// Per-worker pipeline state: matcher hash chains, token buffers, and the
/// block encoder. One instance per worker thread; never shared.
pub(crate) struct WorkerState {
    finder: MatchFinder,
    raw: TokenBuf,
    boosted: TokenBuf,
    encoder: BlockEncoder,
}

impl WorkerState {
    pub(crate) fn new(level: CompressionLevel) -> Self {
        Self {
            finder: MatchFinder::new(level.level()),
            raw: TokenBuf::default(),
            boosted: TokenBuf::default(),
            encoder: BlockEncoder::new(),
        }
    }

    /// Match-finding and frequency-counting stages. Leaves the boosted token
    /// stream in place for the encoding stage.
    pub(crate) fn analyze(&mut self, data: &[u8]) -> Result<FrequencyTables> {
        tokenize_block(&mut self.finder, data, &mut self.raw, &mut self.boosted);
        let mut freqs = FrequencyTables::new();
        freqs.count(&self.boosted.tokens)?;
        Ok(freqs)
    }

    /// Encoding stage for dynamic blocks; call after [`Self::analyze`].
    /// Returns the payload and whether the stored fallback was taken.
    pub(crate) fn encode_with_tables(
        &self,
        data: &[u8],
        tables: &DynamicTables,
    ) -> Result<(Vec<u8>, bool)> {
        let payload = self.encoder.encode_dynamic(&self.boosted.tokens, tables)?;
        Ok(apply_stored_fallback(data, payload))
    }

    /// Full fixed-table path: tokenize and encode in one step.
    pub(crate) fn encode_fixed(&mut self, data: &[u8]) -> Result<(Vec<u8>, bool)> {
        tokenize_block(&mut self.finder, data, &mut self.raw, &mut self.boosted);
        let payload = self.encoder.encode_fixed(&self.boosted.tokens)?;
        Ok(apply_stored_fallback(data, payload))
    }
}

/// If entropy coding expanded the block, fall back to stored blocks.
pub(crate) fn apply_stored_fallback(data: &[u8], payload: Vec<u8>) -> (Vec<u8>, bool) {
    if payload.len() >= BlockEncoder::stored_size(data.len()) {
        (BlockEncoder::encode_stored(data), true)
    } else {
        (payload, false)
    }
}

/// Read until `buf` is full or the source is exhausted; returns bytes read.
pub(crate) fn read_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_block_fills_from_chunky_reader() {
        // A reader that returns one byte at a time
        struct OneByte<R>(R);
        impl<R: Read> Read for OneByte<R> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                let n = buf.len().min(1);
                self.0.read(&mut buf[..n])
            }
        }

        let mut reader = OneByte(Cursor::new(vec![7u8; 10]));
        let mut buf = [0u8; 8];
        assert_eq!(read_block(&mut reader, &mut buf).unwrap(), 8);
        assert_eq!(read_block(&mut reader, &mut buf).unwrap(), 2);
        assert_eq!(read_block(&mut reader, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_stored_fallback_on_expansion() {
        let data = [1u8, 2, 3, 4];
        let bloated = vec![0u8; 100];
        let (payload, stored) = apply_stored_fallback(&data, bloated);
        assert!(stored);
        assert_eq!(payload.len(), BlockEncoder::stored_size(data.len()));
    }

    #[test]
    fn test_stored_fallback_keeps_small_payload() {
        let data = [1u8; 64];
        let compact = vec![0u8; 10];
        let (payload, stored) = apply_stored_fallback(&data, compact);
        assert!(!stored);
        assert_eq!(payload.len(), 10);
    }
}
