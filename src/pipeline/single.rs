use std::io::{BufReader, BufWriter, Read, Write};

use super::{read_block, WorkerState, IO_BUFFER_SIZE};
use crate::checksum::Checksum;
use crate::error::Result;
use crate::huffman::{BlockEncoder, TreeBuilder};
use crate::{CompressConfig, CompressStats, Compressor};

/// Single-threaded compressor: one pipeline instance runs every stage,
/// with the tree builder called inline between analysis and encoding.
pub struct SingleThreadedCompressor {
    config: CompressConfig,
}

impl SingleThreadedCompressor {
    pub fn new(config: CompressConfig) -> Self {
        Self { config }
    }
}

impl Compressor for SingleThreadedCompressor {
    fn compress<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<CompressStats> {
        self.config.validate()?;

        let mut reader = BufReader::with_capacity(IO_BUFFER_SIZE, input);
        let mut writer = BufWriter::with_capacity(IO_BUFFER_SIZE, output);

        let mut stats = CompressStats::default();
        stats.output_bytes += self.config.format.write_header(&mut writer)? as u64;

        // The checksum accumulator sits on the read path and sees every byte
        // in original order.
        let mut checksum = self.config.format.checksum_kind().map(Checksum::new);

        let mut worker = WorkerState::new(self.config.level);
        let mut tree_builder = TreeBuilder::new();
        let use_fixed = self.config.use_fixed_huffman();

        let mut buf = vec![0u8; self.config.block_size];
        loop {
            let n = read_block(&mut reader, &mut buf)?;
            if n == 0 {
                break;
            }
            let data = &buf[..n];

            if let Some(state) = checksum.as_mut() {
                state.update(data);
            }
            stats.input_bytes += n as u64;

            let (payload, stored) = if n < self.config.min_stored_block {
                (BlockEncoder::encode_stored(data), true)
            } else if use_fixed {
                worker.encode_fixed(data)?
            } else {
                let freqs = worker.analyze(data)?;
                let tables = tree_builder.build_dynamic(&freqs);
                worker.encode_with_tables(data, &tables)?
            };

            writer.write_all(&payload)?;
            stats.output_bytes += payload.len() as u64;
            stats.blocks_written += 1;
            if stored {
                stats.stored_blocks += 1;
            }
        }

        let check = checksum.map(|state| state.finalize()).unwrap_or(0);
        stats.output_bytes +=
            self.config.format.write_trailer(&mut writer, check, stats.input_bytes)? as u64;
        writer.flush()?;

        Ok(stats)
    }
}
