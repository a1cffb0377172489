//! Multicore scheduler: replicated worker pipelines with an order-preserving
//! merge.
//!
//! Architecture:
//! - Main thread: split input into blocks, feed the checksum in original byte
//!   order, dispatch jobs, write finished blocks in block-id order
//! - Worker pool: match finding, frequency counting, and bitstream encoding
//!   run fully in parallel, one block per worker at a time
//! - Tree service: a single thread owns the tree-construction scratch state
//!   and serves every worker's histograms strictly in block-id order

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter, Read, Write};

use crossbeam::channel::{bounded, Receiver, Sender};

use super::{read_block, WorkerState, IO_BUFFER_SIZE};
use crate::checksum::Checksum;
use crate::error::{Error, Result};
use crate::huffman::treegen::DynamicTables;
use crate::huffman::{BlockEncoder, FrequencyTables, TreeBuilder};
use crate::{CompressConfig, CompressStats, CompressionLevel, Compressor};

/// One block's worth of work for a worker
#[derive(Clone)]
struct EncodingJob {
    /// Sequence number for ordering output
    block_id: u64,
    /// Raw block bytes
    data: Vec<u8>,
}

/// A worker's finished block
struct EncodedBlock {
    block_id: u64,
    /// Complete byte-aligned block payload
    data: Vec<u8>,
    /// Whether the stored path was taken
    stored: bool,
}

/// Histograms headed for the tree service; the reply channel carries the
/// finished code tables back to the requesting worker.
struct TreeRequest {
    block_id: u64,
    freqs: FrequencyTables,
    reply: Sender<DynamicTables>,
}

/// Parallel compressor implementation
pub struct ParallelCompressor {
    config: CompressConfig,
}

impl ParallelCompressor {
    pub fn new(config: CompressConfig) -> Self {
        Self { config }
    }
}

impl Compressor for ParallelCompressor {
    fn compress<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<CompressStats> {
        self.config.validate()?;
        let num_workers = self.config.effective_workers();

        // A single worker gains nothing from the thread plumbing
        if num_workers == 1 {
            let mut single = super::single::SingleThreadedCompressor::new(self.config.clone());
            return single.compress(input, output);
        }

        self.compress_parallel(input, output, num_workers)
    }
}

impl ParallelCompressor {
    fn compress_parallel<R: Read, W: Write>(
        &mut self,
        input: R,
        mut output: W,
        num_workers: usize,
    ) -> Result<CompressStats> {
        let channel_capacity = num_workers * 4;

        let (job_tx, job_rx): (Sender<EncodingJob>, Receiver<EncodingJob>) =
            bounded(channel_capacity);
        let (result_tx, result_rx): (Sender<Result<EncodedBlock>>, Receiver<Result<EncodedBlock>>) =
            bounded(channel_capacity);

        let use_fixed = self.config.use_fixed_huffman();
        let level = self.config.level;
        let min_stored_block = self.config.min_stored_block;

        let result = crossbeam::scope(|scope| {
            // Static mode never visits the tree service
            let tree_tx = if use_fixed {
                None
            } else {
                // Capacity = workers: each worker has at most one request in
                // flight, so sends never block and the service can always
                // reach the next block id.
                let (tree_tx, tree_rx): (Sender<TreeRequest>, Receiver<TreeRequest>) =
                    bounded(num_workers);
                scope.spawn(move |_| tree_service(tree_rx));
                Some(tree_tx)
            };

            for _ in 0..num_workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let tree_tx = tree_tx.clone();

                scope.spawn(move |_| {
                    worker_thread(job_rx, result_tx, tree_tx, level, min_stored_block);
                });
            }

            // Drop the copies the workers cloned from
            drop(job_rx);
            drop(result_tx);
            drop(tree_tx);

            self.read_dispatch_and_write(input, &mut output, job_tx, result_rx)
        });

        result.map_err(|_| Error::WorkerPanic)?
    }

    fn read_dispatch_and_write<R: Read, W: Write>(
        &self,
        input: R,
        output: &mut W,
        job_tx: Sender<EncodingJob>,
        result_rx: Receiver<Result<EncodedBlock>>,
    ) -> Result<CompressStats> {
        let mut reader = BufReader::with_capacity(IO_BUFFER_SIZE, input);
        let mut writer = BufWriter::with_capacity(IO_BUFFER_SIZE, output);

        let mut stats = CompressStats::default();
        stats.output_bytes += self.config.format.write_header(&mut writer)? as u64;

        // Checksum runs on the distribution path: original byte order,
        // independent of worker completion order.
        let mut checksum = self.config.format.checksum_kind().map(Checksum::new);

        let mut next_block_id: u64 = 0;

        // Reorder buffer for out-of-order completions
        let mut pending_blocks: BTreeMap<u64, EncodedBlock> = BTreeMap::new();
        let mut next_write_id: u64 = 0;

        loop {
            let mut data = vec![0u8; self.config.block_size];
            let n = read_block(&mut reader, &mut data)?;
            if n == 0 {
                break;
            }
            data.truncate(n);

            if let Some(state) = checksum.as_mut() {
                state.update(&data);
            }
            stats.input_bytes += n as u64;

            let job = EncodingJob { block_id: next_block_id, data };
            next_block_id += 1;

            // Send the job, draining finished blocks while the queue is full
            // so workers never starve waiting on the writer.
            let mut job_to_send = Some(job);
            while job_to_send.is_some() {
                crossbeam::channel::select! {
                    send(job_tx, job_to_send.clone().unwrap()) -> res => {
                        match res {
                            Ok(()) => { job_to_send = None; }
                            Err(_) => return Err(Error::Internal("workers disconnected".into())),
                        }
                    }
                    recv(result_rx) -> res => {
                        match res {
                            Ok(result) => {
                                let block = result?;
                                Self::buffer_and_write_block(
                                    &mut writer,
                                    block,
                                    &mut pending_blocks,
                                    &mut next_write_id,
                                    &mut stats,
                                )?;
                            }
                            Err(_) => {
                                return Err(Error::Internal("result channel disconnected".into()));
                            }
                        }
                    }
                }
            }
        }

        // No more jobs: closing the channel lets idle workers exit
        drop(job_tx);

        while stats.blocks_written + (pending_blocks.len() as u64) < next_block_id {
            match result_rx.recv() {
                Ok(result) => {
                    let block = result?;
                    Self::buffer_and_write_block(
                        &mut writer,
                        block,
                        &mut pending_blocks,
                        &mut next_write_id,
                        &mut stats,
                    )?;
                }
                Err(_) => break,
            }
        }

        // Flush whatever the reorder buffer still holds
        while let Some(block) = pending_blocks.remove(&next_write_id) {
            stats.output_bytes += block.data.len() as u64;
            writer.write_all(&block.data)?;
            stats.blocks_written += 1;
            if block.stored {
                stats.stored_blocks += 1;
            }
            next_write_id += 1;
        }

        if stats.blocks_written < next_block_id {
            return Err(Error::Internal(format!(
                "lost blocks: wrote {} of {}",
                stats.blocks_written, next_block_id
            )));
        }

        let check = checksum.map(|state| state.finalize()).unwrap_or(0);
        stats.output_bytes +=
            self.config.format.write_trailer(&mut writer, check, stats.input_bytes)? as u64;
        writer.flush()?;

        Ok(stats)
    }

    fn buffer_and_write_block<W: Write>(
        writer: &mut W,
        block: EncodedBlock,
        pending: &mut BTreeMap<u64, EncodedBlock>,
        next_write_id: &mut u64,
        stats: &mut CompressStats,
    ) -> Result<()> {
        if block.block_id == *next_write_id {
            stats.output_bytes += block.data.len() as u64;
            writer.write_all(&block.data)?;
            stats.blocks_written += 1;
            if block.stored {
                stats.stored_blocks += 1;
            }
            *next_write_id += 1;

            // Any consecutive buffered successors can follow immediately
            while let Some(buffered) = pending.remove(next_write_id) {
                stats.output_bytes += buffered.data.len() as u64;
                writer.write_all(&buffered.data)?;
                stats.blocks_written += 1;
                if buffered.stored {
                    stats.stored_blocks += 1;
                }
                *next_write_id += 1;
            }
        } else {
            pending.insert(block.block_id, block);
        }
        Ok(())
    }
}

/// Worker thread: runs match finding, frequency counting, and encoding for
/// one block at a time, visiting the tree service between the two walks.
fn worker_thread(
    job_rx: Receiver<EncodingJob>,
    result_tx: Sender<Result<EncodedBlock>>,
    tree_tx: Option<Sender<TreeRequest>>,
    level: CompressionLevel,
    min_stored_block: usize,
) {
    let mut state = WorkerState::new(level);

    while let Ok(job) = job_rx.recv() {
        let result = encode_block(&mut state, tree_tx.as_ref(), min_stored_block, job);
        if result_tx.send(result).is_err() {
            // Main thread has stopped, exit
            break;
        }
    }
}

fn encode_block(
    state: &mut WorkerState,
    tree_tx: Option<&Sender<TreeRequest>>,
    min_stored_block: usize,
    job: EncodingJob,
) -> Result<EncodedBlock> {
    if job.data.len() < min_stored_block {
        return Ok(EncodedBlock {
            block_id: job.block_id,
            data: BlockEncoder::encode_stored(&job.data),
            stored: true,
        });
    }

    let (data, stored) = match tree_tx {
        None => state.encode_fixed(&job.data)?,
        Some(tree_tx) => {
            let freqs = state.analyze(&job.data)?;

            let (reply_tx, reply_rx) = bounded(1);
            tree_tx
                .send(TreeRequest { block_id: job.block_id, freqs, reply: reply_tx })
                .map_err(|_| Error::Internal("tree service disconnected".into()))?;
            let tables = reply_rx
                .recv()
                .map_err(|_| Error::Internal("tree service dropped a reply".into()))?;

            state.encode_with_tables(&job.data, &tables)?
        }
    };

    Ok(EncodedBlock { block_id: job.block_id, data, stored })
}

/// The serialized tree-construction service. Requests are honored in strict
/// block-id order; out-of-order arrivals wait in the reorder map. Blocks that
/// skip entropy coding never request a tree, but only the trailing short
/// block can do that, so the id sequence seen here has no interior gaps.
fn tree_service(request_rx: Receiver<TreeRequest>) {
    let mut builder = TreeBuilder::new();
    let mut waiting: BTreeMap<u64, TreeRequest> = BTreeMap::new();
    let mut next_id: u64 = 0;

    while let Ok(request) = request_rx.recv() {
        waiting.insert(request.block_id, request);
        while let Some(request) = waiting.remove(&next_id) {
            let tables = builder.build_dynamic(&request.freqs);
            // A dropped reply means the job already failed; nothing to do
            let _ = request.reply.send(tables);
            next_id += 1;
        }
    }

    // Channel closed: serve any stragglers in order rather than stranding
    // their workers.
    for (_, request) in waiting {
        let tables = builder.build_dynamic(&request.freqs);
        let _ = request.reply.send(tables);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompressionLevel, ContainerFormat};
    use std::io::{Cursor, Read};

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        flate2::read::MultiGzDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    fn compress_with(config: CompressConfig, input: &[u8]) -> (Vec<u8>, CompressStats) {
        let mut compressor = ParallelCompressor::new(config);
        let mut output = Vec::new();
        let stats = compressor.compress(Cursor::new(input), &mut output).unwrap();
        (output, stats)
    }

    #[test]
    fn test_parallel_round_trip() {
        let input: Vec<u8> = (0..200_000u32).flat_map(|i| (i % 239).to_le_bytes()).collect();
        let config =
            CompressConfig { num_workers: 4, block_size: 16384, ..Default::default() };
        let (output, stats) = compress_with(config, &input);

        assert!(stats.blocks_written > 4);
        assert_eq!(stats.input_bytes, input.len() as u64);
        assert_eq!(gunzip(&output), input);
    }

    #[test]
    fn test_parallel_empty_input() {
        let config = CompressConfig { num_workers: 4, ..Default::default() };
        let (output, stats) = compress_with(config, &[]);
        assert_eq!(stats.blocks_written, 0);
        assert!(gunzip(&output).is_empty());
    }

    #[test]
    fn test_parallel_matches_single_after_decode() {
        let input: Vec<u8> =
            b"the quick brown fox ".iter().cycle().take(150_000).copied().collect();

        let single_cfg = CompressConfig { num_workers: 1, ..Default::default() };
        let parallel_cfg = CompressConfig { num_workers: 8, ..Default::default() };
        let (single_out, single_stats) = compress_with(single_cfg, &input);
        let (parallel_out, parallel_stats) = compress_with(parallel_cfg, &input);

        // Decompressed content is independent of parallelism
        assert_eq!(gunzip(&single_out), gunzip(&parallel_out));
        // So is the trailer checksum
        assert_eq!(&single_out[single_out.len() - 8..], &parallel_out[parallel_out.len() - 8..]);
        assert_eq!(single_stats.input_bytes, parallel_stats.input_bytes);
    }

    #[test]
    fn test_parallel_static_mode_skips_tree_service() {
        let input = vec![b'm'; 100_000];
        let config = CompressConfig {
            num_workers: 4,
            level: CompressionLevel::Level2,
            ..Default::default()
        };
        let (output, _) = compress_with(config, &input);
        assert_eq!(gunzip(&output), input);
    }

    #[test]
    fn test_parallel_zlib() {
        let input = vec![0xAB; 90_000];
        let config = CompressConfig {
            num_workers: 3,
            format: ContainerFormat::Zlib,
            ..Default::default()
        };
        let mut compressor = ParallelCompressor::new(config);
        let mut output = Vec::new();
        compressor.compress(Cursor::new(&input[..]), &mut output).unwrap();

        let mut decoded = Vec::new();
        flate2::read::ZlibDecoder::new(&output[..]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_worker_count_clamped() {
        let config = CompressConfig { num_workers: 0, ..Default::default() };
        let workers = config.effective_workers();
        assert!(workers >= 1);
        assert!(workers <= crate::MAX_WORKERS);
    }
}
