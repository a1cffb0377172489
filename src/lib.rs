pub mod bits;
pub mod checksum;
pub mod container;
pub mod deflate;
pub mod error;
pub mod huffman;
pub mod lz77;
pub mod pipeline;

pub use container::ContainerFormat;
pub use deflate::{Token, TokenBuf};
pub use error::{Error, Result};
pub use pipeline::{parallel::ParallelCompressor, single::SingleThreadedCompressor};

use std::io::{Read, Write};

/// Upper bound on worker pipelines
pub const MAX_WORKERS: usize = 32;

/// Compression level (1-9)
///
/// - Levels 1-3: fixed Huffman tables, shallow match chains (fastest)
/// - Levels 4-6: per-block dynamic Huffman (balanced)
/// - Levels 7-9: dynamic Huffman with deep match chains (best compression)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CompressionLevel {
    Level1 = 1,
    Level2 = 2,
    Level3 = 3,
    Level4 = 4,
    Level5 = 5,
    #[default]
    Level6 = 6,
    Level7 = 7,
    Level8 = 8,
    Level9 = 9,
}

impl CompressionLevel {
    /// Create from numeric level (1-9), clamped to valid range
    pub fn from_level(level: u8) -> Self {
        match level {
            0 | 1 => Self::Level1,
            2 => Self::Level2,
            3 => Self::Level3,
            4 => Self::Level4,
            5 => Self::Level5,
            6 => Self::Level6,
            7 => Self::Level7,
            8 => Self::Level8,
            _ => Self::Level9,
        }
    }

    /// Get numeric level (1-9)
    pub fn level(&self) -> u8 {
        *self as u8
    }

    /// Whether this level defaults to the format's fixed tables (levels 1-3)
    pub fn prefers_fixed_huffman(&self) -> bool {
        matches!(self, Self::Level1 | Self::Level2 | Self::Level3)
    }
}

/// Entropy coding mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HuffmanMode {
    /// Follow the compression level (fixed for 1-3, dynamic for 4-9)
    #[default]
    Auto,
    /// Always use the format's fixed code tables (skips tree construction)
    Static,
    /// Always build per-block canonical trees
    Dynamic,
}

/// Configuration for a compression job
#[derive(Clone, Debug)]
pub struct CompressConfig {
    /// Uncompressed bytes per block (default 32768, max 65536)
    pub block_size: usize,
    /// Compression level (1-9)
    pub level: CompressionLevel,
    /// Output framing: gzip, zlib, or raw DEFLATE
    pub format: ContainerFormat,
    /// Entropy coding mode
    pub huffman: HuffmanMode,
    /// Number of parallel workers (0 = auto, 1 = single-threaded)
    pub num_workers: usize,
    /// A trailing block shorter than this bypasses entropy coding entirely
    pub min_stored_block: usize,
}

impl CompressConfig {
    /// Reject configurations the format cannot express. Runs before any data
    /// is read.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || self.block_size > 65536 {
            return Err(Error::InvalidBlockSize(self.block_size));
        }
        if self.num_workers > MAX_WORKERS {
            return Err(Error::InvalidWorkerCount(self.num_workers));
        }
        if self.min_stored_block > self.block_size {
            return Err(Error::InvalidStoredThreshold {
                threshold: self.min_stored_block,
                block_size: self.block_size,
            });
        }
        Ok(())
    }

    /// Whether blocks use the fixed code tables
    pub fn use_fixed_huffman(&self) -> bool {
        match self.huffman {
            HuffmanMode::Auto => self.level.prefers_fixed_huffman(),
            HuffmanMode::Static => true,
            HuffmanMode::Dynamic => false,
        }
    }

    /// Resolve the worker count (0 = one per CPU, capped)
    pub fn effective_workers(&self) -> usize {
        match self.num_workers {
            0 => num_cpus::get().clamp(1, MAX_WORKERS),
            n => n.min(MAX_WORKERS),
        }
    }
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            block_size: 32768,
            level: CompressionLevel::default(),
            format: ContainerFormat::default(),
            huffman: HuffmanMode::default(),
            num_workers: 0,
            min_stored_block: 1024,
        }
    }
}

/// Statistics from a compression job
#[derive(Clone, Debug, Default)]
pub struct CompressStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub blocks_written: u64,
    /// Blocks emitted verbatim (stored fallback or below the size threshold)
    pub stored_blocks: u64,
}

/// The complete compression operation
pub trait Compressor {
    /// Compress `input` into `output` using the configured container format
    fn compress<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<CompressStats>;
}
