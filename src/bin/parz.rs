use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use parz::{
    CompressConfig, CompressionLevel, Compressor, ContainerFormat, HuffmanMode,
    ParallelCompressor, SingleThreadedCompressor,
};

#[derive(Parser, Debug)]
#[command(name = "parz")]
#[command(about = "Block-parallel gzip/zlib compressor")]
#[command(version)]
struct Args {
    /// Input file (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (use - for stdout)
    #[arg(short, long)]
    output: PathBuf,

    /// Container format
    #[arg(short, long, value_enum, default_value = "gzip")]
    format: Format,

    /// Compression level (1-9; 1-3 use fixed Huffman tables)
    #[arg(short = 'l', long, default_value = "6")]
    level: u8,

    /// Number of worker threads (0 = auto, 1 = single-threaded)
    #[arg(short = 't', long, default_value = "0")]
    threads: usize,

    /// Uncompressed block size in bytes (max 65536)
    #[arg(long, default_value = "32768")]
    block_size: usize,

    /// Force static or dynamic Huffman coding regardless of level
    #[arg(long, value_enum)]
    huffman: Option<Huffman>,

    /// Blocks below this size are emitted uncompressed
    #[arg(long, default_value = "1024")]
    min_stored: usize,

    /// Decompress the output afterwards and compare against the input
    /// (requires file input and output)
    #[arg(long)]
    verify: bool,

    /// Show compression statistics
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Gzip,
    Zlib,
    Raw,
}

impl From<Format> for ContainerFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Gzip => ContainerFormat::Gzip,
            Format::Zlib => ContainerFormat::Zlib,
            Format::Raw => ContainerFormat::Raw,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Huffman {
    Static,
    Dynamic,
}

impl From<Huffman> for HuffmanMode {
    fn from(mode: Huffman) -> Self {
        match mode {
            Huffman::Static => HuffmanMode::Static,
            Huffman::Dynamic => HuffmanMode::Dynamic,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = CompressConfig {
        block_size: args.block_size,
        level: CompressionLevel::from_level(args.level),
        format: args.format.into(),
        huffman: args.huffman.map(Into::into).unwrap_or_default(),
        num_workers: args.threads,
        min_stored_block: args.min_stored,
    };

    let is_stdin = args.input.to_str() == Some("-");
    let is_stdout = args.output.to_str() == Some("-");

    let input: Box<dyn Read> = if is_stdin {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(&args.input)?))
    };

    let output: Box<dyn io::Write> = if is_stdout {
        Box::new(io::stdout().lock())
    } else {
        Box::new(BufWriter::new(File::create(&args.output)?))
    };

    let start = std::time::Instant::now();

    let stats = if config.effective_workers() == 1 {
        let mut compressor = SingleThreadedCompressor::new(config.clone());
        compressor.compress(input, output)?
    } else {
        let mut compressor = ParallelCompressor::new(config.clone());
        compressor.compress(input, output)?
    };

    let elapsed = start.elapsed();

    if args.verbose {
        let ratio = if stats.input_bytes > 0 {
            stats.output_bytes as f64 / stats.input_bytes as f64 * 100.0
        } else {
            0.0
        };
        eprintln!("Compression complete:");
        eprintln!("  Input bytes:      {}", stats.input_bytes);
        eprintln!("  Output bytes:     {}", stats.output_bytes);
        eprintln!("  Ratio:            {:.1}%", ratio);
        eprintln!("  Blocks:           {}", stats.blocks_written);
        eprintln!("  Stored blocks:    {}", stats.stored_blocks);
        eprintln!("  Time:             {:.2?}", elapsed);
        eprintln!(
            "  Throughput:       {:.1} MB/s",
            stats.input_bytes as f64 / elapsed.as_secs_f64() / 1_000_000.0
        );
    }

    if args.verify {
        if is_stdin || is_stdout {
            eprintln!("Warning: --verify requires file input and output, skipping");
        } else {
            verify(&args.input, &args.output, args.format)?;
            if args.verbose {
                eprintln!("  Verify:           ok");
            }
        }
    }

    Ok(())
}

/// Decompress the freshly written output and compare it byte-for-byte with
/// the original input.
fn verify(
    input_path: &PathBuf,
    output_path: &PathBuf,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let compressed = BufReader::new(File::open(output_path)?);
    let mut decoded = Vec::new();
    match format {
        Format::Gzip => {
            flate2::read::MultiGzDecoder::new(compressed).read_to_end(&mut decoded)?;
        }
        Format::Zlib => {
            flate2::read::ZlibDecoder::new(compressed).read_to_end(&mut decoded)?;
        }
        Format::Raw => {
            flate2::read::DeflateDecoder::new(compressed).read_to_end(&mut decoded)?;
        }
    }

    let mut original = Vec::new();
    BufReader::new(File::open(input_path)?).read_to_end(&mut original)?;

    if decoded != original {
        return Err(format!(
            "verification failed: decompressed {} bytes, expected {}",
            decoded.len(),
            original.len()
        )
        .into());
    }
    Ok(())
}
