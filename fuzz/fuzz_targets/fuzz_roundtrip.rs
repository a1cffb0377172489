#![no_main]

use libfuzzer_sys::fuzz_target;
use parz::{CompressConfig, Compressor, SingleThreadedCompressor};
use std::io::{Cursor, Read};

fuzz_target!(|data: &[u8]| {
    // Small block size so multi-block paths run even on short inputs
    let config = CompressConfig { block_size: 4096, min_stored_block: 64, ..Default::default() };
    let mut compressor = SingleThreadedCompressor::new(config);
    let mut output = Vec::new();
    compressor.compress(Cursor::new(data), &mut output).expect("compression must not fail");

    let mut decoded = Vec::new();
    flate2::read::MultiGzDecoder::new(&output[..])
        .read_to_end(&mut decoded)
        .expect("output must be valid gzip");
    assert_eq!(decoded, data, "round-trip mismatch");
});
