#![no_main]

use libfuzzer_sys::fuzz_target;
use parz::{CompressConfig, Compressor, ParallelCompressor};
use std::io::{Cursor, Read};

fuzz_target!(|data: &[u8]| {
    let config = CompressConfig {
        block_size: 2048,
        min_stored_block: 64,
        num_workers: 3,
        ..Default::default()
    };
    let mut compressor = ParallelCompressor::new(config);
    let mut output = Vec::new();
    compressor.compress(Cursor::new(data), &mut output).expect("compression must not fail");

    let mut decoded = Vec::new();
    flate2::read::MultiGzDecoder::new(&output[..])
        .read_to_end(&mut decoded)
        .expect("output must be valid gzip");
    assert_eq!(decoded, data, "round-trip mismatch");
});
