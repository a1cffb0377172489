use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors, rejected before any data is processed
    #[error("Invalid block size: {0} (must be 1..=65536, the stored-block span)")]
    InvalidBlockSize(usize),

    #[error("Invalid worker count: {0}")]
    InvalidWorkerCount(usize),

    #[error("Minimum stored-block threshold {threshold} exceeds block size {block_size}")]
    InvalidStoredThreshold { threshold: usize, block_size: usize },

    // Capacity violations: an upstream stage produced a value the format
    // cannot express. These abort the whole job rather than truncate.
    #[error("Match length {0} outside encodable range 3..=258")]
    LengthOutOfRange(u16),

    #[error("Match distance {0} outside encodable range 1..=32768")]
    DistanceOutOfRange(u16),

    // Internal errors
    #[error("Worker thread panicked")]
    WorkerPanic,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
