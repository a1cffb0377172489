//! Checksum collaborators: CRC32 for gzip, Adler-32 for zlib.
//!
//! The accumulator is an order-sensitive reduction over the original byte
//! stream; the pipeline feeds it on the distribution path, before blocks
//! scatter to workers.

pub mod adler32;

pub use adler32::Adler32;

/// Checksum algorithm selector
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChecksumKind {
    Crc32,
    Adler32,
}

/// Rolling checksum state
pub enum Checksum {
    Crc32(crc32fast::Hasher),
    Adler32(Adler32),
}

impl Checksum {
    pub fn new(kind: ChecksumKind) -> Self {
        match kind {
            ChecksumKind::Crc32 => Self::Crc32(crc32fast::Hasher::new()),
            ChecksumKind::Adler32 => Self::Adler32(Adler32::new()),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Crc32(hasher) => hasher.update(data),
            Self::Adler32(state) => state.update(data),
        }
    }

    pub fn finalize(&self) -> u32 {
        match self {
            Self::Crc32(hasher) => hasher.clone().finalize(),
            Self::Adler32(state) => state.finalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_matches_reference() {
        let mut state = Checksum::new(ChecksumKind::Crc32);
        state.update(b"123456789");
        assert_eq!(state.finalize(), 0xCBF43926);
    }

    #[test]
    fn test_adler32_selector() {
        let mut state = Checksum::new(ChecksumKind::Adler32);
        state.update(b"123456789");
        assert_eq!(state.finalize(), 0x091E01DE);
    }

    #[test]
    fn test_empty_initial_values() {
        assert_eq!(Checksum::new(ChecksumKind::Crc32).finalize(), 0);
        assert_eq!(Checksum::new(ChecksumKind::Adler32).finalize(), 1);
    }

    #[test]
    fn test_incremental_updates() {
        let mut a = Checksum::new(ChecksumKind::Crc32);
        a.update(b"hello ");
        a.update(b"world");
        let mut b = Checksum::new(ChecksumKind::Crc32);
        b.update(b"hello world");
        assert_eq!(a.finalize(), b.finalize());
    }
}
