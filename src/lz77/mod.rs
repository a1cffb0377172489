//! LZ77 match finding: hash-chain matcher plus the match boosting pass.

pub mod booster;
pub mod matcher;

pub use booster::boost;
pub use matcher::MatchFinder;

use crate::deflate::TokenBuf;

/// Run the full match-finding stage for one block: hash-chain matching
/// followed by the boost pass. `scratch` holds the raw token stream between
/// the two passes so repeated calls reuse its allocation.
pub fn tokenize_block(
    finder: &mut MatchFinder,
    data: &[u8],
    scratch: &mut TokenBuf,
    out: &mut TokenBuf,
) {
    finder.tokenize(data, scratch);
    boost(scratch, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_block_covers_input() {
        let data = vec![b'A'; 70_000];
        let mut finder = MatchFinder::new(6);
        let mut scratch = TokenBuf::default();
        let mut out = TokenBuf::default();
        tokenize_block(&mut finder, &data[..65536], &mut scratch, &mut out);
        assert_eq!(out.uncompressed_size, 65536);
    }
}
