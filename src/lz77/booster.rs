//! Match boosting pass.
//!
//! The finder caps matches at 255 bytes; long runs therefore arrive as chains
//! of same-distance matches. This pass merges such neighbours back up to the
//! format's 258-byte maximum (copying `a+b` bytes from one distance is
//! byte-for-byte identical to two consecutive copies from that distance) and
//! defensively splits anything longer than the encodable span.

use crate::deflate::{Token, TokenBuf, MAX_MATCH, MIN_MATCH};

/// Rewrite `input` into `out`, merging and splitting matches. Total
/// uncompressed coverage is preserved exactly.
pub fn boost(input: &TokenBuf, out: &mut TokenBuf) {
    out.clear();
    out.tokens.reserve(input.tokens.len());

    let mut pending: Option<(u32, u16)> = None; // (length, distance)

    for token in &input.tokens {
        match *token {
            Token::Match { length, distance } => {
                if let Some((plen, pdist)) = pending {
                    if pdist == distance && plen as usize + length as usize <= MAX_MATCH {
                        pending = Some((plen + u32::from(length), distance));
                        continue;
                    }
                    flush_match(out, plen, pdist);
                }
                pending = Some((u32::from(length), distance));
            }
            Token::Literal(byte) => {
                if let Some((plen, pdist)) = pending.take() {
                    flush_match(out, plen, pdist);
                }
                out.push(Token::Literal(byte));
            }
        }
    }

    if let Some((plen, pdist)) = pending {
        flush_match(out, plen, pdist);
    }

    debug_assert_eq!(out.uncompressed_size, input.uncompressed_size);
}

/// Emit a match, splitting at the 258-byte span. A split never leaves a
/// remainder below the minimum match length.
fn flush_match(out: &mut TokenBuf, mut length: u32, distance: u16) {
    while length as usize > MAX_MATCH {
        let take = if length as usize - MAX_MATCH >= MIN_MATCH {
            MAX_MATCH
        } else {
            // Shrink this piece so the tail stays encodable
            length as usize - MIN_MATCH
        };
        out.push(Token::Match { length: take as u16, distance });
        length -= take as u32;
    }
    out.push(Token::Match { length: length as u16, distance });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(tokens: Vec<Token>) -> TokenBuf {
        let mut b = TokenBuf::default();
        for t in tokens {
            b.push(t);
        }
        b
    }

    fn boosted(tokens: Vec<Token>) -> TokenBuf {
        let input = buf(tokens);
        let mut out = TokenBuf::default();
        boost(&input, &mut out);
        out
    }

    #[test]
    fn test_passthrough() {
        let tokens = vec![
            Token::Literal(b'a'),
            Token::Match { length: 10, distance: 3 },
            Token::Literal(b'b'),
        ];
        let out = boosted(tokens.clone());
        assert_eq!(out.tokens, tokens);
    }

    #[test]
    fn test_merges_same_distance_neighbours() {
        let out = boosted(vec![
            Token::Match { length: 255, distance: 1 },
            Token::Match { length: 3, distance: 1 },
        ]);
        assert_eq!(out.tokens, vec![Token::Match { length: 258, distance: 1 }]);
    }

    #[test]
    fn test_merge_respects_cap() {
        let out = boosted(vec![
            Token::Match { length: 255, distance: 1 },
            Token::Match { length: 255, distance: 1 },
        ]);
        // 510 would overflow the cap; both stay whole
        assert_eq!(
            out.tokens,
            vec![
                Token::Match { length: 255, distance: 1 },
                Token::Match { length: 255, distance: 1 },
            ]
        );
        assert_eq!(out.uncompressed_size, 510);
    }

    #[test]
    fn test_no_merge_across_distances() {
        let tokens = vec![
            Token::Match { length: 100, distance: 4 },
            Token::Match { length: 100, distance: 8 },
        ];
        let out = boosted(tokens.clone());
        assert_eq!(out.tokens, tokens);
    }

    #[test]
    fn test_no_merge_across_literal() {
        let tokens = vec![
            Token::Match { length: 100, distance: 4 },
            Token::Literal(b'q'),
            Token::Match { length: 100, distance: 4 },
        ];
        let out = boosted(tokens.clone());
        assert_eq!(out.tokens, tokens);
    }

    #[test]
    fn test_split_leaves_encodable_tail() {
        let mut out = TokenBuf::default();
        flush_match(&mut out, 260, 2); // 258 + 2 would strand a 2-byte tail
        assert_eq!(
            out.tokens,
            vec![Token::Match { length: 257, distance: 2 }, Token::Match { length: 3, distance: 2 }]
        );
        assert_eq!(out.uncompressed_size, 260);
    }

    #[test]
    fn test_long_run_merges_cleanly() {
        // A 1020-byte run as four 255-byte matches
        let out = boosted(vec![Token::Match { length: 255, distance: 1 }; 4]);
        assert_eq!(out.uncompressed_size, 1020);
        for token in &out.tokens {
            match token {
                Token::Match { length, .. } => {
                    assert!((MIN_MATCH..=MAX_MATCH).contains(&(*length as usize)))
                }
                Token::Literal(_) => panic!("literal appeared from nowhere"),
            }
        }
    }
}
