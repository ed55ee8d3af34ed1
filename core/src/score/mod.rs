//! Sentence-similarity scoring: weighted-LCS ROUGE-L and a METEOR-like
//! synonym-tolerant overlap score.

pub mod lcs;
pub mod meteor;

/// Canonical byte parts for hashing a token sequence into a cache key.
pub(crate) fn token_parts(tokens: &[String]) -> Vec<&[u8]> {
    tokens.iter().map(|t| t.as_bytes()).collect()
}
