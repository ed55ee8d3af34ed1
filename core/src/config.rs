//! Engine configuration and scoring policy.
//!
//! Every tuning constant lives here under a name. `ScoringPolicy` defaults to
//! the unbiased metric: all presentation-oriented bonuses and floors are
//! opt-in.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// BM25 term-frequency saturation parameter.
pub const BM25_K1: f32 = 1.5;
/// BM25 length-normalization parameter.
pub const BM25_B: f32 = 0.75;
/// BM25 scores at or below this are treated as noise and dropped.
pub const BM25_SCORE_FLOOR: f32 = 0.01;
/// Cosine similarities at or below this are dropped.
pub const COSINE_THRESHOLD: f32 = 0.01;

/// Documents longer than this (in chars) are segmented chunk-by-chunk.
pub const CHUNK_SIZE_CHARS: usize = 100_000;
/// Sentence-index stride reserved per chunk. Keeps indices unique
/// document-wide assuming no chunk yields more sentences than this.
pub const SENTENCES_PER_CHUNK: u32 = 1_000;

/// Queries shorter than this (after trimming) are rejected.
pub const MIN_QUERY_CHARS: usize = 2;

/// Synonym lookups return at most this many entries per word.
pub const MAX_SYNONYMS_PER_WORD: usize = 10;
/// Token expansion appends at most this many synonyms per token.
pub const MAX_EXPANSIONS_PER_TOKEN: usize = 3;
/// Tokens must be longer than this to qualify for synonym lookup.
pub const MIN_SYNONYM_TOKEN_LEN: usize = 2;
/// Hypernym/hyponym traversal depth cap per synset.
pub const MAX_RELATED_SYNSETS: usize = 2;

/// Token sequences shorter than this take the set-intersection fast path.
pub const SHORT_SEQUENCE_TOKENS: usize = 5;
/// Token sequences longer than this short-circuit to set intersection.
pub const LONG_SEQUENCE_TOKENS: usize = 100;
/// Shared-character-set ratio needed for a partial LCS match.
pub const CHAR_OVERLAP_RATIO: f32 = 0.7;

/// Comparison candidates drawn per hit (longest sentences first).
pub const COMPARISON_CANDIDATES: usize = 5;
/// Upper bound on synonym substitutions in a synthetic self-reference.
pub const MAX_SELF_REFERENCE_SUBSTITUTIONS: usize = 5;

/// Default number of ranked results returned.
pub const DEFAULT_TOP_K: usize = 5;
/// Default bound on cache entries before FIFO eviction kicks in.
pub const DEFAULT_CACHE_CAPACITY: usize = 65_536;

/// Stopword language selection. `Combined` is the union of both lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    English,
    Indonesian,
    #[default]
    Combined,
}

/// Engine-wide knobs owned by a [`crate::Corpus`].
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub language: Language,
    /// Upper bound on worker threads; the effective pool size is
    /// `min(worker_cap, available_parallelism + 2)`.
    pub worker_cap: usize,
    /// Ranked results returned per query.
    pub top_k: usize,
    /// Hits a strategy may return per document.
    pub per_document_cap: usize,
    /// Wall-clock budget for the scoring fan-in; hits not started before the
    /// deadline degrade to the policy fallback score.
    pub scoring_deadline: Duration,
    pub cache_capacity: usize,
    /// Seed for synthetic self-reference substitution, kept injectable so
    /// single-sentence evaluation is reproducible.
    pub self_reference_seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            worker_cap: 8,
            top_k: DEFAULT_TOP_K,
            per_document_cap: 10,
            scoring_deadline: Duration::from_secs(30),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            self_reference_seed: 0,
        }
    }
}

impl SearchConfig {
    /// Effective worker-pool size.
    pub fn workers(&self) -> usize {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.worker_cap.min(parallelism + 2).max(1)
    }
}

/// Scoring weights and opt-in presentation bonuses.
///
/// The defaults describe the pure metric. The non-default values in the field
/// docs are what the product tuning historically used; enabling them inflates
/// scores and is cosmetic, not a relevance signal.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    /// Weight of an exact token match in the LCS (tuned variant: 1.2).
    pub exact_match_weight: f32,
    /// Weight of a synonym match in the LCS.
    pub synonym_match_weight: f32,
    /// Weight of a character-overlap partial match in the LCS.
    pub partial_match_weight: f32,
    /// Recall-weighting beta for the ROUGE-L F-measure (tuned variant: 1.2).
    pub recall_beta: f32,
    /// Minimum score floor applied when either sequence is short
    /// (tuned variant: Some(0.5)). Off by default.
    pub short_sentence_floor: Option<f32>,
    /// Boost the short-sequence fast path (tuned variant: true).
    pub short_sequence_boost: bool,
    /// BM25 multiplier when the sentence contains the query phrase
    /// (tuned variant: 1.5). 1.0 disables it.
    pub keyword_bonus: f32,
    /// BM25 per-word length bonus rate (tuned variant: 0.01). 0.0 disables it.
    pub length_bonus_rate: f32,
    /// Blend weight of the unexpanded METEOR sub-score.
    pub meteor_base_weight: f32,
    /// Blend weight of the synonym-expanded METEOR sub-score.
    pub meteor_expanded_weight: f32,
    /// Score substituted when scoring fails or times out.
    pub fallback_score: f32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            exact_match_weight: 1.0,
            synonym_match_weight: 0.8,
            partial_match_weight: 0.6,
            recall_beta: 1.0,
            short_sentence_floor: None,
            short_sequence_boost: false,
            keyword_bonus: 1.0,
            length_bonus_rate: 0.0,
            meteor_base_weight: 0.3,
            meteor_expanded_weight: 0.7,
            fallback_score: 0.5,
        }
    }
}

impl ScoringPolicy {
    /// The historical presentation tuning, for callers that want the old
    /// demo-friendly output.
    pub fn tuned() -> Self {
        Self {
            exact_match_weight: 1.2,
            synonym_match_weight: 1.0,
            partial_match_weight: 0.8,
            recall_beta: 1.2,
            short_sentence_floor: Some(0.5),
            short_sequence_boost: true,
            keyword_bonus: 1.5,
            length_bonus_rate: 0.01,
            ..Self::default()
        }
    }

    /// Canonical byte form for cache keys, so cached scores are never reused
    /// across policies.
    pub(crate) fn digest_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(44);
        for f in [
            self.exact_match_weight,
            self.synonym_match_weight,
            self.partial_match_weight,
            self.recall_beta,
            self.short_sentence_floor.unwrap_or(-1.0),
            self.keyword_bonus,
            self.length_bonus_rate,
            self.meteor_base_weight,
            self.meteor_expanded_weight,
        ] {
            out.extend_from_slice(&f.to_bits().to_le_bytes());
        }
        out.push(self.short_sequence_boost as u8);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_pure() {
        let p = ScoringPolicy::default();
        assert_eq!(p.exact_match_weight, 1.0);
        assert_eq!(p.keyword_bonus, 1.0);
        assert_eq!(p.length_bonus_rate, 0.0);
        assert!(p.short_sentence_floor.is_none());
        assert!(!p.short_sequence_boost);
    }

    #[test]
    fn policy_digest_distinguishes_tunings() {
        assert_ne!(
            ScoringPolicy::default().digest_bytes(),
            ScoringPolicy::tuned().digest_bytes()
        );
    }

    #[test]
    fn workers_respect_cap() {
        let cfg = SearchConfig {
            worker_cap: 2,
            ..Default::default()
        };
        assert!(cfg.workers() <= 2);
        assert!(cfg.workers() >= 1);
    }
}
