//! Weighted longest-common-subsequence and the ROUGE-L-like metric built on
//! it.
//!
//! The DP generalizes classical LCS with fractional weights: exact matches
//! count [`ScoringPolicy::exact_match_weight`], synonym matches slightly
//! less, and long tokens sharing most of their character set less still.
//! Very short and very long sequences take set-intersection fast paths, where
//! the DP's granularity is unreliable or too expensive respectively.

use crate::cache::{CacheKey, CachedValue, ContentCache, Op};
use crate::config::{
    CHAR_OVERLAP_RATIO, LONG_SEQUENCE_TOKENS, MIN_SYNONYM_TOKEN_LEN, SHORT_SEQUENCE_TOKENS,
};
use crate::config::ScoringPolicy;
use crate::score::token_parts;
use crate::synonyms::SynonymProvider;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// ROUGE-L-like precision/recall/F-measure in [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RougeMetrics {
    pub precision: f32,
    pub recall: f32,
    pub f_measure: f32,
    /// Diagnostic: the weighted LCS length the metrics derive from.
    pub lcs_length: f32,
}

impl RougeMetrics {
    pub const ZERO: RougeMetrics = RougeMetrics {
        precision: 0.0,
        recall: 0.0,
        f_measure: 0.0,
        lcs_length: 0.0,
    };

    /// Percentage projection for display.
    pub fn as_percentages(&self) -> (f32, f32, f32) {
        (
            self.precision * 100.0,
            self.recall * 100.0,
            self.f_measure * 100.0,
        )
    }
}

/// Weighted LCS length of two token sequences.
///
/// Passing `None` for `synonyms` disables synonym matching, making the result
/// symmetric in its arguments. With default weights the result never exceeds
/// `min(len(reference), len(candidate))`.
pub fn weighted_lcs(
    reference: &[String],
    candidate: &[String],
    synonyms: Option<&SynonymProvider>,
    policy: &ScoringPolicy,
) -> f32 {
    let (m, n) = (reference.len(), candidate.len());
    if m == 0 || n == 0 {
        return 0.0;
    }
    let min_len = m.min(n);

    if m < SHORT_SEQUENCE_TOKENS || n < SHORT_SEQUENCE_TOKENS {
        return short_path(reference, candidate, policy, min_len);
    }
    if m > LONG_SEQUENCE_TOKENS || n > LONG_SEQUENCE_TOKENS {
        // linear-time approximation for long inputs
        return intersection_count(reference, candidate) as f32;
    }

    // rolling two-row DP
    let mut prev = vec![0.0f32; n + 1];
    let mut curr = vec![0.0f32; n + 1];
    for i in 1..=m {
        let a = &reference[i - 1];
        for j in 1..=n {
            let b = &candidate[j - 1];
            let matched = if a == b {
                Some(policy.exact_match_weight)
            } else if is_synonym_pair(a, b, synonyms) {
                Some(policy.synonym_match_weight)
            } else if char_overlap(a, b) {
                Some(policy.partial_match_weight)
            } else {
                None
            };
            curr[j] = match matched {
                Some(weight) => prev[j - 1] + weight,
                None => prev[j].max(curr[j - 1]),
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// Set-intersection count for short sequences, optionally boosted.
fn short_path(reference: &[String], candidate: &[String], policy: &ScoringPolicy, min_len: usize) -> f32 {
    let common = intersection_count(reference, candidate) as f32;
    if policy.short_sequence_boost && min_len > 0 {
        let boost = (1.2 * SHORT_SEQUENCE_TOKENS as f32 / min_len as f32).max(1.0);
        (common * boost).min(min_len as f32)
    } else {
        common
    }
}

fn intersection_count(a: &[String], b: &[String]) -> usize {
    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();
    set_a.intersection(&set_b).count()
}

fn is_synonym_pair(a: &str, b: &str, synonyms: Option<&SynonymProvider>) -> bool {
    let provider = match synonyms {
        Some(p) => p,
        None => return false,
    };
    if a.chars().count() <= MIN_SYNONYM_TOKEN_LEN || b.chars().count() <= MIN_SYNONYM_TOKEN_LEN {
        return false;
    }
    provider.is_synonym(a, b) || provider.is_synonym(b, a)
}

/// Shared-character-set heuristic for longer tokens ("running" vs "runner").
fn char_overlap(a: &str, b: &str) -> bool {
    if a.chars().count() <= 3 || b.chars().count() <= 3 {
        return false;
    }
    let set_a: HashSet<char> = a.chars().collect();
    let set_b: HashSet<char> = b.chars().collect();
    let common = set_a.intersection(&set_b).count() as f32;
    let larger = set_a.len().max(set_b.len()) as f32;
    common / larger >= CHAR_OVERLAP_RATIO
}

/// ROUGE-L against a reference, memoized by token sequences and policy.
pub fn rouge_l(
    reference: &[String],
    candidate: &[String],
    synonyms: &SynonymProvider,
    policy: &ScoringPolicy,
    cache: &ContentCache,
) -> RougeMetrics {
    if reference.is_empty() && candidate.is_empty() {
        return RougeMetrics::ZERO;
    }

    let key = score_cache_key(Op::RougeScore, reference, candidate, policy);
    if let Some(CachedValue::Rouge(hit)) = cache.get(&key) {
        return hit;
    }

    let lcs = weighted_lcs(reference, candidate, Some(synonyms), policy);
    let mut precision = if candidate.is_empty() {
        0.0
    } else {
        (lcs / candidate.len() as f32).clamp(0.0, 1.0)
    };
    let mut recall = if reference.is_empty() {
        0.0
    } else {
        (lcs / reference.len() as f32).clamp(0.0, 1.0)
    };

    let is_short =
        reference.len() < SHORT_SEQUENCE_TOKENS || candidate.len() < SHORT_SEQUENCE_TOKENS;
    if is_short {
        if let Some(floor) = policy.short_sentence_floor {
            precision = precision.max(floor);
            recall = recall.max(floor);
        }
    }

    let f_measure = f_beta(precision, recall, policy.recall_beta);
    let metrics = RougeMetrics {
        precision,
        recall,
        f_measure,
        lcs_length: lcs,
    };
    cache.insert(key, CachedValue::Rouge(metrics));
    metrics
}

fn f_beta(precision: f32, recall: f32, beta: f32) -> f32 {
    if precision + recall == 0.0 {
        return 0.0;
    }
    let b2 = beta * beta;
    ((1.0 + b2) * precision * recall) / (b2 * precision + recall)
}

pub(crate) fn score_cache_key(
    op: Op,
    reference: &[String],
    candidate: &[String],
    policy: &ScoringPolicy,
) -> CacheKey {
    let ref_count = (reference.len() as u64).to_le_bytes();
    let policy_bytes = policy.digest_bytes();
    let mut parts: Vec<&[u8]> = vec![&ref_count];
    parts.extend(token_parts(reference));
    parts.extend(token_parts(candidate));
    parts.push(&policy_bytes);
    CacheKey::of_parts(op, &parts)
}
