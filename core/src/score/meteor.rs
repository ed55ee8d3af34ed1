//! METEOR-like synonym-tolerant overlap score.
//!
//! Exact overlap is a multiset intersection, so repeated tokens are handled
//! correctly. A second overlap is computed against a synonym-expanded
//! reference, and the two are blended with a fixed weighting that biases
//! toward synonym-tolerant matching. Long sequences short-circuit to plain
//! set intersection.

use crate::cache::{CacheKey, CachedValue, ContentCache, Op};
use crate::config::{LONG_SEQUENCE_TOKENS, MAX_EXPANSIONS_PER_TOKEN, ScoringPolicy};
use crate::score::lcs::score_cache_key;
use crate::synonyms::SynonymProvider;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Combined METEOR-like score with its sub-score breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeteorOutcome {
    /// Blended score in [0,1].
    pub score: f32,
    /// Overlap against the unexpanded reference.
    pub base: f32,
    /// Overlap against the synonym-expanded reference.
    pub expanded: f32,
    /// True when the long-sequence fallback produced the score.
    pub degraded: bool,
}

impl MeteorOutcome {
    pub const ZERO: MeteorOutcome = MeteorOutcome {
        score: 0.0,
        base: 0.0,
        expanded: 0.0,
        degraded: false,
    };
}

/// Score `candidate` against `reference`, memoized.
pub fn meteor(
    reference: &[String],
    candidate: &[String],
    synonyms: &SynonymProvider,
    policy: &ScoringPolicy,
    cache: &ContentCache,
) -> MeteorOutcome {
    if reference.is_empty() || candidate.is_empty() {
        return MeteorOutcome::ZERO;
    }

    let key = meteor_cache_key(reference, candidate, policy);
    if let Some(CachedValue::Meteor(hit)) = cache.get(&key) {
        return hit;
    }

    let outcome =
        if reference.len() > LONG_SEQUENCE_TOKENS || candidate.len() > LONG_SEQUENCE_TOKENS {
            let set_a: HashSet<&str> = reference.iter().map(String::as_str).collect();
            let set_b: HashSet<&str> = candidate.iter().map(String::as_str).collect();
            let common = set_a.intersection(&set_b).count() as f32;
            let score = (common / reference.len().min(candidate.len()) as f32).clamp(0.0, 1.0);
            MeteorOutcome {
                score,
                base: score,
                expanded: score,
                degraded: true,
            }
        } else {
            let base_counts = multiset(reference.iter());
            let base = fmean_overlap(&base_counts, candidate, reference.len());

            // Synonyms widen what the candidate may match; the recall
            // denominator stays the original reference length.
            let expanded_counts = expand_reference(base_counts, reference, synonyms);
            let expanded = fmean_overlap(&expanded_counts, candidate, reference.len());

            let score = (policy.meteor_base_weight * base
                + policy.meteor_expanded_weight * expanded)
                .clamp(0.0, 1.0);
            MeteorOutcome {
                score,
                base,
                expanded,
                degraded: false,
            }
        };

    cache.insert(key, CachedValue::Meteor(outcome));
    outcome
}

fn multiset<'a>(tokens: impl Iterator<Item = &'a String>) -> HashMap<String, u32> {
    let mut map = HashMap::new();
    for t in tokens {
        *map.entry(t.clone()).or_insert(0) += 1;
    }
    map
}

fn expand_reference(
    mut counts: HashMap<String, u32>,
    reference: &[String],
    synonyms: &SynonymProvider,
) -> HashMap<String, u32> {
    for token in reference {
        for syn in synonyms.synonyms(token).iter().take(MAX_EXPANSIONS_PER_TOKEN) {
            *counts.entry(syn.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Multiset-overlap F-mean: METEOR's 9:1 recall-weighted harmonic mean.
fn fmean_overlap(
    reference_counts: &HashMap<String, u32>,
    candidate: &[String],
    recall_len: usize,
) -> f32 {
    let mut remaining = reference_counts.clone();
    let mut matches = 0u32;
    for token in candidate {
        if let Some(count) = remaining.get_mut(token) {
            if *count > 0 {
                *count -= 1;
                matches += 1;
            }
        }
    }
    if matches == 0 {
        return 0.0;
    }
    let precision = matches as f32 / candidate.len() as f32;
    let recall = (matches as f32 / recall_len as f32).clamp(0.0, 1.0);
    (10.0 * precision * recall) / (recall + 9.0 * precision)
}

fn meteor_cache_key(
    reference: &[String],
    candidate: &[String],
    policy: &ScoringPolicy,
) -> CacheKey {
    score_cache_key(Op::MeteorScore, reference, candidate, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn score(a: &[&str], b: &[&str]) -> MeteorOutcome {
        meteor(
            &toks(a),
            &toks(b),
            &SynonymProvider::default(),
            &ScoringPolicy::default(),
            &ContentCache::with_capacity(32),
        )
    }

    #[test]
    fn identical_sequences_score_one() {
        let out = score(
            &["winter", "storms", "hit", "coast"],
            &["winter", "storms", "hit", "coast"],
        );
        assert_eq!(out.base, 1.0);
        assert_eq!(out.score, 1.0);
        assert!(!out.degraded);
    }

    #[test]
    fn disjoint_sequences_score_zero() {
        let out = score(&["winter", "storms"], &["summer", "calm"]);
        assert_eq!(out.score, 0.0);
    }

    #[test]
    fn repeated_tokens_match_as_a_multiset() {
        // plain set intersection would treat "cold cold cold" as one match
        let a = score(&["cold", "cold", "cold"], &["cold", "cold", "cold"]);
        assert_eq!(a.base, 1.0);
        let b = score(&["cold", "cold", "cold"], &["cold", "wind", "wind"]);
        assert!(b.base < 1.0);
        assert!(b.base > 0.0);
    }

    #[test]
    fn synonyms_raise_the_expanded_subscore() {
        // "great" is a curated synonym of "good"
        let out = score(
            &["good", "weather", "ahead"],
            &["great", "weather", "ahead"],
        );
        assert!(out.expanded > out.base, "{} vs {}", out.expanded, out.base);
        assert!(out.score > out.base);
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let out = score(
            &["alpha", "beta", "beta", "gamma"],
            &["beta", "beta", "beta", "delta", "alpha"],
        );
        for v in [out.score, out.base, out.expanded] {
            assert!((0.0..=1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn long_sequences_degrade_to_set_overlap() {
        let a: Vec<String> = (0..120).map(|i| format!("w{i}")).collect();
        let out = meteor(
            &a,
            &a,
            &SynonymProvider::default(),
            &ScoringPolicy::default(),
            &ContentCache::with_capacity(32),
        );
        assert!(out.degraded);
        assert_eq!(out.score, 1.0);
    }

    #[test]
    fn empty_inputs_score_zero() {
        let out = score(&[], &["anything"]);
        assert_eq!(out, MeteorOutcome::ZERO);
    }

    #[test]
    fn result_is_memoized() {
        let cache = ContentCache::with_capacity(32);
        let provider = SynonymProvider::default();
        let policy = ScoringPolicy::default();
        let a = toks(&["one", "two", "three"]);
        let b = toks(&["one", "two", "four"]);
        let first = meteor(&a, &b, &provider, &policy, &cache);
        let misses = cache.stats().misses;
        let second = meteor(&a, &b, &provider, &policy, &cache);
        assert_eq!(first, second);
        assert_eq!(cache.stats().misses, misses);
    }
}
