//! Metric scoring and final ranking of retrieval hits.
//!
//! Each hit is scored against reference sentences drawn from its own
//! document: the longest other sentences serve as ground truth, and the best
//! ROUGE-L and best METEOR scores are taken independently across them. A
//! single-sentence document has no peers, so a synthetic reference is
//! derived from the sentence itself by seeded synonym substitution.
//!
//! Scoring fans out over a bounded rayon pool and honors a wall-clock
//! deadline: hits whose scoring has not started before the deadline degrade
//! to the policy fallback score instead of stalling the query.

use crate::config::{COMPARISON_CANDIDATES, MAX_SELF_REFERENCE_SUBSTITUTIONS};
use crate::corpus::{Corpus, SearchableDoc};
use crate::error::EngineError;
use crate::index::{DocId, SearchHit, SentenceId};
use crate::score::lcs::{rouge_l, RougeMetrics};
use crate::score::meteor::{meteor, MeteorOutcome};
use crate::synonyms::SynonymProvider;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

/// Both metric outcomes for one hit.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricSet {
    pub rouge: RougeMetrics,
    pub meteor: MeteorOutcome,
}

/// How a hit's score came to be, for display and debugging.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Explanation {
    /// The reference sentence behind the best ROUGE-L score, if any.
    pub comparison_sentence: Option<String>,
    /// True when the document had no other sentence to compare against.
    pub self_evaluation: bool,
    /// The synthetic reference used for self-evaluation.
    pub artificial_reference: Option<String>,
    /// Set when scoring was skipped or cut short.
    pub degraded: Option<String>,
}

/// A fully scored, rank-ordered result.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub doc_id: DocId,
    pub sentence_index: SentenceId,
    pub sentence_text: String,
    pub metrics: MetricSet,
    /// Equal-weight blend of ROUGE-L F-measure and METEOR.
    pub combined: f32,
    pub explanation: Explanation,
}

/// Score `hits` and return the top `top_k` by combined score.
///
/// Ties keep retrieval order, so a strategy's own ranking survives equal
/// metric scores.
pub fn rank_hits(corpus: &Corpus, hits: &[SearchHit]) -> Result<Vec<RankedResult>, EngineError> {
    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let config = corpus.config();
    let deadline = Instant::now() + config.scoring_deadline;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers())
        .build()
        .map_err(|e| EngineError::Scoring(e.to_string()))?;

    let mut scored: Vec<RankedResult> = pool.install(|| {
        hits.par_iter()
            .filter_map(|hit| score_hit(corpus, hit, deadline))
            .collect()
    });

    scored.sort_by(|a, b| {
        b.combined
            .partial_cmp(&a.combined)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(config.top_k);
    debug!(results = scored.len(), "ranking complete");
    Ok(scored)
}

fn score_hit(corpus: &Corpus, hit: &SearchHit, deadline: Instant) -> Option<RankedResult> {
    let doc = corpus.searchable(hit.doc_id)?;
    let sentence = doc.sentences.iter().find(|s| s.index == hit.sentence_index)?;
    let candidate = doc.index.processed.get(&hit.sentence_index)?;

    if Instant::now() >= deadline {
        warn!(
            doc_id = hit.doc_id,
            sentence = hit.sentence_index,
            "scoring deadline exceeded, using fallback score"
        );
        let fallback = corpus.policy().fallback_score;
        return Some(RankedResult {
            doc_id: hit.doc_id,
            sentence_index: hit.sentence_index,
            sentence_text: sentence.text.clone(),
            metrics: MetricSet {
                rouge: RougeMetrics::ZERO,
                meteor: MeteorOutcome::ZERO,
            },
            combined: fallback,
            explanation: Explanation {
                degraded: Some("scoring deadline exceeded".to_string()),
                ..Explanation::default()
            },
        });
    }

    let references = ground_truth(doc, hit.sentence_index);
    let (metrics, explanation) = if references.is_empty() {
        score_against_self(corpus, hit, &candidate.tokens, &candidate.stemmed)
    } else {
        score_against_peers(corpus, &candidate.stemmed, &references)
    };

    let combined = 0.5 * metrics.rouge.f_measure + 0.5 * metrics.meteor.score;
    Some(RankedResult {
        doc_id: hit.doc_id,
        sentence_index: hit.sentence_index,
        sentence_text: sentence.text.clone(),
        metrics,
        combined,
        explanation,
    })
}

/// The longest other sentences of the same document, most words first.
fn ground_truth(doc: &SearchableDoc, exclude: SentenceId) -> Vec<(String, Vec<String>)> {
    let mut peers: Vec<(usize, &str, &[String])> = doc
        .sentences
        .iter()
        .filter(|s| s.index != exclude)
        .filter_map(|s| {
            let p = doc.index.processed.get(&s.index)?;
            (!p.stemmed.is_empty()).then_some((p.word_count, s.text.as_str(), p.stemmed.as_slice()))
        })
        .collect();
    peers.sort_by(|a, b| b.0.cmp(&a.0));
    peers
        .into_iter()
        .take(COMPARISON_CANDIDATES)
        .map(|(_, text, stemmed)| (text.to_string(), stemmed.to_vec()))
        .collect()
}

/// Best ROUGE-L and best METEOR across the references, taken independently.
fn score_against_peers(
    corpus: &Corpus,
    candidate: &[String],
    references: &[(String, Vec<String>)],
) -> (MetricSet, Explanation) {
    let synonyms = corpus.synonyms();
    let policy = corpus.policy();
    let cache = corpus.cache();

    let mut best_rouge = RougeMetrics::ZERO;
    let mut best_rouge_text: Option<&str> = None;
    let mut best_meteor = MeteorOutcome::ZERO;
    for (text, reference) in references {
        let r = rouge_l(reference, candidate, synonyms, policy, cache);
        if r.f_measure > best_rouge.f_measure || best_rouge_text.is_none() {
            best_rouge = r;
            best_rouge_text = Some(text);
        }
        let m = meteor(reference, candidate, synonyms, policy, cache);
        if m.score > best_meteor.score {
            best_meteor = m;
        }
    }

    (
        MetricSet {
            rouge: best_rouge,
            meteor: best_meteor,
        },
        Explanation {
            comparison_sentence: best_rouge_text.map(str::to_string),
            ..Explanation::default()
        },
    )
}

/// Score a sentence from a single-sentence document against a synthetic
/// reference of itself with some words swapped for synonyms.
fn score_against_self(
    corpus: &Corpus,
    hit: &SearchHit,
    tokens: &[String],
    stemmed: &[String],
) -> (MetricSet, Explanation) {
    let seed = self_reference_seed(corpus, hit.doc_id, hit.sentence_index);
    let reference_tokens = synthetic_reference(tokens, corpus.synonyms(), seed);
    let reference = crate::tokenizer::lemmatize_tokens(&reference_tokens, corpus.synonyms());

    let rouge = rouge_l(
        &reference,
        stemmed,
        corpus.synonyms(),
        corpus.policy(),
        corpus.cache(),
    );
    let met = meteor(
        &reference,
        stemmed,
        corpus.synonyms(),
        corpus.policy(),
        corpus.cache(),
    );

    (
        MetricSet {
            rouge,
            meteor: met,
        },
        Explanation {
            self_evaluation: true,
            artificial_reference: Some(reference_tokens.join(" ")),
            ..Explanation::default()
        },
    )
}

fn self_reference_seed(corpus: &Corpus, doc_id: DocId, sentence_index: SentenceId) -> u64 {
    corpus.config().self_reference_seed ^ (u64::from(doc_id) << 32 | u64::from(sentence_index))
}

/// Replace up to `min(MAX_SELF_REFERENCE_SUBSTITUTIONS, len/2)` interior
/// tokens with a synonym. First and last tokens stay put so the reference
/// keeps the sentence's shape. Deterministic for a given seed.
fn synthetic_reference(tokens: &[String], synonyms: &SynonymProvider, seed: u64) -> Vec<String> {
    let mut out = tokens.to_vec();
    if tokens.len() < 3 {
        return out;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut interior: Vec<usize> = (1..tokens.len() - 1).collect();
    interior.shuffle(&mut rng);

    let budget = MAX_SELF_REFERENCE_SUBSTITUTIONS.min(tokens.len() / 2);
    let mut replaced = 0;
    for idx in interior {
        if replaced >= budget {
            break;
        }
        let options = synonyms.synonyms(&tokens[idx]);
        if options.is_empty() {
            continue;
        }
        out[idx] = options[rng.gen_range(0..options.len())].clone();
        replaced += 1;
    }
    out
}
