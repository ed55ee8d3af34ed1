//! TF-IDF cosine retrieval.
//!
//! Unlike the BM25 strategy, document frequencies are computed across the
//! whole corpus, and the query is appended as one more pseudo-document before
//! weighting. Sentences are ranked by cosine similarity to the query vector;
//! anything at or below the threshold is discarded.

use crate::config::COSINE_THRESHOLD;
use crate::corpus::Corpus;
use crate::index::{DocId, SearchHit, SentenceId};
use crate::search::{PreparedQuery, SearchStrategy};
use std::collections::{HashMap, HashSet};

pub struct TfIdf;

impl SearchStrategy for TfIdf {
    fn name(&self) -> &'static str {
        "tfidf-cosine"
    }

    fn search(&self, query: &PreparedQuery, corpus: &Corpus) -> Vec<SearchHit> {
        if query.stemmed.is_empty() {
            return Vec::new();
        }

        // gather every sentence's stemmed tokens across the corpus
        let mut rows: Vec<(DocId, SentenceId, &[String])> = Vec::new();
        for doc in corpus.searchable_docs() {
            for sentence in doc.sentences.iter() {
                if let Some(p) = doc.index.processed.get(&sentence.index) {
                    rows.push((doc.document.id, sentence.index, &p.stemmed));
                }
            }
        }
        if rows.is_empty() {
            return Vec::new();
        }

        // document frequencies: every sentence plus the query pseudo-document
        let n = (rows.len() + 1) as f32;
        let mut df: HashMap<&str, u32> = HashMap::new();
        for (_, _, stemmed) in &rows {
            let distinct: HashSet<&str> = stemmed.iter().map(String::as_str).collect();
            for term in distinct {
                *df.entry(term).or_insert(0) += 1;
            }
        }
        let q_distinct: HashSet<&str> = query.stemmed.iter().map(String::as_str).collect();
        for term in q_distinct {
            *df.entry(term).or_insert(0) += 1;
        }

        let q_vector = weigh(&query.stemmed, &df, n);
        if q_vector.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = rows
            .iter()
            .filter_map(|(doc_id, idx, stemmed)| {
                let s_vector = weigh(stemmed, &df, n);
                let score = cosine(&q_vector, &s_vector);
                (score > COSINE_THRESHOLD).then_some(SearchHit {
                    doc_id: *doc_id,
                    sentence_index: *idx,
                    raw_score: score,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.raw_score
                .partial_cmp(&a.raw_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.doc_id.cmp(&b.doc_id))
                .then(a.sentence_index.cmp(&b.sentence_index))
        });
        hits.truncate(corpus.config().per_document_cap * corpus.stats().documents.max(1));
        hits
    }
}

/// Log-scaled TF-IDF weights, L2-normalized.
fn weigh<'a>(tokens: &'a [String], df: &HashMap<&str, u32>, n: f32) -> HashMap<&'a str, f32> {
    let mut tf: HashMap<&str, u32> = HashMap::new();
    for t in tokens {
        *tf.entry(t.as_str()).or_insert(0) += 1;
    }
    let mut weights: HashMap<&str, f32> = HashMap::new();
    let mut norm = 0.0f32;
    for (term, count) in tf {
        let df_t = df.get(term).copied().unwrap_or(1).max(1) as f32;
        let w = (1.0 + (count as f32).ln()) * (n / df_t).ln();
        if w > 0.0 {
            norm += w * w;
            weights.insert(term, w);
        }
    }
    if norm > 0.0 {
        let norm = norm.sqrt();
        for w in weights.values_mut() {
            *w /= norm;
        }
    }
    weights
}

fn cosine(a: &HashMap<&str, f32>, b: &HashMap<&str, f32>) -> f32 {
    // both sides are unit vectors, so the dot product is the cosine
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|v| w * v))
        .sum()
}
