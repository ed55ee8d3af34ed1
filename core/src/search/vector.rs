//! Plain term-frequency cosine retrieval.
//!
//! Builds an explicit vocabulary over corpus + query, L2-normalizes raw
//! frequency vectors, and ranks by dot product. Needs no IDF statistics,
//! which makes it the fallback when corpus-wide statistics are unavailable
//! or meaningless (e.g. a single short document).

use crate::corpus::Corpus;
use crate::index::{DocId, SearchHit, SentenceId};
use crate::search::{PreparedQuery, SearchStrategy};
use std::collections::HashMap;

pub struct VectorSpace;

impl SearchStrategy for VectorSpace {
    fn name(&self) -> &'static str {
        "vector-space"
    }

    fn search(&self, query: &PreparedQuery, corpus: &Corpus) -> Vec<SearchHit> {
        if query.stemmed.is_empty() {
            return Vec::new();
        }

        // vocabulary over corpus + query
        let mut vocabulary: HashMap<&str, usize> = HashMap::new();
        let mut rows: Vec<(DocId, SentenceId, &[String])> = Vec::new();
        for doc in corpus.searchable_docs() {
            for sentence in doc.sentences.iter() {
                if let Some(p) = doc.index.processed.get(&sentence.index) {
                    for t in &p.stemmed {
                        let next = vocabulary.len();
                        vocabulary.entry(t.as_str()).or_insert(next);
                    }
                    rows.push((doc.document.id, sentence.index, &p.stemmed));
                }
            }
        }
        for t in &query.stemmed {
            let next = vocabulary.len();
            vocabulary.entry(t.as_str()).or_insert(next);
        }

        let q_vector = frequency_vector(&query.stemmed, &vocabulary);

        let mut hits: Vec<SearchHit> = rows
            .iter()
            .filter_map(|(doc_id, idx, stemmed)| {
                let score = dot(&q_vector, &frequency_vector(stemmed, &vocabulary));
                (score > 0.0).then_some(SearchHit {
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

/// Sparse L2-normalized term-frequency vector.
fn frequency_vector(tokens: &[String], vocabulary: &HashMap<&str, usize>) -> HashMap<usize, f32> {
    let mut vector: HashMap<usize, f32> = HashMap::new();
    for t in tokens {
        if let Some(&dim) = vocabulary.get(t.as_str()) {
            *vector.entry(dim).or_insert(0.0) += 1.0;
        }
    }
    let norm: f32 = vector.values().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.values_mut() {
            *v /= norm;
        }
    }
    vector
}

fn dot(a: &HashMap<usize, f32>, b: &HashMap<usize, f32>) -> f32 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(dim, w)| large.get(dim).map(|v| w * v))
        .sum()
}
