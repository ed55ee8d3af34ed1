//! Per-document BM25 retrieval.
//!
//! Each document is its own corpus: document frequencies and the average
//! sentence length are computed over that document's sentences only, so raw
//! scores are not comparable across documents. The query is expanded with at
//! most one synonym of its first stemmed token. Optional keyword/length
//! bonuses come from the scoring policy and default to off.

use crate::config::{BM25_B, BM25_K1, BM25_SCORE_FLOOR};
use crate::corpus::Corpus;
use crate::index::{SearchHit, SentenceId};
use crate::search::{cap_hits, PreparedQuery, SearchStrategy};
use std::collections::HashMap;

pub struct Bm25;

impl SearchStrategy for Bm25 {
    fn name(&self) -> &'static str {
        "bm25"
    }

    fn search(&self, query: &PreparedQuery, corpus: &Corpus) -> Vec<SearchHit> {
        let expanded = expand_query(query, corpus);
        if expanded.is_empty() {
            tracing::warn!("query reduced to nothing after normalization");
            return Vec::new();
        }

        let policy = corpus.policy();
        let cap = corpus.config().per_document_cap;
        let mut hits = Vec::new();

        for doc in corpus.searchable_docs() {
            // sentence order is the deterministic tie-break substrate
            let mut rows: Vec<(SentenceId, &[String], usize, &str)> = Vec::new();
            for sentence in doc.sentences.iter() {
                if let Some(p) = doc.index.processed.get(&sentence.index) {
                    rows.push((sentence.index, &p.stemmed, p.word_count, &sentence.text));
                }
            }
            if rows.is_empty() {
                continue;
            }

            let n = rows.len() as f32;
            let avgdl = rows.iter().map(|r| r.1.len() as f32).sum::<f32>() / n;
            let avgdl = if avgdl == 0.0 { 1.0 } else { avgdl };

            // document frequencies within this document
            let mut df: HashMap<&str, u32> = HashMap::new();
            for term in &expanded {
                let count = rows
                    .iter()
                    .filter(|r| r.1.iter().any(|t| t == term))
                    .count() as u32;
                if count > 0 {
                    df.insert(term.as_str(), count);
                }
            }

            let mut scored: Vec<(SentenceId, f32, usize)> = Vec::new();
            for (idx, stemmed, word_count, text) in &rows {
                let dl = stemmed.len() as f32;
                let mut score = 0.0f32;
                for term in &expanded {
                    let df_t = match df.get(term.as_str()) {
                        Some(&d) => d as f32,
                        None => continue,
                    };
                    let tf = stemmed.iter().filter(|t| *t == term).count() as f32;
                    if tf == 0.0 {
                        continue;
                    }
                    let idf = ((n - df_t + 0.5) / (df_t + 0.5) + 1.0).ln();
                    let tf_norm =
                        (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * dl / avgdl));
                    score += idf * tf_norm;
                }
                if score <= BM25_SCORE_FLOOR {
                    continue;
                }
                // presentation bonuses, off under the default policy
                if policy.keyword_bonus != 1.0 && text.to_lowercase().contains(&query.lowercase) {
                    score *= policy.keyword_bonus;
                }
                if policy.length_bonus_rate > 0.0 {
                    score *= 1.0 + policy.length_bonus_rate * *word_count as f32;
                }
                scored.push((*idx, score, *word_count));
            }

            scored.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(b.2.cmp(&a.2))
                    .then(a.0.cmp(&b.0))
            });
            hits.extend(cap_hits(
                scored
                    .into_iter()
                    .map(|(idx, score, _)| SearchHit {
                        doc_id: doc.document.id,
                        sentence_index: idx,
                        raw_score: score,
                    })
                    .collect(),
                cap,
            ));
        }
        hits
    }
}

/// Query terms plus at most one synonym of the first term.
fn expand_query(query: &PreparedQuery, corpus: &Corpus) -> Vec<String> {
    let mut expanded = query.stemmed.clone();
    if let Some(first) = query.stemmed.first() {
        if let Some(synonym) = corpus.synonyms().synonyms(first).first() {
            if !expanded.contains(synonym) {
                expanded.push(synonym.clone());
            }
        }
    }
    expanded
}
