//! Retrieval strategies.
//!
//! Four interchangeable strategies share the [`SearchStrategy`] contract:
//! given a prepared query and a corpus, return scored sentence hits. Raw
//! scores are only comparable within one strategy; the ranking aggregator
//! re-scores hits with the similarity metrics before anything is shown.

mod bm25;
mod exact;
mod tfidf;
mod vector;

pub use bm25::Bm25;
pub use exact::ExactMatch;
pub use tfidf::TfIdf;
pub use vector::VectorSpace;

use crate::config::{Language, MIN_QUERY_CHARS};
use crate::corpus::Corpus;
use crate::error::EngineError;
use crate::index::SearchHit;
use crate::synonyms::SynonymProvider;
use crate::tokenizer;
use serde::{Deserialize, Serialize};

/// A validated, pre-tokenized query.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    /// Trimmed original query.
    pub raw: String,
    /// Lowercased form, used for phrase containment.
    pub lowercase: String,
    /// Lowercased whitespace-split terms (stopwords kept, for exact match).
    pub terms: Vec<String>,
    /// Normalized (stopword-free) and stemmed terms, for ranked strategies.
    pub stemmed: Vec<String>,
}

/// Validate and tokenize a query. Queries shorter than
/// [`MIN_QUERY_CHARS`] after trimming are rejected before any search runs.
pub fn prepare_query(
    query: &str,
    language: Language,
    provider: &SynonymProvider,
) -> Result<PreparedQuery, EngineError> {
    let trimmed = query.trim();
    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return Err(EngineError::QueryTooShort {
            min: MIN_QUERY_CHARS,
        });
    }
    let lowercase = trimmed.to_lowercase();
    let terms: Vec<String> = lowercase.split_whitespace().map(str::to_string).collect();
    let normalized = tokenizer::normalize(trimmed, language);
    let stemmed = tokenizer::lemmatize_tokens(&normalized, provider);
    Ok(PreparedQuery {
        raw: trimmed.to_string(),
        lowercase,
        terms,
        stemmed,
    })
}

/// Common contract of all retrieval strategies.
pub trait SearchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Scored hits per searchable document, capped at the corpus
    /// per-document limit, best first.
    fn search(&self, query: &PreparedQuery, corpus: &Corpus) -> Vec<SearchHit>;
}

/// Strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    ExactMatch,
    Bm25,
    TfIdf,
    VectorSpace,
}

impl Strategy {
    pub fn resolve(&self) -> &'static dyn SearchStrategy {
        match self {
            Strategy::ExactMatch => &ExactMatch,
            Strategy::Bm25 => &Bm25,
            Strategy::TfIdf => &TfIdf,
            Strategy::VectorSpace => &VectorSpace,
        }
    }

    pub fn name(&self) -> &'static str {
        self.resolve().name()
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Truncate a per-document hit list, best first.
pub(crate) fn cap_hits(mut hits: Vec<SearchHit>, cap: usize) -> Vec<SearchHit> {
    hits.truncate(cap);
    hits
}
