//! Error taxonomy.
//!
//! Nothing here is fatal to a whole search request: extraction, scoring and
//! cache failures degrade per document or per hit, and the remaining results
//! are still returned. Only local input validation surfaces to the caller.

use crate::index::DocId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Query was empty or shorter than the minimum after trimming.
    #[error("query must be at least {min} characters")]
    QueryTooShort { min: usize },

    /// Query reduced to nothing after stopword removal.
    #[error("query contains only stopwords")]
    QueryAllStopwords,

    #[error("unknown document {0}")]
    UnknownDocument(DocId),

    /// Segmentation produced no usable sentences; the document is excluded
    /// from retrieval but kept so re-ingestion can retry.
    #[error("document {0} has no usable text")]
    Unprocessable(DocId),

    /// Unexpected failure inside the LCS/METEOR computation. Recovered at the
    /// call site with the policy fallback score.
    #[error("scoring failed: {0}")]
    Scoring(String),

    #[error("persistence error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(String),
}

impl From<bincode::Error> for EngineError {
    fn from(e: bincode::Error) -> Self {
        EngineError::Codec(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Codec(e.to_string())
    }
}
