//! Sentence-level search-and-score engine.
//!
//! Documents are segmented into sentences, indexed per document, searched by
//! one of four retrieval strategies, and the returned sentences are ranked by
//! ROUGE-L-like and METEOR-like similarity against automatically selected
//! reference sentences from the same document.

pub mod cache;
pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod persist;
pub mod rank;
pub mod score;
pub mod search;
pub mod segment;
pub mod stopwords;
pub mod synonyms;
pub mod tokenizer;

pub use cache::{CacheStats, ContentCache};
pub use config::{Language, ScoringPolicy, SearchConfig};
pub use corpus::{Corpus, CorpusStats, DocumentState, SearchableDoc};
pub use error::EngineError;
pub use index::{DocId, Document, DocumentIndex, ProcessedTokens, SearchHit, Sentence, SentenceId};
pub use rank::{Explanation, MetricSet, RankedResult};
pub use score::lcs::RougeMetrics;
pub use score::meteor::MeteorOutcome;
pub use search::Strategy;
pub use synonyms::{Lexicon, NullLexicon, Synset, SynonymProvider};
