//! Document lifecycle and the search entry point.
//!
//! A [`Corpus`] owns the ingested documents, drives each one through
//! segmentation and indexing, and answers queries by running a retrieval
//! strategy followed by metric ranking. Derived data (sentences, index) is
//! held behind `Arc`, so replacing a document on re-ingestion is a pointer
//! swap that never invalidates views handed out earlier.

use crate::cache::{CacheStats, ContentCache};
use crate::config::{Language, ScoringPolicy, SearchConfig};
use crate::error::EngineError;
use crate::index::{build_document_index, DocId, Document, DocumentIndex, Sentence};
use crate::rank::{rank_hits, RankedResult};
use crate::search::{prepare_query, SearchStrategy, Strategy};
use crate::segment;
use crate::synonyms::SynonymProvider;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of one document. Forward-only except for re-ingestion, which
/// resets to `Unindexed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentState {
    /// Ingested, nothing derived yet.
    Unindexed,
    /// Sentences extracted.
    Segmented,
    /// Inverted index built.
    Indexed,
    /// Fully processed and visible to retrieval.
    Searchable,
    /// Yielded no usable sentences; excluded from retrieval but kept so a
    /// re-ingestion can retry.
    Unprocessable,
}

/// Read view of a fully processed document.
pub struct SearchableDoc {
    pub document: Arc<Document>,
    pub sentences: Arc<Vec<Sentence>>,
    pub index: Arc<DocumentIndex>,
}

struct DocEntry {
    document: Arc<Document>,
    state: DocumentState,
    sentences: Option<Arc<Vec<Sentence>>>,
}

/// Corpus-level counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub documents: usize,
    pub searchable: usize,
    pub unprocessable: usize,
    pub sentences: usize,
    pub total_bytes: u64,
}

pub struct Corpus {
    config: SearchConfig,
    policy: ScoringPolicy,
    synonyms: SynonymProvider,
    cache: ContentCache,
    docs: BTreeMap<DocId, DocEntry>,
    searchable: BTreeMap<DocId, SearchableDoc>,
    next_id: DocId,
}

impl Corpus {
    pub fn new(config: SearchConfig, policy: ScoringPolicy) -> Self {
        let cache = ContentCache::with_capacity(config.cache_capacity);
        Self {
            config,
            policy,
            synonyms: SynonymProvider::default(),
            cache,
            docs: BTreeMap::new(),
            searchable: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SearchConfig::default(), ScoringPolicy::default())
    }

    pub fn with_policy(policy: ScoringPolicy) -> Self {
        Self::new(SearchConfig::default(), policy)
    }

    /// Swap in a different synonym source. Clears the cache since synonym
    /// choices feed indexed token forms.
    pub fn set_synonyms(&mut self, synonyms: SynonymProvider) {
        self.synonyms = synonyms;
        self.cache.reset();
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Switch the stopword language. Clears the cache; already-indexed
    /// documents keep their token forms until re-ingested.
    pub fn set_language(&mut self, language: Language) {
        if self.config.language != language {
            self.config.language = language;
            self.cache.reset();
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn synonyms(&self) -> &SynonymProvider {
        &self.synonyms
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn reset_cache(&self) {
        self.cache.reset();
    }

    /// Ingest a document. Ids start at 1 and are never reused.
    pub fn add_document(&mut self, filename: &str, text: String) -> DocId {
        let id = self.next_id;
        self.next_id += 1;
        let size_bytes = text.len() as u64;
        self.docs.insert(
            id,
            DocEntry {
                document: Arc::new(Document {
                    id,
                    filename: filename.to_string(),
                    raw_text: text,
                    size_bytes,
                }),
                state: DocumentState::Unindexed,
                sentences: None,
            },
        );
        debug!(doc_id = id, filename, size_bytes, "document ingested");
        id
    }

    /// Replace a document's content under its existing id. All derived data
    /// is dropped; the document goes back to `Unindexed`.
    pub fn reingest(&mut self, doc_id: DocId, text: String) -> Result<(), EngineError> {
        let entry = self
            .docs
            .get_mut(&doc_id)
            .ok_or(EngineError::UnknownDocument(doc_id))?;
        let size_bytes = text.len() as u64;
        entry.document = Arc::new(Document {
            id: doc_id,
            filename: entry.document.filename.clone(),
            raw_text: text,
            size_bytes,
        });
        entry.state = DocumentState::Unindexed;
        entry.sentences = None;
        self.searchable.remove(&doc_id);
        debug!(doc_id, size_bytes, "document re-ingested");
        Ok(())
    }

    pub fn remove_document(&mut self, doc_id: DocId) -> Result<(), EngineError> {
        self.docs
            .remove(&doc_id)
            .ok_or(EngineError::UnknownDocument(doc_id))?;
        self.searchable.remove(&doc_id);
        Ok(())
    }

    /// Drive one document to `Searchable` (or `Unprocessable`).
    pub fn index_document(&mut self, doc_id: DocId) -> Result<(), EngineError> {
        let entry = self
            .docs
            .get_mut(&doc_id)
            .ok_or(EngineError::UnknownDocument(doc_id))?;
        if entry.state == DocumentState::Searchable {
            return Ok(());
        }

        let sentences = segment::segment(doc_id, &entry.document.raw_text, &self.cache);
        if sentences.is_empty() {
            entry.state = DocumentState::Unprocessable;
            warn!(doc_id, "no usable sentences, marking unprocessable");
            return Err(EngineError::Unprocessable(doc_id));
        }
        entry.sentences = Some(Arc::clone(&sentences));
        entry.state = DocumentState::Segmented;

        let index =
            build_document_index(&sentences, self.config.language, &self.synonyms, &self.cache);
        entry.state = DocumentState::Indexed;

        let view = SearchableDoc {
            document: Arc::clone(&entry.document),
            sentences,
            index,
        };
        entry.state = DocumentState::Searchable;
        self.searchable.insert(doc_id, view);
        Ok(())
    }

    /// Index every document that is not yet searchable. Per-document work is
    /// independent, so the pass fans out over the worker pool. Unprocessable
    /// documents are skipped, not fatal.
    pub fn index_all(&mut self) {
        let pending: Vec<(DocId, Arc<Document>)> = self
            .docs
            .iter()
            .filter(|(_, e)| e.state != DocumentState::Searchable)
            .map(|(id, e)| (*id, Arc::clone(&e.document)))
            .collect();
        if pending.is_empty() {
            return;
        }

        let cache = &self.cache;
        let synonyms = &self.synonyms;
        let language = self.config.language;
        let built: Vec<(DocId, Arc<Vec<Sentence>>, Option<Arc<DocumentIndex>>)> =
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers())
                .build()
            {
                Ok(pool) => pool.install(|| {
                    pending
                        .par_iter()
                        .map(|(doc_id, document)| {
                            let sentences = segment::segment(*doc_id, &document.raw_text, cache);
                            let index = (!sentences.is_empty()).then(|| {
                                build_document_index(&sentences, language, synonyms, cache)
                            });
                            (*doc_id, sentences, index)
                        })
                        .collect()
                }),
                Err(_) => pending
                    .iter()
                    .map(|(doc_id, document)| {
                        let sentences = segment::segment(*doc_id, &document.raw_text, cache);
                        let index = (!sentences.is_empty())
                            .then(|| build_document_index(&sentences, language, synonyms, cache));
                        (*doc_id, sentences, index)
                    })
                    .collect(),
            };

        for (doc_id, sentences, index) in built {
            let entry = match self.docs.get_mut(&doc_id) {
                Some(e) => e,
                None => continue,
            };
            match index {
                Some(index) => {
                    entry.sentences = Some(Arc::clone(&sentences));
                    entry.state = DocumentState::Searchable;
                    self.searchable.insert(
                        doc_id,
                        SearchableDoc {
                            document: Arc::clone(&entry.document),
                            sentences,
                            index,
                        },
                    );
                }
                None => {
                    entry.state = DocumentState::Unprocessable;
                    warn!(doc_id, "no usable sentences, excluded from retrieval");
                }
            }
        }

        let stats = self.stats();
        info!(
            documents = stats.documents,
            searchable = stats.searchable,
            sentences = stats.sentences,
            "indexing pass complete"
        );
    }

    /// Restore a previously persisted document with its derived data intact.
    pub fn insert_persisted(
        &mut self,
        document: Document,
        sentences: Vec<Sentence>,
        index: DocumentIndex,
    ) {
        let doc_id = document.id;
        self.next_id = self.next_id.max(doc_id + 1);
        let document = Arc::new(document);
        let sentences = Arc::new(sentences);
        let index = Arc::new(index);
        self.docs.insert(
            doc_id,
            DocEntry {
                document: Arc::clone(&document),
                state: DocumentState::Searchable,
                sentences: Some(Arc::clone(&sentences)),
            },
        );
        self.searchable.insert(
            doc_id,
            SearchableDoc {
                document,
                sentences,
                index,
            },
        );
    }

    pub fn document_state(&self, doc_id: DocId) -> Option<DocumentState> {
        self.docs.get(&doc_id).map(|e| e.state)
    }

    /// All documents in id order, whatever their state.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.docs.values().map(|e| e.document.as_ref())
    }

    /// Processed documents visible to retrieval, in id order.
    pub fn searchable_docs(&self) -> impl Iterator<Item = &SearchableDoc> {
        self.searchable.values()
    }

    pub fn searchable(&self, doc_id: DocId) -> Option<&SearchableDoc> {
        self.searchable.get(&doc_id)
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            documents: self.docs.len(),
            searchable: self.searchable.len(),
            unprocessable: self
                .docs
                .values()
                .filter(|e| e.state == DocumentState::Unprocessable)
                .count(),
            sentences: self.searchable.values().map(|d| d.sentences.len()).sum(),
            total_bytes: self.docs.values().map(|e| e.document.size_bytes).sum(),
        }
    }

    /// Run a full query: validate, retrieve with `strategy`, then score and
    /// rank the hits.
    pub fn search(&self, query: &str, strategy: Strategy) -> Result<Vec<RankedResult>, EngineError> {
        self.search_with(query, strategy.resolve())
    }

    pub fn search_with(
        &self,
        query: &str,
        strategy: &dyn SearchStrategy,
    ) -> Result<Vec<RankedResult>, EngineError> {
        let prepared = prepare_query(query, self.config.language, &self.synonyms)?;
        // Exact match works on raw terms; the ranked strategies need at least
        // one content token to score against.
        if prepared.stemmed.is_empty() && strategy.name() != "exact-match" {
            return Err(EngineError::QueryAllStopwords);
        }

        let hits = strategy.search(&prepared, self);
        debug!(strategy = strategy.name(), hits = hits.len(), "retrieval done");
        rank_hits(self, &hits)
    }
}
