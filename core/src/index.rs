//! Data model and the per-document inverted index builder.

use crate::cache::{CacheKey, CachedValue, ContentCache, Op};
use crate::config::Language;
use crate::synonyms::SynonymProvider;
use crate::tokenizer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub type DocId = u32;
/// 1-based, unique per document, insertion order = document order.
pub type SentenceId = u32;

/// An ingested document. Immutable once indexed; re-ingestion under the same
/// id replaces it and invalidates all derived data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub filename: String,
    pub raw_text: String,
    pub size_bytes: u64,
}

/// A sentence owned by exactly one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub doc_id: DocId,
    pub index: SentenceId,
    pub text: String,
}

/// Derived token record for one sentence, rebuilt whenever the sentence
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedTokens {
    /// Stopword-free tokens in sentence order.
    pub tokens: Vec<String>,
    /// Lemmatized (or stemmed) form of `tokens`.
    pub stemmed: Vec<String>,
    /// Whitespace word count of the original sentence text.
    pub word_count: usize,
}

/// Output of a retrieval strategy. Ephemeral.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub sentence_index: SentenceId,
    pub raw_score: f32,
}

/// Per-document inverted index: lowercased raw token → sentence indices.
/// Read-only for the lifetime of one document version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentIndex {
    pub postings: HashMap<String, Vec<SentenceId>>,
    pub processed: HashMap<SentenceId, ProcessedTokens>,
}

impl DocumentIndex {
    /// Sentence indices containing `token` (lowercased raw token).
    pub fn postings_for(&self, token: &str) -> &[SentenceId] {
        self.postings.get(token).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Build the inverted index and processed-token records for one document.
///
/// Postings are keyed by the **raw** (non-stemmed) lowercased token so
/// exact-match semantics survive; `ProcessedTokens.stemmed` carries the
/// normalized form the ranking strategies consume. Insertion is idempotent:
/// a rebuild over identical sentences yields identical postings.
pub fn build_document_index(
    sentences: &[Sentence],
    language: Language,
    provider: &SynonymProvider,
    cache: &ContentCache,
) -> Arc<DocumentIndex> {
    let key = index_cache_key(sentences);
    if let Some(CachedValue::Index(hit)) = cache.get(&key) {
        return hit;
    }

    let mut index = DocumentIndex::default();
    for sentence in sentences {
        let raw = tokenizer::raw_tokens(&sentence.text);
        let tokens = tokenizer::remove_stopwords(&raw, language);
        let stemmed = tokenizer::lemmatize_tokens(&tokens, provider);
        index.processed.insert(
            sentence.index,
            ProcessedTokens {
                tokens,
                stemmed,
                word_count: sentence.text.split_whitespace().count(),
            },
        );

        for token in raw {
            let postings = index.postings.entry(token).or_default();
            if !postings.contains(&sentence.index) {
                postings.push(sentence.index);
            }
        }
    }
    for postings in index.postings.values_mut() {
        postings.sort_unstable();
    }

    let shared = Arc::new(index);
    cache.insert(key, CachedValue::Index(Arc::clone(&shared)));
    shared
}

fn index_cache_key(sentences: &[Sentence]) -> CacheKey {
    let mut parts: Vec<&[u8]> = Vec::with_capacity(sentences.len());
    for s in sentences {
        parts.push(s.text.as_bytes());
    }
    CacheKey::of_parts(Op::IndexBuild, &parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(idx: SentenceId, text: &str) -> Sentence {
        Sentence {
            doc_id: 1,
            index: idx,
            text: text.to_string(),
        }
    }

    fn build(sentences: &[Sentence]) -> Arc<DocumentIndex> {
        build_document_index(
            sentences,
            Language::English,
            &SynonymProvider::default(),
            &ContentCache::with_capacity(64),
        )
    }

    #[test]
    fn postings_use_raw_lowercased_tokens() {
        let idx = build(&[sentence(1, "The Cats sat."), sentence(2, "A cat.")]);
        // raw token "cats" is not stemmed to "cat" in the postings
        assert_eq!(idx.postings_for("cats"), &[1]);
        assert_eq!(idx.postings_for("cat"), &[2]);
    }

    #[test]
    fn postings_are_deduplicated() {
        let idx = build(&[sentence(1, "cat cat cat")]);
        assert_eq!(idx.postings_for("cat"), &[1]);
    }

    #[test]
    fn processed_tokens_are_stopword_free_and_stemmed() {
        let idx = build(&[sentence(1, "The cats are running.")]);
        let p = &idx.processed[&1];
        assert_eq!(p.tokens, vec!["cats", "running"]);
        assert_eq!(p.stemmed, vec!["cat", "run"]);
        assert_eq!(p.word_count, 4);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let sentences = vec![sentence(1, "The cat sat."), sentence(2, "Dogs bark.")];
        let a = build(&sentences);
        let b = build(&sentences);
        assert_eq!(a.postings, b.postings);
        assert_eq!(a.processed, b.processed);
    }

    #[test]
    fn identical_content_hits_the_cache() {
        let cache = ContentCache::with_capacity(64);
        let provider = SynonymProvider::default();
        let sentences = vec![sentence(1, "The cat sat.")];
        let a = build_document_index(&sentences, Language::English, &provider, &cache);
        let b = build_document_index(&sentences, Language::English, &provider, &cache);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
