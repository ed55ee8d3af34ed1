//! Exact-match retrieval.
//!
//! Single-term queries consult the inverted index; multi-term queries scan
//! for the full phrase or for every term as a whole word. Ties are broken by
//! descending sentence word count, a deliberate preference for context-rich
//! matches rather than a relevance signal.

use crate::corpus::Corpus;
use crate::index::{Sentence, SearchHit};
use crate::search::{cap_hits, PreparedQuery, SearchStrategy};
use regex::RegexBuilder;

pub struct ExactMatch;

impl SearchStrategy for ExactMatch {
    fn name(&self) -> &'static str {
        "exact-match"
    }

    fn search(&self, query: &PreparedQuery, corpus: &Corpus) -> Vec<SearchHit> {
        let cap = corpus.config().per_document_cap;
        let mut hits = Vec::new();

        if query.terms.len() == 1 {
            // postings are keyed by whole raw tokens of the preprocessed
            // text, so a posting hit already is a whole-word match
            let term = &query.terms[0];
            for doc in corpus.searchable_docs() {
                let mut matched: Vec<&Sentence> = Vec::new();
                for &idx in doc.index.postings_for(term) {
                    if let Some(sentence) = doc.sentences.iter().find(|s| s.index == idx) {
                        matched.push(sentence);
                    }
                }
                hits.extend(cap_hits(rank_by_length(matched), cap));
            }
        } else {
            let term_regexes: Vec<_> = query
                .terms
                .iter()
                .filter_map(|t| whole_word_regex(t))
                .collect();
            if term_regexes.len() != query.terms.len() {
                return hits;
            }
            for doc in corpus.searchable_docs() {
                let mut matched: Vec<&Sentence> = Vec::new();
                for sentence in doc.sentences.iter() {
                    let lowered = sentence.text.to_lowercase();
                    let phrase = lowered.contains(&query.lowercase);
                    if phrase || term_regexes.iter().all(|re| re.is_match(&sentence.text)) {
                        matched.push(sentence);
                    }
                }
                hits.extend(cap_hits(rank_by_length(matched), cap));
            }
        }
        hits
    }
}

/// Case-insensitive whole-word matcher for one term.
fn whole_word_regex(term: &str) -> Option<regex::Regex> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(term)))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Longest sentences first; equal lengths keep document order.
fn rank_by_length(matched: Vec<&Sentence>) -> Vec<SearchHit> {
    let mut with_len: Vec<(&Sentence, usize)> = matched
        .into_iter()
        .map(|s| (s, s.text.split_whitespace().count()))
        .collect();
    with_len.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.index.cmp(&b.0.index)));
    with_len
        .into_iter()
        .map(|(s, len)| SearchHit {
            doc_id: s.doc_id,
            sentence_index: s.index,
            raw_score: len as f32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::search::prepare_query;

    fn corpus() -> Corpus {
        let mut c = Corpus::with_defaults();
        c.add_document(
            "pets.txt",
            "The cat sat on the mat. Dogs bark loudly at night. The cat and the dog are friends."
                .to_string(),
        );
        c.index_all();
        c
    }

    fn query(c: &Corpus, q: &str) -> Vec<SearchHit> {
        let prepared = prepare_query(q, c.config().language, c.synonyms()).unwrap();
        ExactMatch.search(&prepared, c)
    }

    #[test]
    fn single_term_matches_whole_words_only() {
        let c = corpus();
        let hits = query(&c, "cat");
        let indices: Vec<u32> = hits.iter().map(|h| h.sentence_index).collect();
        assert_eq!(indices.len(), 2);
        assert!(indices.contains(&1));
        assert!(indices.contains(&3));
    }

    #[test]
    fn longer_sentences_rank_first() {
        let c = corpus();
        let hits = query(&c, "cat");
        // sentence 3 has 7 words, sentence 1 has 6
        assert_eq!(hits[0].sentence_index, 3);
        assert_eq!(hits[1].sentence_index, 1);
    }

    #[test]
    fn no_false_positive_substrings() {
        let mut c = Corpus::with_defaults();
        c.add_document("words.txt", "This category is broad. The cat purred.".to_string());
        c.index_all();
        let hits = query(&c, "cat");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sentence_index, 2);
    }

    #[test]
    fn possessives_match_their_folded_token() {
        // preprocessing strips the apostrophe, so "cat's" is posted as "cats"
        let mut c = Corpus::with_defaults();
        c.add_document("toys.txt", "The cat's toy squeaks. Nothing else here.".to_string());
        c.index_all();
        let hits = query(&c, "cats");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sentence_index, 1);
    }

    #[test]
    fn multi_term_requires_phrase_or_all_terms() {
        let mut c = Corpus::with_defaults();
        c.add_document(
            "mix.txt",
            "The dog chased the cat. Only dogs here. A cat met a dog at dawn.".to_string(),
        );
        c.index_all();
        let hits = query(&c, "cat dog");
        let indices: Vec<u32> = hits.iter().map(|h| h.sentence_index).collect();
        assert!(indices.contains(&1), "both terms as whole words");
        assert!(indices.contains(&3));
        assert!(!indices.contains(&2), "missing term excludes the sentence");
    }

    #[test]
    fn exact_phrase_matches_too() {
        let mut c = Corpus::with_defaults();
        c.add_document("phrase.txt", "They found the lost city. Nothing else here.".to_string());
        c.index_all();
        let hits = query(&c, "lost city");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sentence_index, 1);
    }
}
