//! Text normalization and tokenization.
//!
//! NFKC normalization, lowercasing, punctuation stripping, stopword removal,
//! stemming with per-word memoization, lemmatization with deterministic
//! fallback to stemming, and optional synonym expansion. All functions are
//! pure apart from memo population.

use crate::config::{Language, MAX_EXPANSIONS_PER_TOKEN, MIN_SYNONYM_TOKEN_LEN};
use crate::stopwords::is_stopword;
use crate::synonyms::SynonymProvider;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref NON_WORD_RE: Regex = Regex::new(r"(?u)[^\w\s]").expect("valid regex");
    static ref WS_RE: Regex = Regex::new(r"\s+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STEM_MEMO: RwLock<HashMap<String, String>> = RwLock::new(HashMap::new());
}

/// Lowercase, NFKC-normalize, strip punctuation, collapse whitespace.
pub fn preprocess(text: &str) -> String {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&normalized, "");
    WS_RE.replace_all(stripped.trim(), " ").into_owned()
}

/// Word tokens of the preprocessed form of `text`, in order.
pub fn raw_tokens(text: &str) -> Vec<String> {
    let clean = preprocess(text);
    WORD_RE
        .find_iter(&clean)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Drop stopwords for the given language setting.
pub fn remove_stopwords(tokens: &[String], language: Language) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !is_stopword(t, language))
        .cloned()
        .collect()
}

/// Porter-stem a single word, memoized.
pub fn stem(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if let Some(hit) = STEM_MEMO.read().get(word) {
        return hit.clone();
    }
    let stemmed = STEMMER.stem(word).to_string();
    STEM_MEMO.write().insert(word.to_string(), stemmed.clone());
    stemmed
}

/// Lemmatize via the synonym provider's lexicon, falling back to stemming for
/// any word the resource does not know. Deterministic for a fixed resource.
pub fn lemmatize_tokens(tokens: &[String], provider: &SynonymProvider) -> Vec<String> {
    tokens
        .iter()
        .map(|t| provider.lexicon().lemma(t).unwrap_or_else(|| stem(t)))
        .collect()
}

/// Full normalization: raw tokens minus stopwords.
pub fn normalize(text: &str, language: Language) -> Vec<String> {
    remove_stopwords(&raw_tokens(text), language)
}

/// Append up to [`MAX_EXPANSIONS_PER_TOKEN`] synonyms per qualifying token,
/// skipping any already present. The originals always come first.
pub fn expand_with_synonyms(tokens: &[String], provider: &SynonymProvider) -> Vec<String> {
    let mut expanded: Vec<String> = tokens.to_vec();
    for token in tokens {
        if token.chars().count() <= MIN_SYNONYM_TOKEN_LEN {
            continue;
        }
        let mut added = 0;
        for syn in provider.synonyms(token).iter() {
            if added >= MAX_EXPANSIONS_PER_TOKEN {
                break;
            }
            if !expanded.iter().any(|t| t == syn) {
                expanded.push(syn.clone());
                added += 1;
            }
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_strips_punctuation_and_case() {
        assert_eq!(preprocess("The  CAT, sat!"), "the cat sat");
    }

    #[test]
    fn preprocess_applies_nfkc() {
        // fullwidth letters fold to ASCII under NFKC
        assert_eq!(preprocess("ＣＡＴ"), "cat");
    }

    #[test]
    fn raw_tokens_split_on_word_boundaries() {
        assert_eq!(raw_tokens("cats and dogs"), vec!["cats", "and", "dogs"]);
    }

    #[test]
    fn normalize_removes_stopwords() {
        let tokens = normalize("The cat sat on the mat", Language::English);
        assert_eq!(tokens, vec!["cat", "sat", "mat"]);
    }

    #[test]
    fn stemming_reduces_inflections() {
        assert_eq!(stem("running"), "run");
        assert_eq!(stem("runner"), "runner");
    }

    #[test]
    fn lemmatize_falls_back_to_stemming() {
        let provider = SynonymProvider::default();
        let tokens = vec!["running".to_string()];
        assert_eq!(lemmatize_tokens(&tokens, &provider), vec!["run"]);
    }

    #[test]
    fn expansion_caps_and_dedupes() {
        let provider = SynonymProvider::default();
        let tokens = vec!["good".to_string(), "great".to_string()];
        let expanded = expand_with_synonyms(&tokens, &provider);
        // originals first
        assert_eq!(&expanded[..2], &["good", "great"]);
        // "great" is a synonym of "good" but already present
        assert_eq!(
            expanded.iter().filter(|t| t.as_str() == "great").count(),
            1
        );
        // at most 3 added per token
        assert!(expanded.len() <= 2 + 2 * MAX_EXPANSIONS_PER_TOKEN);
    }

    #[test]
    fn short_tokens_are_not_expanded() {
        let provider = SynonymProvider::default();
        let tokens = vec!["at".to_string(), "éé".to_string()];
        assert_eq!(expand_with_synonyms(&tokens, &provider), vec!["at", "éé"]);
    }
}
