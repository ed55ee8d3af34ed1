//! Synonym lookup: curated bilingual dictionary plus an optional lexical
//! resource, memoized per word.
//!
//! The lexical resource is behind the [`Lexicon`] trait and is allowed to be
//! absent or empty; the engine never fails because of it.

use crate::config::{MAX_RELATED_SYNSETS, MAX_SYNONYMS_PER_WORD, MIN_SYNONYM_TOKEN_LEN};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One sense of a word as reported by the lexical resource.
#[derive(Debug, Clone, Default)]
pub struct Synset {
    pub lemmas: Vec<String>,
    pub hypernyms: Vec<String>,
    pub hyponyms: Vec<String>,
}

/// Interface the engine needs from a lexical resource. Implementations must
/// tolerate unknown words by returning an empty result.
pub trait Lexicon: Send + Sync {
    fn synsets(&self, word: &str) -> Vec<Synset>;

    /// Base form of a word, if the resource knows one. `None` makes the
    /// tokenizer fall back to stemming.
    fn lemma(&self, _word: &str) -> Option<String> {
        None
    }
}

/// The always-available lexicon: knows nothing.
#[derive(Debug, Default)]
pub struct NullLexicon;

impl Lexicon for NullLexicon {
    fn synsets(&self, _word: &str) -> Vec<Synset> {
        Vec::new()
    }
}

lazy_static! {
    static ref CURATED: HashMap<&'static str, &'static [&'static str]> = {
        let entries: &[(&str, &[&str])] = &[
            ("good", &["great", "excellent", "fine", "nice", "positive", "wonderful"]),
            ("bad", &["poor", "terrible", "awful", "negative", "horrible", "inferior"]),
            ("big", &["large", "huge", "enormous", "massive", "substantial", "major"]),
            ("small", &["little", "tiny", "slight", "minor", "compact", "minimal"]),
            ("happy", &["glad", "pleased", "delighted", "content", "joyful", "cheerful"]),
            ("sad", &["unhappy", "depressed", "gloomy", "sorrowful", "miserable"]),
            ("important", &["significant", "crucial", "essential", "vital", "key", "critical"]),
            ("fast", &["quick", "rapid", "swift", "speedy", "prompt", "brisk"]),
            ("slow", &["gradual", "unhurried", "leisurely", "sluggish", "tardy"]),
            ("beautiful", &["pretty", "attractive", "lovely", "gorgeous", "stunning", "elegant"]),
            ("difficult", &["hard", "challenging", "tough", "complicated", "complex", "demanding"]),
            ("easy", &["simple", "straightforward", "effortless", "basic", "elementary"]),
            ("interesting", &["engaging", "fascinating", "intriguing", "compelling", "captivating"]),
            ("smart", &["intelligent", "clever", "bright", "brilliant", "wise", "sharp"]),
            ("strong", &["powerful", "mighty", "robust", "sturdy", "tough", "potent"]),
            ("weak", &["feeble", "frail", "fragile", "delicate", "powerless", "faint"]),
            ("old", &["ancient", "aged", "elderly", "vintage", "archaic", "traditional"]),
            ("new", &["fresh", "recent", "modern", "current", "novel", "latest"]),
            ("true", &["accurate", "correct", "factual", "valid", "genuine", "authentic"]),
            ("false", &["incorrect", "untrue", "wrong", "invalid", "fake", "erroneous"]),
            ("increase", &["rise", "growth", "gain", "expansion", "boost", "increment"]),
            ("decrease", &["reduction", "decline", "drop", "fall", "cutback", "contraction"]),
            ("create", &["make", "build", "develop", "generate", "produce", "construct"]),
            ("help", &["assist", "aid", "support", "facilitate", "benefit", "serve"]),
            ("begin", &["start", "commence", "initiate", "launch", "originate", "introduce"]),
            ("end", &["finish", "conclude", "terminate", "complete", "cease", "close"]),
            // Indonesian entries
            ("baik", &["bagus", "hebat", "keren", "mantap", "unggul"]),
            ("buruk", &["jelek", "parah", "payah", "rusak", "gagal"]),
            ("besar", &["luas", "raya", "agung", "raksasa", "gede"]),
            ("kecil", &["mungil", "mini", "sedikit", "minim", "cilik"]),
            ("senang", &["gembira", "bahagia", "ceria", "riang", "puas"]),
            ("sedih", &["murung", "pilu", "duka", "susah", "muram"]),
            ("penting", &["krusial", "vital", "utama", "pokok", "kunci"]),
            ("cepat", &["kilat", "gesit", "tangkas", "lekas", "segera"]),
            ("lambat", &["pelan", "perlahan", "lamban", "lelet"]),
            ("cantik", &["indah", "elok", "molek", "rupawan", "menawan"]),
            ("sulit", &["rumit", "susah", "kompleks", "berat", "sukar"]),
            ("mudah", &["gampang", "enteng", "ringan", "praktis", "sederhana"]),
            ("pintar", &["cerdas", "pandai", "cemerlang", "brilian", "jenius"]),
            ("kuat", &["tangguh", "kokoh", "solid", "teguh", "perkasa"]),
            ("benar", &["betul", "tepat", "jitu", "akurat", "valid"]),
            ("salah", &["keliru", "sesat", "menyimpang", "khilaf"]),
        ];
        entries.iter().copied().collect()
    };
}

/// Combined curated-dictionary + lexicon synonym source with a per-word memo.
pub struct SynonymProvider {
    lexicon: Arc<dyn Lexicon>,
    memo: RwLock<HashMap<String, Arc<[String]>>>,
}

impl SynonymProvider {
    pub fn new(lexicon: Arc<dyn Lexicon>) -> Self {
        Self {
            lexicon,
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// Synonyms of a lowercased word, capped at
    /// [`MAX_SYNONYMS_PER_WORD`]. Order is deterministic: curated entries
    /// first, then lexicon lemmas, hypernyms, hyponyms in resource order.
    pub fn synonyms(&self, word: &str) -> Arc<[String]> {
        if word.chars().count() <= MIN_SYNONYM_TOKEN_LEN {
            return Arc::from(Vec::new());
        }
        if let Some(hit) = self.memo.read().get(word) {
            return Arc::clone(hit);
        }

        let mut out: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(word.to_string());

        let mut push = |candidate: &str, out: &mut Vec<String>, seen: &mut HashSet<String>| {
            if out.len() >= MAX_SYNONYMS_PER_WORD {
                return;
            }
            let lowered = candidate.to_lowercase();
            // Skip compound lemmas; token-level matching cannot use them.
            if lowered.contains(['_', ' ']) || lowered.is_empty() {
                return;
            }
            if seen.insert(lowered.clone()) {
                out.push(lowered);
            }
        };

        if let Some(curated) = CURATED.get(word) {
            for syn in curated.iter() {
                push(syn, &mut out, &mut seen);
            }
        }

        for synset in self.lexicon.synsets(word) {
            for lemma in &synset.lemmas {
                push(lemma, &mut out, &mut seen);
            }
            for related in synset
                .hypernyms
                .iter()
                .take(MAX_RELATED_SYNSETS)
                .chain(synset.hyponyms.iter().take(MAX_RELATED_SYNSETS))
            {
                push(related, &mut out, &mut seen);
            }
        }

        let shared: Arc<[String]> = Arc::from(out);
        self.memo
            .write()
            .insert(word.to_string(), Arc::clone(&shared));
        shared
    }

    /// Whether `candidate` is a known synonym of `word`.
    pub fn is_synonym(&self, word: &str, candidate: &str) -> bool {
        self.synonyms(word).iter().any(|s| s == candidate)
    }

    pub fn lexicon(&self) -> &dyn Lexicon {
        self.lexicon.as_ref()
    }
}

impl Default for SynonymProvider {
    fn default() -> Self {
        Self::new(Arc::new(NullLexicon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ToyLexicon;

    impl Lexicon for ToyLexicon {
        fn synsets(&self, word: &str) -> Vec<Synset> {
            if word == "cat" || word == "éé" {
                vec![Synset {
                    lemmas: vec!["feline".into(), "cat".into(), "big_cat".into()],
                    hypernyms: vec!["animal".into(), "mammal".into(), "vertebrate".into()],
                    hyponyms: vec!["kitten".into()],
                }]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn short_words_have_no_synonyms() {
        let p = SynonymProvider::default();
        assert!(p.synonyms("at").is_empty());
    }

    #[test]
    fn length_gate_counts_chars_not_bytes() {
        // "éé" is two chars (four bytes); gated exactly like "at"
        let p = SynonymProvider::new(Arc::new(ToyLexicon));
        assert!(p.synonyms("éé").is_empty());
    }

    #[test]
    fn curated_entries_come_first() {
        let p = SynonymProvider::default();
        let syns = p.synonyms("good");
        assert_eq!(syns.first().map(String::as_str), Some("great"));
        assert!(syns.len() <= MAX_SYNONYMS_PER_WORD);
    }

    #[test]
    fn lexicon_lemmas_skip_self_and_compounds() {
        let p = SynonymProvider::new(Arc::new(ToyLexicon));
        let syns = p.synonyms("cat");
        assert!(syns.iter().any(|s| s == "feline"));
        assert!(syns.iter().any(|s| s == "kitten"));
        assert!(!syns.iter().any(|s| s == "cat"));
        assert!(!syns.iter().any(|s| s == "big_cat"));
        // only the first two hypernyms are traversed
        assert!(!syns.iter().any(|s| s == "vertebrate"));
    }

    #[test]
    fn lookup_is_memoized() {
        let p = SynonymProvider::default();
        let a = p.synonyms("good");
        let b = p.synonyms("good");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn absent_lexicon_is_tolerated() {
        let p = SynonymProvider::default();
        assert!(p.synonyms("zzzxqy").is_empty());
    }
}
