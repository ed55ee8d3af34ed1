//! On-disk corpus layout and the search-history log.
//!
//! Layout under the index root:
//!   meta.json                 corpus-level metadata
//!   docs/XXXXXXXX.doc.bin     one bincode record per searchable document
//!   history.jsonl             append-only search history
//!
//! Only searchable documents are persisted; anything unprocessable is
//! re-derived from its source on the next ingestion.

use crate::config::Language;
use crate::corpus::{Corpus, SearchableDoc};
use crate::error::EngineError;
use crate::index::{DocId, Document, DocumentIndex, Sentence};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const FORMAT_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
pub struct CorpusMeta {
    pub num_documents: u32,
    /// Stopword language the index was built under. Queries against the
    /// restored corpus must use the same one, or stopword filtering and
    /// stemming diverge from the stored `ProcessedTokens`.
    pub language: Language,
    pub created_at: String,
    pub version: u32,
}

/// One line of the search-history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub keyword: String,
    pub strategy: String,
    pub results_count: usize,
    pub recorded_at: String,
}

pub struct CorpusPaths {
    pub root: PathBuf,
}

impl CorpusPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
    fn meta(&self) -> PathBuf {
        self.root.join("meta.json")
    }
    fn docs_dir(&self) -> PathBuf {
        self.root.join("docs")
    }
    fn doc_file(&self, doc_id: DocId) -> PathBuf {
        self.docs_dir().join(format!("{doc_id:08}.doc.bin"))
    }
    fn history(&self) -> PathBuf {
        self.root.join("history.jsonl")
    }
}

type DocRecord = (Document, Vec<Sentence>, DocumentIndex);

/// Save one document with its derived sentences and index.
pub fn save_document(paths: &CorpusPaths, doc: &SearchableDoc) -> Result<(), EngineError> {
    create_dir_all(paths.docs_dir())?;
    let record: DocRecord = (
        (*doc.document).clone(),
        (*doc.sentences).clone(),
        (*doc.index).clone(),
    );
    let bytes = bincode::serialize(&record)?;
    let mut f = File::create(paths.doc_file(doc.document.id))?;
    f.write_all(&bytes)?;
    Ok(())
}

/// Load one document record by id.
pub fn load_document(paths: &CorpusPaths, doc_id: DocId) -> Result<DocRecord, EngineError> {
    let mut buf = Vec::new();
    File::open(paths.doc_file(doc_id))?.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

/// Save every searchable document plus `meta`. Existing document files are
/// replaced wholesale so a smaller corpus never leaves stale records behind.
pub fn save_corpus(paths: &CorpusPaths, corpus: &Corpus, meta: &CorpusMeta) -> Result<(), EngineError> {
    let dir = paths.docs_dir();
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
    }
    create_dir_all(&dir)?;

    let mut saved = 0u32;
    for doc in corpus.searchable_docs() {
        save_document(paths, doc)?;
        saved += 1;
    }

    save_meta(paths, meta)?;
    info!(documents = saved, root = %paths.root.display(), "corpus saved");
    Ok(())
}

/// Load a saved corpus into `corpus`, restoring derived data as-is. The
/// corpus language is aligned to the one the index was built under.
pub fn load_corpus(paths: &CorpusPaths, corpus: &mut Corpus) -> Result<CorpusMeta, EngineError> {
    let meta = load_meta(paths)?;
    if corpus.config().language != meta.language {
        warn!(
            requested = ?corpus.config().language,
            stored = ?meta.language,
            "corpus was indexed under a different language; using the stored one"
        );
        corpus.set_language(meta.language);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(paths.docs_dir())?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|x| x == "bin").unwrap_or(false))
        .collect();
    files.sort();

    for file in files {
        let mut buf = Vec::new();
        File::open(&file)?.read_to_end(&mut buf)?;
        let (document, sentences, index): DocRecord = bincode::deserialize(&buf)?;
        debug!(doc_id = document.id, file = %file.display(), "document restored");
        corpus.insert_persisted(document, sentences, index);
    }
    Ok(meta)
}

pub fn save_meta(paths: &CorpusPaths, meta: &CorpusMeta) -> Result<(), EngineError> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta)?;
    let mut f = File::create(paths.meta())?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &CorpusPaths) -> Result<CorpusMeta, EngineError> {
    let mut buf = String::new();
    File::open(paths.meta())?.read_to_string(&mut buf)?;
    let meta: CorpusMeta = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Append one history line. Creates the log on first use.
pub fn record_search(paths: &CorpusPaths, entry: &HistoryEntry) -> Result<(), EngineError> {
    create_dir_all(&paths.root)?;
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths.history())?;
    let line = serde_json::to_string(entry)?;
    writeln!(f, "{line}")?;
    Ok(())
}

/// The most recent `limit` history entries, newest first. A missing log is
/// an empty history, not an error.
pub fn recent_history(paths: &CorpusPaths, limit: usize) -> Result<Vec<HistoryEntry>, EngineError> {
    let file = match File::open(paths.history()) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut entries: Vec<HistoryEntry> = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // A torn final line from a crashed writer is skipped, not fatal.
        if let Ok(entry) = serde_json::from_str::<HistoryEntry>(&line) {
            entries.push(entry);
        }
    }
    entries.reverse();
    entries.truncate(limit);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScoringPolicy, SearchConfig};
    use crate::search::Strategy;
    use tempfile::TempDir;

    fn meta() -> CorpusMeta {
        CorpusMeta {
            num_documents: 1,
            language: Language::default(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            version: FORMAT_VERSION,
        }
    }

    #[test]
    fn corpus_survives_a_save_load_cycle() {
        let dir = TempDir::new().unwrap();
        let paths = CorpusPaths::new(dir.path());

        let mut original = Corpus::with_defaults();
        original.add_document(
            "facts.txt",
            "The cat sat on the mat. Dogs play in the yard. A cat chased the mouse.".to_string(),
        );
        original.index_all();
        save_corpus(&paths, &original, &meta()).unwrap();

        let mut restored = Corpus::with_defaults();
        let loaded_meta = load_corpus(&paths, &mut restored).unwrap();
        assert_eq!(loaded_meta.version, FORMAT_VERSION);
        assert_eq!(restored.stats().searchable, 1);
        assert_eq!(restored.stats().sentences, 3);

        let before = original.search("cat", Strategy::ExactMatch).unwrap();
        let after = restored.search("cat", Strategy::ExactMatch).unwrap();
        assert_eq!(before.len(), after.len());
        assert_eq!(before[0].sentence_text, after[0].sentence_text);
    }

    #[test]
    fn reload_keeps_the_indexing_language() {
        let dir = TempDir::new().unwrap();
        let paths = CorpusPaths::new(dir.path());

        // "besar" is an Indonesian stopword, invisible under the Combined
        // default but a real term under English-only filtering
        let config = SearchConfig {
            language: Language::English,
            ..SearchConfig::default()
        };
        let mut original = Corpus::new(config, ScoringPolicy::default());
        original.add_document(
            "kota.txt",
            "Kota besar itu ramai. Pasar besar buka pagi.".to_string(),
        );
        original.index_all();
        let before = original.search("besar", Strategy::Bm25).unwrap();
        assert!(!before.is_empty());

        let meta = CorpusMeta {
            language: Language::English,
            ..meta()
        };
        save_corpus(&paths, &original, &meta).unwrap();

        let mut restored = Corpus::with_defaults();
        let loaded = load_corpus(&paths, &mut restored).unwrap();
        assert_eq!(loaded.language, Language::English);
        assert_eq!(restored.config().language, Language::English);

        let after = restored.search("besar", Strategy::Bm25).unwrap();
        assert_eq!(before.len(), after.len());
        assert_eq!(before[0].sentence_text, after[0].sentence_text);
    }

    #[test]
    fn single_document_loads_by_id() {
        let dir = TempDir::new().unwrap();
        let paths = CorpusPaths::new(dir.path());
        let mut c = Corpus::with_defaults();
        let id = c.add_document("solo.txt", "A single sentence lives here.".to_string());
        c.index_all();
        save_corpus(&paths, &c, &meta()).unwrap();

        let (document, sentences, index) = load_document(&paths, id).unwrap();
        assert_eq!(document.filename, "solo.txt");
        assert_eq!(sentences.len(), 1);
        assert!(!index.postings.is_empty());
    }

    #[test]
    fn resave_drops_removed_documents() {
        let dir = TempDir::new().unwrap();
        let paths = CorpusPaths::new(dir.path());

        let mut c = Corpus::with_defaults();
        let a = c.add_document("a.txt", "Alpha sentence here.".to_string());
        c.add_document("b.txt", "Beta sentence here.".to_string());
        c.index_all();
        save_corpus(&paths, &c, &meta()).unwrap();

        c.remove_document(a).unwrap();
        save_corpus(&paths, &c, &meta()).unwrap();

        let mut restored = Corpus::with_defaults();
        load_corpus(&paths, &mut restored).unwrap();
        assert_eq!(restored.stats().documents, 1);
    }

    #[test]
    fn history_appends_and_reads_newest_first() {
        let dir = TempDir::new().unwrap();
        let paths = CorpusPaths::new(dir.path());

        for (i, keyword) in ["first", "second", "third"].iter().enumerate() {
            record_search(
                &paths,
                &HistoryEntry {
                    keyword: keyword.to_string(),
                    strategy: "bm25".to_string(),
                    results_count: i,
                    recorded_at: format!("2024-01-0{}T00:00:00Z", i + 1),
                },
            )
            .unwrap();
        }

        let recent = recent_history(&paths, 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].keyword, "third");
        assert_eq!(recent[1].keyword, "second");
    }

    #[test]
    fn missing_history_is_empty() {
        let dir = TempDir::new().unwrap();
        let paths = CorpusPaths::new(dir.path());
        assert!(recent_history(&paths, 10).unwrap().is_empty());
    }

    #[test]
    fn loading_without_meta_fails() {
        let dir = TempDir::new().unwrap();
        let paths = CorpusPaths::new(dir.path());
        let mut c = Corpus::with_defaults();
        assert!(matches!(
            load_corpus(&paths, &mut c),
            Err(EngineError::Io(_))
        ));
    }
}
