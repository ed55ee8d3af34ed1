use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sentra_core::persist::{
    load_corpus, load_meta, recent_history, record_search, save_corpus, CorpusMeta, CorpusPaths,
    HistoryEntry, FORMAT_VERSION,
};
use sentra_core::{Corpus, Language, ScoringPolicy, SearchConfig, Strategy};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sentra")]
#[command(about = "Sentence-level document search and scoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest text files and build a searchable corpus
    Index {
        /// Input path (file or directory of .txt/.md files)
        #[arg(long)]
        input: String,
        /// Output corpus directory
        #[arg(long, default_value = "./corpus")]
        output: String,
        /// Stopword language
        #[arg(long, value_enum, default_value_t = LangArg::Combined)]
        language: LangArg,
    },
    /// Search a corpus and print ranked sentences
    Search {
        /// The query
        query: String,
        /// Corpus directory
        #[arg(long, default_value = "./corpus")]
        corpus: String,
        /// Retrieval strategy
        #[arg(long, value_enum, default_value_t = StrategyArg::Bm25)]
        strategy: StrategyArg,
        /// Number of results
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        /// Stopword language; the corpus's indexing language always wins
        #[arg(long, value_enum)]
        language: Option<LangArg>,
        /// Use the presentation-tuned scoring policy
        #[arg(long, default_value_t = false)]
        tuned: bool,
        /// Emit results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print corpus statistics
    Stats {
        /// Corpus directory
        #[arg(long, default_value = "./corpus")]
        corpus: String,
    },
    /// Show recent searches
    History {
        /// Corpus directory
        #[arg(long, default_value = "./corpus")]
        corpus: String,
        /// Number of entries
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LangArg {
    English,
    Indonesian,
    Combined,
}

impl From<LangArg> for Language {
    fn from(l: LangArg) -> Self {
        match l {
            LangArg::English => Language::English,
            LangArg::Indonesian => Language::Indonesian,
            LangArg::Combined => Language::Combined,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Exact,
    Bm25,
    Tfidf,
    Vector,
}

impl From<StrategyArg> for Strategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::Exact => Strategy::ExactMatch,
            StrategyArg::Bm25 => Strategy::Bm25,
            StrategyArg::Tfidf => Strategy::TfIdf,
            StrategyArg::Vector => Strategy::VectorSpace,
        }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            input,
            output,
            language,
        } => build_corpus(&input, &output, language.into()),
        Commands::Search {
            query,
            corpus,
            strategy,
            top_k,
            language,
            tuned,
            json,
        } => run_search(&query, &corpus, strategy, top_k, language, tuned, json),
        Commands::Stats { corpus } => show_stats(&corpus),
        Commands::History { corpus, limit } => show_history(&corpus, limit),
    }
}

fn build_corpus(input: &str, output: &str, language: Language) -> Result<()> {
    let files = collect_text_files(Path::new(input))?;
    anyhow::ensure!(!files.is_empty(), "no .txt or .md files under {input}");

    let config = SearchConfig {
        language,
        ..SearchConfig::default()
    };
    let mut corpus = Corpus::new(config, ScoringPolicy::default());
    for file in &files {
        let text = fs::read_to_string(file)
            .with_context(|| format!("reading {}", file.display()))?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        corpus.add_document(&name, text);
    }
    corpus.index_all();

    let stats = corpus.stats();
    let meta = CorpusMeta {
        num_documents: stats.searchable as u32,
        language,
        created_at: now_rfc3339(),
        version: FORMAT_VERSION,
    };
    let paths = CorpusPaths::new(output);
    save_corpus(&paths, &corpus, &meta)?;
    tracing::info!(files = files.len(), output, "corpus written");

    println!(
        "indexed {} document(s), {} sentence(s) -> {output}",
        stats.searchable, stats.sentences
    );
    if stats.unprocessable > 0 {
        println!("skipped {} unprocessable document(s)", stats.unprocessable);
    }
    Ok(())
}

fn run_search(
    query: &str,
    corpus_dir: &str,
    strategy: StrategyArg,
    top_k: usize,
    language: Option<LangArg>,
    tuned: bool,
    json: bool,
) -> Result<()> {
    let paths = CorpusPaths::new(corpus_dir);
    let meta = load_meta(&paths).with_context(|| format!("loading corpus {corpus_dir}"))?;
    if let Some(flag) = language {
        let requested: Language = flag.into();
        if requested != meta.language {
            tracing::warn!(
                ?requested,
                stored = ?meta.language,
                "--language ignored; queries use the language the corpus was indexed under"
            );
        }
    }
    let config = SearchConfig {
        language: meta.language,
        top_k,
        ..SearchConfig::default()
    };
    let policy = if tuned {
        ScoringPolicy::tuned()
    } else {
        ScoringPolicy::default()
    };
    let mut corpus = Corpus::new(config, policy);
    load_corpus(&paths, &mut corpus).with_context(|| format!("loading corpus {corpus_dir}"))?;

    let strategy: Strategy = strategy.into();
    let results = corpus.search(query, strategy)?;

    record_search(
        &paths,
        &HistoryEntry {
            keyword: query.to_string(),
            strategy: strategy.name().to_string(),
            results_count: results.len(),
            recorded_at: now_rfc3339(),
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("no results for \"{query}\"");
        return Ok(());
    }
    for (rank, r) in results.iter().enumerate() {
        let (p, rec, f) = r.metrics.rouge.as_percentages();
        println!("{}. [doc {} / sentence {}]", rank + 1, r.doc_id, r.sentence_index);
        println!("   {}", r.sentence_text.trim());
        println!(
            "   combined {:.1}%  rouge-l P {p:.1}% R {rec:.1}% F {f:.1}%  meteor {:.1}%",
            r.combined * 100.0,
            r.metrics.meteor.score * 100.0
        );
        if let Some(reference) = &r.explanation.comparison_sentence {
            println!("   vs: {}", reference.trim());
        }
        if r.explanation.self_evaluation {
            println!("   (scored against a synthetic reference of itself)");
        }
        if let Some(reason) = &r.explanation.degraded {
            println!("   (degraded: {reason})");
        }
    }
    Ok(())
}

fn show_stats(corpus_dir: &str) -> Result<()> {
    let paths = CorpusPaths::new(corpus_dir);
    let meta = load_meta(&paths).with_context(|| format!("loading corpus {corpus_dir}"))?;
    let mut corpus = Corpus::with_defaults();
    load_corpus(&paths, &mut corpus)?;
    let stats = corpus.stats();

    println!("corpus:      {corpus_dir}");
    println!("created at:  {}", meta.created_at);
    println!("language:    {:?}", meta.language);
    println!("format:      v{}", meta.version);
    println!("documents:   {}", stats.documents);
    println!("sentences:   {}", stats.sentences);
    println!("total bytes: {}", stats.total_bytes);
    Ok(())
}

fn show_history(corpus_dir: &str, limit: usize) -> Result<()> {
    let paths = CorpusPaths::new(corpus_dir);
    let entries = recent_history(&paths, limit)?;
    if entries.is_empty() {
        println!("no search history");
        return Ok(());
    }
    for e in entries {
        println!(
            "{}  {:<12} {:>3} result(s)  \"{}\"",
            e.recorded_at, e.strategy, e.results_count, e.keyword
        );
    }
    Ok(())
}

fn collect_text_files(input: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if input.is_file() {
        files.push(input.to_path_buf());
        return Ok(files);
    }
    for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        let is_text = p
            .extension()
            .map(|x| x == "txt" || x == "md")
            .unwrap_or(false);
        if p.is_file() && is_text {
            files.push(p.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::new())
}
