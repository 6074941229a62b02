use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docrank_core::{Engine, EngineConfig, FolderLoader, Keyword, Method, QueryRouter, Ranking, SearchResult};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "docrank")]
#[command(about = "Rank a folder of text documents against a query", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where documents come from and how the engine is tuned.
#[derive(Args, Debug, Clone)]
pub struct Source {
    /// Folder holding .txt/.md documents
    #[arg(long, default_value = "./documents")]
    pub docs: PathBuf,
    /// Include documents in subfolders
    #[arg(long, default_value_t = false)]
    pub recursive: bool,
    /// JSON file with engine settings
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// BM25 term frequency saturation
    #[arg(long)]
    pub k1: Option<f32>,
    /// BM25 length normalization
    #[arg(long)]
    pub b: Option<f32>,
    /// Snippet window in characters
    #[arg(long)]
    pub window: Option<usize>,
}

impl Source {
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(k1) = self.k1 { config.k1 = k1; }
        if let Some(b) = self.b { config.b = b; }
        if let Some(window) = self.window { config.snippet_window = window; }
        config.validate()?;
        Ok(config)
    }

    pub fn open(&self) -> Result<Engine> {
        let engine = Engine::new(self.engine_config()?, QueryRouter::default());
        engine
            .refresh(&FolderLoader::new(&self.docs), self.recursive)
            .with_context(|| format!("loading documents from {}", self.docs.display()))?;
        Ok(engine)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the documents; wrap the query in double quotes for an exact phrase
    Search {
        #[command(flatten)]
        source: Source,
        /// vector (tfidf) or probabilistic (bm25)
        #[arg(long, default_value = "vector")]
        method: String,
        /// Number of results
        #[arg(long)]
        k: Option<usize>,
        query: String,
    },
    /// Show the highest weighted terms of one document
    Keywords {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        doc: usize,
        #[arg(long, default_value_t = 12)]
        n: usize,
    },
    /// List loaded documents in id order
    List {
        #[command(flatten)]
        source: Source,
    },
    /// Print the text of one document
    Show {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        doc: usize,
    },
}

#[derive(Serialize)]
pub struct SearchReport {
    pub query: String,
    pub ranking: Ranking,
    pub documents: usize,
    pub generated_at: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Serialize)]
pub struct DocumentEntry {
    pub index: usize,
    pub name: String,
    pub path: PathBuf,
    pub tokens: usize,
}

pub fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    match cli.command {
        Commands::Search { source, method, k, query } => {
            let method: Method = method.parse()?;
            let engine = source.open()?;
            let report = search(&engine, &query, method, k)?;
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        Commands::Keywords { source, doc, n } => {
            let keywords: Vec<Keyword> = source.open()?.top_keywords(doc, n)?;
            serde_json::to_writer_pretty(&mut *out, &keywords)?;
            writeln!(out)?;
        }
        Commands::List { source } => {
            let bundle = source.open()?.snapshot();
            let entries: Vec<DocumentEntry> = bundle
                .corpus()
                .documents()
                .iter()
                .map(|d| DocumentEntry { index: d.id, name: d.name.clone(), path: d.path.clone(), tokens: d.len() })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &entries)?;
            writeln!(out)?;
        }
        Commands::Show { source, doc } => {
            let record = source.open()?.document(doc)?;
            writeln!(out, "{}", record.text)?;
        }
    }
    Ok(())
}

pub fn search(engine: &Engine, query: &str, method: Method, k: Option<usize>) -> Result<SearchReport> {
    let start = Instant::now();
    let k = k.unwrap_or(engine.config().default_top_k);
    let (ranking, results) = engine.search_ranked(query, method, k)?;
    let elapsed = start.elapsed();
    tracing::info!(query, ?ranking, hits = results.len(), took_s = elapsed.as_secs_f64(), "search complete");
    Ok(SearchReport {
        query: query.to_string(),
        ranking,
        documents: engine.snapshot().len(),
        generated_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        took_s: elapsed.as_secs_f64(),
        total_hits: results.len(),
        results,
    })
}
