//! Ranking core: tokenization, a TF-IDF vector index, a BM25 ranker, literal
//! phrase lookup, and snippet extraction over an in-memory corpus.

pub mod bm25;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod loader;
pub mod phrase;
pub mod query;
pub mod snippet;
pub mod stopwords;
pub mod tokenizer;

pub use config::EngineConfig;
pub use corpus::{Corpus, DocId, Document, DocumentRecord};
pub use engine::{Engine, IndexBundle, SearchResult};
pub use error::{Result, SearchError};
pub use index::{Keyword, VectorIndex};
pub use loader::{DocumentLoader, FolderLoader};
pub use query::{Method, ParsedQuery, QueryRouter, Ranking};
pub use stopwords::StopwordSet;
