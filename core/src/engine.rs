//! The searchable bundle and the engine that publishes it.
//!
//! A bundle is built completely before it replaces the live one; queries
//! clone the `Arc` under a short read lock and then run without any lock, so a
//! query sees exactly one generation from start to finish.

use crate::bm25::Bm25Ranker;
use crate::config::EngineConfig;
use crate::corpus::{Corpus, DocId, Document, DocumentRecord};
use crate::error::{Result, SearchError};
use crate::index::{Keyword, VectorIndex};
use crate::loader::DocumentLoader;
use crate::phrase::PhraseMatcher;
use crate::query::{rank, Method, ParsedQuery, QueryRouter, Ranking};
use crate::snippet::{MatchTarget, SnippetExtractor};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub index: DocId,
    pub name: String,
    pub path: PathBuf,
    /// Rounded to 4 decimal places.
    pub score: f32,
    pub snippet: String,
    /// Present only for literal-phrase results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_count: Option<usize>,
}

/// Corpus plus every index derived from it. Immutable once built.
#[derive(Debug, Default)]
pub struct IndexBundle {
    generation: u64,
    corpus: Corpus,
    vector: VectorIndex,
    bm25: Bm25Ranker,
    phrase: PhraseMatcher,
}

impl IndexBundle {
    pub fn build(records: Vec<DocumentRecord>, config: &EngineConfig, generation: u64) -> Self {
        let corpus = Corpus::build(records);
        let vector = VectorIndex::build(&corpus, config.max_features);
        let bm25 = Bm25Ranker::build(&corpus, config.k1, config.b);
        let phrase = PhraseMatcher::build(&corpus);
        tracing::info!(
            generation,
            num_docs = corpus.len(),
            num_terms = corpus.vocabulary_size(),
            features = vector.vocabulary_size(),
            "index build complete"
        );
        Self { generation, corpus, vector, bm25, phrase }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn vector(&self) -> &VectorIndex {
        &self.vector
    }

    pub fn bm25(&self) -> &Bm25Ranker {
        &self.bm25
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn document(&self, id: DocId) -> Result<&Document> {
        self.corpus
            .get(id)
            .ok_or(SearchError::DocumentOutOfRange { id, count: self.corpus.len() })
    }

    pub fn top_keywords(&self, id: DocId, n: usize) -> Result<Vec<Keyword>> {
        self.vector.top_keywords(id, n)
    }
}

pub struct Engine {
    config: EngineConfig,
    router: QueryRouter,
    snippets: SnippetExtractor,
    current: RwLock<Arc<IndexBundle>>,
    /// Serializes rebuilds; never taken by queries.
    rebuild: Mutex<()>,
}

impl Engine {
    /// An engine over an empty corpus; every search returns nothing until `load` or `refresh`.
    pub fn new(config: EngineConfig, router: QueryRouter) -> Self {
        let snippets = SnippetExtractor::from_config(&config);
        Self {
            config,
            router,
            snippets,
            current: RwLock::new(Arc::new(IndexBundle::default())),
            rebuild: Mutex::new(()),
        }
    }

    pub fn with_documents(config: EngineConfig, records: Vec<DocumentRecord>) -> Self {
        let engine = Self::new(config, QueryRouter::default());
        engine.load(records);
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The live bundle. Holding it keeps that generation alive across refreshes.
    pub fn snapshot(&self) -> Arc<IndexBundle> {
        self.current.read().clone()
    }

    /// Build a bundle from in-memory records and publish it.
    pub fn load(&self, records: Vec<DocumentRecord>) -> Arc<IndexBundle> {
        let _guard = self.rebuild.lock();
        self.publish(records)
    }

    /// Reload through `loader` and swap in the result; on failure the current bundle stays live.
    ///
    /// The rebuild lock covers the load too, so overlapping refreshes publish
    /// in the order they started.
    pub fn refresh(&self, loader: &dyn DocumentLoader, recursive: bool) -> Result<Arc<IndexBundle>> {
        let _guard = self.rebuild.lock();
        match loader.load(recursive) {
            Ok(records) => Ok(self.publish(records)),
            Err(err) => {
                tracing::warn!(error = %err, generation = self.snapshot().generation, "refresh failed; keeping current index");
                Err(err)
            }
        }
    }

    /// Callers hold `rebuild`.
    fn publish(&self, records: Vec<DocumentRecord>) -> Arc<IndexBundle> {
        let generation = self.snapshot().generation + 1;
        let bundle = Arc::new(IndexBundle::build(records, &self.config, generation));
        *self.current.write() = bundle.clone();
        bundle
    }

    pub fn search(&self, query: &str, method: Method, top_k: usize) -> Result<Vec<SearchResult>> {
        self.search_ranked(query, method, top_k).map(|(_, results)| results)
    }

    /// Like `search`, also reporting which ranking the query was routed to.
    pub fn search_ranked(&self, query: &str, method: Method, top_k: usize) -> Result<(Ranking, Vec<SearchResult>)> {
        let bundle = self.snapshot();
        let parsed = self.router.parse(query);
        let ranking = parsed.ranking(method);
        let results = match &parsed {
            ParsedQuery::Empty => Vec::new(),
            ParsedQuery::Phrase(phrase) => self.phrase_results(&bundle, phrase, top_k)?,
            ParsedQuery::Terms(tokens) => {
                let scores = match ranking {
                    Ranking::Probabilistic => bundle.bm25.score(tokens),
                    _ => bundle.vector.score(tokens),
                };
                rank(&scores, top_k)
                    .into_iter()
                    .map(|(id, score)| self.result(&bundle, id, score, MatchTarget::Terms(tokens), None))
                    .collect::<Result<Vec<_>>>()?
            }
        };
        tracing::debug!(?ranking, generation = bundle.generation, hits = results.len(), "search");
        Ok((ranking, results))
    }

    /// Parse `method` by name first; unknown names are an error rather than a default.
    pub fn search_with(&self, query: &str, method: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        self.search(query, method.parse()?, top_k)
    }

    pub fn top_keywords(&self, id: DocId, n: usize) -> Result<Vec<Keyword>> {
        self.snapshot().top_keywords(id, n)
    }

    pub fn document(&self, id: DocId) -> Result<DocumentRecord> {
        let bundle = self.snapshot();
        let doc = bundle.document(id)?;
        Ok(DocumentRecord { name: doc.name.clone(), path: doc.path.clone(), text: doc.text.clone() })
    }

    fn phrase_results(&self, bundle: &IndexBundle, phrase: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        bundle
            .phrase
            .search_exact_phrase(phrase, top_k)
            .into_iter()
            .map(|m| self.result(bundle, m.doc_id, m.score, MatchTarget::Phrase(phrase), Some(m.occurrences)))
            .collect()
    }

    fn result(
        &self,
        bundle: &IndexBundle,
        id: DocId,
        score: f32,
        target: MatchTarget<'_>,
        occurrence_count: Option<usize>,
    ) -> Result<SearchResult> {
        let doc = bundle.document(id)?;
        Ok(SearchResult {
            index: id,
            name: doc.name.clone(),
            path: doc.path.clone(),
            score: round4(score),
            snippet: self.snippets.extract(&doc.text, target)?,
            occurrence_count,
        })
    }
}

fn round4(score: f32) -> f32 {
    ((score as f64 * 10_000.0).round() / 10_000.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(texts: &[&str]) -> Vec<DocumentRecord> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| DocumentRecord::new(format!("doc{i}.txt"), format!("/docs/doc{i}.txt"), *t))
            .collect()
    }

    #[test]
    fn rounding() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(1.0), 1.0);
    }

    #[test]
    fn empty_engine_returns_nothing() {
        let engine = Engine::new(EngineConfig::default(), QueryRouter::default());
        assert!(engine.search("anything", Method::Vector, 10).unwrap().is_empty());
        assert!(engine.search("\"anything\"", Method::Vector, 10).unwrap().is_empty());
        assert!(matches!(engine.top_keywords(0, 5), Err(SearchError::DocumentOutOfRange { id: 0, count: 0 })));
    }

    #[test]
    fn generations_increase() {
        let engine = Engine::new(EngineConfig::default(), QueryRouter::default());
        assert_eq!(engine.snapshot().generation(), 0);
        engine.load(records(&["one two"]));
        engine.load(records(&["three four"]));
        assert_eq!(engine.snapshot().generation(), 2);
    }

    #[test]
    fn old_snapshot_survives_swap() {
        let engine = Engine::with_documents(EngineConfig::default(), records(&["first corpus text"]));
        let old = engine.snapshot();
        engine.load(records(&["second corpus", "with two documents"]));
        assert_eq!(old.len(), 1);
        assert_eq!(engine.snapshot().len(), 2);
    }

    #[test]
    fn search_reports_ranking_used() {
        let engine = Engine::with_documents(EngineConfig::default(), records(&["the quick brown fox"]));
        let (ranking, hits) = engine.search_ranked("fox", Method::Probabilistic, 10).unwrap();
        assert_eq!(ranking, Ranking::Probabilistic);
        assert_eq!(hits.len(), 1);
        let (ranking, hits) = engine.search_ranked("\"brown fox\"", Method::Probabilistic, 10).unwrap();
        assert_eq!(ranking, Ranking::Phrase);
        assert_eq!(hits[0].occurrence_count, Some(1));
    }

    #[test]
    fn custom_stopwords_are_used() {
        let engine = Engine::new(EngineConfig::default(), QueryRouter::new(crate::StopwordSet::new(["fox"])));
        engine.load(records(&["the quick brown fox", "the lazy dog sleeps"]));
        // "fox" is filtered, leaving "the", which is in both documents.
        let hits = engine.search("the fox", Method::Vector, 10).unwrap();
        assert_eq!(hits.len(), 2);
    }
}
