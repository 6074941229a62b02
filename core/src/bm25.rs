//! Probabilistic (BM25 Okapi) ranking.

use crate::corpus::{Corpus, DocId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermPosting {
    pub doc_id: DocId,
    pub term_frequency: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Bm25Ranker {
    /// term -> postings, sorted by doc_id
    postings: HashMap<String, Vec<TermPosting>>,
    doc_lengths: Vec<u32>,
    avgdl: f32,
    k1: f32,
    b: f32,
}

impl Bm25Ranker {
    pub fn build(corpus: &Corpus, k1: f32, b: f32) -> Self {
        let mut postings: HashMap<String, Vec<TermPosting>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(corpus.len());
        for doc in corpus.documents() {
            doc_lengths.push(doc.len() as u32);
            for (term, tf) in doc.term_counts() {
                postings
                    .entry(term.to_string())
                    .or_default()
                    .push(TermPosting { doc_id: doc.id, term_frequency: tf });
            }
        }
        Self { postings, doc_lengths, avgdl: corpus.average_length(), k1, b }
    }

    pub fn num_docs(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn average_doc_length(&self) -> f32 {
        self.avgdl
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    /// `ln((N - df + 0.5) / (df + 0.5) + 1)`; always positive, defined for unseen terms.
    pub fn idf(&self, term: &str) -> f32 {
        let n = self.num_docs() as f32;
        let df = self.document_frequency(term) as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// BM25 score of every document, indexed by document id. Repeated query terms count once.
    pub fn score(&self, query_tokens: &[String]) -> Vec<f32> {
        let mut scores = vec![0.0f32; self.num_docs()];
        let mut seen: HashSet<&str> = HashSet::new();

        for term in query_tokens {
            if !seen.insert(term.as_str()) {
                continue;
            }
            let Some(postings) = self.postings.get(term) else { continue };
            let idf = self.idf(term);
            for posting in postings {
                let tf = posting.term_frequency as f32;
                let dl = self.doc_lengths[posting.doc_id] as f32;
                let length_ratio = if self.avgdl > 0.0 { dl / self.avgdl } else { 0.0 };
                let denom = tf + self.k1 * (1.0 - self.b + self.b * length_ratio);
                scores[posting.doc_id] += idf * tf * (self.k1 + 1.0) / denom;
            }
        }
        scores
    }
}
