//! Vector-space (TF-IDF, cosine) index over a corpus.
//!
//! Weights use sublinear term frequency `1 + ln(tf)` times smoothed
//! `idf = ln((1 + N) / (1 + df)) + 1`, and every document vector is
//! L2-normalized, so the dot product of two vectors is their cosine.

use crate::corpus::{Corpus, DocId};
use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

pub type TermId = u32;

#[derive(Debug, Clone)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f32, // normalized tf-idf weight
}

/// A term and its weight in one document vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub term: String,
    pub weight: f32,
}

#[derive(Debug, Default, Clone)]
pub struct VectorIndex {
    pub dictionary: HashMap<String, TermId>,
    /// term id -> term, ids assigned in lexicographic term order.
    pub terms: Vec<String>,
    pub idf: Vec<f32>,
    pub postings: HashMap<TermId, Vec<Posting>>, // postings sorted by doc_id
    /// Sparse unit vector per document, sorted by term id.
    pub doc_vectors: Vec<Vec<(TermId, f32)>>,
    pub num_docs: usize,
}

#[inline]
fn sublinear_tf(tf: u32) -> f32 {
    if tf > 0 { 1.0 + (tf as f32).ln() } else { 0.0 }
}

fn l2_normalize(weights: &mut [(TermId, f32)]) {
    let norm = weights.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in weights.iter_mut() {
            *w /= norm;
        }
    }
}

impl VectorIndex {
    /// Build from a corpus, keeping at most `max_features` terms ranked by total corpus count.
    pub fn build(corpus: &Corpus, max_features: usize) -> Self {
        let n = corpus.len();

        let mut totals: HashMap<&str, u64> = HashMap::new();
        for doc in corpus.documents() {
            for token in &doc.tokens {
                *totals.entry(token.as_str()).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(&str, u64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        terms.sort();
        let dictionary: HashMap<String, TermId> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as TermId))
            .collect();
        let idf: Vec<f32> = terms
            .iter()
            .map(|t| {
                let df = corpus.document_frequency(t) as f32;
                ((1.0 + n as f32) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let mut postings: HashMap<TermId, Vec<Posting>> = HashMap::new();
        let mut doc_vectors = Vec::with_capacity(n);
        for doc in corpus.documents() {
            let mut weights: Vec<(TermId, f32)> = doc
                .term_counts()
                .into_iter()
                .filter_map(|(term, tf)| {
                    dictionary
                        .get(term)
                        .map(|&tid| (tid, sublinear_tf(tf) * idf[tid as usize]))
                })
                .collect();
            weights.sort_by_key(|(tid, _)| *tid);
            l2_normalize(&mut weights);
            for &(tid, weight) in &weights {
                postings.entry(tid).or_default().push(Posting { doc_id: doc.id, weight });
            }
            doc_vectors.push(weights);
        }

        Self { dictionary, terms, idf, postings, doc_vectors, num_docs: n }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Cosine similarity of the query against every document, indexed by document id.
    ///
    /// Query terms outside the vocabulary are ignored; a query with no known
    /// terms scores every document 0.
    pub fn score(&self, query_tokens: &[String]) -> Vec<f32> {
        let mut scores = vec![0.0f32; self.num_docs];

        let mut tf_q: HashMap<TermId, u32> = HashMap::new();
        for token in query_tokens {
            if let Some(&tid) = self.dictionary.get(token) {
                *tf_q.entry(tid).or_insert(0) += 1;
            }
        }
        if tf_q.is_empty() {
            return scores;
        }

        let mut q_weights: Vec<(TermId, f32)> = tf_q
            .into_iter()
            .map(|(tid, tf)| (tid, sublinear_tf(tf) * self.idf[tid as usize]))
            .collect();
        q_weights.sort_by_key(|(tid, _)| *tid);
        l2_normalize(&mut q_weights);

        for (tid, q_w) in q_weights {
            if let Some(postings) = self.postings.get(&tid) {
                for p in postings {
                    scores[p.doc_id] += p.weight * q_w;
                }
            }
        }
        scores
    }

    /// The `n` heaviest terms of a document, by descending weight then ascending term.
    pub fn top_keywords(&self, doc_id: DocId, n: usize) -> Result<Vec<Keyword>> {
        let vector = self
            .doc_vectors
            .get(doc_id)
            .ok_or(SearchError::DocumentOutOfRange { id: doc_id, count: self.num_docs })?;
        let mut keywords: Vec<Keyword> = vector
            .iter()
            .filter(|(_, w)| *w > 0.0)
            .map(|&(tid, weight)| Keyword { term: self.terms[tid as usize].clone(), weight })
            .collect();
        keywords.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.term.cmp(&b.term))
        });
        keywords.truncate(n);
        Ok(keywords)
    }
}
