use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub type DocId = usize;

/// A loaded document as produced by a loader, before indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub name: String,
    pub path: PathBuf,
    pub text: String,
}

impl DocumentRecord {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self { name: name.into(), path: path.into(), text: text.into() }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocId,
    pub name: String,
    pub path: PathBuf,
    /// Text exactly as loaded; snippets and phrase matching read this.
    pub text: String,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn term_counts(&self) -> HashMap<&str, u32> {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for token in &self.tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// Immutable, tokenized snapshot of every loaded document.
///
/// Document ids are the dense positions `0..len()` in load order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    document_frequency: HashMap<String, u32>,
    total_tokens: u64,
}

impl Corpus {
    pub fn build(records: Vec<DocumentRecord>) -> Self {
        let mut document_frequency: HashMap<String, u32> = HashMap::new();
        let mut total_tokens = 0u64;
        let documents: Vec<Document> = records
            .into_iter()
            .enumerate()
            .map(|(id, rec)| {
                let tokens = tokenize(&rec.text);
                total_tokens += tokens.len() as u64;
                let doc = Document { id, name: rec.name, path: rec.path, text: rec.text, tokens };
                for term in doc.term_counts().into_keys() {
                    *document_frequency.entry(term.to_string()).or_insert(0) += 1;
                }
                doc
            })
            .collect();
        Self { documents, document_frequency, total_tokens }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of documents containing `term`; 0 for unseen terms.
    pub fn document_frequency(&self, term: &str) -> u32 {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.document_frequency.len()
    }

    pub fn average_length(&self) -> f32 {
        if self.documents.is_empty() {
            0.0
        } else {
            self.total_tokens as f32 / self.documents.len() as f32
        }
    }
}
