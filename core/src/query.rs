//! Query classification and ranker selection.

use crate::corpus::DocId;
use crate::error::SearchError;
use crate::stopwords::StopwordSet;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Ranking model chosen by the caller for tokenized queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Vector,
    Probabilistic,
}

impl FromStr for Method {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" | "tfidf" | "tf-idf" => Ok(Method::Vector),
            "probabilistic" | "bm25" => Ok(Method::Probabilistic),
            _ => Err(SearchError::InvalidMethod { method: s.to_string() }),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Vector => f.write_str("vector"),
            Method::Probabilistic => f.write_str("probabilistic"),
        }
    }
}

/// What actually scores a query, decided once per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ranking {
    Vector,
    Probabilistic,
    Phrase,
}

impl From<Method> for Ranking {
    fn from(method: Method) -> Self {
        match method {
            Method::Vector => Ranking::Vector,
            Method::Probabilistic => Ranking::Probabilistic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuery {
    /// Nothing left after trimming.
    Empty,
    /// Double-quoted input, quotes removed.
    Phrase(String),
    /// Tokens after stopword filtering (or the raw tokens when filtering removed everything).
    Terms(Vec<String>),
}

impl ParsedQuery {
    pub fn ranking(&self, method: Method) -> Ranking {
        match self {
            ParsedQuery::Phrase(_) => Ranking::Phrase,
            _ => method.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryRouter {
    stopwords: StopwordSet,
}

impl Default for QueryRouter {
    fn default() -> Self {
        Self::new(StopwordSet::english())
    }
}

impl QueryRouter {
    pub fn new(stopwords: StopwordSet) -> Self {
        Self { stopwords }
    }

    pub fn parse(&self, raw: &str) -> ParsedQuery {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ParsedQuery::Empty;
        }
        if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
            return ParsedQuery::Phrase(trimmed[1..trimmed.len() - 1].to_string());
        }
        ParsedQuery::Terms(self.filter_stopwords(tokenize(trimmed)))
    }

    /// Drop stopwords, falling back to the unfiltered tokens if nothing would remain.
    pub fn filter_stopwords(&self, tokens: Vec<String>) -> Vec<String> {
        let filtered: Vec<String> = tokens
            .iter()
            .filter(|t| !self.stopwords.contains(t))
            .cloned()
            .collect();
        if filtered.is_empty() { tokens } else { filtered }
    }
}

/// Descending score, then ascending document id.
pub fn compare_hits(a: (DocId, f32), b: (DocId, f32)) -> Ordering {
    b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
}

/// Turn a per-document score vector into the top `k` non-zero hits.
pub fn rank(scores: &[f32], top_k: usize) -> Vec<(DocId, f32)> {
    let mut scored: Vec<(DocId, f32)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, s)| s > 0.0)
        .collect();
    scored.sort_by(|a, b| compare_hits(*a, *b));
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> QueryRouter {
        QueryRouter::default()
    }

    #[test]
    fn quoted_input_is_a_phrase() {
        assert_eq!(router().parse("  \"Vector Space\" "), ParsedQuery::Phrase("Vector Space".into()));
        assert_eq!(router().parse("\"\""), ParsedQuery::Phrase(String::new()));
    }

    #[test]
    fn lone_quote_is_tokenized() {
        assert_eq!(router().parse("\""), ParsedQuery::Terms(Vec::new()));
        assert_eq!(router().parse("\"open ended"), ParsedQuery::Terms(vec!["open".into(), "ended".into()]));
    }

    #[test]
    fn stopwords_are_filtered() {
        assert_eq!(
            router().parse("The quick fox and the dog"),
            ParsedQuery::Terms(vec!["quick".into(), "fox".into(), "dog".into()])
        );
    }

    #[test]
    fn all_stopword_query_falls_back() {
        assert_eq!(router().parse("is the"), ParsedQuery::Terms(vec!["is".into(), "the".into()]));
    }

    #[test]
    fn empty_query() {
        assert_eq!(router().parse("   "), ParsedQuery::Empty);
    }

    #[test]
    fn phrase_overrides_method() {
        let q = router().parse("\"x\"");
        assert_eq!(q.ranking(Method::Probabilistic), Ranking::Phrase);
        let q = router().parse("x");
        assert_eq!(q.ranking(Method::Probabilistic), Ranking::Probabilistic);
    }

    #[test]
    fn method_parsing() {
        assert_eq!("tfidf".parse::<Method>().unwrap(), Method::Vector);
        assert_eq!("BM25".parse::<Method>().unwrap(), Method::Probabilistic);
        assert_eq!("probabilistic".parse::<Method>().unwrap(), Method::Probabilistic);
        assert!(matches!("cosine".parse::<Method>(), Err(SearchError::InvalidMethod { .. })));
    }

    #[test]
    fn rank_drops_zeros_and_breaks_ties_by_id() {
        let ranked = rank(&[0.5, 0.0, 0.9, 0.5], 10);
        assert_eq!(ranked, vec![(2, 0.9), (0, 0.5), (3, 0.5)]);
        assert_eq!(rank(&[0.5, 0.9], 1), vec![(1, 0.9)]);
        assert!(rank(&[0.5], 0).is_empty());
    }
}
