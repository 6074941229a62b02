//! Literal, case-insensitive phrase lookup over raw document text.

use crate::corpus::{Corpus, DocId};
use crate::query::compare_hits;

/// Offsets before this many characters are weighed against this floor instead of the document length.
const POSITION_LENGTH_FLOOR: usize = 1000;
/// Occurrence count at which the frequency component saturates.
const FREQUENCY_CEILING: f32 = 10.0;
const POSITION_WEIGHT: f32 = 0.4;
const FREQUENCY_WEIGHT: f32 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct PhraseMatch {
    pub doc_id: DocId,
    pub score: f32,
    pub occurrences: usize,
    /// Character offset of the first occurrence.
    pub first_offset: usize,
}

/// Lower-cased copy of every document, built once per corpus generation.
#[derive(Debug, Clone, Default)]
pub struct PhraseMatcher {
    lowered: Vec<String>,
}

impl PhraseMatcher {
    pub fn build(corpus: &Corpus) -> Self {
        Self { lowered: corpus.documents().iter().map(|d| d.text.to_lowercase()).collect() }
    }

    /// Documents containing `phrase` verbatim (ignoring case), best first.
    ///
    /// The phrase is never tokenized. An empty or blank phrase matches nothing.
    pub fn search_exact_phrase(&self, phrase: &str, top_k: usize) -> Vec<PhraseMatch> {
        if phrase.trim().is_empty() {
            return Vec::new();
        }
        let needle = phrase.to_lowercase();

        let mut matches: Vec<PhraseMatch> = self
            .lowered
            .iter()
            .enumerate()
            .filter_map(|(doc_id, text)| score_document(doc_id, text, &needle))
            .collect();
        matches.sort_by(|a, b| compare_hits((a.doc_id, a.score), (b.doc_id, b.score)));
        matches.truncate(top_k);
        matches
    }
}

fn score_document(doc_id: DocId, text: &str, needle: &str) -> Option<PhraseMatch> {
    if needle.len() > text.len() {
        return None;
    }
    let mut hits = text.match_indices(needle);
    let (first_byte, _) = hits.next()?;
    let occurrences = 1 + hits.count();

    let first_offset = text[..first_byte].chars().count();
    let length = text.chars().count().max(POSITION_LENGTH_FLOOR);
    let position_score = 1.0 - (first_offset as f32 / length as f32) * 0.5;
    let frequency_score = (occurrences as f32 / FREQUENCY_CEILING).min(1.0);
    let score = POSITION_WEIGHT * position_score + FREQUENCY_WEIGHT * frequency_score;

    Some(PhraseMatch { doc_id, score, occurrences, first_offset })
}
