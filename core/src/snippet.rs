//! Context windows with highlighted matches.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::tokenizer::fold_with_offsets;
use regex::{Regex, RegexBuilder};

const ELLIPSIS: &str = "...";

/// What a snippet should be centered on and highlight.
#[derive(Debug, Clone, Copy)]
pub enum MatchTarget<'a> {
    Terms(&'a [String]),
    Phrase(&'a str),
}

impl<'a> MatchTarget<'a> {
    fn needles(self) -> Vec<String> {
        let mut needles: Vec<String> = match self {
            MatchTarget::Terms(terms) => terms.iter().map(|t| fold_with_offsets(t.trim()).0).collect(),
            MatchTarget::Phrase(phrase) => vec![phrase.to_string()],
        };
        needles.retain(|n| !n.trim().is_empty());
        let mut seen = std::collections::HashSet::new();
        needles.retain(|n| seen.insert(n.to_lowercase()));
        needles
    }
}

/// Where the window is anchored and which spans get highlighted, in char indices of the raw text.
struct Matches {
    anchor: Option<usize>,
    spans: Vec<(usize, usize)>,
}

#[derive(Debug, Clone)]
pub struct SnippetExtractor {
    window: usize,
    open: String,
    close: String,
}

impl SnippetExtractor {
    pub fn new(window: usize, open: impl Into<String>, close: impl Into<String>) -> Self {
        Self { window, open: open.into(), close: close.into() }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.snippet_window, config.highlight_open.clone(), config.highlight_close.clone())
    }

    /// A window of `window` characters around the first match, with every match inside it highlighted.
    ///
    /// Terms are matched against the folded text, so a token like `cafe`
    /// finds and highlights `Café`; phrases match the raw text ignoring case.
    /// Falls back to the start of the document when nothing matches. Empty
    /// text or an empty target produce an empty string.
    pub fn extract(&self, text: &str, target: MatchTarget<'_>) -> Result<String> {
        let needles = target.needles();
        if text.is_empty() || needles.is_empty() {
            return Ok(String::new());
        }
        let matches = match target {
            MatchTarget::Terms(_) => term_matches(text, &needles)?,
            MatchTarget::Phrase(_) => phrase_matches(text, &needles)?,
        };

        let total = text.chars().count();
        let (start, end) = match matches.anchor {
            Some(center) => {
                let start = center.saturating_sub(self.window / 2);
                (start, start.saturating_add(self.window).min(total))
            }
            None => (0, self.window.min(total)),
        };

        let mut snippet = String::new();
        if start > 0 {
            snippet.push_str(ELLIPSIS);
        }
        let mut spans = matches.spans.iter().filter(|(s, e)| *s >= start && *e <= end).peekable();
        let mut open_until = None;
        for (idx, c) in text.chars().enumerate().skip(start).take(end - start) {
            if let Some(&&(s, e)) = spans.peek() {
                if s == idx {
                    snippet.push_str(&self.open);
                    open_until = Some(e);
                    spans.next();
                }
            }
            snippet.push(c);
            if open_until == Some(idx + 1) {
                snippet.push_str(&self.close);
                open_until = None;
            }
        }
        if end < total {
            snippet.push_str(ELLIPSIS);
        }
        Ok(snippet)
    }
}

/// Search the folded text; anchor on the first needle found in query order.
fn term_matches(text: &str, needles: &[String]) -> Result<Matches> {
    let (folded, origin) = fold_with_offsets(text);
    let anchor = needles.iter().find_map(|n| folded.find(n.as_str())).map(|b| origin[b]);
    // Folded text is ASCII, so byte offsets index `origin` directly.
    let spans = alternation(needles)?
        .find_iter(&folded)
        .map(|m| (origin[m.start()], origin[m.end() - 1] + 1))
        .collect();
    Ok(Matches { anchor, spans: disjoint(spans) })
}

fn phrase_matches(text: &str, needles: &[String]) -> Result<Matches> {
    let starts: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    let char_index = |byte: usize| starts.partition_point(|&b| b < byte);
    let mut anchor = None;
    for needle in needles {
        if let Some(m) = case_insensitive(&regex::escape(needle))?.find(text) {
            anchor = Some(char_index(m.start()));
            break;
        }
    }
    let spans = alternation(needles)?
        .find_iter(text)
        .map(|m| (char_index(m.start()), char_index(m.end())))
        .collect();
    Ok(Matches { anchor, spans })
}

/// One case-insensitive pattern over every needle. Longer needles win on overlap.
fn alternation(needles: &[String]) -> Result<Regex> {
    let mut ordered: Vec<&str> = needles.iter().map(String::as_str).collect();
    ordered.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = ordered.iter().map(|n| regex::escape(n)).collect::<Vec<_>>().join("|");
    case_insensitive(&pattern)
}

/// Two folded matches can meet inside one raw char; keep the earlier one.
fn disjoint(spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    let mut kept: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for span in spans {
        if kept.last().map_or(true, |&(_, end)| span.0 >= end) {
            kept.push(span);
        }
    }
    kept
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}
