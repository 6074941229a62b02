use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Collapse every whitespace run (including CR/LF) into a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Lowercase, drop every character that is neither alphanumeric nor whitespace, and collapse whitespace.
pub fn preprocess(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    collapse_whitespace(&stripped)
}

/// Canonical decomposition, diacritic removal, and restriction to printable ASCII, split on whitespace.
pub fn normalize_for_index(text: &str) -> Vec<String> {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter_map(|c| {
            if c.is_ascii_graphic() {
                Some(c)
            } else if c.is_whitespace() {
                Some(' ')
            } else {
                None
            }
        })
        .collect();
    folded.split_whitespace().map(str::to_string).collect()
}

/// Full pipeline shared by documents and queries: `preprocess` then `normalize_for_index`.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_for_index(&preprocess(text))
}

/// Fold `text` character by character the way `tokenize` does, without collapsing whitespace.
///
/// Returns the folded text (always ASCII) and, for each folded byte, the
/// char index in `text` it came from, so token matches found in the folded
/// text can be mapped back onto the original.
pub fn fold_with_offsets(text: &str) -> (String, Vec<usize>) {
    let mut folded = String::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len());
    for (idx, c) in text.chars().enumerate() {
        for lower in c.to_lowercase() {
            if lower.is_whitespace() {
                folded.push(' ');
                origin.push(idx);
            } else if lower.is_alphanumeric() {
                for d in std::iter::once(lower).nfd().filter(|d| !is_combining_mark(*d)) {
                    if d.is_ascii_graphic() {
                        folded.push(d);
                        origin.push(idx);
                    }
                }
            }
        }
    }
    (folded, origin)
}
