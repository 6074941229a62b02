//! Document loading from a folder of plain-text files.

use crate::corpus::DocumentRecord;
use crate::error::{Result, SearchError};
use crate::tokenizer::collapse_whitespace;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md"];
/// Documents whose collapsed text is this short or shorter are skipped.
pub const MIN_DOCUMENT_CHARS: usize = 10;

/// Produces the ordered records an index is built from.
pub trait DocumentLoader {
    fn load(&self, recursive: bool) -> Result<Vec<DocumentRecord>>;
}

impl<F> DocumentLoader for F
where
    F: Fn(bool) -> Result<Vec<DocumentRecord>>,
{
    fn load(&self, recursive: bool) -> Result<Vec<DocumentRecord>> {
        self(recursive)
    }
}

#[derive(Debug, Clone)]
pub struct FolderLoader {
    root: PathBuf,
    extensions: Vec<String>,
    min_chars: usize,
}

impl FolderLoader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            min_chars: MIN_DOCUMENT_CHARS,
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(|e| e.into().to_ascii_lowercase()).collect();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    fn read(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|source| SearchError::Load { path: path.to_path_buf(), source })?;
        Ok(collapse_whitespace(&String::from_utf8_lossy(&bytes)))
    }
}

impl DocumentLoader for FolderLoader {
    fn load(&self, recursive: bool) -> Result<Vec<DocumentRecord>> {
        if !self.root.exists() {
            return Err(SearchError::MissingFolder { path: self.root.clone() });
        }
        if !self.root.is_dir() {
            return Err(SearchError::NotADirectory { path: self.root.clone() });
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut records = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(max_depth).sort_by_file_name() {
            let entry = entry.map_err(|e| SearchError::Load {
                path: e.path().unwrap_or(&self.root).to_path_buf(),
                source: io::Error::from(e),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !self.accepts(path) {
                continue;
            }

            let text = self.read(path)?;
            if text.chars().count() <= self.min_chars {
                tracing::debug!(path = %path.display(), "skipping near-empty document");
                continue;
            }
            let name = path
                .strip_prefix(&self.root)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            records.push(DocumentRecord { name, path: path.to_path_buf(), text });
        }

        tracing::info!(root = %self.root.display(), recursive, documents = records.len(), "loaded documents");
        Ok(records)
    }
}
