//! # Source View
//!
//! @title Loaded Contract Source
//! @author Anchor Sentinel Static Analysis Team
//!
//! Holds the whole contract file in memory, split into a line-indexed view.
//! A [`SourceView`] is created once per analysis and never mutated; every
//! detector reads through a shared `&SourceView`.

use std::fs;
use std::path::Path;

use thiserror::Error;

/// Failure modes for loading a contract file from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The path does not exist on the filesystem.
    #[error("Contract not found: {0}")]
    NotFound(String),

    /// The path exists but could not be read (permissions, invalid UTF-8, ...).
    #[error("Failed to load contract")]
    Unreadable(#[source] std::io::Error),
}

/// Immutable, whole-file view over a loaded contract source.
///
/// `lines` is indexable from 0; callers working with 1-based line numbers
/// (as returned by [`crate::navigator::Navigator::line_of`]) must subtract
/// one before indexing.
#[derive(Debug, Clone)]
pub struct SourceView {
    /// The entire contract source as a single string.
    pub text: String,

    /// `text` split on line boundaries, 0-indexed.
    pub lines: Vec<String>,

    /// The origin identifier reported inside every finding's location.
    pub path: String,
}

impl SourceView {
    /// Loads a contract from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] if `path` does not exist, or
    /// [`LoadError::Unreadable`] if it exists but cannot be read as UTF-8
    /// text.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.display().to_string()));
        }

        let text = fs::read_to_string(path).map_err(LoadError::Unreadable)?;
        Ok(Self::from_text(text, path.display().to_string()))
    }

    /// Builds a view directly from in-memory source text.
    ///
    /// Used by detector unit tests and by [`Self::load`].
    pub fn from_text(text: String, path: String) -> Self {
        let lines = text.lines().map(str::to_string).collect::<Vec<_>>();
        // An empty file still has one (empty) line, matching the Python
        // original's `content.split('\n')` which always yields at least one
        // element.
        let lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        Self { text, lines, path }
    }

    /// Number of lines in the source, counting a trailing partial line.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the 1-based line `n`, if in range.
    pub fn line(&self, n: usize) -> Option<&str> {
        n.checked_sub(1).and_then(|i| self.lines.get(i)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_has_one_line() {
        let view = SourceView::from_text(String::new(), "test.rs".into());
        assert_eq!(view.line_count(), 1);
    }

    #[test]
    fn load_missing_file_errors() {
        let err = SourceView::load(Path::new("/nonexistent/path/contract.rs")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn line_is_one_indexed() {
        let view = SourceView::from_text("a\nb\nc".into(), "test.rs".into());
        assert_eq!(view.line(1), Some("a"));
        assert_eq!(view.line(3), Some("c"));
        assert_eq!(view.line(4), None);
        assert_eq!(view.line(0), None);
    }
}
