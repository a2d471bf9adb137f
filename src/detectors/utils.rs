//! # Detector Utilities
//!
//! @title Shared Finding-Construction Helpers
//! @author Anchor Sentinel Static Analysis Team
//!
//! A single helper for building a [`Finding`] with the right field order
//! and wiring, so every detector check is a few lines of pattern-specific
//! logic followed by one call here instead of hand-assembling the struct.

use crate::report::{Category, Finding, Location, Severity};

/// Builds a normalized [`Finding`].
///
/// `id`, `title`, `description`, `recommendation` accept anything
/// `Into<String>` so call sites can pass `format!(...)` results or string
/// literals interchangeably.
#[allow(clippy::too_many_arguments)]
pub fn finding(
    id: impl Into<String>,
    title: impl Into<String>,
    description: impl Into<String>,
    severity: Severity,
    category: Category,
    file: &str,
    line: Option<usize>,
    function: Option<String>,
    code_snippet: Option<String>,
    recommendation: impl Into<String>,
    cwe: Option<&str>,
) -> Finding {
    Finding {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        severity,
        category,
        location: Location {
            file: file.to_string(),
            line,
            function,
        },
        code_snippet,
        recommendation: recommendation.into(),
        cwe: cwe.map(str::to_string),
    }
}
