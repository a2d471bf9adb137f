//! # Finding and Severity Definitions
//!
//! @title Security Finding Data Structures
//! @author Anchor Sentinel Static Analysis Team
//!
//! Defines the core data structures for representing a single security
//! finding and its severity classification.

use serde::{Deserialize, Serialize};

/// Severity level classification for security findings.
///
/// Declared in rank order (`Critical` first) so that `derive(Ord)` gives
/// `severity_rank` directly: sorting findings ascending by `Severity`
/// places `Critical` first and `Info` last, matching the spec's fixed
/// sort key `critical=0 ... info=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// Parses a severity level from a string, case-insensitively.
    ///
    /// Unknown values fall back to `Info`, matching the Python original's
    /// `severity_order.get(x['severity'], 5)` default-to-lowest-priority
    /// behavior.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Info,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        };
        write!(f, "{s}")
    }
}

/// Vulnerability category, fixed to the six detector families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    AccessControl,
    AccountValidation,
    Arithmetic,
    EconomicAttacks,
    InputValidation,
    StateManipulation,
}

/// Location of a finding within the analyzed contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Path to the contract file, as passed on the command line.
    pub file: String,

    /// 1-based line number, when resolvable.
    pub line: Option<usize>,

    /// Name of the enclosing function, when the heuristic lookup succeeds.
    pub function: Option<String>,
}

/// A single, normalized security finding.
///
/// Field order here is load-bearing: `serde_json` serializes struct fields
/// in declaration order, and the external report format fixes the exact
/// output order of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Stable, detector-specific identifier (often suffixed with a line
    /// number). Used together with `title` as the deduplication key.
    pub id: String,

    /// Short human-readable classification.
    pub title: String,

    /// One-line explanation of the vulnerability.
    pub description: String,

    /// Severity classification.
    pub severity: Severity,

    /// Vulnerability category.
    pub category: Category,

    /// Source location of the finding.
    pub location: Location,

    #[serde(rename = "codeSnippet")]
    /// Surrounding source lines, 1-based-prefixed, when available.
    pub code_snippet: Option<String>,

    /// One-line remediation advice.
    pub recommendation: String,

    /// Optional `CWE-<digits>` weakness-enumeration tag.
    pub cwe: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_matches_rank() {
        assert!(Severity::Critical < Severity::High);
        assert!(Severity::High < Severity::Medium);
        assert!(Severity::Medium < Severity::Low);
        assert!(Severity::Low < Severity::Info);
    }

    #[test]
    fn severity_from_str_defaults_to_info() {
        assert_eq!(Severity::from_str("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::from_str("bogus"), Severity::Info);
    }

    #[test]
    fn finding_serializes_with_camel_case_snippet_key() {
        let finding = Finding {
            id: "TEST_1".into(),
            title: "Test".into(),
            description: "desc".into(),
            severity: Severity::High,
            category: Category::Arithmetic,
            location: Location {
                file: "a.rs".into(),
                line: Some(1),
                function: None,
            },
            code_snippet: None,
            recommendation: "fix it".into(),
            cwe: None,
        };
        let json = serde_json::to_string(&finding).unwrap();
        assert!(json.contains("\"codeSnippet\":null"));
        assert!(json.contains("\"function\":null"));
        assert!(json.contains("\"category\":\"arithmetic\""));
    }
}
