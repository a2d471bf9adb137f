//! # Report Module
//!
//! @title Security Report Generator
//! @author Anchor Sentinel Static Analysis Team
//!
//! Defines the top-level report document returned by a single analysis
//! run, and the summary statistics attached to it.
//!
//! ## Key Types
//!
//! - [`Report`] - complete security analysis report
//! - [`Finding`] - individual vulnerability finding
//! - [`Severity`] / [`Category`] - finding classification

mod finding;

pub use finding::{Category, Finding, Location, Severity};

use serde::Serialize;

/// Fixed scanner identifier retained for output compatibility with the
/// original Python tool's downstream consumers. See `DESIGN.md` for the
/// rationale to keep rather than version this literal.
pub const SCANNER_NAME: &str = "python-static-analyzer";

/// Complete security analysis report for one contract file.
///
/// Field order matches the external report format exactly:
/// `scanner, contract_path, contract_lines, findings, summary`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub scanner: &'static str,
    pub contract_path: String,
    pub contract_lines: usize,
    pub findings: Vec<Finding>,
    pub summary: Summary,
}

/// Per-severity finding counts.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl Summary {
    /// Tallies a summary from a (already deduplicated) findings slice.
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Summary {
            total: findings.len(),
            critical: 0,
            high: 0,
            medium: 0,
            low: 0,
            info: 0,
        };

        for finding in findings {
            match finding.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
        }

        summary
    }
}

impl Report {
    /// Builds a report from a contract path, line count, and the final
    /// (deduplicated, severity-sorted) findings list.
    pub fn new(contract_path: String, contract_lines: usize, findings: Vec<Finding>) -> Self {
        let summary = Summary::from_findings(&findings);
        Self {
            scanner: SCANNER_NAME,
            contract_path,
            contract_lines,
            findings,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finding::Location;

    fn sample(severity: Severity) -> Finding {
        Finding {
            id: "X_1".into(),
            title: "X".into(),
            description: "d".into(),
            severity,
            category: Category::Arithmetic,
            location: Location {
                file: "a.rs".into(),
                line: Some(1),
                function: None,
            },
            code_snippet: None,
            recommendation: "r".into(),
            cwe: None,
        }
    }

    #[test]
    fn summary_totals_match_findings_len() {
        let findings = vec![sample(Severity::Critical), sample(Severity::Low)];
        let report = Report::new("a.rs".into(), 10, findings);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.critical, 1);
        assert_eq!(report.summary.low, 1);
        assert_eq!(
            report.summary.total,
            report.summary.critical
                + report.summary.high
                + report.summary.medium
                + report.summary.low
                + report.summary.info
        );
    }
}
