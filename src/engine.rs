//! # Analysis Engine
//!
//! @title Detector Orchestration Engine
//! @author Anchor Sentinel Static Analysis Team
//!
//! Loads a contract, runs the fixed detector set against it with
//! per-detector fault isolation, then deduplicates and ranks the
//! resulting findings into a [`Report`].

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use log::error;

use crate::detectors::{default_detectors, Detector};
use crate::report::{Finding, Report};
use crate::source::{LoadError, SourceView};

/// Runs the full detector catalogue against a single contract file.
pub struct Engine {
    detectors: Vec<Box<dyn Detector>>,
}

impl Engine {
    /// Builds an engine with the fixed, spec-ordered detector set.
    pub fn new() -> Self {
        Self { detectors: default_detectors() }
    }

    /// Loads `path`, runs every detector, and returns the assembled report.
    ///
    /// A detector that panics during scanning is caught, logged to stderr
    /// via [`log::error`] naming the detector and the panic message, and
    /// skipped; the run continues with the remaining detectors.
    pub fn run(&self, path: &Path) -> Result<Report, LoadError> {
        let view = SourceView::load(path)?;

        let mut all_findings = Vec::new();
        for detector in &self.detectors {
            match panic::catch_unwind(AssertUnwindSafe(|| detector.detect(&view))) {
                Ok(findings) => all_findings.extend(findings),
                Err(panic) => {
                    let message = panic_message(&panic);
                    error!("Error in detector {}: {message}", detector.name());
                }
            }
        }

        let findings = dedup_and_sort(all_findings);
        Ok(Report::new(view.path.clone(), view.line_count(), findings))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Engine {
    /// Builds an engine against an explicit detector set, bypassing the
    /// fixed catalogue. Used to exercise fault isolation in tests.
    fn with_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Deduplicates by `"{title}:{line_or_0}"`, keeping the first occurrence
/// (stable w.r.t. detector/check order), then stably sorts by severity.
fn dedup_and_sort(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::with_capacity(findings.len());

    for finding in findings {
        let key = format!("{}:{}", finding.title, finding.location.line.unwrap_or(0));
        if seen.insert(key) {
            unique.push(finding);
        }
    }

    unique.sort_by_key(|f| f.severity);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Category, Location, Severity};

    fn sample(title: &str, line: Option<usize>, severity: Severity) -> Finding {
        Finding {
            id: format!("{title}_{line:?}"),
            title: title.to_string(),
            description: "d".into(),
            severity,
            category: Category::Arithmetic,
            location: Location { file: "a.rs".into(), line, function: None },
            code_snippet: None,
            recommendation: "r".into(),
            cwe: None,
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence_per_title_and_line() {
        let a = sample("X", Some(3), Severity::Low);
        let b = sample("X", Some(3), Severity::Critical);
        let findings = dedup_and_sort(vec![a, b]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Low);
    }

    #[test]
    fn sort_is_stable_and_severity_ascending() {
        let findings = dedup_and_sort(vec![
            sample("A", Some(1), Severity::Info),
            sample("B", Some(2), Severity::Critical),
            sample("C", Some(3), Severity::High),
        ]);
        let ranks: Vec<_> = findings.iter().map(|f| f.severity).collect();
        assert_eq!(ranks, vec![Severity::Critical, Severity::High, Severity::Info]);
    }

    #[test]
    fn run_on_missing_file_returns_not_found() {
        let engine = Engine::new();
        let err = engine.run(Path::new("/nonexistent/contract.rs")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    struct PanickingDetector;

    impl Detector for PanickingDetector {
        fn name(&self) -> &'static str {
            "PanickingDetector"
        }

        fn detect(&self, _view: &SourceView) -> Vec<Finding> {
            panic!("boom");
        }
    }

    struct StubDetector;

    impl Detector for StubDetector {
        fn name(&self) -> &'static str {
            "StubDetector"
        }

        fn detect(&self, _view: &SourceView) -> Vec<Finding> {
            vec![sample("Stub Finding", Some(1), Severity::Low)]
        }
    }

    #[test]
    fn faulting_detector_does_not_affect_other_detectors() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("create temp fixture");
        file.write_all(b"fn main() {}\n").expect("write fixture");

        let engine = Engine::with_detectors(vec![Box::new(PanickingDetector), Box::new(StubDetector)]);

        let previous_hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let report = engine.run(file.path());
        panic::set_hook(previous_hook);

        let report = report.expect("report should still be produced");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].title, "Stub Finding");
    }
}
