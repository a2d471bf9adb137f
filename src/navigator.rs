//! # Navigator
//!
//! @title Source-Navigation Primitives
//! @author Anchor Sentinel Static Analysis Team
//!
//! Pure, side-effect-free helpers shared by every detector: offset-to-line
//! resolution, context-window extraction, a heuristic enclosing-function
//! lookup, and absence-of-pattern checks. None of these attempt to parse
//! Rust — they operate on the raw text and line array of a [`SourceView`].

use regex::Regex;

use crate::source::SourceView;

/// Regex matching a (possibly `pub`) function header, used by
/// [`Navigator::enclosing_function`].
fn function_header_re() -> Regex {
    Regex::new(r"(?:pub\s+)?fn\s+(\w+)").expect("static regex")
}

/// Source-navigation primitives bound to a single [`SourceView`].
pub struct Navigator<'a> {
    view: &'a SourceView,
    function_header: Regex,
}

impl<'a> Navigator<'a> {
    /// Builds a navigator over `view`.
    pub fn new(view: &'a SourceView) -> Self {
        Self {
            view,
            function_header: function_header_re(),
        }
    }

    /// The full source text.
    pub fn text(&self) -> &str {
        &self.view.text
    }

    /// The 0-indexed line array.
    pub fn lines(&self) -> &[String] {
        &self.view.lines
    }

    /// Given a 0-based byte offset into [`Self::text`], returns the 1-based
    /// line number containing it: `1 + (count of '\n' in text[0..offset])`.
    pub fn line_of(&self, offset: usize) -> usize {
        1 + self.view.text[..offset.min(self.view.text.len())]
            .bytes()
            .filter(|&b| b == b'\n')
            .count()
    }

    /// Returns a multi-line string of the lines around `line` (1-based),
    /// each prefixed `"{1-based-line-number}: "`, clamped to the file's
    /// bounds. `radius` lines are included on each side when not clamped.
    pub fn context(&self, line: usize, radius: usize) -> String {
        let lines = self.lines();
        let total = lines.len();
        let start = line.saturating_sub(radius + 1).min(total);
        let end = (line + radius).min(total);

        (start..end)
            .map(|i| format!("{}: {}", i + 1, lines[i]))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convenience wrapper over [`Self::context`] with the default radius
    /// of 3 used for `code_snippet` generation.
    pub fn snippet(&self, line: usize) -> String {
        self.context(line, 3)
    }

    /// Scans lines `[1..line]` tracking a running brace-depth counter;
    /// whenever a line matches a function header, it becomes the current
    /// candidate, and the candidate clears whenever brace depth returns to
    /// zero. Returns the final candidate, or `None` near file boundaries or
    /// outside any function.
    pub fn enclosing_function(&self, line: usize) -> Option<String> {
        let lines = self.lines();
        let upto = line.min(lines.len());

        let mut current: Option<String> = None;
        let mut brace_depth: i64 = 0;

        for raw_line in &lines[..upto] {
            if let Some(caps) = self.function_header.captures(raw_line) {
                current = Some(caps[1].to_string());
            }

            brace_depth += raw_line.matches('{').count() as i64;
            brace_depth -= raw_line.matches('}').count() as i64;
            if brace_depth == 0 && current.is_some() {
                current = None;
            }
        }

        current
    }

    /// True when none of `needles` occur in `window` (plain substring
    /// search, case-sensitive). Callers needing case-insensitivity or
    /// regex matching lowercase the window first or use a precompiled
    /// `Regex` directly — documented per call site in each detector.
    pub fn absent_in(window: &str, needles: &[&str]) -> bool {
        !needles.iter().any(|n| window.contains(n))
    }

    /// True when at least one of `needles` occurs in `window`.
    pub fn present_in(window: &str, needles: &[&str]) -> bool {
        !Self::absent_in(window, needles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(text: &str) -> SourceView {
        SourceView::from_text(text.to_string(), "test.rs".into())
    }

    #[test]
    fn line_of_counts_newlines() {
        let v = view("a\nb\nc\n");
        let nav = Navigator::new(&v);
        assert_eq!(nav.line_of(0), 1);
        assert_eq!(nav.line_of(2), 2); // offset of 'b'
        assert_eq!(nav.line_of(4), 3); // offset of 'c'
    }

    #[test]
    fn context_clamps_to_bounds() {
        let v = view("l1\nl2\nl3\nl4\nl5");
        let nav = Navigator::new(&v);
        let ctx = nav.context(1, 3);
        assert!(ctx.starts_with("1: l1"));
        let ctx_end = nav.context(5, 3);
        assert!(ctx_end.contains("5: l5"));
    }

    #[test]
    fn enclosing_function_tracks_braces() {
        let v = view("fn outer() {\n    let x = 1;\n}\nfn inner() {\n    let y = 2;\n");
        let nav = Navigator::new(&v);
        assert_eq!(nav.enclosing_function(2).as_deref(), Some("outer"));
        assert_eq!(nav.enclosing_function(3), None);
        assert_eq!(nav.enclosing_function(5).as_deref(), Some("inner"));
    }

    #[test]
    fn absent_in_and_present_in() {
        assert!(Navigator::absent_in("foo bar", &["baz", "qux"]));
        assert!(!Navigator::absent_in("foo bar", &["bar"]));
        assert!(Navigator::present_in("foo bar", &["bar"]));
    }
}
