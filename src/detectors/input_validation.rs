//! # Input Validation Detector
//!
//! @title Input-Validation Vulnerability Detector
//! @author Anchor Sentinel Static Analysis Team
//!
//! Flags missing zero-amount checks, unbounded string parameters,
//! unchecked array indexing, unvalidated timestamp assignments, and
//! sensitive pubkey parameters accepted without validation.

use regex::Regex;

use super::utils::finding;
use super::Detector;
use crate::navigator::Navigator;
use crate::report::{Category, Finding, Severity};
use crate::source::SourceView;

const ZERO_CHECK_LITERALS: &[&str] = &[
    "amount > 0", "amount >= 1", "amount != 0",
    "price > 0", "price >= 1", "price != 0",
    "value > 0", "bid > 0",
];
const STRING_LENGTH_TOKENS: &[&str] = &[".len()", ".is_empty()", "MAX_", "MIN_", "< 64", "<= 64", "trim()"];
const BOUNDS_TOKENS: &[&str] = &[".len()", ".get(", "get_mut(", "first()", "last()"];
const TIME_CHECK_TOKENS: &[&str] = &["Clock::get", "current_time", "> now", ">= now", "require!", "MIN_", "MAX_"];

/// Detects zero-amount, string-length, array-bounds, timestamp, and
/// pubkey-parameter validation gaps.
pub struct InputValidationDetector {
    amount_fn: Regex,
    require_gt_zero: Regex,
    require_ne_zero: Regex,
    string_fn: Regex,
    require_len: Regex,
    index_site: Regex,
    time_field: Regex,
    pubkey_fn: Regex,
}

impl InputValidationDetector {
    pub fn new() -> Self {
        Self {
            amount_fn: Regex::new(
                r"(?is)fn\s+(\w+)\s*\([^)]*(?:amount|price|value|bid):\s*u64[^)]*\)[^{]*\{([^}]+(?:\{[^}]*\}[^}]*)*)\}",
            )
            .expect("static regex"),
            require_gt_zero: Regex::new(r"(?i)require!.*> 0").expect("static regex"),
            require_ne_zero: Regex::new(r"(?i)require!.*!= 0").expect("static regex"),
            string_fn: Regex::new(
                r"(?is)fn\s+(\w+)\s*\([^)]*(?:title|name|description|category):\s*String[^)]*\)[^{]*\{([^}]+(?:\{[^}]*\}[^}]*)*)\}",
            )
            .expect("static regex"),
            require_len: Regex::new(r"require!.*len").expect("static regex"),
            index_site: Regex::new(r"\[(\w+)\]").expect("static regex"),
            time_field: Regex::new(r"(?i)(deadline|end_time|expiry|start_time|timestamp):\s*(u64|i64)")
                .expect("static regex"),
            pubkey_fn: Regex::new(r"fn\s+(\w+)\s*\([^)]*(\w+):\s*Pubkey[^)]*\)").expect("static regex"),
        }
    }

    fn check_zero_amount(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for caps in self.amount_fn.captures_iter(nav.text()) {
            let m = caps.get(0).unwrap();
            let fn_name = caps.get(1).unwrap().as_str();
            let fn_body = caps.get(2).unwrap().as_str();
            let line_num = nav.line_of(m.start());

            let has_zero_check = ZERO_CHECK_LITERALS.iter().any(|c| fn_body.to_lowercase().contains(&c.to_lowercase()))
                || self.require_gt_zero.is_match(fn_body)
                || self.require_ne_zero.is_match(fn_body);

            if !has_zero_check {
                out.push(finding(
                    format!("NO_ZERO_CHECK_{line_num}"),
                    "Missing Zero Amount Check",
                    format!("Function '{fn_name}' accepts amount without zero validation"),
                    Severity::Medium,
                    Category::InputValidation,
                    &view.path,
                    Some(line_num),
                    Some(fn_name.to_string()),
                    Some(nav.snippet(line_num)),
                    "Add require!(amount > 0) at function start",
                    Some("CWE-20"),
                ));
            }
        }
    }

    fn check_string_length(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for caps in self.string_fn.captures_iter(nav.text()) {
            let m = caps.get(0).unwrap();
            let fn_name = caps.get(1).unwrap().as_str();
            let fn_body = caps.get(2).unwrap().as_str();
            let line_num = nav.line_of(m.start());

            let has_length_check =
                STRING_LENGTH_TOKENS.iter().any(|t| fn_body.contains(t)) || self.require_len.is_match(fn_body);

            if !has_length_check {
                out.push(finding(
                    format!("NO_STRING_LENGTH_{line_num}"),
                    "Missing String Length Validation",
                    format!("Function '{fn_name}' accepts strings without length check"),
                    Severity::Low,
                    Category::InputValidation,
                    &view.path,
                    Some(line_num),
                    Some(fn_name.to_string()),
                    Some(nav.snippet(line_num)),
                    "Validate string length: require!(!s.is_empty() && s.len() <= MAX_LEN)",
                    Some("CWE-20"),
                ));
            }
        }
    }

    fn check_array_bounds(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for caps in self.index_site.captures_iter(nav.text()) {
            let m = caps.get(0).unwrap();
            let index_var = caps.get(1).unwrap().as_str();
            if index_var.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }

            let line_num = nav.line_of(m.start());
            let context = nav.context(line_num, 3);

            let has_bounds_check = context.contains(&format!("{index_var} <"))
                || context.contains(&format!("{index_var} <="))
                || BOUNDS_TOKENS.iter().any(|t| context.contains(t));

            if !has_bounds_check {
                out.push(finding(
                    format!("NO_BOUNDS_CHECK_{line_num}"),
                    "Potential Out of Bounds Access",
                    format!("Array access with index '{index_var}' without bounds check"),
                    Severity::Medium,
                    Category::InputValidation,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(context),
                    "Use .get() instead of [] or verify index < len",
                    Some("CWE-129"),
                ));
            }
        }
    }

    fn check_timestamp_validation(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();
        for caps in self.time_field.captures_iter(text) {
            let field_name = caps.get(1).unwrap().as_str();
            let set_pattern = Regex::new(&format!(r"(?i){field_name}\s*=\s*([^;]+);")).expect("dynamic regex");

            for set_m in set_pattern.find_iter(text) {
                let set_line = nav.line_of(set_m.start());
                let context = nav.context(set_line, 3);

                let has_time_check = TIME_CHECK_TOKENS.iter().any(|t| context.contains(t));

                if !has_time_check && !context.to_lowercase().contains("init") {
                    out.push(finding(
                        format!("NO_TIME_VALIDATION_{set_line}"),
                        "Missing Timestamp Validation",
                        format!("Timestamp '{field_name}' set without validation"),
                        Severity::Medium,
                        Category::InputValidation,
                        &view.path,
                        Some(set_line),
                        nav.enclosing_function(set_line),
                        Some(context),
                        "Validate timestamp is in the future and within reasonable bounds",
                        Some("CWE-20"),
                    ));
                }
            }
        }
    }

    fn check_address_validation(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        const SENSITIVE: &[&str] = &["treasury", "admin", "authority", "recipient"];

        for caps in self.pubkey_fn.captures_iter(nav.text()) {
            let m = caps.get(0).unwrap();
            let fn_name = caps.get(1).unwrap().as_str();
            let param_name = caps.get(2).unwrap().as_str();
            let line_num = nav.line_of(m.start());
            let context = nav.context(line_num, 10);

            let has_validation = context.contains(&format!("{param_name} != Pubkey::default"))
                || context.contains(&format!("{param_name} != system_program"))
                || context.contains("key()")
                || context.contains("has_one");

            let is_sensitive = SENSITIVE.iter().any(|s| param_name.to_lowercase().contains(s));

            if is_sensitive && !has_validation {
                out.push(finding(
                    format!("NO_PUBKEY_VALIDATION_{line_num}"),
                    "Missing Pubkey Validation",
                    format!("Sensitive pubkey parameter '{param_name}' may not be validated"),
                    Severity::High,
                    Category::InputValidation,
                    &view.path,
                    Some(line_num),
                    Some(fn_name.to_string()),
                    Some(context),
                    "Validate pubkey is not default and matches expected constraints",
                    Some("CWE-20"),
                ));
            }
        }
    }
}

impl Detector for InputValidationDetector {
    fn name(&self) -> &'static str {
        "InputValidationDetector"
    }

    fn detect(&self, view: &SourceView) -> Vec<Finding> {
        let nav = Navigator::new(view);
        let mut out = Vec::new();
        self.check_zero_amount(&nav, view, &mut out);
        self.check_string_length(&nav, view, &mut out);
        self.check_array_bounds(&nav, view, &mut out);
        self.check_timestamp_validation(&nav, view, &mut out);
        self.check_address_validation(&nav, view, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(src: &str) -> Vec<Finding> {
        let view = SourceView::from_text(src.to_string(), "test.rs".into());
        InputValidationDetector::new().detect(&view)
    }

    #[test]
    fn flags_amount_param_without_zero_check() {
        let src = "pub fn bid(ctx: Context<Bid>, amount: u64) {\n    place(amount);\n}\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("NO_ZERO_CHECK_")));
    }

    #[test]
    fn flags_string_param_without_length_check() {
        let src = "pub fn create(ctx: Context<Create>, title: String) {\n    store(title);\n}\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("NO_STRING_LENGTH_")));
    }

    #[test]
    fn flags_index_without_bounds_check() {
        let src = "let item = items[idx];\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("NO_BOUNDS_CHECK_")));
    }

    #[test]
    fn literal_index_is_not_flagged() {
        let src = "let item = items[0];\n";
        let findings = detect(src);
        assert!(!findings.iter().any(|f| f.id.starts_with("NO_BOUNDS_CHECK_")));
    }

    #[test]
    fn flags_sensitive_pubkey_param_without_validation() {
        let src = "pub fn configure(ctx: Context<Configure>, treasury: Pubkey) {\n    set(treasury);\n}\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("NO_PUBKEY_VALIDATION_")));
    }
}
