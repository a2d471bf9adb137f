//! # State Manipulation Detector
//!
//! @title State-Manipulation Vulnerability Detector
//! @author Anchor Sentinel Static Analysis Team
//!
//! Flags unchecked enum-status transitions, time-of-check/time-of-use
//! patterns, missing expiry checks on time-sensitive operations,
//! unverified account closure, and denial-of-service surfaces from
//! unbounded loops and vectors.

use fancy_regex::Regex as FancyRegex;
use regex::Regex;

use super::utils::finding;
use super::Detector;
use crate::navigator::Navigator;
use crate::report::{Category, Finding, Severity};
use crate::source::SourceView;

const EXPIRY_SENSITIVE_FNS: &[&str] = &["bid", "offer", "settle", "claim", "finalize"];
const TIME_SENSITIVE_TOKENS: &[&str] = &[
    "Clock::get", "current_time", "unix_timestamp", "expired", "deadline", "end_time",
    "< now", "> now", "<= now", ">= now",
];
const ESCROW_LIKE_TOKENS: &[&str] = &["escrow", "secret"];

/// Detects unchecked status transitions, TOCTOU patterns, missing expiry
/// checks, unverified account closure, and DoS-prone loops/vectors.
pub struct StateManipulationDetector {
    status_enum: Regex,
    toctou: FancyRegex,
    close_attr: Regex,
    for_loop: Regex,
    vec_field: Regex,
}

impl StateManipulationDetector {
    pub fn new() -> Self {
        Self {
            status_enum: Regex::new(r"(?s)enum\s+(\w*Status\w*)\s*\{([^}]+)\}").expect("static regex"),
            toctou: FancyRegex::new(r"(?s)if\s+.*(\w+)\.(\w+)[^{]*\{[^}]*\1\.\2").expect("static regex"),
            close_attr: Regex::new(r"close\s*=\s*(\w+)").expect("static regex"),
            for_loop: Regex::new(r"for\s+\w+\s+in\s+(\w+)(?:\.iter\(\))?").expect("static regex"),
            vec_field: Regex::new(r"pub\s+(\w+):\s*Vec<([^>]+)>").expect("static regex"),
        }
    }

    fn check_state_transitions(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();

        for enum_caps in self.status_enum.captures_iter(text) {
            let enum_name = enum_caps.get(1).unwrap().as_str();

            let change_pattern =
                Regex::new(&format!(r"\.status\s*=\s*{enum_name}::(\w+)")).expect("dynamic regex");
            let match_arm = Regex::new(&format!(r"(?i){enum_name}::\w+\s*=>\s*{enum_name}::(\w+)"))
                .expect("dynamic regex");
            let equality_check = Regex::new(&format!(r"(?i)\.status\s*==\s*{enum_name}::\w+")).expect("dynamic regex");
            let match_expr = Regex::new(r"(?i)match\s+.*\.status").expect("dynamic regex");
            let require_status = Regex::new(r"(?i)require!.*status").expect("dynamic regex");

            for change_m in change_pattern.captures_iter(text) {
                let m = change_m.get(0).unwrap();
                let new_status = change_m.get(1).unwrap().as_str();
                let line_num = nav.line_of(m.start());
                let context = nav.context(line_num, 5);
                let fn_name = nav.enclosing_function(line_num);

                let specific_arm = Regex::new(&format!(r"(?i){enum_name}::\w+\s*=>\s*{enum_name}::{new_status}"))
                    .expect("dynamic regex");

                let has_validation = specific_arm.is_match(&context)
                    || match_arm.is_match(&context)
                    || equality_check.is_match(&context)
                    || match_expr.is_match(&context)
                    || require_status.is_match(&context);

                if !has_validation {
                    out.push(finding(
                        format!("INVALID_STATE_TRANSITION_{line_num}"),
                        "Unchecked State Transition",
                        format!("Status changed to {new_status} without validating current state"),
                        Severity::High,
                        Category::StateManipulation,
                        &view.path,
                        Some(line_num),
                        fn_name,
                        Some(context),
                        format!("Verify current status before changing to {new_status}"),
                        Some("CWE-372"),
                    ));
                }
            }
        }
    }

    fn check_race_conditions(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();
        let mut pos = 0;
        while let Ok(Some(m)) = self.toctou.find_from_pos(text, pos) {
            let start = m.start();
            pos = m.end().max(start + 1);
            let line_num = nav.line_of(start);
            out.push(finding(
                format!("POTENTIAL_TOCTOU_{line_num}"),
                "Potential Time-of-Check to Time-of-Use",
                "Value checked then used separately - may be vulnerable to race condition",
                Severity::Low,
                Category::StateManipulation,
                &view.path,
                Some(line_num),
                nav.enclosing_function(line_num),
                Some(nav.context(line_num, 5)),
                "Consider using atomic operations or mutex patterns",
                Some("CWE-367"),
            ));
        }
    }

    fn check_expired_state(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();
        for fn_substr in EXPIRY_SENSITIVE_FNS {
            let fn_pattern =
                Regex::new(&format!(r"(?is)fn\s+\w*{fn_substr}\w*\s*\([^)]*\)[^{{]*\{{([^}}]+(?:\{{[^}}]*\}}[^}}]*)*)\}}"))
                    .expect("dynamic regex");

            for caps in fn_pattern.captures_iter(text) {
                let m = caps.get(0).unwrap();
                let fn_body = caps.get(1).unwrap().as_str();
                let line_num = nav.line_of(m.start());
                let fn_name = nav.enclosing_function(line_num);

                let has_time_check = TIME_SENSITIVE_TOKENS.iter().any(|t| fn_body.contains(t));

                if !has_time_check {
                    let display_name = fn_name.clone().unwrap_or_else(|| (*fn_substr).to_string());
                    out.push(finding(
                        format!("NO_EXPIRY_CHECK_{line_num}"),
                        format!("Missing Expiry Check in {display_name}"),
                        "Time-sensitive operation without expiry validation",
                        Severity::High,
                        Category::StateManipulation,
                        &view.path,
                        Some(line_num),
                        fn_name,
                        Some(nav.context(line_num, 5)),
                        "Add time check: require!(current_time < deadline)",
                        Some("CWE-367"),
                    ));
                }
            }
        }
    }

    fn check_account_closure(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();
        for caps in self.close_attr.captures_iter(text) {
            let m = caps.get(0).unwrap();
            let recipient = caps.get(1).unwrap().as_str();
            let line_num = nav.line_of(m.start());
            let context = nav.context(line_num, 5);

            if !context.contains("has_one") && !context.contains("constraint") {
                out.push(finding(
                    format!("UNVERIFIED_CLOSE_{line_num}"),
                    "Account Close Without Relationship Check",
                    format!("Account closed to '{recipient}' without verifying relationship"),
                    Severity::Medium,
                    Category::StateManipulation,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(context.clone()),
                    "Add has_one constraint to verify recipient",
                    Some("CWE-672"),
                ));
            }

            let Some(fn_name) = nav.enclosing_function(line_num) else {
                continue;
            };
            let fn_pattern =
                Regex::new(&format!(r"(?s)fn\s+{fn_name}\s*\([^)]*\)[^{{]*\{{([^}}]+(?:\{{[^}}]*\}}[^}}]*)*)\}}"))
                    .expect("dynamic regex");
            let Some(fn_caps) = fn_pattern.captures(text) else {
                continue;
            };
            let fn_body = fn_caps.get(1).unwrap().as_str();

            if !fn_body.contains(".data.borrow_mut().fill(0)")
                && !fn_body.to_lowercase().contains("zero")
                && ESCROW_LIKE_TOKENS.iter().any(|t| context.to_lowercase().contains(t))
            {
                out.push(finding(
                    format!("DATA_NOT_ZEROED_{line_num}"),
                    "Account Data Not Zeroed Before Close",
                    "Account closed without zeroing potentially sensitive data",
                    Severity::Low,
                    Category::StateManipulation,
                    &view.path,
                    Some(line_num),
                    Some(fn_name),
                    Some(context),
                    "Zero sensitive data before closing account",
                    Some("CWE-212"),
                ));
            }
        }
    }

    fn check_dos_vectors(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();

        for caps in self.for_loop.captures_iter(text) {
            let m = caps.get(0).unwrap();
            let iterable = caps.get(1).unwrap().as_str();
            let line_num = nav.line_of(m.start());
            let context = nav.context(line_num, 3);

            if !context.contains(".take(")
                && !context.contains("MAX_")
                && (text.contains("Vec") || iterable.ends_with('s'))
            {
                out.push(finding(
                    format!("UNBOUNDED_LOOP_{line_num}"),
                    "Potentially Unbounded Loop",
                    format!("Loop over '{iterable}' without explicit bounds"),
                    Severity::Medium,
                    Category::StateManipulation,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(context),
                    "Add .take(MAX_ITERATIONS) or validate collection size",
                    Some("CWE-400"),
                ));
            }
        }

        for caps in self.vec_field.captures_iter(text) {
            let m = caps.get(0).unwrap();
            let field_name = caps.get(1).unwrap().as_str();
            let line_num = nav.line_of(m.start());

            let context_before_start = m.start().saturating_sub(200);
            let context_before = &text[context_before_start..m.start()];

            if !context_before.contains("max_len") && !context_before.contains("MAX_") {
                out.push(finding(
                    format!("UNBOUNDED_VEC_{line_num}"),
                    "Unbounded Vector Field",
                    format!("Vector field '{field_name}' has no maximum length constraint"),
                    Severity::Medium,
                    Category::StateManipulation,
                    &view.path,
                    Some(line_num),
                    None,
                    Some(nav.context(line_num, 2)),
                    "Add #[max_len(N)] or enforce size limits on push operations",
                    Some("CWE-400"),
                ));
            }
        }
    }
}

impl Detector for StateManipulationDetector {
    fn name(&self) -> &'static str {
        "StateManipulationDetector"
    }

    fn detect(&self, view: &SourceView) -> Vec<Finding> {
        let nav = Navigator::new(view);
        let mut out = Vec::new();
        self.check_state_transitions(&nav, view, &mut out);
        self.check_race_conditions(&nav, view, &mut out);
        self.check_expired_state(&nav, view, &mut out);
        self.check_account_closure(&nav, view, &mut out);
        self.check_dos_vectors(&nav, view, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(src: &str) -> Vec<Finding> {
        let view = SourceView::from_text(src.to_string(), "test.rs".into());
        StateManipulationDetector::new().detect(&view)
    }

    #[test]
    fn flags_unchecked_status_transition() {
        let src = "enum ListingStatus {\n    Open,\n    Closed,\n}\nfn close(ctx: Context<Close>) {\n    ctx.accounts.listing.status = ListingStatus::Closed;\n}\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("INVALID_STATE_TRANSITION_")));
    }

    #[test]
    fn flags_toctou_pattern() {
        let src = "fn check(ctx: Context<Check>) {\n    if thing.flag {\n        use_it(thing.flag);\n    }\n}\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("POTENTIAL_TOCTOU_")));
    }

    #[test]
    fn flags_missing_expiry_check_in_claim() {
        let src = "pub fn claim(ctx: Context<Claim>) {\n    transfer(amount);\n}\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("NO_EXPIRY_CHECK_")));
    }

    #[test]
    fn flags_close_without_relationship_check() {
        let src = "#[account(mut, close = recipient)]\npub vault: Account<'info, Vault>,\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("UNVERIFIED_CLOSE_")));
    }

    #[test]
    fn flags_unbounded_loop_over_plural_vec() {
        let src = "let bids: Vec<Bid> = vec![];\nfor bid in bids {\n    process(bid);\n}\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("UNBOUNDED_LOOP_")));
    }

    #[test]
    fn flags_unbounded_vec_field() {
        let src = "pub struct Auction {\n    pub bids: Vec<Bid>,\n}\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("UNBOUNDED_VEC_")));
    }
}
