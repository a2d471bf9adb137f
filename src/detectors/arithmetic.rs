//! # Arithmetic Detector
//!
//! @title Arithmetic Vulnerability Detector
//! @author Anchor Sentinel Static Analysis Team
//!
//! Flags unchecked arithmetic, division hazards, unsafe narrowing casts,
//! and fee-calculation overflow/cap issues.

use regex::Regex;

use super::utils::finding;
use super::Detector;
use crate::navigator::Navigator;
use crate::report::{Category, Finding, Severity};
use crate::source::SourceView;

const UNSAFE_CASTS: &[(&str, &str)] = &[
    ("u128", "u64"),
    ("u64", "u32"),
    ("u32", "u16"),
    ("u16", "u8"),
    ("i128", "i64"),
    ("i64", "i32"),
    ("i32", "i16"),
    ("i16", "i8"),
    ("usize", "u32"),
    ("usize", "u16"),
    ("usize", "u8"),
];

/// Detects unchecked math, division hazards, unsafe casts, and fee
/// calculation overflow/cap issues.
pub struct ArithmeticDetector {
    arithmetic_op: Regex,
    safe_op: Regex,
    expr: Regex,
    division: Regex,
    precision_a: Regex,
    precision_b: Regex,
    cast: Regex,
    fee_assignment: Regex,
}

impl ArithmeticDetector {
    pub fn new() -> Self {
        Self {
            arithmetic_op: Regex::new(r"\w+\s*[+\-*]\s*\w+").expect("static regex"),
            safe_op: Regex::new(r"\.checked_|\.saturating_|\.wrapping_").expect("static regex"),
            expr: Regex::new(r"(\w+)\s*([+\-*])\s*(\w+)").expect("static regex"),
            division: Regex::new(r"(\w+)\s*/\s*(\w+)").expect("static regex"),
            precision_a: Regex::new(r"\*\s*\w+\s*/\s*\d+").expect("static regex"),
            precision_b: Regex::new(r"/\s*\d+\s*\*").expect("static regex"),
            cast: Regex::new(r"(\w+)\s+as\s+(u\d+|i\d+|usize|isize)").expect("static regex"),
            fee_assignment: Regex::new(r"(?i)(?:fee|commission|royalty|bps|basis_points)\s*[=:]\s*([^;]+)")
                .expect("static regex"),
        }
    }

    fn check_unchecked_math(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for (idx, line) in nav.lines().iter().enumerate() {
            let line_num = idx + 1;
            if line.trim_start().starts_with("//") {
                continue;
            }
            if !self.arithmetic_op.is_match(line) {
                continue;
            }
            if self.safe_op.is_match(line) {
                continue;
            }
            if line.contains("checked!") || line.contains(".ok_or") {
                continue;
            }

            let context = nav.context(line_num, 2);
            let has_protection = ["checked_", "saturating_", "try_into", "as u64", "ok_or"]
                .iter()
                .any(|s| context.contains(s));

            if has_protection {
                continue;
            }

            let Some(caps) = self.expr.captures(line) else {
                continue;
            };
            let op = caps.get(2).unwrap().as_str();
            let (op_name, op_title, method) = match op {
                "*" => ("multiplication", "Multiplication", "mul"),
                "+" => ("addition", "Addition", "add"),
                "-" => ("subtraction", "Subtraction", "sub"),
                _ => ("arithmetic", "Arithmetic", "arithmetic"),
            };

            out.push(finding(
                format!("UNCHECKED_MATH_{line_num}"),
                format!("Unchecked {op_title}"),
                format!("Arithmetic operation without overflow protection on line {line_num}"),
                Severity::High,
                Category::Arithmetic,
                &view.path,
                Some(line_num),
                nav.enclosing_function(line_num),
                Some(context),
                format!("Use checked_{method}() or saturating_{method}()"),
                Some("CWE-190"),
            ));
            let _ = op_name;
        }
    }

    fn check_division_issues(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for caps in self.division.captures_iter(nav.text()) {
            let m = caps.get(0).unwrap();
            let denominator = caps.get(2).unwrap().as_str();
            let line_num = nav.line_of(m.start());
            let context = nav.snippet(line_num);

            if denominator != "0"
                && !context.contains(&format!("{denominator} == 0"))
                && !context.contains(&format!("{denominator} > 0"))
                && !context.contains("checked_div")
            {
                out.push(finding(
                    format!("DIV_ZERO_{line_num}"),
                    "Potential Division by Zero",
                    format!("Division by '{denominator}' without zero check"),
                    Severity::Medium,
                    Category::Arithmetic,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(context.clone()),
                    "Check divisor is non-zero or use checked_div()",
                    Some("CWE-369"),
                ));
            }

            if !context.contains('.')
                && !context.contains("as f")
                && (self.precision_a.is_match(&context) || self.precision_b.is_match(&context))
            {
                out.push(finding(
                    format!("PRECISION_LOSS_{line_num}"),
                    "Potential Precision Loss",
                    "Integer division may lose precision in fee/ratio calculation",
                    Severity::Low,
                    Category::Arithmetic,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(context),
                    "Consider order of operations to minimize precision loss",
                    Some("CWE-682"),
                ));
            }
        }
    }

    fn check_type_casting(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for caps in self.cast.captures_iter(nav.text()) {
            let m = caps.get(0).unwrap();
            let source = caps.get(1).unwrap().as_str();
            let target_type = caps.get(2).unwrap().as_str();
            let line_num = nav.line_of(m.start());
            let context = nav.snippet(line_num);

            if context.contains("try_into") {
                continue;
            }

            let source_lower = source.to_lowercase();
            for (large, small) in UNSAFE_CASTS {
                if *small != target_type {
                    continue;
                }
                if context.contains(large) || source_lower.contains("amount") || source_lower.contains("value") {
                    out.push(finding(
                        format!("UNSAFE_CAST_{line_num}"),
                        "Potentially Unsafe Type Cast",
                        format!("Cast to {target_type} may truncate larger values"),
                        Severity::Medium,
                        Category::Arithmetic,
                        &view.path,
                        Some(line_num),
                        nav.enclosing_function(line_num),
                        Some(context),
                        "Use try_into() with error handling instead of 'as'",
                        Some("CWE-681"),
                    ));
                    break;
                }
            }
        }
    }

    fn check_fee_calculations(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for caps in self.fee_assignment.captures_iter(nav.text()) {
            let m = caps.get(0).unwrap();
            let calculation = caps.get(1).unwrap().as_str();
            let line_num = nav.line_of(m.start());
            let context = nav.snippet(line_num);

            if (calculation.contains('*') || calculation.contains('/'))
                && !calculation.contains("checked_")
                && !calculation.contains("saturating_")
            {
                out.push(finding(
                    format!("FEE_OVERFLOW_{line_num}"),
                    "Fee Calculation Without Overflow Protection",
                    "Fee calculation may overflow with large amounts",
                    Severity::High,
                    Category::Arithmetic,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(context.clone()),
                    "Use checked arithmetic for fee calculations",
                    Some("CWE-190"),
                ));
            }

            let calc_lower = calculation.to_lowercase();
            if (calc_lower.contains("bps") || calculation.contains("10000") || calculation.contains("100"))
                && !context.contains("require!")
                && !context.contains('>')
                && !context.to_lowercase().contains("max")
            {
                out.push(finding(
                    format!("FEE_NO_CAP_{line_num}"),
                    "Fee Without Maximum Cap",
                    "Fee percentage may not be capped to prevent abuse",
                    Severity::Medium,
                    Category::Arithmetic,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(context),
                    "Add maximum fee validation (e.g., require!(fee_bps <= 1000))",
                    Some("CWE-20"),
                ));
            }
        }
    }
}

impl Detector for ArithmeticDetector {
    fn name(&self) -> &'static str {
        "ArithmeticDetector"
    }

    fn detect(&self, view: &SourceView) -> Vec<Finding> {
        let nav = Navigator::new(view);
        let mut out = Vec::new();
        self.check_unchecked_math(&nav, view, &mut out);
        self.check_division_issues(&nav, view, &mut out);
        self.check_type_casting(&nav, view, &mut out);
        self.check_fee_calculations(&nav, view, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(src: &str) -> Vec<Finding> {
        let view = SourceView::from_text(src.to_string(), "test.rs".into());
        ArithmeticDetector::new().detect(&view)
    }

    #[test]
    fn flags_unchecked_addition() {
        let src = "let total = balance + deposit;\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("UNCHECKED_MATH_")));
    }

    #[test]
    fn checked_add_is_clean() {
        let src = "let total = balance.checked_add(deposit).ok_or(Error)?;\n";
        let findings = detect(src);
        assert!(!findings.iter().any(|f| f.id.starts_with("UNCHECKED_MATH_")));
    }

    #[test]
    fn flags_division_without_zero_check() {
        let src = "let share = amount / divisor;\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("DIV_ZERO_")));
    }

    #[test]
    fn flags_unsafe_narrowing_cast_of_amount() {
        let src = "let small = amount as u32;\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("UNSAFE_CAST_")));
    }

    #[test]
    fn flags_fee_overflow_without_checked_math() {
        let src = "let fee = amount * bps / 10000;\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("FEE_OVERFLOW_")));
    }

    #[test]
    fn flags_fee_without_cap() {
        let src = "let fee_bps = new_bps;\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("FEE_NO_CAP_")));
    }
}
