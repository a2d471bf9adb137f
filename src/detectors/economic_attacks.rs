//! # Economic Attack Detector
//!
//! @title Economic-Attack Vulnerability Detector
//! @author Anchor Sentinel Static Analysis Team
//!
//! Flags fund-extraction and manipulation surfaces: double withdrawal,
//! auction sniping, fee-locking gaps, unguarded transfers and
//! check-effects-interactions violations, and weak escrow release
//! conditions.

use regex::Regex;

use super::utils::finding;
use super::Detector;
use crate::navigator::Navigator;
use crate::report::{Category, Finding, Severity};
use crate::source::SourceView;

const STATUS_CHECK_TOKENS: &[&str] = &["claimed", "processed", "withdrawn", "completed", "status ==", "is_some()", ".is_none()"];
const STATUS_UPDATE_TOKENS: &[&str] =
    &["claimed = true", "processed = true", "withdrawn = true", "status =", "close ="];
const ANTI_SNIPE_TOKENS: &[&str] =
    &["auction_end", "extend", "time_extension", "ANTI_SNIPE", "EXTENSION", "+ 900", "+ 15"];
const BALANCE_CHECK_TOKENS: &[&str] = &["lamports() >=", "lamports() >", "balance >=", "sufficient"];
const ESCROW_CONDITIONS: &[&str] = &["status", "verified", "confirmed", "grace_period", "deadline"];

/// Detects double-withdrawal, anti-sniping, fee-locking, fund-extraction,
/// reentrancy, and weak escrow release vulnerabilities.
pub struct EconomicAttackDetector {
    withdraw_fn: Regex,
    auction_fn: Regex,
    fee_reference: Regex,
    fee_locked: Regex,
    fee_setter: Regex,
    transfer_site: Regex,
    reentrancy_followup: Regex,
    escrow_marker: Regex,
    release_fn: Regex,
}

impl EconomicAttackDetector {
    pub fn new() -> Self {
        Self {
            withdraw_fn: Regex::new(r"(?s)fn\s+(withdraw|claim|redeem)\w*\s*\([^)]*\)[^{]*\{([^}]+(?:\{[^}]*\}[^}]*)*)\}")
                .expect("static regex"),
            auction_fn: Regex::new(r"(?s)fn\s+(place_bid|submit_bid|bid)\s*\([^)]*\)[^{]*\{([^}]+(?:\{[^}]*\}[^}]*)*)\}")
                .expect("static regex"),
            fee_reference: Regex::new(r"(?i)platform_fee|dispute_fee|fee_bps|commission").expect("static regex"),
            fee_locked: Regex::new(r"(?i)locked_.*fee|fee.*locked|\.locked_").expect("static regex"),
            fee_setter: Regex::new(r"(?i)fn\s+set_.*fee|fn\s+update_.*fee|\.fee.*=\s*\d+").expect("static regex"),
            transfer_site: Regex::new(r"\*\*.*lamports\(\).*\?\s*[+\-]=|transfer\s*\(|\.sub\(.*lamports")
                .expect("static regex"),
            reentrancy_followup: Regex::new(r"(?s)\?;\s*\n.*\.\w+\s*=").expect("static regex"),
            escrow_marker: Regex::new(r"(?i)struct\s+Escrow|escrow.*locked|locked.*amount").expect("static regex"),
            release_fn: Regex::new(r"(?i)fn\s+(release|finalize|complete)\w*\s*\([^)]*\)[^{]*\{").expect("static regex"),
        }
    }

    fn check_double_withdrawal(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for caps in self.withdraw_fn.captures_iter(nav.text()) {
            let m = caps.get(0).unwrap();
            let fn_name = caps.get(1).unwrap().as_str();
            let fn_body = caps.get(2).unwrap().as_str().to_lowercase();
            let line_num = nav.line_of(m.start());

            let has_status_check = STATUS_CHECK_TOKENS.iter().any(|t| fn_body.contains(t));
            let has_status_update = STATUS_UPDATE_TOKENS.iter().any(|t| fn_body.contains(t));

            if !has_status_check || !has_status_update {
                out.push(finding(
                    format!("DOUBLE_WITHDRAW_{line_num}"),
                    "Potential Double Withdrawal",
                    format!("Function '{fn_name}' may allow multiple claims"),
                    Severity::Critical,
                    Category::EconomicAttacks,
                    &view.path,
                    Some(line_num),
                    Some(fn_name.to_string()),
                    Some(nav.context(line_num, 8)),
                    "Mark withdrawal as claimed before transfer and verify status on entry",
                    Some("CWE-367"),
                ));
            }
        }
    }

    fn check_front_running(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for caps in self.auction_fn.captures_iter(nav.text()) {
            let m = caps.get(0).unwrap();
            let fn_name = caps.get(1).unwrap().as_str();
            let fn_body = caps.get(2).unwrap().as_str();
            let line_num = nav.line_of(m.start());

            let has_anti_sniping = ANTI_SNIPE_TOKENS.iter().any(|t| fn_body.contains(t));

            if !has_anti_sniping {
                out.push(finding(
                    format!("NO_ANTI_SNIPE_{line_num}"),
                    "Missing Anti-Sniping Protection",
                    "Auction bid function lacks anti-sniping time extension",
                    Severity::Medium,
                    Category::EconomicAttacks,
                    &view.path,
                    Some(line_num),
                    Some(fn_name.to_string()),
                    Some(nav.snippet(line_num)),
                    "Extend auction by 15 minutes when bid placed near end",
                    Some("CWE-362"),
                ));
            }
        }
    }

    fn check_fee_manipulation(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();

        if let Some(m) = self.fee_reference.find(text) {
            if !self.fee_locked.is_match(text) {
                let line_num = nav.line_of(m.start());
                out.push(finding(
                    "FEE_NOT_LOCKED",
                    "Fees Not Locked at Creation",
                    "Fees may be changed between listing creation and settlement",
                    Severity::High,
                    Category::EconomicAttacks,
                    &view.path,
                    Some(line_num),
                    None,
                    Some(nav.snippet(line_num)),
                    "Lock fee rates at listing creation time to prevent manipulation",
                    Some("CWE-682"),
                ));
            }
        }

        for m in self.fee_setter.find_iter(text) {
            let line_num = nav.line_of(m.start());
            let context = nav.context(line_num, 5);

            if !context.contains("MAX_") && !context.contains("<=") && !context.contains("require!") {
                out.push(finding(
                    format!("NO_FEE_CAP_{line_num}"),
                    "Fee Change Without Cap",
                    "Fee can be set without maximum limit",
                    Severity::Medium,
                    Category::EconomicAttacks,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(context),
                    "Add require!(new_fee <= MAX_FEE) to prevent excessive fees",
                    Some("CWE-20"),
                ));
            }
        }
    }

    fn check_fund_extraction(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();
        for m in self.transfer_site.find_iter(text) {
            let line_num = nav.line_of(m.start());
            let context = nav.context(line_num, 8);
            let fn_name = nav.enclosing_function(line_num);

            let has_balance_check = BALANCE_CHECK_TOKENS.iter().any(|t| context.contains(t));

            if !has_balance_check {
                out.push(finding(
                    format!("NO_BALANCE_CHECK_{line_num}"),
                    "Transfer Without Balance Check",
                    "Fund transfer without verifying sufficient balance",
                    Severity::Critical,
                    Category::EconomicAttacks,
                    &view.path,
                    Some(line_num),
                    fn_name.clone(),
                    Some(context.clone()),
                    "Verify account has sufficient balance before transfer",
                    Some("CWE-20"),
                ));
            }

            let end = (m.start() + 500).min(text.len());
            let following = &text[m.start()..end];
            if self.reentrancy_followup.is_match(following) {
                out.push(finding(
                    format!("REENTRANCY_{line_num}"),
                    "Potential Reentrancy",
                    "State modified after external transfer call",
                    Severity::High,
                    Category::EconomicAttacks,
                    &view.path,
                    Some(line_num),
                    fn_name,
                    Some(context),
                    "Update state before making transfers (Checks-Effects-Interactions)",
                    Some("CWE-841"),
                ));
            }
        }
    }

    fn check_escrow_security(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();
        if !self.escrow_marker.is_match(text) {
            return;
        }

        for caps in self.release_fn.captures_iter(text) {
            let m = caps.get(0).unwrap();
            let fn_name = caps.get(1).unwrap().as_str();
            let line_num = nav.line_of(m.start());

            let Some(rel_end) = text[m.start()..].find("\n}\n") else {
                continue;
            };
            let fn_body = &text[m.start()..m.start() + rel_end];
            let body_lower = fn_body.to_lowercase();

            let condition_count = ESCROW_CONDITIONS.iter().filter(|c| body_lower.contains(*c)).count();

            if condition_count < 2 {
                out.push(finding(
                    format!("WEAK_ESCROW_RELEASE_{line_num}"),
                    "Weak Escrow Release Conditions",
                    "Escrow may be released without sufficient verification",
                    Severity::High,
                    Category::EconomicAttacks,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num).or_else(|| Some(fn_name.to_string())),
                    Some(nav.context(line_num, 5)),
                    "Add multiple conditions: verification, grace period, status checks",
                    Some("CWE-284"),
                ));
            }
        }
    }
}

impl Detector for EconomicAttackDetector {
    fn name(&self) -> &'static str {
        "EconomicAttackDetector"
    }

    fn detect(&self, view: &SourceView) -> Vec<Finding> {
        let nav = Navigator::new(view);
        let mut out = Vec::new();
        self.check_double_withdrawal(&nav, view, &mut out);
        self.check_front_running(&nav, view, &mut out);
        self.check_fee_manipulation(&nav, view, &mut out);
        self.check_fund_extraction(&nav, view, &mut out);
        self.check_escrow_security(&nav, view, &mut out);
        out
    }
}
