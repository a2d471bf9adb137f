//! # Account Validation Detector
//!
//! @title Account-Validation Vulnerability Detector
//! @author Anchor Sentinel Static Analysis Team
//!
//! Checks Anchor account declarations for missing signer constraints,
//! unverified owners, weak or bump-less PDA derivation, absent `has_one`
//! relationships, missing discriminator checks, and missing rent
//! exemption on `init`.

use fancy_regex::Regex as FancyRegex;
use regex::Regex;

use super::utils::finding;
use super::Detector;
use crate::navigator::Navigator;
use crate::report::{Category, Finding, Severity};
use crate::source::SourceView;

const SENSITIVE_NAMES: &[&str] = &["admin", "authority", "owner", "seller", "buyer", "user"];
const SKIP_NAMES: &[&str] = &["system_program", "rent", "clock", "token_program", "associated_token"];

/// Detects missing signer/owner/PDA/relationship/discriminator/rent-exemption
/// safeguards on Anchor account declarations.
pub struct AccountValidationDetector {
    signer_field: Regex,
    account_info_field: Regex,
    simple_seed: Regex,
    missing_bump: FancyRegex,
    accounts_struct: FancyRegex,
    manual_deserialize: Regex,
    rent_init: Regex,
}

impl AccountValidationDetector {
    pub fn new() -> Self {
        Self {
            signer_field: Regex::new(r"#\[account\(([^)]*)\)\]\s*pub\s+(\w+):\s*(?:Signer|AccountInfo)")
                .expect("static regex"),
            account_info_field: Regex::new(r"pub\s+(\w+):\s*AccountInfo<'info>").expect("static regex"),
            simple_seed: Regex::new(r#"seeds\s*=\s*\[\s*b"(\w+)"\s*\]"#).expect("static regex"),
            missing_bump: FancyRegex::new(r"(?s)seeds\s*=\s*\[[^\]]+\](?![^}]*bump)").expect("static regex"),
            accounts_struct: FancyRegex::new(r"(?s)#\[derive\(Accounts\)\]\s*pub\s+struct\s+(\w+)[^{]*\{([^}]+)\}")
                .expect("static regex"),
            manual_deserialize: Regex::new(r"\.try_borrow_data\(\)|\.data\.borrow\(\)").expect("static regex"),
            rent_init: Regex::new(r"#\[account\(\s*init\s*,").expect("static regex"),
        }
    }

    fn check_missing_signer(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for caps in self.signer_field.captures_iter(nav.text()) {
            let m = caps.get(0).unwrap();
            let constraints = caps.get(1).unwrap().as_str();
            let account_name = caps.get(2).unwrap().as_str();
            let account_lower = account_name.to_lowercase();

            if SENSITIVE_NAMES.iter().any(|n| account_lower.contains(n))
                && !constraints.to_lowercase().contains("signer")
                && !m.as_str().contains("Signer")
            {
                let line_num = nav.line_of(m.start());
                out.push(finding(
                    format!("MISSING_SIGNER_{line_num}"),
                    "Missing Signer Constraint",
                    format!(
                        "Account '{account_name}' appears to be a privileged account but may not verify signature"
                    ),
                    Severity::High,
                    Category::AccountValidation,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(nav.snippet(line_num)),
                    "Add #[account(signer)] or use Signer<'info> type",
                    Some("CWE-285"),
                ));
            }
        }
    }

    fn check_missing_owner(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();
        for caps in self.account_info_field.captures_iter(text) {
            let m = caps.get(0).unwrap();
            let account_name = caps.get(1).unwrap().as_str();
            let account_lower = account_name.to_lowercase();

            if SKIP_NAMES.iter().any(|s| account_lower.contains(s)) {
                continue;
            }

            let context_start = m.start().saturating_sub(500);
            let context_end = (m.end() + 500).min(text.len());
            let context = &text[context_start..context_end];

            if !context.contains(&format!("{account_name}.owner")) && !context.contains("owner =") {
                let line_num = nav.line_of(m.start());
                out.push(finding(
                    format!("MISSING_OWNER_{line_num}"),
                    "Missing Account Owner Check",
                    format!("AccountInfo '{account_name}' used without owner validation"),
                    Severity::Critical,
                    Category::AccountValidation,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(nav.snippet(line_num)),
                    "Use Account<T> wrapper or verify owner manually",
                    Some("CWE-284"),
                ));
            }
        }
    }

    fn check_unsafe_pda(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();

        for caps in self.simple_seed.captures_iter(text) {
            let m = caps.get(0).unwrap();
            let seed = caps.get(1).unwrap().as_str();
            if seed.len() < 5 {
                let line_num = nav.line_of(m.start());
                out.push(finding(
                    format!("SIMPLE_PDA_SEED_{line_num}"),
                    "Simple PDA Seed Pattern",
                    format!("PDA seed '{seed}' is short and may cause collisions"),
                    Severity::Medium,
                    Category::AccountValidation,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(nav.snippet(line_num)),
                    "Use longer, more descriptive seed prefixes with multiple components",
                    Some("CWE-330"),
                ));
            }
        }

        let mut pos = 0;
        while let Ok(Some(m)) = self.missing_bump.find_from_pos(text, pos) {
            let start = m.start();
            pos = m.end().max(start + 1);
            let context_start = start.saturating_sub(200);
            let preceding = &text[context_start..start];
            if preceding.contains("init") || preceding.contains("seeds") {
                let line_num = nav.line_of(start);
                out.push(finding(
                    format!("MISSING_BUMP_{line_num}"),
                    "Missing Bump Seed",
                    "PDA derivation without explicit bump seed",
                    Severity::Low,
                    Category::AccountValidation,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(nav.snippet(line_num)),
                    "Include bump seed in PDA derivation for consistency",
                    Some("CWE-330"),
                ));
            }
        }
    }

    fn check_missing_has_one(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();
        let mut pos = 0;
        while let Ok(Some(caps)) = self.accounts_struct.captures_from_pos(text, pos) {
            let m = caps.get(0).unwrap();
            pos = m.end().max(m.start() + 1);
            let struct_name = caps.get(1).unwrap().as_str().to_string();
            let struct_body = caps.get(2).unwrap().as_str();
            let body_lower = struct_body.to_lowercase();

            let has_seller = body_lower.contains("seller");
            let has_buyer = body_lower.contains("buyer");
            let has_admin = body_lower.contains("admin");
            let has_listing = body_lower.contains("listing");
            let has_has_one = struct_body.contains("has_one");

            if (has_seller || has_buyer || has_admin) && has_listing && !has_has_one {
                let line_num = nav.line_of(m.start());
                out.push(finding(
                    format!("MISSING_HAS_ONE_{line_num}"),
                    "Missing has_one Relationship",
                    format!("Struct '{struct_name}' has related accounts without has_one constraint"),
                    Severity::High,
                    Category::AccountValidation,
                    &view.path,
                    Some(line_num),
                    Some(struct_name),
                    Some(nav.context(line_num, 5)),
                    "Add has_one = listing or similar constraints to verify relationships",
                    Some("CWE-285"),
                ));
            }
        }
    }

    fn check_account_type_validation(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for m in self.manual_deserialize.find_iter(nav.text()) {
            let line_num = nav.line_of(m.start());
            let context = nav.snippet(line_num);

            if !context.to_lowercase().contains("discriminator") {
                out.push(finding(
                    format!("MISSING_DISCRIMINATOR_{line_num}"),
                    "Missing Account Discriminator Check",
                    "Manual account deserialization without discriminator verification",
                    Severity::High,
                    Category::AccountValidation,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(context),
                    "Verify account discriminator before deserializing",
                    Some("CWE-20"),
                ));
            }
        }
    }

    fn check_rent_exemption(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        let text = nav.text();
        for m in self.rent_init.find_iter(text) {
            let Some(rel_end) = text[m.end()..].find(')') else {
                continue;
            };
            let constraint_block = &text[m.start()..m.end() + rel_end];

            if !constraint_block.contains("rent_exempt") {
                let line_num = nav.line_of(m.start());
                out.push(finding(
                    format!("NO_RENT_EXEMPT_{line_num}"),
                    "Missing Rent Exemption",
                    "Account initialization without rent_exempt constraint",
                    Severity::Medium,
                    Category::AccountValidation,
                    &view.path,
                    Some(line_num),
                    nav.enclosing_function(line_num),
                    Some(nav.snippet(line_num)),
                    "Add rent_exempt = \"enforce\" to init constraint",
                    Some("CWE-400"),
                ));
            }
        }
    }
}

impl Detector for AccountValidationDetector {
    fn name(&self) -> &'static str {
        "AccountValidationDetector"
    }

    fn detect(&self, view: &SourceView) -> Vec<Finding> {
        let nav = Navigator::new(view);
        let mut out = Vec::new();
        self.check_missing_signer(&nav, view, &mut out);
        self.check_missing_owner(&nav, view, &mut out);
        self.check_unsafe_pda(&nav, view, &mut out);
        self.check_missing_has_one(&nav, view, &mut out);
        self.check_account_type_validation(&nav, view, &mut out);
        self.check_rent_exemption(&nav, view, &mut out);
        out
    }
}
