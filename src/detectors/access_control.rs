//! # Access Control Detector
//!
//! @title Access-Control Vulnerability Detector
//! @author Anchor Sentinel Static Analysis Team
//!
//! Looks for administrative entry points and privileged-field assignments
//! that lack the access-control safeguards Anchor/Solana programs are
//! expected to carry: authority checks, timelocks, and a pause switch.

use regex::Regex;

use super::utils::finding;
use super::Detector;
use crate::navigator::Navigator;
use crate::report::{Category, Finding, Severity};
use crate::source::SourceView;

const SENSITIVE_PAUSE_FNS: &[&str] =
    &["place_bid", "buy_now", "create_listing", "make_offer", "accept_offer"];

/// Detects missing authority checks, unguarded privilege assignment,
/// timelock bypasses, and absent pause mechanisms.
pub struct AccessControlDetector {
    admin_fn_patterns: Vec<Regex>,
    privilege_patterns: Vec<Regex>,
    timelock_marker: Regex,
    admin_assignment: Regex,
    execute_fn: Regex,
    time_check: Vec<Regex>,
    pause_marker: Regex,
    funds_marker: Regex,
    require_admin: Regex,
}

impl AccessControlDetector {
    pub fn new() -> Self {
        let admin_fn_patterns = [
            r"fn\s+(set_(?:admin|treasury|fee|paused?))",
            r"fn\s+(update_(?:admin|config|settings?))",
            r"fn\s+(change_(?:admin|owner|authority))",
            r"fn\s+(propose_(?:admin|treasury)_change)",
            r"fn\s+(execute_(?:admin|treasury)_change)",
            r"fn\s+(resolve_dispute)",
            r"fn\s+(emergency_\w+)",
            r"fn\s+(withdraw_(?:all|treasury|platform))",
        ]
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("static regex"))
        .collect();

        let privilege_patterns = [r"\.admin\s*=\s*[^;]+", r"\.authority\s*=\s*[^;]+", r"\.owner\s*=\s*[^;]+"]
            .iter()
            .map(|p| Regex::new(p).expect("static regex"))
            .collect();

        Self {
            admin_fn_patterns,
            privilege_patterns,
            timelock_marker: Regex::new(r"(?i)timelock|time_lock|pending_.*_change|execute_.*_change")
                .expect("static regex"),
            admin_assignment: Regex::new(r"\.admin\s*=|\.treasury\s*=").expect("static regex"),
            execute_fn: Regex::new(r"(?i)fn\s+(execute_\w+_change|execute_timelock)").expect("static regex"),
            time_check: [r"(?i)Clock::get", r"(?i)current_time", r"(?i)unix_timestamp", r"(?i)timelock.*<|>.*timelock"]
                .iter()
                .map(|p| Regex::new(p).expect("static regex"))
                .collect(),
            pause_marker: Regex::new(r"(?i)paused|is_paused|set_paused").expect("static regex"),
            funds_marker: Regex::new(r"(?i)transfer|lamports|escrow").expect("static regex"),
            require_admin: Regex::new(r"(?i)require!.*admin").expect("static regex"),
        }
    }

    /// Extracts the function body from its header to the next `\n    }\n`,
    /// falling back to `\n}\n`. Returns `None` if neither terminator is found.
    fn function_body<'a>(text: &'a str, start: usize) -> Option<&'a str> {
        if let Some(rel) = text[start..].find("\n    }\n") {
            return Some(&text[start..start + rel]);
        }
        text[start..].find("\n}\n").map(|rel| &text[start..start + rel])
    }

    fn check_admin_functions(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for pattern in &self.admin_fn_patterns {
            for caps in pattern.captures_iter(nav.text()) {
                let m = caps.get(0).unwrap();
                let fn_name = caps.get(1).unwrap().as_str().to_string();
                let line_num = nav.line_of(m.start());

                let Some(fn_body) = Self::function_body(nav.text(), m.start()) else {
                    continue;
                };

                let has_admin_check = fn_body.contains("has_one = admin")
                    || fn_body.contains(".admin ==")
                    || fn_body.contains("constraint = market_config.admin")
                    || self.require_admin.is_match(fn_body)
                    || fn_body.contains("admin: Signer");

                if !has_admin_check {
                    out.push(finding(
                        format!("NO_ADMIN_CHECK_{line_num}"),
                        "Admin Function Without Authority Check",
                        format!("Function '{fn_name}' may be missing admin verification"),
                        Severity::Critical,
                        Category::AccessControl,
                        &view.path,
                        Some(line_num),
                        Some(fn_name),
                        Some(nav.context(line_num, 5)),
                        "Add has_one = admin constraint or verify ctx.accounts.admin == config.admin",
                        Some("CWE-862"),
                    ));
                }
            }
        }
    }

    fn check_privilege_escalation(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        for pattern in &self.privilege_patterns {
            for m in pattern.find_iter(nav.text()) {
                let line_num = nav.line_of(m.start());
                let context = nav.context(line_num, 5);
                let fn_name = nav.enclosing_function(line_num);

                let has_protection = context.to_lowercase().contains("timelock")
                    || context.contains("has_one = admin")
                    || context.contains("pending_")
                    || fn_name.as_deref().map(|n| n.to_lowercase().contains("propose")).unwrap_or(false);

                if !has_protection && !context.to_lowercase().contains("init") {
                    out.push(finding(
                        format!("PRIV_ESCALATION_{line_num}"),
                        "Potential Privilege Escalation",
                        "Admin/authority assignment without timelock or verification",
                        Severity::High,
                        Category::AccessControl,
                        &view.path,
                        Some(line_num),
                        fn_name,
                        Some(context),
                        "Implement timelock for sensitive admin changes",
                        Some("CWE-269"),
                    ));
                }
            }
        }
    }

    fn check_timelock_bypass(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        if !self.timelock_marker.is_match(nav.text()) {
            if self.admin_assignment.is_match(nav.text()) {
                out.push(finding(
                    "NO_TIMELOCK",
                    "Missing Timelock for Admin Changes",
                    "Sensitive configuration changes have no timelock protection",
                    Severity::High,
                    Category::AccessControl,
                    &view.path,
                    Some(1),
                    None,
                    None,
                    "Implement a timelock mechanism (e.g., 48 hours) for admin changes",
                    Some("CWE-269"),
                ));
            }
            return;
        }

        for caps in self.execute_fn.captures_iter(nav.text()) {
            let m = caps.get(0).unwrap();
            let fn_name = caps.get(1).unwrap().as_str().to_string();
            let line_num = nav.line_of(m.start());

            let Some(fn_body) = Self::function_body(nav.text(), m.start()) else {
                continue;
            };

            let has_time_check = self.time_check.iter().any(|p| p.is_match(fn_body));

            if !has_time_check {
                out.push(finding(
                    format!("TIMELOCK_BYPASS_{line_num}"),
                    "Potential Timelock Bypass",
                    format!("Function '{fn_name}' may not verify timelock duration"),
                    Severity::Critical,
                    Category::AccessControl,
                    &view.path,
                    Some(line_num),
                    Some(fn_name),
                    Some(nav.context(line_num, 8)),
                    "Verify current_time >= timelock_start + TIMELOCK_DURATION",
                    Some("CWE-269"),
                ));
            }
        }
    }

    fn check_pause_mechanism(&self, nav: &Navigator, view: &SourceView, out: &mut Vec<Finding>) {
        if !self.pause_marker.is_match(nav.text()) {
            if self.funds_marker.is_match(nav.text()) {
                out.push(finding(
                    "NO_PAUSE_MECHANISM",
                    "Missing Emergency Pause",
                    "No pause mechanism found for emergency situations",
                    Severity::Medium,
                    Category::AccessControl,
                    &view.path,
                    Some(1),
                    None,
                    None,
                    "Implement a pause mechanism to halt operations in emergencies",
                    Some("CWE-693"),
                ));
            }
            return;
        }

        for fn_name in SENSITIVE_PAUSE_FNS {
            let pattern = Regex::new(&format!(r"fn\s+{fn_name}\s*\(")).expect("static regex");
            for m in pattern.find_iter(nav.text()) {
                let line_num = nav.line_of(m.start());
                let Some(fn_body) = Self::function_body(nav.text(), m.start()) else {
                    continue;
                };

                if !fn_body.to_lowercase().contains("paused") {
                    out.push(finding(
                        format!("NO_PAUSE_CHECK_{line_num}"),
                        format!("Missing Pause Check in {fn_name}"),
                        format!("Function '{fn_name}' does not check if contract is paused"),
                        Severity::Low,
                        Category::AccessControl,
                        &view.path,
                        Some(line_num),
                        Some(fn_name.to_string()),
                        Some(nav.snippet(line_num)),
                        "Add require!(!config.paused) at the start of the function",
                        Some("CWE-693"),
                    ));
                }
            }
        }
    }
}

impl Detector for AccessControlDetector {
    fn name(&self) -> &'static str {
        "AccessControlDetector"
    }

    fn detect(&self, view: &SourceView) -> Vec<Finding> {
        let nav = Navigator::new(view);
        let mut out = Vec::new();
        self.check_admin_functions(&nav, view, &mut out);
        self.check_privilege_escalation(&nav, view, &mut out);
        self.check_timelock_bypass(&nav, view, &mut out);
        self.check_pause_mechanism(&nav, view, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(src: &str) -> Vec<Finding> {
        let view = SourceView::from_text(src.to_string(), "test.rs".into());
        AccessControlDetector::new().detect(&view)
    }

    #[test]
    fn flags_admin_function_without_check() {
        let src = "pub fn set_admin(ctx: Context<SetAdmin>) -> Result<()> {\n    ctx.accounts.config.admin = new_admin;\n    }\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("NO_ADMIN_CHECK_")));
    }

    #[test]
    fn admin_function_with_has_one_is_clean() {
        let src = "pub fn set_admin(ctx: Context<SetAdmin>) -> Result<()> {\n    // has_one = admin\n    ctx.accounts.config.admin = new_admin;\n    }\n";
        let findings = detect(src);
        assert!(!findings.iter().any(|f| f.id.starts_with("NO_ADMIN_CHECK_")));
    }

    #[test]
    fn admin_function_guarded_by_require_macro_is_clean() {
        let src = "pub fn set_admin(ctx: Context<SetAdmin>) -> Result<()> {\n    require!(ctx.accounts.cfg.admin == authority, Unauthorized);\n    ctx.accounts.config.admin = new_admin;\n    }\n";
        let findings = detect(src);
        assert!(!findings.iter().any(|f| f.id.starts_with("NO_ADMIN_CHECK_")));
    }

    #[test]
    fn flags_missing_timelock_when_admin_assigned() {
        let src = "pub fn set_fee(ctx: Context<SetFee>) {\n    ctx.accounts.config.treasury = new_treasury;\n}\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id == "NO_TIMELOCK"));
    }

    #[test]
    fn flags_missing_pause_mechanism_on_funds_code() {
        let src = "pub fn withdraw(ctx: Context<Withdraw>) {\n    transfer(lamports);\n}\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id == "NO_PAUSE_MECHANISM"));
    }

    #[test]
    fn flags_sensitive_fn_missing_pause_check() {
        let src = "paused\npub fn place_bid(ctx: Context<PlaceBid>) {\n    let x = 1;\n}\n";
        let findings = detect(src);
        assert!(findings.iter().any(|f| f.id.starts_with("NO_PAUSE_CHECK_")));
    }
}
