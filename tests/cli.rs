//! Integration tests for the `sentinel-static` binary.
//!
//! Exercises the seed scenarios, the error paths, and determinism of the
//! stdout JSON report.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn write_fixture(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp fixture");
    file.write_all(contents.as_bytes()).expect("write fixture");
    file
}

#[test]
fn s1_empty_file_has_no_findings() {
    let file = write_fixture("");

    Command::cargo_bin("sentinel-static")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"findings\": []"))
        .stdout(predicate::str::contains("\"total\": 0"))
        .stdout(predicate::str::contains("\"contract_lines\": 1"));
}

#[test]
fn s2_unchecked_addition_is_flagged() {
    let file = write_fixture("let total = a + b;\n");

    Command::cargo_bin("sentinel-static")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("UNCHECKED_MATH_1"))
        .stdout(predicate::str::contains("\"severity\": \"high\""))
        .stdout(predicate::str::contains("checked_add"));
}

#[test]
fn s3_admin_function_without_authority_check_is_flagged() {
    let file = write_fixture(
        "pub fn set_admin(ctx: Context<X>) -> Result<()> {\n    ctx.accounts.cfg.admin = new;\n    }\n",
    );

    Command::cargo_bin("sentinel-static")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Admin Function Without Authority Check"))
        .stdout(predicate::str::contains("\"severity\": \"critical\""));
}

#[test]
fn s4_division_without_zero_check_is_flagged() {
    let file = write_fixture("let r = x / y;\n");

    Command::cargo_bin("sentinel-static")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Potential Division by Zero"))
        .stdout(predicate::str::contains("\"severity\": \"medium\""));
}

#[test]
fn s5_unbounded_vec_field_is_flagged() {
    let file = write_fixture("pub struct Auction {\n    pub items: Vec<Item>,\n}\n");

    Command::cargo_bin("sentinel-static")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Unbounded Vector Field"));
}

#[test]
fn s6_double_withdrawal_is_flagged() {
    let file = write_fixture("fn withdraw_all(ctx: Context<X>) {\n    transfer(amount);\n}\n");

    Command::cargo_bin("sentinel-static")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Potential Double Withdrawal"))
        .stdout(predicate::str::contains("DOUBLE_WITHDRAW_"));
}

#[test]
fn missing_contract_exits_one_with_error_document() {
    Command::cargo_bin("sentinel-static")
        .unwrap()
        .arg("/nonexistent/path/contract.rs")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Contract not found"));
}

#[test]
fn two_runs_produce_byte_identical_stdout() {
    let file = write_fixture(include_str!("fixtures/vulnerable_market.rs"));

    let first = Command::cargo_bin("sentinel-static")
        .unwrap()
        .arg(file.path())
        .output()
        .unwrap();
    let second = Command::cargo_bin("sentinel-static")
        .unwrap()
        .arg(file.path())
        .output()
        .unwrap();

    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn full_fixture_report_is_well_formed_json() {
    let file = write_fixture(include_str!("fixtures/vulnerable_market.rs"));

    let output = Command::cargo_bin("sentinel-static").unwrap().arg(file.path()).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(report["scanner"], "python-static-analyzer");

    let findings = report["findings"].as_array().expect("findings array");
    let total = report["summary"]["total"].as_u64().unwrap();
    assert_eq!(total, findings.len() as u64);

    let mut seen = std::collections::HashSet::new();
    let mut last_rank = 0;
    let rank = |s: &str| match s {
        "critical" => 0,
        "high" => 1,
        "medium" => 2,
        "low" => 3,
        _ => 4,
    };

    for finding in findings {
        let title = finding["title"].as_str().unwrap();
        let line = finding["location"]["line"].as_u64().unwrap_or(0);
        assert!(seen.insert((title.to_string(), line)), "duplicate finding key");

        let this_rank = rank(finding["severity"].as_str().unwrap());
        assert!(this_rank >= last_rank, "findings not sorted by severity");
        last_rank = this_rank;
    }
}
