//! # Sentinel-Static CLI Entry Point
//!
//! @title Sentinel-Static CLI
//! @author Anchor Sentinel Static Analysis Team
//!
//! Thin binary wrapper: parse the one positional path argument, run the
//! engine, and print the resulting report (or error document) as JSON.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::error;
use serde_json::json;

use sentinel_static::{Cli, Engine, LoadError};

/// Default contract path, relative to the running binary: two directories
/// up, then `programs/app-market/src/lib.rs`.
fn default_contract_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let bin_dir = exe.parent()?;
    let root = bin_dir.parent()?.parent()?;
    Some(root.join("programs").join("app-market").join("src").join("lib.rs"))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let path = match cli.path.or_else(default_contract_path) {
        Some(path) => path,
        None => {
            error!("No contract path given and no default path could be resolved");
            println!("{}", json!({ "error": "Contract not found: <unresolved>" }));
            return ExitCode::from(1);
        }
    };

    run(&path)
}

fn run(path: &Path) -> ExitCode {
    let engine = Engine::new();

    match engine.run(path) {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(err) => error!("Failed to serialize report: {err}"),
            }
            ExitCode::SUCCESS
        }
        Err(LoadError::NotFound(path)) => {
            println!("{}", json!({ "error": format!("Contract not found: {path}") }));
            ExitCode::from(1)
        }
        Err(LoadError::Unreadable(source)) => {
            error!("Failed to load contract: {source}");
            println!("{}", json!({ "error": "Failed to load contract" }));
            ExitCode::from(2)
        }
    }
}
