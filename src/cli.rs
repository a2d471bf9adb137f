//! # CLI Argument Definitions
//!
//! @title Sentinel-Static Command-Line Interface
//! @author Anchor Sentinel Static Analysis Team
//!
//! The binary takes a single optional positional argument: the path to
//! the contract source file to analyze.

use std::path::PathBuf;

use clap::Parser;

/// Static security analyzer for Anchor/Solana smart contract source files.
#[derive(Debug, Parser)]
#[command(name = "sentinel-static", version, about)]
pub struct Cli {
    /// Path to the contract source file. Defaults to
    /// `<parent-of-parent-of-binary-dir>/programs/app-market/src/lib.rs`
    /// when omitted.
    pub path: Option<PathBuf>,
}
