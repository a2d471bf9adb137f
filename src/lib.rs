//! # Sentinel-Static Library
//!
//! @title Sentinel-Static - Static Security Analysis for Anchor Contracts
//! @author Anchor Sentinel Static Analysis Team
//!
//! A lexical, regex-based static analyzer for Anchor/Solana smart contract
//! source files. Given one contract file, it emits a structured report of
//! security findings covering access control, account validation,
//! arithmetic safety, economic attack surface, input validation, and
//! state-machine integrity.
//!
//! This is deliberately not an AST-based analyzer: every detector works
//! against the raw source text and a line-indexed view of it, composing
//! candidate-site patterns with local context checks.
//!
//! ## Modules
//!
//! - [`cli`] - command-line argument definitions
//! - [`source`] - loaded contract source and its line-indexed view
//! - [`navigator`] - source-navigation primitives shared by every detector
//! - [`report`] - the finding and report data model
//! - [`detectors`] - the six concrete vulnerability detectors
//! - [`engine`] - orchestration: load, run detectors, dedup, rank, report
//!
//! ## Example
//!
//! ```rust,ignore
//! use sentinel_static::Engine;
//! use std::path::Path;
//!
//! let engine = Engine::new();
//! let report = engine.run(Path::new("./program.rs"))?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

pub mod cli;
pub mod detectors;
pub mod engine;
pub mod navigator;
pub mod report;
pub mod source;

pub use cli::Cli;
pub use engine::Engine;
pub use report::{Finding, Report, Severity};
pub use source::{LoadError, SourceView};
