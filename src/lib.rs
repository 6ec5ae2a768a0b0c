//! interview-digest library crate
//!
//! Exposes the analysis pipeline so benchmarks and external tooling can
//! exercise prompt composition and report checks without going through the CLI.

pub mod batch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod llm;
pub mod report;
pub mod themes;

pub use error::{AnalysisError, Result};
