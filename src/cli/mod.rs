//! CLI command handlers

pub mod commands;

pub use commands::{apply, apply_diff, diff, extract, watch};
