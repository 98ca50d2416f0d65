//! Subcommand implementations

pub mod inspect;
pub mod order;
pub mod weave;

use anyhow::Context;
use std::path::Path;
use weft_weaver::WeaverConfig;

/// Load the configuration named on the command line, or discover one in
/// the current directory
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<WeaverConfig> {
    match path {
        Some(path) => WeaverConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => WeaverConfig::discover(Path::new("."))
            .context("Failed to load configuration from the current directory"),
    }
}
