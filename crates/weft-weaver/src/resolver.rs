//! Module search-path resolution
//!
//! Builds the set of directories that module references are looked up in,
//! derived from the reference module paths supplied to a batch.

use crate::error::WeaverError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use weft_bytecode::{ModuleRef, MODULE_EXTENSION};

/// Strip surrounding whitespace and quote characters from a raw path item
pub fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'')
}

/// Search-path context for one batch
///
/// Built once from the reference paths and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    /// Quote-stripped reference paths, in input order
    references: Vec<String>,
    /// Search directories, in registration order
    search_dirs: Vec<PathBuf>,
    /// Registered directories, for de-duplication
    registered: HashSet<PathBuf>,
}

impl ModuleResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a resolver from raw reference item paths
    ///
    /// Fails if the directory containing a reference does not exist.
    pub fn from_references<S: AsRef<str>>(references: &[S]) -> Result<Self, WeaverError> {
        let mut resolver = Self::new();
        for raw in references {
            resolver.add_reference(raw.as_ref())?;
        }
        Ok(resolver)
    }

    /// Register one reference path and its containing directory
    pub fn add_reference(&mut self, raw: &str) -> Result<(), WeaverError> {
        let path = unquote(raw);
        self.references.push(path.to_string());

        let dir = match Path::new(path).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => return Ok(()),
        };

        if self.registered.contains(&dir) {
            return Ok(());
        }

        if !dir.is_dir() {
            return Err(WeaverError::ReferenceDirNotFound(dir));
        }

        log::debug!("Adding search directory {}", dir.display());
        self.registered.insert(dir.clone());
        self.search_dirs.push(dir);
        Ok(())
    }

    /// Quote-stripped reference paths, in input order
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Registered search directories
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Locate the file of a referenced module
    pub fn resolve(&self, reference: &ModuleRef) -> Option<PathBuf> {
        let file_name = format!("{}.{}", reference.name, MODULE_EXTENSION);
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
    }
}
