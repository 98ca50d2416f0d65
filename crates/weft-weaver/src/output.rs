//! Staged output writing and promotion
//!
//! Every output of a batch goes to a staging directory under the output
//! directory first. Staged files are copied into place only once the whole
//! batch has succeeded.

use crate::error::WeaverError;
use crate::metadata::{metadata_path_for, ApiMetadata, LoadOrderManifest};
use std::fs;
use std::path::{Path, PathBuf};
use weft_bytecode::{symbol_path_for, verify_module, Module, SymbolTable};

/// Files staged for one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedModule {
    /// Rewritten module
    pub module: PathBuf,
    /// Metadata sidecar
    pub metadata: PathBuf,
    /// Rewritten symbol file, when the module had symbols
    pub symbols: Option<PathBuf>,
}

impl StagedModule {
    /// All staged paths of this module
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.module, &self.metadata]
            .into_iter()
            .chain(self.symbols.as_ref())
    }
}

/// Paths produced by a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSet {
    paths: Vec<PathBuf>,
}

impl OutputSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a path
    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Recorded paths, in write order
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of recorded paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl IntoIterator for OutputSet {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

/// Staging directory owned by one batch
#[derive(Debug)]
pub struct StagingArea {
    dir: PathBuf,
    pretty_metadata: bool,
    staged: OutputSet,
}

impl StagingArea {
    /// Create `<output_dir>/<name>`, replacing a stale one
    pub fn create(
        output_dir: &Path,
        name: &str,
        pretty_metadata: bool,
    ) -> Result<Self, WeaverError> {
        let dir = output_dir.join(name);

        if dir.exists() {
            log::warn!("Removing stale staging directory {}", dir.display());
            fs::remove_dir_all(&dir).map_err(|e| WeaverError::io(&dir, e))?;
        }
        fs::create_dir_all(&dir).map_err(|e| WeaverError::io(&dir, e))?;

        Ok(Self {
            dir,
            pretty_metadata,
            staged: OutputSet::new(),
        })
    }

    /// Staging directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files staged so far
    pub fn staged(&self) -> &OutputSet {
        &self.staged
    }

    /// Verify and stage one rewritten module with its sidecars
    ///
    /// `file_name` is the module's original file name; outputs keep it.
    pub fn write_module(
        &mut self,
        file_name: &str,
        module: &Module,
        symbols: Option<&SymbolTable>,
        metadata: &ApiMetadata,
    ) -> Result<StagedModule, WeaverError> {
        verify_module(module).map_err(|source| WeaverError::Verify {
            module: module.name().to_string(),
            source,
        })?;

        let module_path = self.dir.join(file_name);
        fs::write(&module_path, module.encode()).map_err(|e| WeaverError::io(&module_path, e))?;

        let symbols_path = match symbols {
            Some(table) => {
                let path = symbol_path_for(&module_path);
                fs::write(&path, table.encode()).map_err(|e| WeaverError::io(&path, e))?;
                Some(path)
            }
            None => None,
        };

        let metadata_path = metadata_path_for(&module_path);
        let json = if self.pretty_metadata {
            serde_json::to_string_pretty(metadata)
        } else {
            serde_json::to_string(metadata)
        }
        .map_err(|source| WeaverError::Json {
            path: metadata_path.clone(),
            source,
        })?;
        fs::write(&metadata_path, json).map_err(|e| WeaverError::io(&metadata_path, e))?;

        let staged = StagedModule {
            module: module_path,
            metadata: metadata_path,
            symbols: symbols_path,
        };
        for path in staged.paths() {
            log::trace!("Staged {}", path.display());
            self.staged.push(path.clone());
        }
        Ok(staged)
    }

    /// Copy every staged file into `output_dir` and remove the staging directory
    ///
    /// Returns the final paths, in staging order.
    pub fn promote(self, output_dir: &Path) -> Result<OutputSet, WeaverError> {
        let mut promoted = OutputSet::new();

        for staged in self.staged.paths() {
            let Some(file_name) = staged.file_name() else {
                continue;
            };
            let target = output_dir.join(file_name);
            fs::copy(staged, &target).map_err(|e| WeaverError::io(&target, e))?;
            promoted.push(target);
        }

        fs::remove_dir_all(&self.dir).map_err(|e| WeaverError::io(&self.dir, e))?;
        log::debug!(
            "Promoted {} files from {}",
            promoted.len(),
            self.dir.display()
        );
        Ok(promoted)
    }

    /// Discard everything staged
    pub fn abandon(self) {
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            log::warn!(
                "Failed to remove staging directory {}: {}",
                self.dir.display(),
                e
            );
        } else {
            log::debug!(
                "Discarded {} staged files in {}",
                self.staged.len(),
                self.dir.display()
            );
        }
    }
}

/// Write the load-order manifest into `output_dir`
pub fn write_manifest(
    output_dir: &Path,
    name: &str,
    manifest: &LoadOrderManifest,
) -> Result<PathBuf, WeaverError> {
    let path = output_dir.join(name);
    let json = serde_json::to_string(manifest).map_err(|source| WeaverError::Json {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, json).map_err(|e| WeaverError::io(&path, e))?;
    Ok(path)
}
