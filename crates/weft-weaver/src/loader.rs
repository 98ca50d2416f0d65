//! Loading target modules into the batch arena

use crate::error::WeaverError;
use crate::order::ModuleNode;
use crate::resolver::{unquote, ModuleResolver};
use std::path::{Path, PathBuf};
use weft_bytecode::{symbol_path_for, Module, ModuleRef, SymbolTable};

/// Index of a module in a [`ModuleSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub usize);

/// A module reference together with where the resolver found it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// The reference as declared in the module
    pub reference: ModuleRef,
    /// File the reference resolved to, if any
    pub location: Option<PathBuf>,
}

/// A module loaded from disk
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// Decoded module
    pub module: Module,
    /// File the module was read from
    pub origin: PathBuf,
    /// Attached symbol data
    pub symbols: Option<SymbolTable>,
    /// Declared references with their resolved locations
    pub references: Vec<ResolvedReference>,
}

impl LoadedModule {
    /// Module name as used in outputs: the origin file stem
    pub fn file_stem(&self) -> String {
        self.origin
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.module.name().to_string())
    }

    /// Origin file name
    pub fn file_name(&self) -> String {
        self.origin
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.module.name().to_string())
    }
}

impl ModuleNode for LoadedModule {
    fn identity(&self) -> String {
        self.module.identity()
    }

    fn dependencies(&self) -> Vec<String> {
        self.module.dependencies()
    }
}

/// Arena of the modules loaded for one batch, in input order
#[derive(Debug, Default)]
pub struct ModuleSet {
    modules: Vec<LoadedModule>,
}

impl ModuleSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module, returning its id
    pub fn push(&mut self, module: LoadedModule) -> ModuleId {
        self.modules.push(module);
        ModuleId(self.modules.len() - 1)
    }

    /// Get a module by id
    pub fn get(&self, id: ModuleId) -> Option<&LoadedModule> {
        self.modules.get(id.0)
    }

    /// Get a module mutably by id
    pub fn get_mut(&mut self, id: ModuleId) -> Option<&mut LoadedModule> {
        self.modules.get_mut(id.0)
    }

    /// Modules in input order
    pub fn as_slice(&self) -> &[LoadedModule] {
        &self.modules
    }

    /// Number of modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Loader options
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Read `.wsym` files next to the modules
    pub read_symbols: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { read_symbols: true }
    }
}

/// Load every target module, preserving input order
///
/// All paths are checked before any module is read, so a missing target
/// fails the batch without loading anything.
pub fn load_modules<S: AsRef<str>>(
    targets: &[S],
    resolver: &ModuleResolver,
    options: LoadOptions,
) -> Result<ModuleSet, WeaverError> {
    let paths: Vec<PathBuf> = targets
        .iter()
        .map(|raw| PathBuf::from(unquote(raw.as_ref())))
        .collect();

    if let Some(missing) = paths.iter().find(|path| !path.is_file()) {
        return Err(WeaverError::ModuleNotFound(missing.clone()));
    }

    let mut set = ModuleSet::new();
    for path in paths {
        let loaded = load_module(&path, resolver, options)?;
        log::debug!(
            "Loaded {} ({} types, {} references)",
            loaded.module.identity,
            loaded.module.types.len(),
            loaded.references.len()
        );
        set.push(loaded);
    }
    Ok(set)
}

/// Load a single module file and its attached symbols
pub fn load_module(
    path: &Path,
    resolver: &ModuleResolver,
    options: LoadOptions,
) -> Result<LoadedModule, WeaverError> {
    if !path.is_file() {
        return Err(WeaverError::ModuleNotFound(path.to_path_buf()));
    }

    let module = Module::read_from(path).map_err(|source| WeaverError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let symbols = if options.read_symbols {
        read_symbols(path, &module)?
    } else {
        None
    };

    let references = module
        .references
        .iter()
        .map(|reference| {
            let location = resolver.resolve(reference);
            if location.is_none() {
                log::debug!(
                    "{}: reference {} not found on the search path",
                    module.identity.name,
                    reference
                );
            }
            ResolvedReference {
                reference: reference.clone(),
                location,
            }
        })
        .collect();

    Ok(LoadedModule {
        module,
        origin: path.to_path_buf(),
        symbols,
        references,
    })
}

fn read_symbols(module_path: &Path, module: &Module) -> Result<Option<SymbolTable>, WeaverError> {
    let path = symbol_path_for(module_path);
    if !path.is_file() {
        return Ok(None);
    }

    let symbols = SymbolTable::read_from(&path).map_err(|source| WeaverError::Symbols {
        path: path.clone(),
        source,
    })?;

    if symbols.module_name != module.name() {
        return Err(WeaverError::SymbolMismatch {
            path,
            expected: module.name().to_string(),
            found: symbols.module_name,
        });
    }

    Ok(Some(symbols))
}
