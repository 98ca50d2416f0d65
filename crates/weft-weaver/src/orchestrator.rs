//! Batch orchestration
//!
//! A batch resolves references, loads every target, orders the modules, then
//! weaves them one at a time into a staging area. The first failing module
//! stops the batch and nothing is promoted. On success every staged file is
//! promoted and the load-order manifest is written.

use crate::classify::classify_module;
use crate::config::WeaverConfig;
use crate::dispatch::dispatch;
use crate::error::WeaverError;
use crate::loader::{load_modules, LoadOptions, LoadedModule, ModuleId, ModuleSet};
use crate::metadata::{ApiMetadata, LoadOrderManifest};
use crate::order::processing_order;
use crate::output::{write_manifest, OutputSet, StagedModule, StagingArea};
use crate::resolver::ModuleResolver;
use crate::transform::{RegistrationTransformer, Transformer, WeaveContext};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::PathBuf;
use weft_bytecode::flags;

/// Inputs of one weaving batch
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    /// Reference module paths, possibly quoted
    pub references: Vec<String>,
    /// Target module paths, possibly quoted, in input order
    pub targets: Vec<String>,
    /// Final destination of every output
    pub output_dir: PathBuf,
}

/// Result of a successful batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Promoted files, in processing order
    pub outputs: OutputSet,
    /// Woven module names (file stems) in processing order
    pub load_order: Vec<String>,
    /// Glue modules passed through without weaving
    pub skipped: Vec<String>,
    /// Path of the written load-order manifest
    pub manifest: PathBuf,
}

/// Loaded batch with its processing order
#[derive(Debug)]
pub struct BatchPlan {
    /// Search-path context
    pub resolver: ModuleResolver,
    /// Loaded modules, in input order
    pub modules: ModuleSet,
    /// Processing order
    pub order: Vec<ModuleId>,
}

/// Resolve, load, and order a batch without weaving anything
pub fn plan_batch<S: AsRef<str>>(
    references: &[S],
    targets: &[S],
    options: LoadOptions,
) -> Result<BatchPlan, WeaverError> {
    let resolver = ModuleResolver::from_references(references)?;
    let modules = load_modules(targets, &resolver, options)?;
    reject_duplicate_outputs(&modules)?;
    let order = processing_order(modules.as_slice())
        .into_iter()
        .map(ModuleId)
        .collect();

    Ok(BatchPlan {
        resolver,
        modules,
        order,
    })
}

/// Every target must own its output file names
fn reject_duplicate_outputs(modules: &ModuleSet) -> Result<(), WeaverError> {
    let mut seen: HashMap<String, &PathBuf> = HashMap::new();
    for loaded in modules.as_slice() {
        let stem = loaded.file_stem();
        if let Some(first) = seen.get(&stem) {
            return Err(WeaverError::DuplicateOutput {
                stem,
                first: (*first).clone(),
                second: loaded.origin.clone(),
            });
        }
        seen.insert(stem, &loaded.origin);
    }
    Ok(())
}

enum ModuleOutcome {
    Woven(StagedModule),
    Skipped,
    Failed(WeaverError),
}

/// Runs weaving batches with one transformer
pub struct Weaver<T> {
    config: WeaverConfig,
    transformer: T,
}

impl Weaver<RegistrationTransformer> {
    /// Create a weaver using the registration transformer
    pub fn with_config(config: WeaverConfig) -> Self {
        Self::new(config, RegistrationTransformer::new())
    }
}

impl Default for Weaver<RegistrationTransformer> {
    fn default() -> Self {
        Self::with_config(WeaverConfig::default())
    }
}

impl<T: Transformer> Weaver<T> {
    /// Create a weaver
    pub fn new(config: WeaverConfig, transformer: T) -> Self {
        Self {
            config,
            transformer,
        }
    }

    /// Run one batch
    pub fn run(&mut self, request: &BatchRequest) -> Result<BatchReport, WeaverError> {
        let options = LoadOptions {
            read_symbols: self.config.read_symbols,
        };
        let BatchPlan {
            resolver,
            mut modules,
            order,
        } = plan_batch(&request.references, &request.targets, options)?;
        log::info!(
            "Weaving {} modules with {} search directories",
            modules.len(),
            resolver.search_dirs().len()
        );

        std::fs::create_dir_all(&request.output_dir)
            .map_err(|e| WeaverError::io(&request.output_dir, e))?;
        let mut staging = StagingArea::create(
            &request.output_dir,
            &self.config.staging_dir,
            self.config.pretty_metadata,
        )?;

        let mut load_order = Vec::new();
        let mut skipped = Vec::new();

        let flow = order.iter().try_for_each(|&id| {
            let Some(loaded) = modules.get_mut(id) else {
                return ControlFlow::Continue(());
            };
            let stem = loaded.file_stem();

            match self.weave_one(loaded, &resolver, &mut staging) {
                ModuleOutcome::Woven(staged) => {
                    log::debug!("{}: staged {}", stem, staged.module.display());
                    load_order.push(stem);
                    ControlFlow::Continue(())
                }
                ModuleOutcome::Skipped => {
                    log::debug!("{}: glue module, skipped", stem);
                    skipped.push(stem);
                    ControlFlow::Continue(())
                }
                ModuleOutcome::Failed(error) => ControlFlow::Break((stem, error)),
            }
        });

        log::debug!("Releasing {} loaded modules", modules.len());
        drop(modules);

        if let ControlFlow::Break((module, source)) = flow {
            staging.abandon();
            return Err(WeaverError::Batch {
                module,
                source: Box::new(source),
            });
        }

        let outputs = staging.promote(&request.output_dir)?;
        let manifest = write_manifest(
            &request.output_dir,
            &self.config.manifest_name,
            &LoadOrderManifest {
                assembly_names: load_order.clone(),
            },
        )?;
        log::info!(
            "Wove {} modules ({} skipped), {} files written to {}",
            load_order.len(),
            skipped.len(),
            outputs.len(),
            request.output_dir.display()
        );

        Ok(BatchReport {
            outputs,
            load_order,
            skipped,
            manifest,
        })
    }

    fn weave_one(
        &mut self,
        loaded: &mut LoadedModule,
        resolver: &ModuleResolver,
        staging: &mut StagingArea,
    ) -> ModuleOutcome {
        if self.config.is_glue(loaded.module.name()) {
            return ModuleOutcome::Skipped;
        }

        match self.weave_and_stage(loaded, resolver, staging) {
            Ok(staged) => ModuleOutcome::Woven(staged),
            Err(error) => ModuleOutcome::Failed(error),
        }
    }

    fn weave_and_stage(
        &mut self,
        loaded: &mut LoadedModule,
        resolver: &ModuleResolver,
        staging: &mut StagingArea,
    ) -> Result<StagedModule, WeaverError> {
        let name = loaded.module.name().to_string();
        let categorized = classify_module(&mut loaded.module, &self.config.reflection);
        log::debug!("{}: {} types classified", name, categorized.len());

        let mut metadata = ApiMetadata::new(&name, resolver.references());
        let mut cx = WeaveContext {
            module: &mut loaded.module,
            metadata: &mut metadata,
            resolver,
            symbols: loaded.symbols.as_ref(),
        };
        dispatch(&mut self.transformer, &mut cx, &categorized).map_err(|source| {
            WeaverError::Transform {
                module: name.clone(),
                source,
            }
        })?;

        loaded.module.flags |= flags::WOVEN;
        staging.write_module(
            &loaded.file_name(),
            &loaded.module,
            loaded.symbols.as_ref(),
            &metadata,
        )
    }
}
