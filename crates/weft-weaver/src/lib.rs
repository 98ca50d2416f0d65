//! Weft post-compilation weaver
//!
//! Takes a batch of compiled modules, orders them so that every module is
//! woven after the in-batch modules it references, classifies each module's
//! types into the categories exposed to the host runtime, runs a
//! [`Transformer`] over each category, and writes the rewritten modules with
//! their metadata sidecars.
//!
//! # Example
//!
//! ```no_run
//! use weft_weaver::{BatchRequest, Weaver, WeaverConfig};
//!
//! let request = BatchRequest {
//!     references: vec!["lib/Weft.Host.wbc".to_string()],
//!     targets: vec!["bin/Game.wbc".to_string()],
//!     output_dir: "woven".into(),
//! };
//!
//! let report = Weaver::with_config(WeaverConfig::default()).run(&request)?;
//! println!("load order: {:?}", report.load_order);
//! # Ok::<(), weft_weaver::WeaverError>(())
//! ```

#![warn(rust_2018_idioms)]

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod metadata;
pub mod orchestrator;
pub mod order;
pub mod output;
pub mod resolver;
pub mod transform;

pub use classify::{classify, classify_module, CategorizedTypes, Category};
pub use config::{ConfigError, ReflectionNames, WeaverConfig, CONFIG_FILE_NAME};
pub use dispatch::dispatch;
pub use error::{ErrorKind, TransformError, WeaverError};
pub use loader::{load_module, load_modules, LoadOptions, LoadedModule, ModuleId, ModuleSet};
pub use metadata::{ApiMetadata, LoadOrderManifest, TypeMetadata, METADATA_EXTENSION};
pub use orchestrator::{plan_batch, BatchPlan, BatchReport, BatchRequest, Weaver};
pub use order::{processing_order, ModuleNode};
pub use output::{write_manifest, OutputSet, StagedModule, StagingArea};
pub use resolver::ModuleResolver;
pub use transform::{RegistrationTransformer, Transformer, WeaveContext};
