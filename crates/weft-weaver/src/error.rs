//! Weaver error types

use std::path::PathBuf;
use thiserror::Error;
use weft_bytecode::{ModuleError, SymbolError, VerifyError};

/// Errors raised by a transformer while weaving one category of types
#[derive(Debug, Error)]
pub enum TransformError {
    /// The transformer cannot handle a type
    #[error("Cannot weave {type_name}: {reason}")]
    Unsupported { type_name: String, reason: String },

    /// Any other transformer failure
    #[error("{0}")]
    Failed(String),
}

/// Errors that can occur while running a weaving batch
#[derive(Debug, Error)]
pub enum WeaverError {
    /// A reference path points into a directory that does not exist
    #[error("Reference directory does not exist: {0}")]
    ReferenceDirNotFound(PathBuf),

    /// A target module path does not exist
    #[error("Target module not found: {0}")]
    ModuleNotFound(PathBuf),

    /// Two targets would be written to the same output files
    #[error(
        "Targets {} and {} both produce output {stem}",
        .first.display(),
        .second.display()
    )]
    DuplicateOutput {
        stem: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A module file could not be decoded
    #[error("Failed to load module {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ModuleError,
    },

    /// A symbol file could not be decoded
    #[error("Failed to load symbols {path}: {source}")]
    Symbols {
        path: PathBuf,
        #[source]
        source: SymbolError,
    },

    /// A symbol file belongs to a different module
    #[error("Symbol file {path} belongs to module {found}, expected {expected}")]
    SymbolMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// A transformer failed
    #[error("Failed to weave {module}: {source}")]
    Transform {
        module: String,
        #[source]
        source: TransformError,
    },

    /// A rewritten module failed verification
    #[error("Rewritten module {module} is invalid: {source}")]
    Verify {
        module: String,
        #[source]
        source: VerifyError,
    },

    /// File system error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("Failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The batch stopped at a failing module
    #[error("Weaving batch failed at module {module}")]
    Batch {
        module: String,
        #[source]
        source: Box<WeaverError>,
    },
}

/// Coarse classification of a [`WeaverError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad reference directory or conflicting targets
    Configuration,
    /// Missing target module
    NotFound,
    /// Classification, transformer, or verification failure
    Transform,
    /// Reading or writing files
    Io,
}

impl WeaverError {
    /// Classify the error; batch failures report their cause's kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeaverError::ReferenceDirNotFound(_) | WeaverError::DuplicateOutput { .. } => {
                ErrorKind::Configuration
            }
            WeaverError::ModuleNotFound(_) => ErrorKind::NotFound,
            WeaverError::Transform { .. } | WeaverError::Verify { .. } => ErrorKind::Transform,
            WeaverError::Load { .. }
            | WeaverError::Symbols { .. }
            | WeaverError::SymbolMismatch { .. }
            | WeaverError::Io { .. }
            | WeaverError::Json { .. } => ErrorKind::Io,
            WeaverError::Batch { source, .. } => source.kind(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WeaverError::Io {
            path: path.into(),
            source,
        }
    }
}
