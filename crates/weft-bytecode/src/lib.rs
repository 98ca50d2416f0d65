//! Weft module formats
//!
//! This crate provides the binary module format (`.wbc`), the symbol data
//! sidecar format (`.wsym`), and structural verification for modules
//! rewritten by the weaver.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod encoder;
pub mod module;
pub mod symbols;
pub mod types;
pub mod verify;

pub use encoder::{BytecodeReader, BytecodeWriter, DecodeError};
pub use module::{
    flags, Metadata, Module, ModuleError, ModuleIdentity, ModuleRef, Registration,
    MODULE_EXTENSION,
};
pub use symbols::{symbol_path_for, SymbolEntry, SymbolError, SymbolTable, SYMBOL_EXTENSION};
pub use types::{FieldDef, TypeDef, TypeKind, TypeRef};
pub use verify::{verify_module, VerifyError};
