//! Symbol data sidecar format (.wsym)
//!
//! Symbol files live next to their module and map declared types back to
//! the source documents they were compiled from.

use crate::encoder::{BytecodeReader, BytecodeWriter, DecodeError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Magic number for symbol files: "WSYM"
pub const SYMBOL_MAGIC: [u8; 4] = *b"WSYM";

/// Current symbol format version
pub const SYMBOL_VERSION: u32 = 1;

/// File extension of symbol files
pub const SYMBOL_EXTENSION: &str = "wsym";

/// Symbol file errors
#[derive(Debug, Error)]
pub enum SymbolError {
    /// Decode error
    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    /// Invalid magic number
    #[error("Invalid symbol file magic: expected WSYM, got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Unsupported version
    #[error("Unsupported symbol file version: {0} (current: {SYMBOL_VERSION})")]
    UnsupportedVersion(u32),

    /// Checksum mismatch
    #[error("Symbol file checksum mismatch: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Source location of a declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    /// Full name of the type
    pub type_name: String,
    /// Source document path
    pub document: String,
    /// 1-based line of the declaration
    pub line: u32,
}

/// Symbol data attached to one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    /// Name of the module these symbols belong to
    pub module_name: String,
    /// Entries, in declaration order
    pub entries: Vec<SymbolEntry>,
}

impl SymbolTable {
    /// Create an empty symbol table for a module
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            entries: Vec::new(),
        }
    }

    /// Add an entry
    pub fn with_entry(mut self, type_name: &str, document: &str, line: u32) -> Self {
        self.entries.push(SymbolEntry {
            type_name: type_name.to_string(),
            document: document.to_string(),
            line,
        });
        self
    }

    /// Look up the entry for a type
    pub fn lookup(&self, type_name: &str) -> Option<&SymbolEntry> {
        self.entries.iter().find(|e| e.type_name == type_name)
    }

    /// Encode to binary format
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = BytecodeWriter::new();

        writer.emit_bytes(&SYMBOL_MAGIC);
        writer.emit_u32(SYMBOL_VERSION);
        let checksum_offset = writer.offset();
        writer.emit_u32(0);

        writer.emit_string(&self.module_name);
        writer.emit_u32(self.entries.len() as u32);
        for entry in &self.entries {
            writer.emit_string(&entry.type_name);
            writer.emit_string(&entry.document);
            writer.emit_u32(entry.line);
        }

        let checksum = crc32fast::hash(&writer.buffer()[12..]);
        writer.patch_u32(checksum_offset, checksum);
        writer.into_bytes()
    }

    /// Decode from binary format
    pub fn decode(data: &[u8]) -> Result<Self, SymbolError> {
        let mut reader = BytecodeReader::new(data);

        let bytes = reader.read_bytes(4)?;
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes);
        if magic != SYMBOL_MAGIC {
            return Err(SymbolError::InvalidMagic(magic));
        }

        let version = reader.read_u32()?;
        if version != SYMBOL_VERSION {
            return Err(SymbolError::UnsupportedVersion(version));
        }

        let expected = reader.read_u32()?;
        let actual = crc32fast::hash(&data[12..]);
        if expected != actual {
            return Err(SymbolError::ChecksumMismatch { expected, actual });
        }

        let module_name = reader.read_string()?;
        let count = reader.read_count()?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(SymbolEntry {
                type_name: reader.read_string()?,
                document: reader.read_string()?,
                line: reader.read_u32()?,
            });
        }

        Ok(Self {
            module_name,
            entries,
        })
    }

    /// Read and decode a symbol file
    pub fn read_from(path: &Path) -> Result<Self, SymbolError> {
        let data = std::fs::read(path)?;
        Self::decode(&data)
    }

    /// Encode and write to a file
    pub fn write_to(&self, path: &Path) -> Result<(), SymbolError> {
        std::fs::write(path, self.encode())?;
        Ok(())
    }
}

/// Path of the symbol file that accompanies a module file
pub fn symbol_path_for(module_path: &Path) -> PathBuf {
    module_path.with_extension(SYMBOL_EXTENSION)
}
