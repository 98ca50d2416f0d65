//! Bytecode module format

use crate::encoder::{BytecodeReader, BytecodeWriter, DecodeError};
use crate::types::TypeDef;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Magic number for weft module files: "WEFT"
pub const MAGIC: [u8; 4] = *b"WEFT";

/// Current module format version
pub const VERSION: u32 = 1;

/// File extension of module files
pub const MODULE_EXTENSION: &str = "wbc";

/// Size of the fixed header (magic + version + flags + checksum)
const HEADER_SIZE: usize = 16;

/// Module encoding/decoding errors
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Decode error
    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    /// Invalid magic number
    #[error("Invalid magic number: expected WEFT, got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Unsupported version
    #[error("Unsupported version: {0} (current: {VERSION})")]
    UnsupportedVersion(u32),

    /// Checksum mismatch
    #[error("Checksum mismatch: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Module flags
pub mod flags {
    /// Module has been processed by the weaver
    pub const WOVEN: u32 = 1 << 0;
}

/// Name and version identifying a module
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity {
    /// Simple name (file stem of the module)
    pub name: String,
    /// Version string
    pub version: String,
}

/// Reference from one module to another, by identity
pub type ModuleRef = ModuleIdentity;

impl ModuleIdentity {
    /// Create a new identity
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    /// Full identity string: `Name, Version=x.y.z`
    pub fn full_name(&self) -> String {
        format!("{}, Version={}", self.name, self.version)
    }

    fn encode(&self, writer: &mut BytecodeWriter) {
        writer.emit_string(&self.name);
        writer.emit_string(&self.version);
    }

    fn decode(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            name: reader.read_string()?,
            version: reader.read_string()?,
        })
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Registration marker for a type exposed to the host runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Full name of the registered type
    pub type_name: String,
    /// Category the type was registered under
    pub category: String,
}

/// Module metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Source file path
    pub source_file: Option<String>,
}

/// A compiled module
#[derive(Debug, Clone)]
pub struct Module {
    /// Magic number (must be "WEFT")
    pub magic: [u8; 4],
    /// Format version
    pub version: u32,
    /// Module flags
    pub flags: u32,
    /// Module identity
    pub identity: ModuleIdentity,
    /// Modules this module references, in declaration order
    pub references: Vec<ModuleRef>,
    /// Declared types, in declaration order
    pub types: Vec<TypeDef>,
    /// Registration table
    pub registrations: Vec<Registration>,
    /// Module metadata
    pub metadata: Metadata,
}

impl Module {
    /// Create a new empty module
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            flags: 0,
            identity: ModuleIdentity::new(name, version),
            references: Vec::new(),
            types: Vec::new(),
            registrations: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Whether the given flag bit is set
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    /// Find a declared type by full name
    pub fn find_type(&self, full_name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.full_name() == full_name)
    }

    /// Validate module header fields
    pub fn validate(&self) -> Result<(), String> {
        if self.magic != MAGIC {
            return Err("Invalid magic number".to_string());
        }
        if self.version != VERSION {
            return Err(format!("Unsupported version: {}", self.version));
        }
        Ok(())
    }

    /// Encode the module to binary format (.wbc)
    ///
    /// Format:
    /// - Header: magic (4 bytes) + version (u32) + flags (u32) + checksum (u32)
    /// - Identity
    /// - Reference table
    /// - Type table
    /// - Registration table
    /// - Metadata
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = BytecodeWriter::new();

        writer.emit_bytes(&self.magic);
        writer.emit_u32(self.version);
        writer.emit_u32(self.flags);
        let checksum_offset = writer.offset();
        writer.emit_u32(0); // Placeholder for checksum

        self.identity.encode(&mut writer);

        writer.emit_u32(self.references.len() as u32);
        for reference in &self.references {
            reference.encode(&mut writer);
        }

        writer.emit_u32(self.types.len() as u32);
        for ty in &self.types {
            ty.encode(&mut writer);
        }

        writer.emit_u32(self.registrations.len() as u32);
        for registration in &self.registrations {
            writer.emit_string(&registration.type_name);
            writer.emit_string(&registration.category);
        }

        writer.emit_opt_string(self.metadata.source_file.as_deref());

        // CRC32 of everything after the header
        let checksum = crc32fast::hash(&writer.buffer()[HEADER_SIZE..]);
        writer.patch_u32(checksum_offset, checksum);

        writer.into_bytes()
    }

    /// Decode a module from binary format
    pub fn decode(data: &[u8]) -> Result<Self, ModuleError> {
        let mut reader = BytecodeReader::new(data);

        let bytes = reader.read_bytes(4)?;
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes);
        if magic != MAGIC {
            return Err(ModuleError::InvalidMagic(magic));
        }

        let version = reader.read_u32()?;
        if version != VERSION {
            return Err(ModuleError::UnsupportedVersion(version));
        }

        let flags = reader.read_u32()?;
        let stored_checksum = reader.read_u32()?;

        let calculated_checksum = crc32fast::hash(&data[HEADER_SIZE..]);
        if stored_checksum != calculated_checksum {
            return Err(ModuleError::ChecksumMismatch {
                expected: stored_checksum,
                actual: calculated_checksum,
            });
        }

        let identity = ModuleIdentity::decode(&mut reader)?;

        let reference_count = reader.read_count()?;
        let mut references = Vec::with_capacity(reference_count);
        for _ in 0..reference_count {
            references.push(ModuleIdentity::decode(&mut reader)?);
        }

        let type_count = reader.read_count()?;
        let mut types = Vec::with_capacity(type_count);
        for _ in 0..type_count {
            types.push(TypeDef::decode(&mut reader)?);
        }

        let registration_count = reader.read_count()?;
        let mut registrations = Vec::with_capacity(registration_count);
        for _ in 0..registration_count {
            registrations.push(Registration {
                type_name: reader.read_string()?,
                category: reader.read_string()?,
            });
        }

        let source_file = reader.read_opt_string()?;

        Ok(Self {
            magic,
            version,
            flags,
            identity,
            references,
            types,
            registrations,
            metadata: Metadata { source_file },
        })
    }

    /// Read and decode a module file
    pub fn read_from(path: &Path) -> Result<Self, ModuleError> {
        let data = std::fs::read(path)?;
        Self::decode(&data)
    }

    /// Encode and write the module to a file
    pub fn write_to(&self, path: &Path) -> Result<(), ModuleError> {
        std::fs::write(path, self.encode())?;
        Ok(())
    }
}
