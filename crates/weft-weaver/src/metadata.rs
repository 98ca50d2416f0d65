//! Metadata records consumed by the host runtime

use crate::classify::Category;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension of per-module metadata sidecars
pub const METADATA_EXTENSION: &str = "metadata.json";

/// Exposed surface of one module
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetadata {
    /// Declaring module name
    pub assembly_name: String,

    /// Reference paths supplied to the batch
    pub references: Vec<String>,

    /// Exposed classes
    #[serde(default)]
    pub classes: Vec<TypeMetadata>,

    /// Exposed value types
    #[serde(default)]
    pub structs: Vec<TypeMetadata>,

    /// Exposed enumerations
    #[serde(default)]
    pub enums: Vec<TypeMetadata>,

    /// Exposed interfaces
    #[serde(default)]
    pub interfaces: Vec<TypeMetadata>,

    /// Single-cast and multicast delegates
    #[serde(default)]
    pub delegates: Vec<TypeMetadata>,
}

impl ApiMetadata {
    /// Create an empty record for a module
    pub fn new(assembly_name: &str, references: &[String]) -> Self {
        Self {
            assembly_name: assembly_name.to_string(),
            references: references.to_vec(),
            ..Self::default()
        }
    }

    /// List a type of the given category belongs in
    pub fn list_mut(&mut self, category: Category) -> &mut Vec<TypeMetadata> {
        match category {
            Category::Class => &mut self.classes,
            Category::Struct => &mut self.structs,
            Category::Enum => &mut self.enums,
            Category::Interface => &mut self.interfaces,
            Category::Delegate | Category::MulticastDelegate => &mut self.delegates,
        }
    }

    /// Total number of recorded types
    pub fn type_count(&self) -> usize {
        self.classes.len()
            + self.structs.len()
            + self.enums.len()
            + self.interfaces.len()
            + self.delegates.len()
    }
}

/// Description of one exposed type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeMetadata {
    /// Type name
    pub name: String,
    /// Namespace
    pub namespace: String,
    /// `Namespace.Name`
    pub full_name: String,
    /// Category the type was woven as
    pub category: Category,
    /// Base type full name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    /// Fields, or members for enumerations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldMetadata>,
    /// Declaration site, when symbols were loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLocation>,
}

/// Field description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    /// Field name
    pub name: String,
    /// Field type full name
    pub type_name: String,
}

/// Source location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceLocation {
    /// Document path
    pub document: String,
    /// 1-based line
    pub line: u32,
}

/// Global module load order, written once per successful batch
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoadOrderManifest {
    /// Module names (file stems) in processing order
    pub assembly_names: Vec<String>,
}

/// Sidecar path for a module file: `Game.wbc` -> `Game.metadata.json`
pub fn metadata_path_for(module_path: &Path) -> PathBuf {
    module_path.with_extension(METADATA_EXTENSION)
}
