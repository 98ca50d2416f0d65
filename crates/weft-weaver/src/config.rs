//! Weaver configuration (weft.toml)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "weft.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Batch configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WeaverConfig {
    /// Modules whose name ends with this suffix pass through unwoven
    pub glue_suffix: String,

    /// Name of the staging subdirectory created under the output directory
    pub staging_dir: String,

    /// File name of the load-order manifest
    pub manifest_name: String,

    /// Read `.wsym` symbol files next to target modules
    pub read_symbols: bool,

    /// Pretty-print metadata sidecars
    pub pretty_metadata: bool,

    /// Attribute and base-type names used for classification
    pub reflection: ReflectionNames,
}

/// Names the classifier matches against
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ReflectionNames {
    /// Attribute marking an exposed class
    pub class_attribute: String,
    /// Attribute marking an exposed value type
    pub struct_attribute: String,
    /// Attribute marking an exposed enumeration
    pub enum_attribute: String,
    /// Attribute marking an exposed interface
    pub interface_attribute: String,
    /// Base type of multicast delegates, without generic arity
    pub multicast_delegate_base: String,
    /// Base type of single-cast delegates, without generic arity
    pub delegate_base: String,
    /// Attribute attached to every classified type
    pub generated_attribute: String,
}

impl Default for WeaverConfig {
    fn default() -> Self {
        Self {
            glue_suffix: "Glue".to_string(),
            staging_dir: ".weft-staging".to_string(),
            manifest_name: "weft.assemblyloadorder.json".to_string(),
            read_symbols: true,
            pretty_metadata: true,
            reflection: ReflectionNames::default(),
        }
    }
}

impl Default for ReflectionNames {
    fn default() -> Self {
        Self {
            class_attribute: "Weft.HostClass".to_string(),
            struct_attribute: "Weft.HostStruct".to_string(),
            enum_attribute: "Weft.HostEnum".to_string(),
            interface_attribute: "Weft.HostInterface".to_string(),
            multicast_delegate_base: "Weft.MulticastDelegate".to_string(),
            delegate_base: "Weft.Delegate".to_string(),
            generated_attribute: "Weft.Generated".to_string(),
        }
    }
}

impl WeaverConfig {
    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: WeaverConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `weft.toml` from `dir` if present, otherwise use defaults
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            log::debug!("Loading configuration from {}", path.display());
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.staging_dir.is_empty() || is_nested(&self.staging_dir) {
            return Err(ConfigError::ValidationError(format!(
                "staging_dir must be a single directory name, got {:?}",
                self.staging_dir
            )));
        }

        if self.manifest_name.is_empty() || is_nested(&self.manifest_name) {
            return Err(ConfigError::ValidationError(format!(
                "manifest_name must be a plain file name, got {:?}",
                self.manifest_name
            )));
        }

        let names = &self.reflection;
        for (key, value) in [
            ("class_attribute", &names.class_attribute),
            ("struct_attribute", &names.struct_attribute),
            ("enum_attribute", &names.enum_attribute),
            ("interface_attribute", &names.interface_attribute),
            ("multicast_delegate_base", &names.multicast_delegate_base),
            ("delegate_base", &names.delegate_base),
            ("generated_attribute", &names.generated_attribute),
        ] {
            if value.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "reflection.{} cannot be empty",
                    key
                )));
            }
        }

        if names.delegate_base == names.multicast_delegate_base {
            return Err(ConfigError::ValidationError(
                "reflection.delegate_base and reflection.multicast_delegate_base must differ"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Whether a module name marks a pass-through glue module
    pub fn is_glue(&self, module_name: &str) -> bool {
        !self.glue_suffix.is_empty() && module_name.ends_with(&self.glue_suffix)
    }
}

fn is_nested(name: &str) -> bool {
    name.contains('/') || name.contains('\\') || name == "." || name == ".."
}
