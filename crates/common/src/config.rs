//! Generator configuration
//!
//! Settings can come from a YAML file; every field has a default so an
//! empty file (or no file at all) is valid.
//!
//! ```yaml
//! cpp:
//!   native_namespace: app::model
//!   native_includes:
//!     - app/model/records.hpp
//! kotlin:
//!   native_package: com.example.model
//! ```

use crate::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level generator settings
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// C++ surface settings
    pub cpp: CppConfig,
    /// Kotlin surface settings
    pub kotlin: KotlinConfig,
}

/// Settings for the C++ declarations/definitions pair
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CppConfig {
    /// Whether to emit the C++ files
    pub enabled: bool,
    /// Namespace holding the native model types (`native` -> `::native::pkg::Msg`)
    pub native_namespace: String,
    /// Namespace wrapping the generated conversion functions
    pub helpers_namespace: String,
    /// Extra headers declaring the native model types
    pub native_includes: Vec<String>,
}

impl Default for CppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            native_namespace: "native".to_string(),
            helpers_namespace: "protobuf_helpers".to_string(),
            native_includes: Vec::new(),
        }
    }
}

/// Settings for the Kotlin mapper file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct KotlinConfig {
    /// Whether to emit the Kotlin file
    pub enabled: bool,
    /// Package of the native model classes; defaults to the proto package
    pub native_package: Option<String>,
}

impl Default for KotlinConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            native_package: None,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            GeneratorError::Config(format!("Failed to parse config YAML from {:?}: {}", path, e))
        })
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would produce uncompilable output
    pub fn validate(&self) -> Result<()> {
        if self.cpp.helpers_namespace.trim().is_empty() {
            return Err(GeneratorError::Config(
                "cpp.helpers_namespace must not be empty".to_string(),
            ));
        }
        if let Some(package) = &self.kotlin.native_package {
            if package.split('.').any(|segment| segment.is_empty()) {
                return Err(GeneratorError::Config(format!(
                    "kotlin.native_package `{}` is not a valid package name",
                    package
                )));
            }
        }
        Ok(())
    }
}
