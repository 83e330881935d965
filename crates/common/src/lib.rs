//! Common types and utilities for the bindings generator
//!
//! This crate contains the descriptor model, the naming rules shared by both
//! emitters, error types and the generator configuration used across the
//! parser, generator, and CLI components.

pub mod config;
pub mod naming;
pub mod schema;

pub use config::{CppConfig, GeneratorConfig, KotlinConfig};
pub use schema::{
    BaseKind, Enum, EnumValue, Field, FieldClassification, JavaOptions, Message, Multiplicity,
    ScalarType, SchemaFile, Syntax, TypeKind,
};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during bindings generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("protoc failed with exit code {status}: {diagnostics}")]
    Compiler { status: i32, diagnostics: String },

    #[error("Unresolved type reference `{type_name}` in `{referenced_from}`")]
    UnresolvedType {
        type_name: String,
        referenced_from: String,
    },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Turns a `.proto` source file into a resolved descriptor tree
///
/// Implemented by the parser crate on top of `protoc`; tests substitute
/// their own implementation.
pub trait SchemaCompiler {
    /// Compile `proto_file`, searching `include_dirs` for imports
    fn compile(&self, proto_file: &Path, include_dirs: &[PathBuf]) -> Result<SchemaFile>;
}
