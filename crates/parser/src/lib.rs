//! Schema loading for the bindings generator
//!
//! This crate turns protobuf schemas into the descriptor model
//! (`SchemaFile`) shared by the emitters.
//!
//! ## Loading Strategy
//!
//! A `.proto` file is compiled by `protoc` into a FileDescriptorSet with all
//! imports included. The set is decoded with `prost-types` and the requested
//! file is converted:
//! - names are fully qualified without protoc's leading dot
//! - every field is classified into a base kind and a multiplicity
//! - types declared by imported files are indexed so references resolve

mod field_classifier;
pub mod protobuf;
mod protoc;

pub use field_classifier::FieldClassifier;
pub use protobuf::DescriptorSetParser;
pub use protoc::Protoc;

use bindings_generator_common::{Result, SchemaFile};
use std::path::Path;

/// Load and validate a schema from a pre-built descriptor set
///
/// # Arguments
/// * `descriptor_set` - Path to a FileDescriptorSet written by protoc
/// * `proto_name` - File to convert; the last file of the set when `None`
///
/// # Returns
/// * `SchemaFile` - Descriptor tree with every type reference resolved
pub fn load_descriptor_set(descriptor_set: &Path, proto_name: Option<&str>) -> Result<SchemaFile> {
    let parser = DescriptorSetParser::from_file(descriptor_set)?;
    let schema = match proto_name {
        Some(name) => parser.parse(name)?,
        None => parser.parse_main()?,
    };
    schema.resolve_references()?;
    Ok(schema)
}
