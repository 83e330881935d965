//! Protobuf descriptor parser
//!
//! Decodes a Protocol Buffer FileDescriptorSet and converts one of its files
//! into the descriptor model.
//!
//! ## Sources
//! - **protoc output**: `--descriptor_set_out` with `--include_imports`
//! - **Pre-built descriptor sets**: checked into a repository or produced by
//!   another build step
//!
//! ## Example
//! ```rust,ignore
//! use bindings_generator_parser::DescriptorSetParser;
//!
//! let parser = DescriptorSetParser::from_file("rec.desc")?;
//! let schema = parser.parse("rec.proto")?;
//! ```

mod converter;
mod parser;

pub use converter::convert_file_descriptor;
pub use parser::DescriptorSetParser;
