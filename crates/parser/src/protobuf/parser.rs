//! Protobuf FileDescriptorSet parser

use bindings_generator_common::{GeneratorError, Result, SchemaFile};
use prost::Message;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use std::fs;
use std::path::Path;

/// Descriptor set parser
///
/// Holds a decoded FileDescriptorSet (compiled with `--include_imports`)
/// and converts one of its files into the descriptor model.
pub struct DescriptorSetParser {
    /// Decoded descriptor set
    set: FileDescriptorSet,
}

impl DescriptorSetParser {
    /// Load FileDescriptorSet from binary file
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = DescriptorSetParser::from_file("rec.desc")?;
    /// let schema = parser.parse("rec.proto")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path.as_ref()).map_err(|e| {
            GeneratorError::Parse(format!(
                "Failed to read FileDescriptorSet file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_bytes(&bytes)
    }

    /// Parse FileDescriptorSet from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let set = FileDescriptorSet::decode(bytes).map_err(|e| {
            GeneratorError::Parse(format!("Failed to decode FileDescriptorSet: {}", e))
        })?;

        Ok(Self { set })
    }

    /// Convert the file named `proto_name` into a `SchemaFile`
    ///
    /// A descriptor matches when its recorded name equals `proto_name` or
    /// ends with `/<proto_name>`.
    pub fn parse(&self, proto_name: &str) -> Result<SchemaFile> {
        let file = self.find_file(proto_name).ok_or_else(|| {
            GeneratorError::Parse(format!("Could not find descriptor for {}", proto_name))
        })?;

        Ok(super::converter::convert_file_descriptor(&self.set, file))
    }

    /// Convert the last file of the set
    ///
    /// protoc writes dependencies before the files that import them, so the
    /// last entry is the file that was compiled.
    pub fn parse_main(&self) -> Result<SchemaFile> {
        let file = self
            .set
            .file
            .last()
            .ok_or_else(|| GeneratorError::Parse("FileDescriptorSet is empty".to_string()))?;

        Ok(super::converter::convert_file_descriptor(&self.set, file))
    }

    /// Names of all files in the set
    pub fn file_names(&self) -> Vec<&str> {
        self.set.file.iter().map(|f| f.name()).collect()
    }

    fn find_file(&self, proto_name: &str) -> Option<&FileDescriptorProto> {
        let suffix = format!("/{}", proto_name);
        self.set
            .file
            .iter()
            .find(|f| f.name() == proto_name || f.name().ends_with(&suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, package: &str) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.to_string()),
            package: Some(package.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_empty_descriptor_set() {
        let bytes = FileDescriptorSet { file: vec![] }.encode_to_vec();

        let parser = DescriptorSetParser::from_bytes(&bytes).unwrap();
        assert!(parser.file_names().is_empty());
        assert!(matches!(parser.parse_main(), Err(GeneratorError::Parse(_))));
    }

    #[test]
    fn test_invalid_bytes() {
        let result = DescriptorSetParser::from_bytes(&[0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(GeneratorError::Parse(_))));
    }

    #[test]
    fn test_find_by_suffix() {
        let set = FileDescriptorSet {
            file: vec![file("common/types.proto", "common"), file("api/rec.proto", "api")],
        };
        let parser = DescriptorSetParser::from_bytes(&set.encode_to_vec()).unwrap();

        assert_eq!(parser.parse("rec.proto").unwrap().package_name, "api");
        assert_eq!(parser.parse("common/types.proto").unwrap().package_name, "common");
        assert!(parser.parse("missing.proto").is_err());
        assert_eq!(parser.parse_main().unwrap().source_name, "api/rec.proto");
    }
}
