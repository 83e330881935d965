//! `protoc` invocation
//!
//! Compiles a `.proto` file into a FileDescriptorSet with imports included,
//! then hands the bytes to [`DescriptorSetParser`].

use crate::protobuf::DescriptorSetParser;
use bindings_generator_common::{GeneratorError, Result, SchemaCompiler, SchemaFile};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Schema compiler backed by the `protoc` executable
#[derive(Debug, Clone)]
pub struct Protoc {
    /// Executable to run, looked up on `PATH` when not absolute
    path: PathBuf,
}

impl Default for Protoc {
    fn default() -> Self {
        Self::new("protoc")
    }
}

impl Protoc {
    /// Use the given `protoc` executable
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Command-line arguments for one compilation
    ///
    /// User include directories come first, then the directory holding the
    /// proto file itself.
    pub fn arguments(proto_file: &Path, include_dirs: &[PathBuf], output: &Path) -> Vec<String> {
        let mut args: Vec<String> = include_dirs
            .iter()
            .map(|dir| format!("-I{}", dir.display()))
            .collect();

        let proto_dir = match proto_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        args.push(format!("-I{}", proto_dir.display()));
        args.push(format!("--descriptor_set_out={}", output.display()));
        args.push("--include_imports".to_string());
        args.push(proto_file.display().to_string());
        args
    }
}

impl SchemaCompiler for Protoc {
    fn compile(&self, proto_file: &Path, include_dirs: &[PathBuf]) -> Result<SchemaFile> {
        let descriptor_out = tempfile::Builder::new()
            .prefix("bindings-")
            .suffix(".desc")
            .tempfile()?;

        let output = Command::new(&self.path)
            .args(Self::arguments(proto_file, include_dirs, descriptor_out.path()))
            .output()
            .map_err(|e| GeneratorError::Compiler {
                status: -1,
                diagnostics: format!("failed to run {}: {}", self.path.display(), e),
            })?;

        if !output.status.success() {
            return Err(GeneratorError::Compiler {
                status: output.status.code().unwrap_or(-1),
                diagnostics: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let parser = DescriptorSetParser::from_file(descriptor_out.path())?;
        let proto_name = proto_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        parser.parse(&proto_name)
    }
}
