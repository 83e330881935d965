//! Conversion code generation for protobuf schemas
//!
//! This crate walks a resolved `SchemaFile` and renders the conversion
//! layers between protobuf generated classes and native model types:
//! - `<stem>_protobuf_helpers.hpp` / `.cpp` (C++ `toNative`/`toProto` overloads)
//! - `<native package path>/NativeModelMapper.kt` (Kotlin extension functions)

mod cpp;
mod kotlin;
mod templates;
mod writer;

pub use cpp::{CppEmitter, CppUnit};
pub use kotlin::KotlinEmitter;
pub use writer::{write_artifacts, Artifact};

use bindings_generator_common::naming::{
    include_guard, kotlin_native_package, managed_output_path, INCLUDE_GUARD_TOKEN,
};
use bindings_generator_common::{
    GeneratorConfig, GeneratorError, Result, SchemaCompiler, SchemaFile,
};
use std::path::{Path, PathBuf};
use tera::Tera;

/// Notice written at the top of every generated file
const GENERATED_NOTICE: &str = "THIS FILE IS AUTO-GENERATED. DO NOT MODIFY.";

/// Bindings generator
///
/// Transforms a SchemaFile into the conversion artifacts enabled by the
/// configuration. Construction fails when a field references a type that is
/// neither declared in the file nor imported.
pub struct BindingsGenerator {
    schema: SchemaFile,
    config: GeneratorConfig,
    tera: Tera,
}

impl BindingsGenerator {
    /// Create a new generator from a SchemaFile
    pub fn new(schema: SchemaFile, config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        schema.resolve_references()?;
        let tera = templates::load_templates()?;
        Ok(Self {
            schema,
            config,
            tera,
        })
    }

    /// Render every enabled artifact in memory
    pub fn render(&self) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::new();
        if self.config.cpp.enabled {
            artifacts.extend(self.render_cpp()?);
        }
        if self.config.kotlin.enabled {
            artifacts.push(self.render_kotlin()?);
        }
        Ok(artifacts)
    }

    /// Render and write all artifacts to a directory
    pub fn generate_to_directory(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let artifacts = self.render()?;
        write_artifacts(output_dir, &artifacts)
    }

    /// Header and source file names for this schema file
    pub fn cpp_file_names(&self) -> (String, String) {
        let stem = self.schema.file_stem();
        (
            format!("{}_protobuf_helpers.hpp", stem),
            format!("{}_protobuf_helpers.cpp", stem),
        )
    }

    /// Kotlin package the mapper file is declared in
    pub fn kotlin_package(&self) -> String {
        kotlin_native_package(
            self.config.kotlin.native_package.as_deref(),
            &self.schema.package_name,
        )
    }

    /// Render C++ header and source
    fn render_cpp(&self) -> Result<Vec<Artifact>> {
        let unit = CppEmitter::new(&self.schema, &self.config.cpp).emit();
        let (header_name, source_name) = self.cpp_file_names();
        let guard = include_guard(INCLUDE_GUARD_TOKEN, &self.schema.package_name);

        let mut context = self.create_context();
        context.insert("guard", &guard);
        context.insert("pb_header", &self.pb_header());
        context.insert("native_includes", &self.config.cpp.native_includes);
        context.insert("forward_declarations", &unit.forward_declarations);
        context.insert("helpers_namespace", &self.config.cpp.helpers_namespace);
        context.insert("declarations", &unit.declarations);
        let header = self.render_template(templates::CPP_HEADER, &context)?;

        let mut context = self.create_context();
        context.insert("header_name", &header_name);
        context.insert("helpers_namespace", &self.config.cpp.helpers_namespace);
        context.insert("definitions", &unit.definitions);
        let source = self.render_template(templates::CPP_SOURCE, &context)?;

        Ok(vec![
            Artifact::new(header_name, header),
            Artifact::new(source_name, source),
        ])
    }

    /// Render Kotlin mapper
    fn render_kotlin(&self) -> Result<Artifact> {
        let package = self.kotlin_package();
        let functions = KotlinEmitter::new(&self.schema).emit();

        let mut context = self.create_context();
        context.insert("package", &package);
        context.insert("functions", &functions);
        let contents = self.render_template(templates::KOTLIN_MAPPER, &context)?;

        Ok(Artifact::new(managed_output_path(&package), contents))
    }

    fn render_template(&self, name: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(name, context)
            .map_err(|e| GeneratorError::Generation(format!("Template error in {}: {:?}", name, e)))
    }

    /// Header generated by protoc for the schema file (`api/rec.proto` -> `api/rec.pb.h`)
    fn pb_header(&self) -> String {
        let source = &self.schema.source_name;
        let base = source.strip_suffix(".proto").unwrap_or(source);
        format!("{}.pb.h", base)
    }

    /// Create template context shared by every file
    fn create_context(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert(
            "notice",
            &format!("{}\nSource: {}", GENERATED_NOTICE, self.schema.source_name),
        );
        context
    }
}

/// Compile a `.proto` file and write its bindings (convenience function)
///
/// # Arguments
/// * `compiler` - Schema compiler turning the proto file into a SchemaFile
/// * `proto_file` - Schema source
/// * `include_dirs` - Import search path
/// * `config` - Generator settings
/// * `output_dir` - Destination of the generated files
pub fn generate_bindings(
    compiler: &dyn SchemaCompiler,
    proto_file: &Path,
    include_dirs: &[PathBuf],
    config: GeneratorConfig,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let schema = compiler.compile(proto_file, include_dirs)?;
    let generator = BindingsGenerator::new(schema, config)?;
    generator.generate_to_directory(output_dir)
}
