//! Bindings Generator CLI
//!
//! Command-line interface for generating C++ and Kotlin conversion code
//! between protobuf messages and native model types.

use anyhow::{bail, Context, Result};
use bindings_generator_common::{
    BaseKind, Enum, GeneratorConfig, Message, SchemaCompiler, SchemaFile,
};
use bindings_generator_generator::BindingsGenerator;
use bindings_generator_parser::{load_descriptor_set, Protoc};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bindings-generator")]
#[command(version, about = "Generate C++ and Kotlin conversion code for protobuf schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a schema and display the descriptor tree
    #[command(after_help = "EXAMPLES:\n  \
        # Compile and inspect a proto file\n  \
        bindings-generator parse --proto protos/rec.proto -I third_party\n\n  \
        # Dump a pre-built descriptor set as JSON\n  \
        bindings-generator parse --descriptor-set rec.desc --json")]
    Parse {
        #[command(flatten)]
        source: SchemaSource,

        /// Print the descriptor tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate conversion code for a schema
    #[command(after_help = "EXAMPLES:\n  \
        # Generate both surfaces\n  \
        bindings-generator generate \\\n    \
        --proto protos/rec.proto \\\n    \
        -I third_party \\\n    \
        --output ./generated\n\n  \
        # Kotlin only, into a custom package\n  \
        bindings-generator generate \\\n    \
        --descriptor-set rec.desc \\\n    \
        --no-cpp \\\n    \
        --kotlin-package com.example.model \\\n    \
        --output ./generated")]
    Generate {
        #[command(flatten)]
        source: SchemaSource,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip the C++ header and source
        #[arg(long)]
        no_cpp: bool,

        /// Skip the Kotlin mapper
        #[arg(long)]
        no_kotlin: bool,

        /// Package of the native Kotlin model (defaults to the proto package)
        #[arg(long)]
        kotlin_package: Option<String>,

        /// C++ namespace of the native model types
        #[arg(long)]
        cpp_native_namespace: Option<String>,
    },
}

/// Where the schema comes from
#[derive(Args, Debug)]
struct SchemaSource {
    /// Path to the .proto file (compiled with protoc)
    #[arg(short, long, required_unless_present = "descriptor_set", conflicts_with = "descriptor_set")]
    proto: Option<PathBuf>,

    /// Path to a FileDescriptorSet built with --include_imports
    #[arg(short, long)]
    descriptor_set: Option<PathBuf>,

    /// File to convert from the descriptor set (defaults to the last one)
    #[arg(long, requires = "descriptor_set")]
    proto_name: Option<String>,

    /// Include directories for proto imports (can be specified multiple times)
    #[arg(short = 'I', long = "include")]
    include_dirs: Vec<PathBuf>,

    /// Path to protoc binary
    #[arg(long, default_value = "protoc")]
    protoc: PathBuf,
}

/// Settings that override the configuration file
struct ConfigOverrides {
    no_cpp: bool,
    no_kotlin: bool,
    kotlin_package: Option<String>,
    cpp_native_namespace: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    match cli.command {
        Commands::Parse { source, json } => {
            parse_command(&source, json, cli.verbose)?;
        }
        Commands::Generate {
            source,
            output,
            config,
            no_cpp,
            no_kotlin,
            kotlin_package,
            cpp_native_namespace,
        } => {
            let overrides = ConfigOverrides {
                no_cpp,
                no_kotlin,
                kotlin_package,
                cpp_native_namespace,
            };
            let config = load_config(config.as_deref(), overrides)?;
            generate_command(&source, config, output.as_path(), cli.verbose)?;
        }
    }

    Ok(())
}

fn parse_command(source: &SchemaSource, json: bool, verbose: bool) -> Result<()> {
    let schema = load_schema(source, verbose)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&schema).context("Failed to serialize descriptor tree")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("\n{}", "✓ Parse successful!".green().bold());
    println!("\n{}", "Schema:".bold());
    println!("  Source: {}", schema.source_name.yellow());
    println!("  Package: {}", schema.package_name.yellow());
    println!("  Syntax: {:?}", schema.syntax);
    println!("  Types: {}", schema.type_count());

    println!("\n{}", "Types:".bold());
    for enum_def in &schema.enums {
        print_enum(enum_def, 1, verbose);
    }
    for message in &schema.messages {
        print_message(message, 1, verbose);
    }

    if verbose && !schema.external_types.is_empty() {
        println!("\n{}", "Imported types:".bold());
        for (name, kind) in &schema.external_types {
            println!("  • {} ({:?})", name, kind);
        }
    }

    Ok(())
}

fn print_enum(enum_def: &Enum, depth: usize, verbose: bool) {
    let indent = "  ".repeat(depth);
    println!(
        "{}• enum {} ({} values)",
        indent,
        enum_def.full_name.cyan(),
        enum_def.values.len()
    );
    if verbose {
        for value in &enum_def.values {
            println!("{}    {} = {}", indent, value.name, value.number);
        }
    }
}

fn print_message(message: &Message, depth: usize, verbose: bool) {
    let indent = "  ".repeat(depth);
    let marker = if message.is_map_entry { " [map entry]" } else { "" };
    println!(
        "{}• message {} ({} fields){}",
        indent,
        message.full_name.cyan(),
        message.fields.len(),
        marker
    );
    if verbose {
        for field in &message.fields {
            let type_name = match &field.classification.base {
                BaseKind::Scalar(scalar) => scalar.as_str().to_string(),
                BaseKind::Enum(name) | BaseKind::Message(name) => name.clone(),
            };
            println!(
                "{}    {} = {}: {} [{}]",
                indent,
                field.wire_name,
                field.number,
                type_name,
                field.classification.label().dimmed()
            );
        }
    }
    for nested in &message.nested_enums {
        print_enum(nested, depth + 1, verbose);
    }
    for nested in &message.nested_messages {
        print_message(nested, depth + 1, verbose);
    }
}

fn generate_command(
    source: &SchemaSource,
    config: GeneratorConfig,
    output: &Path,
    verbose: bool,
) -> Result<()> {
    if !config.cpp.enabled && !config.kotlin.enabled {
        bail!("Both C++ and Kotlin output are disabled; nothing to generate");
    }

    if verbose {
        println!("  Output: {}", output.display());
        println!("  C++: {}", config.cpp.enabled);
        println!("  Kotlin: {}", config.kotlin.enabled);
    }

    let schema = load_schema(source, verbose)?;
    println!(
        "{} Parsed {} types from package {}",
        "✓".green(),
        schema.type_count(),
        schema.package_name.yellow()
    );

    println!("{} Generating conversion code...", "→".cyan());
    let generator =
        BindingsGenerator::new(schema, config).context("Failed to create generator")?;
    let written = generator
        .generate_to_directory(output)
        .with_context(|| format!("Failed to write bindings to {}", output.display()))?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("\n{}", "Generated files:".bold());
    for path in &written {
        println!("  📄 {}", path.display());
    }

    Ok(())
}

/// Compile or load the schema selected on the command line
fn load_schema(source: &SchemaSource, verbose: bool) -> Result<SchemaFile> {
    if let Some(proto) = &source.proto {
        println!("{} Compiling proto file: {}", "→".cyan(), proto.display());
        if !proto.exists() {
            bail!("Proto file not found: {}", proto.display());
        }
        if verbose {
            println!("  protoc: {}", source.protoc.display());
            for dir in &source.include_dirs {
                println!("  Include: {}", dir.display());
            }
        }

        let schema = Protoc::new(&source.protoc)
            .compile(proto, &source.include_dirs)
            .with_context(|| format!("Failed to compile {}", proto.display()))?;
        schema
            .resolve_references()
            .with_context(|| format!("Invalid schema in {}", proto.display()))?;
        return Ok(schema);
    }

    let Some(descriptor_set) = &source.descriptor_set else {
        bail!("Either --proto or --descriptor-set is required");
    };
    println!(
        "{} Loading descriptor set: {}",
        "→".cyan(),
        descriptor_set.display()
    );
    load_descriptor_set(descriptor_set, source.proto_name.as_deref())
        .with_context(|| format!("Failed to load {}", descriptor_set.display()))
}

/// Load the configuration file, if any, and apply command-line overrides
fn load_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<GeneratorConfig> {
    let mut config = match path {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    if overrides.no_cpp {
        config.cpp.enabled = false;
    }
    if overrides.no_kotlin {
        config.kotlin.enabled = false;
    }
    if let Some(package) = overrides.kotlin_package {
        config.kotlin.native_package = Some(package);
    }
    if let Some(namespace) = overrides.cpp_native_namespace {
        config.cpp.native_namespace = namespace;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
