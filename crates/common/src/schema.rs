//! Descriptor model
//!
//! An immutable tree of messages, enums and fields for one `.proto` file.
//! Every message and enum carries its fully-qualified name (without protoc's
//! leading dot); that name is the only input the naming rules work from.

use crate::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Protobuf syntax level of a schema file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// `syntax = "proto2"` (also what protoc reports when the syntax is omitted)
    #[default]
    Proto2,
    /// `syntax = "proto3"`
    Proto3,
    /// `edition = "..."`
    Editions,
}

impl Syntax {
    /// Map the `syntax` field of a `FileDescriptorProto`
    pub fn from_descriptor(syntax: Option<&str>) -> Self {
        match syntax {
            Some("proto3") => Syntax::Proto3,
            Some("editions") => Syntax::Editions,
            _ => Syntax::Proto2,
        }
    }

    /// Whether enums accept unknown numbers on the wire
    ///
    /// Open enums get an `UNRECOGNIZED` constant in protobuf-java.
    pub fn has_open_enums(self) -> bool {
        matches!(self, Syntax::Proto3 | Syntax::Editions)
    }
}

/// Primitive protobuf field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    /// A type number this generator does not know about
    Unknown,
}

impl ScalarType {
    /// The `.proto` spelling of the type
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
            ScalarType::Unknown => "unknown",
        }
    }
}

/// What a field holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "type")]
pub enum BaseKind {
    Scalar(ScalarType),
    /// Fully-qualified enum name
    Enum(String),
    /// Fully-qualified message name
    Message(String),
}

/// How many values a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    Singular,
    /// Explicit presence (`optional` keyword or proto2 optional label)
    Optional,
    Repeated,
}

/// Classification of a field: base kind x multiplicity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldClassification {
    pub base: BaseKind,
    pub multiplicity: Multiplicity,
}

impl FieldClassification {
    pub fn new(base: BaseKind, multiplicity: Multiplicity) -> Self {
        Self { base, multiplicity }
    }

    /// Referenced enum or message name, `None` for scalars
    pub fn type_name(&self) -> Option<&str> {
        match &self.base {
            BaseKind::Scalar(_) => None,
            BaseKind::Enum(name) | BaseKind::Message(name) => Some(name),
        }
    }

    /// Short label such as `enum/repeated`
    pub fn label(&self) -> String {
        let base = match self.base {
            BaseKind::Scalar(_) => "scalar",
            BaseKind::Enum(_) => "enum",
            BaseKind::Message(_) => "message",
        };
        let multiplicity = match self.multiplicity {
            Multiplicity::Singular => "singular",
            Multiplicity::Optional => "optional",
            Multiplicity::Repeated => "repeated",
        };
        format!("{}/{}", base, multiplicity)
    }
}

/// A message field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Name as declared in the schema (`display_name`)
    pub wire_name: String,
    /// lowerCamelCase name used on the native side (`displayName`)
    pub native_name: String,
    pub number: i32,
    pub classification: FieldClassification,
}

/// A message, possibly with nested types
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    pub full_name: String,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub nested_messages: Vec<Message>,
    #[serde(default)]
    pub nested_enums: Vec<Enum>,
    /// Synthetic entry type generated for a `map<K, V>` field
    #[serde(default)]
    pub is_map_entry: bool,
}

/// An enum
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    pub full_name: String,
    pub values: Vec<EnumValue>,
}

/// A single enum constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

/// Kind of a named type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Message,
    Enum,
}

/// Java code generation options of the schema file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JavaOptions {
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub outer_classname: Option<String>,
    #[serde(default)]
    pub multiple_files: bool,
}

/// Root of one compilation unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    /// File name as recorded by protoc (`p/rec.proto`)
    pub source_name: String,
    pub package_name: String,
    #[serde(default)]
    pub syntax: Syntax,
    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
    #[serde(default)]
    pub java_options: JavaOptions,
    /// Types declared in imported files, by fully-qualified name
    #[serde(default)]
    pub external_types: BTreeMap<String, TypeKind>,
}

impl SchemaFile {
    /// File name without directories and without the `.proto` extension
    pub fn file_stem(&self) -> &str {
        let file_name = self
            .source_name
            .rsplit('/')
            .next()
            .unwrap_or(&self.source_name);
        file_name.strip_suffix(".proto").unwrap_or(file_name)
    }

    /// Every message in the file, depth-first pre-order
    pub fn all_messages(&self) -> Vec<&Message> {
        fn visit<'a>(message: &'a Message, out: &mut Vec<&'a Message>) {
            out.push(message);
            for nested in &message.nested_messages {
                visit(nested, out);
            }
        }

        let mut out = Vec::new();
        for message in &self.messages {
            visit(message, &mut out);
        }
        out
    }

    /// Number of message and enum nodes that get a conversion pair
    ///
    /// Nested types are included; synthetic map entries are not, since
    /// their contents are converted inline with the map field.
    pub fn type_count(&self) -> usize {
        fn count(message: &Message) -> usize {
            if message.is_map_entry {
                return 0;
            }
            1 + message.nested_enums.len() + message.nested_messages.iter().map(count).sum::<usize>()
        }

        self.enums.len() + self.messages.iter().map(count).sum::<usize>()
    }

    /// Value type of a map field, given the field's entry message name
    ///
    /// Returns `None` when `type_name` is not a map entry of this file.
    pub fn map_value(&self, type_name: &str) -> Option<&BaseKind> {
        self.all_messages()
            .into_iter()
            .find(|message| message.is_map_entry && message.full_name == type_name)
            .and_then(|entry| entry.fields.iter().find(|field| field.number == 2))
            .map(|field| &field.classification.base)
    }

    /// Every type a field of this file may refer to
    pub fn type_index(&self) -> BTreeMap<String, TypeKind> {
        fn visit(message: &Message, index: &mut BTreeMap<String, TypeKind>) {
            index.insert(message.full_name.clone(), TypeKind::Message);
            for nested in &message.nested_enums {
                index.insert(nested.full_name.clone(), TypeKind::Enum);
            }
            for nested in &message.nested_messages {
                visit(nested, index);
            }
        }

        let mut index = self.external_types.clone();
        for enum_def in &self.enums {
            index.insert(enum_def.full_name.clone(), TypeKind::Enum);
        }
        for message in &self.messages {
            visit(message, &mut index);
        }
        index
    }

    /// Check that every enum and message reference resolves to a type of
    /// the matching kind
    pub fn resolve_references(&self) -> Result<()> {
        let index = self.type_index();

        for message in self.all_messages() {
            for field in &message.fields {
                let (type_name, expected) = match &field.classification.base {
                    BaseKind::Scalar(_) => continue,
                    BaseKind::Enum(name) => (name, TypeKind::Enum),
                    BaseKind::Message(name) => (name, TypeKind::Message),
                };

                if index.get(type_name) != Some(&expected) {
                    return Err(GeneratorError::UnresolvedType {
                        type_name: type_name.clone(),
                        referenced_from: format!("{}.{}", message.full_name, field.wire_name),
                    });
                }
            }
        }

        Ok(())
    }
}
