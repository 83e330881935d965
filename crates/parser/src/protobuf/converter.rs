//! Converts protobuf descriptors to the descriptor model

use crate::field_classifier::FieldClassifier;
use bindings_generator_common::naming::native_field_name;
use bindings_generator_common::{
    Enum, EnumValue, Field, JavaOptions, Message, SchemaFile, Syntax, TypeKind,
};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet,
};
use std::collections::BTreeMap;

/// Convert one file of a descriptor set into a `SchemaFile`
///
/// Types declared by the other files of the set (the imports flattened by
/// `--include_imports`) are recorded as external types so references to
/// them resolve.
pub fn convert_file_descriptor(set: &FileDescriptorSet, file: &FileDescriptorProto) -> SchemaFile {
    let package = file.package().to_string();
    let syntax = Syntax::from_descriptor(file.syntax.as_deref());

    let messages = file
        .message_type
        .iter()
        .map(|message| parse_message(message, &package, syntax))
        .collect();

    let enums = file
        .enum_type
        .iter()
        .map(|enum_def| parse_enum(enum_def, &package))
        .collect();

    let java_options = file
        .options
        .as_ref()
        .map(|options| JavaOptions {
            package: options.java_package.clone(),
            outer_classname: options.java_outer_classname.clone(),
            multiple_files: options.java_multiple_files(),
        })
        .unwrap_or_default();

    SchemaFile {
        source_name: file.name().to_string(),
        package_name: package,
        syntax,
        messages,
        enums,
        java_options,
        external_types: collect_external_types(set, file.name()),
    }
}

/// Index every type declared outside `file_name`
fn collect_external_types(set: &FileDescriptorSet, file_name: &str) -> BTreeMap<String, TypeKind> {
    fn visit(message: &DescriptorProto, prefix: &str, index: &mut BTreeMap<String, TypeKind>) {
        let full_name = qualify(prefix, message.name());
        for enum_def in &message.enum_type {
            index.insert(qualify(&full_name, enum_def.name()), TypeKind::Enum);
        }
        for nested in &message.nested_type {
            visit(nested, &full_name, index);
        }
        index.insert(full_name, TypeKind::Message);
    }

    let mut index = BTreeMap::new();
    for file in set.file.iter().filter(|f| f.name() != file_name) {
        for enum_def in &file.enum_type {
            index.insert(qualify(file.package(), enum_def.name()), TypeKind::Enum);
        }
        for message in &file.message_type {
            visit(message, file.package(), &mut index);
        }
    }
    index
}

fn parse_message(message: &DescriptorProto, prefix: &str, syntax: Syntax) -> Message {
    let full_name = qualify(prefix, message.name());

    let fields = message
        .field
        .iter()
        .map(|field| parse_field(field, syntax))
        .collect();

    let nested_messages = message
        .nested_type
        .iter()
        .map(|nested| parse_message(nested, &full_name, syntax))
        .collect();

    let nested_enums = message
        .enum_type
        .iter()
        .map(|nested| parse_enum(nested, &full_name))
        .collect();

    let is_map_entry = message
        .options
        .as_ref()
        .map(|options| options.map_entry())
        .unwrap_or(false);

    Message {
        name: message.name().to_string(),
        full_name,
        fields,
        nested_messages,
        nested_enums,
        is_map_entry,
    }
}

fn parse_field(field: &FieldDescriptorProto, syntax: Syntax) -> Field {
    let wire_name = field.name().to_string();
    let native_name = match field.json_name.as_deref() {
        Some(json_name) if !json_name.is_empty() => json_name.to_string(),
        _ => native_field_name(&wire_name),
    };

    Field {
        native_name,
        number: field.number(),
        classification: FieldClassifier::classify(field, syntax),
        wire_name,
    }
}

fn parse_enum(enum_def: &EnumDescriptorProto, prefix: &str) -> Enum {
    Enum {
        name: enum_def.name().to_string(),
        full_name: qualify(prefix, enum_def.name()),
        values: enum_def
            .value
            .iter()
            .map(|value| EnumValue {
                name: value.name().to_string(),
                number: value.number(),
            })
            .collect(),
    }
}

/// Prefix `name` with its enclosing scope
fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindings_generator_common::{BaseKind, Multiplicity};
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::{EnumValueDescriptorProto, FileOptions, MessageOptions};

    fn enum_field(name: &str, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(1),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::Enum as i32),
            type_name: Some(type_name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_qualify() {
        assert_eq!(qualify("p", "Rec"), "p.Rec");
        assert_eq!(qualify("", "Rec"), "Rec");
    }

    #[test]
    fn test_convert_nested_names() {
        let file = FileDescriptorProto {
            name: Some("rec.proto".to_string()),
            package: Some("p".to_string()),
            syntax: Some("proto3".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Rec".to_string()),
                field: vec![enum_field("kind", ".p.Rec.Kind")],
                nested_type: vec![DescriptorProto {
                    name: Some("Inner".to_string()),
                    ..Default::default()
                }],
                enum_type: vec![EnumDescriptorProto {
                    name: Some("Kind".to_string()),
                    value: vec![EnumValueDescriptorProto {
                        name: Some("kKindA".to_string()),
                        number: Some(0),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let set = FileDescriptorSet {
            file: vec![file.clone()],
        };

        let schema = convert_file_descriptor(&set, &file);
        assert_eq!(schema.package_name, "p");
        assert_eq!(schema.syntax, Syntax::Proto3);

        let rec = &schema.messages[0];
        assert_eq!(rec.full_name, "p.Rec");
        assert_eq!(rec.nested_messages[0].full_name, "p.Rec.Inner");
        assert_eq!(rec.nested_enums[0].full_name, "p.Rec.Kind");
        assert_eq!(rec.nested_enums[0].values[0].name, "kKindA");
        assert_eq!(
            rec.fields[0].classification.base,
            BaseKind::Enum("p.Rec.Kind".to_string())
        );
        assert_eq!(
            rec.fields[0].classification.multiplicity,
            Multiplicity::Singular
        );
        assert!(schema.resolve_references().is_ok());
    }

    #[test]
    fn test_native_name_prefers_json_name() {
        let mut field = enum_field("display_name", ".p.Status");
        assert_eq!(parse_field(&field, Syntax::Proto3).native_name, "displayName");

        field.json_name = Some("shownAs".to_string());
        let parsed = parse_field(&field, Syntax::Proto3);
        assert_eq!(parsed.native_name, "shownAs");
        assert_eq!(parsed.wire_name, "display_name");
    }

    #[test]
    fn test_external_types_from_imports() {
        let timestamp = FileDescriptorProto {
            name: Some("google/protobuf/timestamp.proto".to_string()),
            package: Some("google.protobuf".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Timestamp".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let main = FileDescriptorProto {
            name: Some("rec.proto".to_string()),
            package: Some("p".to_string()),
            dependency: vec!["google/protobuf/timestamp.proto".to_string()],
            ..Default::default()
        };
        let set = FileDescriptorSet {
            file: vec![timestamp, main.clone()],
        };

        let schema = convert_file_descriptor(&set, &main);
        assert_eq!(
            schema.external_types.get("google.protobuf.Timestamp"),
            Some(&TypeKind::Message)
        );
        assert!(!schema.external_types.contains_key("p.Rec"));
    }

    #[test]
    fn test_java_options_and_map_entry() {
        let file = FileDescriptorProto {
            name: Some("rec.proto".to_string()),
            package: Some("p".to_string()),
            options: Some(FileOptions {
                java_package: Some("com.example.protos".to_string()),
                java_multiple_files: Some(true),
                ..Default::default()
            }),
            message_type: vec![DescriptorProto {
                name: Some("LabelsEntry".to_string()),
                options: Some(MessageOptions {
                    map_entry: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        };
        let set = FileDescriptorSet {
            file: vec![file.clone()],
        };

        let schema = convert_file_descriptor(&set, &file);
        assert_eq!(
            schema.java_options.package.as_deref(),
            Some("com.example.protos")
        );
        assert!(schema.java_options.multiple_files);
        assert!(schema.messages[0].is_map_entry);
    }
}
