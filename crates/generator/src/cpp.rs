//! Compiled-surface (C++) emitter
//!
//! Walks the descriptor tree depth-first and produces, for every enum and
//! message, a `toNative`/`toProto` overload pair: one declaration block for
//! the header and one definition block for the source file.

use bindings_generator_common::naming::{
    cpp_field_accessor, cpp_forward_declaration, cpp_native_member, cpp_native_type,
    cpp_wire_enum_value, cpp_wire_type, native_enum_value_name,
};
use bindings_generator_common::{
    BaseKind, CppConfig, Enum, Field, Message, Multiplicity, SchemaFile,
};
use std::collections::HashSet;

const INDENT: &str = "    ";

/// Text blocks for one schema file, in emission order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CppUnit {
    /// One line per message type, nested included
    pub forward_declarations: Vec<String>,
    /// One block per enum/message holding both declarations
    pub declarations: Vec<String>,
    /// One block per enum/message holding both definitions
    pub definitions: Vec<String>,
}

/// C++ conversion emitter
pub struct CppEmitter<'a> {
    schema: &'a SchemaFile,
    config: &'a CppConfig,
}

impl<'a> CppEmitter<'a> {
    pub fn new(schema: &'a SchemaFile, config: &'a CppConfig) -> Self {
        Self { schema, config }
    }

    /// Emit every conversion pair of the schema file
    ///
    /// Top-level enums come first, then messages; each message is followed
    /// by its nested enums and then its nested messages.
    pub fn emit(&self) -> CppUnit {
        let mut unit = CppUnit {
            forward_declarations: self
                .schema
                .all_messages()
                .iter()
                .filter(|message| !message.is_map_entry)
                .map(|message| cpp_forward_declaration(&self.schema.package_name, &message.full_name))
                .collect(),
            ..Default::default()
        };

        for enum_def in &self.schema.enums {
            self.emit_enum(enum_def, &mut unit);
        }
        for message in &self.schema.messages {
            self.emit_message(message, &mut unit);
        }

        unit
    }

    fn native_type(&self, full_name: &str) -> String {
        cpp_native_type(&self.config.native_namespace, full_name)
    }

    fn emit_enum(&self, enum_def: &Enum, unit: &mut CppUnit) {
        let native = self.native_type(&enum_def.full_name);
        let wire = cpp_wire_type(&enum_def.full_name);

        unit.declarations.push(format!(
            "// {name}\n{native} toNative({wire} proto);\n{wire} toProto({native} native);",
            name = enum_def.full_name,
        ));

        let mut to_native = vec![
            format!("{native} toNative({wire} proto) {{"),
            format!("{INDENT}switch (proto) {{"),
        ];
        // Aliased numbers share one case label; the first declaration wins
        let mut seen_numbers = HashSet::new();
        for value in &enum_def.values {
            if !seen_numbers.insert(value.number) {
                continue;
            }
            to_native.push(format!(
                "{INDENT}{INDENT}case {}:",
                cpp_wire_enum_value(&enum_def.full_name, &value.name)
            ));
            to_native.push(format!(
                "{INDENT}{INDENT}{INDENT}return {native}::{};",
                native_enum_value_name(&value.name)
            ));
        }
        to_native.push(format!("{INDENT}{INDENT}default:"));
        to_native.push(format!(
            "{INDENT}{INDENT}{INDENT}throw std::invalid_argument(\"Unrecognized value for {}: \" + std::to_string(static_cast<int>(proto)));",
            enum_def.full_name
        ));
        to_native.push(format!("{INDENT}}}"));
        to_native.push("}".to_string());

        let mut to_proto = vec![
            format!("{wire} toProto({native} native) {{"),
            format!("{INDENT}switch (native) {{"),
        ];
        let mut seen_names = HashSet::new();
        for value in &enum_def.values {
            let native_value = native_enum_value_name(&value.name);
            if !seen_names.insert(native_value.clone()) {
                continue;
            }
            to_proto.push(format!("{INDENT}{INDENT}case {native}::{native_value}:"));
            to_proto.push(format!(
                "{INDENT}{INDENT}{INDENT}return {};",
                cpp_wire_enum_value(&enum_def.full_name, &value.name)
            ));
        }
        to_proto.push(format!("{INDENT}}}"));
        to_proto.push(format!(
            "{INDENT}throw std::invalid_argument(\"Unrecognized native value for {}\");",
            enum_def.full_name
        ));
        to_proto.push("}".to_string());

        unit.definitions
            .push(format!("{}\n\n{}", to_native.join("\n"), to_proto.join("\n")));
    }

    fn emit_message(&self, message: &Message, unit: &mut CppUnit) {
        if message.is_map_entry {
            return;
        }
        let native = self.native_type(&message.full_name);
        let wire = cpp_wire_type(&message.full_name);
        // Field-less messages leave the parameter unnamed
        let (proto_param, native_param) = if message.fields.is_empty() {
            ("/*proto*/", "/*native*/")
        } else {
            ("proto", "native")
        };

        unit.declarations.push(format!(
            "// {name}\n{native} toNative(const {wire}& proto);\n{wire} toProto(const {native}& native);",
            name = message.full_name,
        ));

        let mut to_native = vec![
            format!("{native} toNative(const {wire}& {proto_param}) {{"),
            format!("{INDENT}{native} native;"),
        ];
        for field in &message.fields {
            self.field_to_native(field, &mut to_native);
        }
        to_native.push(format!("{INDENT}return native;"));
        to_native.push("}".to_string());

        let mut to_proto = vec![
            format!("{wire} toProto(const {native}& {native_param}) {{"),
            format!("{INDENT}{wire} proto;"),
        ];
        for field in &message.fields {
            self.field_to_proto(field, &mut to_proto);
        }
        to_proto.push(format!("{INDENT}return proto;"));
        to_proto.push("}".to_string());

        unit.definitions
            .push(format!("{}\n\n{}", to_native.join("\n"), to_proto.join("\n")));

        for nested in &message.nested_enums {
            self.emit_enum(nested, unit);
        }
        for nested in &message.nested_messages {
            self.emit_message(nested, unit);
        }
    }

    /// Value type of a map field, `None` for every other field
    fn map_value(&self, field: &Field) -> Option<&BaseKind> {
        match (&field.classification.base, field.classification.multiplicity) {
            (BaseKind::Message(entry), Multiplicity::Repeated) => self.schema.map_value(entry),
            _ => None,
        }
    }

    fn field_to_native(&self, field: &Field, out: &mut Vec<String>) {
        let member = cpp_native_member(&field.native_name);
        let accessor = cpp_field_accessor(&field.wire_name);

        if let Some(value) = self.map_value(field) {
            let converted = match value {
                BaseKind::Scalar(_) => "value",
                BaseKind::Enum(_) | BaseKind::Message(_) => "toNative(value)",
            };
            out.push(format!("{INDENT}for (const auto& [key, value] : proto.{accessor}()) {{"));
            out.push(format!("{INDENT}{INDENT}native.{member}.emplace(key, {converted});"));
            out.push(format!("{INDENT}}}"));
            return;
        }

        let has = format!("has_{}", field.wire_name.to_ascii_lowercase());
        let classification = &field.classification;

        match (&classification.base, classification.multiplicity) {
            (BaseKind::Scalar(_), Multiplicity::Singular) => {
                out.push(format!("{INDENT}native.{member} = proto.{accessor}();"));
            }
            (BaseKind::Scalar(_), Multiplicity::Optional) => {
                out.push(format!("{INDENT}if (proto.{has}()) {{"));
                out.push(format!("{INDENT}{INDENT}native.{member} = proto.{accessor}();"));
                out.push(format!("{INDENT}}}"));
            }
            (BaseKind::Scalar(_), Multiplicity::Repeated) => {
                out.push(format!("{INDENT}for (const auto& item : proto.{accessor}()) {{"));
                out.push(format!("{INDENT}{INDENT}native.{member}.push_back(item);"));
                out.push(format!("{INDENT}}}"));
            }
            (BaseKind::Enum(_), Multiplicity::Singular) => {
                out.push(format!("{INDENT}native.{member} = toNative(proto.{accessor}());"));
            }
            (BaseKind::Enum(_), Multiplicity::Optional) => {
                out.push(format!("{INDENT}if (proto.{has}()) {{"));
                out.push(format!(
                    "{INDENT}{INDENT}native.{member} = toNative(proto.{accessor}());"
                ));
                out.push(format!("{INDENT}}}"));
            }
            (BaseKind::Enum(type_name), Multiplicity::Repeated) => {
                // Repeated enums are stored as int on the wire side
                out.push(format!("{INDENT}for (const auto& item : proto.{accessor}()) {{"));
                out.push(format!(
                    "{INDENT}{INDENT}native.{member}.push_back(toNative(static_cast<{}>(item)));",
                    cpp_wire_type(type_name)
                ));
                out.push(format!("{INDENT}}}"));
            }
            (BaseKind::Message(_), Multiplicity::Singular | Multiplicity::Optional) => {
                out.push(format!("{INDENT}if (proto.{has}()) {{"));
                out.push(format!(
                    "{INDENT}{INDENT}native.{member} = toNative(proto.{accessor}());"
                ));
                out.push(format!("{INDENT}}}"));
            }
            (BaseKind::Message(_), Multiplicity::Repeated) => {
                out.push(format!("{INDENT}for (const auto& item : proto.{accessor}()) {{"));
                out.push(format!("{INDENT}{INDENT}native.{member}.push_back(toNative(item));"));
                out.push(format!("{INDENT}}}"));
            }
        }
    }

    fn field_to_proto(&self, field: &Field, out: &mut Vec<String>) {
        let member = cpp_native_member(&field.native_name);
        let raw = field.wire_name.to_ascii_lowercase();

        if let Some(value) = self.map_value(field) {
            let converted = match value {
                BaseKind::Scalar(_) => "value",
                BaseKind::Enum(_) | BaseKind::Message(_) => "toProto(value)",
            };
            out.push(format!("{INDENT}for (const auto& [key, value] : native.{member}) {{"));
            out.push(format!("{INDENT}{INDENT}(*proto.mutable_{raw}())[key] = {converted};"));
            out.push(format!("{INDENT}}}"));
            return;
        }

        let classification = &field.classification;

        match (&classification.base, classification.multiplicity) {
            (BaseKind::Scalar(_), Multiplicity::Singular) => {
                out.push(format!("{INDENT}proto.set_{raw}(native.{member});"));
            }
            (BaseKind::Scalar(_), Multiplicity::Optional) => {
                out.push(format!("{INDENT}if (native.{member}.has_value()) {{"));
                out.push(format!("{INDENT}{INDENT}proto.set_{raw}(native.{member}.value());"));
                out.push(format!("{INDENT}}}"));
            }
            (BaseKind::Scalar(_), Multiplicity::Repeated) => {
                out.push(format!("{INDENT}for (const auto& item : native.{member}) {{"));
                out.push(format!("{INDENT}{INDENT}proto.add_{raw}(item);"));
                out.push(format!("{INDENT}}}"));
            }
            (BaseKind::Enum(_), Multiplicity::Singular) => {
                out.push(format!("{INDENT}proto.set_{raw}(toProto(native.{member}));"));
            }
            (BaseKind::Enum(_), Multiplicity::Optional) => {
                out.push(format!("{INDENT}if (native.{member}.has_value()) {{"));
                out.push(format!(
                    "{INDENT}{INDENT}proto.set_{raw}(toProto(native.{member}.value()));"
                ));
                out.push(format!("{INDENT}}}"));
            }
            (BaseKind::Enum(_), Multiplicity::Repeated) => {
                out.push(format!("{INDENT}for (const auto& item : native.{member}) {{"));
                out.push(format!("{INDENT}{INDENT}proto.add_{raw}(toProto(item));"));
                out.push(format!("{INDENT}}}"));
            }
            (BaseKind::Message(_), Multiplicity::Singular | Multiplicity::Optional) => {
                out.push(format!("{INDENT}if (native.{member}.has_value()) {{"));
                out.push(format!(
                    "{INDENT}{INDENT}*proto.mutable_{raw}() = toProto(native.{member}.value());"
                ));
                out.push(format!("{INDENT}}}"));
            }
            (BaseKind::Message(_), Multiplicity::Repeated) => {
                out.push(format!("{INDENT}for (const auto& item : native.{member}) {{"));
                out.push(format!("{INDENT}{INDENT}*proto.add_{raw}() = toProto(item);"));
                out.push(format!("{INDENT}}}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindings_generator_common::{EnumValue, FieldClassification, ScalarType};

    fn field(name: &str, base: BaseKind, multiplicity: Multiplicity) -> Field {
        Field {
            wire_name: name.to_string(),
            native_name: name.to_string(),
            number: 1,
            classification: FieldClassification::new(base, multiplicity),
        }
    }

    fn status_enum() -> Enum {
        Enum {
            name: "Status".to_string(),
            full_name: "p.Status".to_string(),
            values: vec![
                EnumValue {
                    name: "kActive".to_string(),
                    number: 0,
                },
                EnumValue {
                    name: "kInactive".to_string(),
                    number: 1,
                },
                EnumValue {
                    name: "kDisabled".to_string(),
                    number: 1,
                },
            ],
        }
    }

    fn emit(schema: &SchemaFile) -> CppUnit {
        let config = CppConfig::default();
        CppEmitter::new(schema, &config).emit()
    }

    #[test]
    fn test_enum_switches() {
        let schema = SchemaFile {
            package_name: "p".to_string(),
            enums: vec![status_enum()],
            ..Default::default()
        };
        let unit = emit(&schema);

        assert_eq!(unit.declarations.len(), 1);
        assert!(unit.declarations[0].contains("::native::p::Status toNative(::p::Status proto);"));

        let definition = &unit.definitions[0];
        assert!(definition.contains("case ::p::kActive:\n            return ::native::p::Status::ACTIVE;"));
        assert!(definition.contains("case ::native::p::Status::DISABLED:\n            return ::p::kDisabled;"));
        assert!(definition.contains("default:"));
        assert!(definition.contains("throw std::invalid_argument(\"Unrecognized value for p.Status: \""));
        // kDisabled aliases kInactive: two wire cases, three native cases
        assert_eq!(definition.matches("case ::p::").count(), 2);
        assert_eq!(definition.matches("case ::native::p::Status::").count(), 3);
    }

    #[test]
    fn test_message_field_patterns() {
        let schema = SchemaFile {
            package_name: "p".to_string(),
            messages: vec![Message {
                name: "Rec".to_string(),
                full_name: "p.Rec".to_string(),
                fields: vec![
                    field("nickname", BaseKind::Scalar(ScalarType::String), Multiplicity::Optional),
                    field("status", BaseKind::Enum("p.Status".to_string()), Multiplicity::Optional),
                    field("class", BaseKind::Scalar(ScalarType::Int32), Multiplicity::Singular),
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        let unit = emit(&schema);
        let definition = &unit.definitions[0];

        assert!(definition.contains("    if (proto.has_nickname()) {\n        native.nickname = proto.nickname();\n    }"));
        assert!(definition.contains("    if (native.nickname.has_value()) {\n        proto.set_nickname(native.nickname.value());\n    }"));
        assert!(definition.contains("native.status = toNative(proto.status());"));
        assert!(definition.contains("proto.set_status(toProto(native.status.value()));"));
        // C++ keywords get protoc's trailing underscore on the getter only
        assert!(definition.contains("native.class_ = proto.class_();"));
        assert!(definition.contains("proto.set_class(native.class_);"));
    }

    #[test]
    fn test_nested_order_and_forward_declarations() {
        let inner = Message {
            name: "Inner".to_string(),
            full_name: "p.Rec.Inner".to_string(),
            ..Default::default()
        };
        let schema = SchemaFile {
            package_name: "p".to_string(),
            enums: vec![status_enum()],
            messages: vec![Message {
                name: "Rec".to_string(),
                full_name: "p.Rec".to_string(),
                nested_messages: vec![inner],
                nested_enums: vec![Enum {
                    name: "Kind".to_string(),
                    full_name: "p.Rec.Kind".to_string(),
                    values: vec![],
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let unit = emit(&schema);

        assert_eq!(
            unit.forward_declarations,
            vec![
                "namespace p { class Rec; }".to_string(),
                "namespace p { class Rec_Inner; }".to_string(),
            ]
        );
        let order: Vec<&str> = unit
            .declarations
            .iter()
            .map(|block| block.lines().next().unwrap_or_default())
            .collect();
        assert_eq!(
            order,
            vec!["// p.Status", "// p.Rec", "// p.Rec.Kind", "// p.Rec.Inner"]
        );
        assert_eq!(unit.declarations.len(), schema.type_count());
        assert_eq!(unit.definitions.len(), schema.type_count());
        assert!(unit.definitions[3].contains("toNative(const ::p::Rec::Inner& /*proto*/)"));
    }

    #[test]
    fn test_map_fields_convert_inline() {
        let mut value = field("value", BaseKind::Message("p.Inner".to_string()), Multiplicity::Singular);
        value.number = 2;
        let entry = Message {
            name: "ItemsEntry".to_string(),
            full_name: "p.Rec.ItemsEntry".to_string(),
            fields: vec![
                field("key", BaseKind::Scalar(ScalarType::String), Multiplicity::Singular),
                value,
            ],
            is_map_entry: true,
            ..Default::default()
        };
        let schema = SchemaFile {
            package_name: "p".to_string(),
            messages: vec![
                Message {
                    name: "Rec".to_string(),
                    full_name: "p.Rec".to_string(),
                    fields: vec![field(
                        "items",
                        BaseKind::Message("p.Rec.ItemsEntry".to_string()),
                        Multiplicity::Repeated,
                    )],
                    nested_messages: vec![entry],
                    ..Default::default()
                },
                Message {
                    name: "Inner".to_string(),
                    full_name: "p.Inner".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let unit = emit(&schema);

        assert_eq!(unit.declarations.len(), 2);
        assert_eq!(unit.declarations.len(), schema.type_count());
        assert!(!unit.forward_declarations.iter().any(|line| line.contains("ItemsEntry")));
        assert!(!unit.definitions.iter().any(|block| block.contains("ItemsEntry")));

        let definition = &unit.definitions[0];
        assert!(definition.contains(
            "    for (const auto& [key, value] : proto.items()) {\n        native.items.emplace(key, toNative(value));\n    }"
        ));
        assert!(definition.contains(
            "    for (const auto& [key, value] : native.items) {\n        (*proto.mutable_items())[key] = toProto(value);\n    }"
        ));
    }

    #[test]
    fn test_custom_native_namespace() {
        let schema = SchemaFile {
            package_name: "p".to_string(),
            enums: vec![status_enum()],
            ..Default::default()
        };
        let config = CppConfig {
            native_namespace: "app::model".to_string(),
            ..Default::default()
        };
        let unit = CppEmitter::new(&schema, &config).emit();
        assert!(unit.declarations[0].contains("::app::model::p::Status toNative(::p::Status proto);"));
    }
}
