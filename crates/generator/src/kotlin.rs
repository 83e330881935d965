//! Managed-surface (Kotlin) emitter
//!
//! Produces extension functions between protobuf-java classes and the
//! native Kotlin model: `Native.toProto()` and `Wire.toNative()` for every
//! enum and message, in the same depth-first order as the C++ emitter.

use bindings_generator_common::naming::{
    java_accessor_suffix, java_list_property, java_map_property, java_property_name,
    kotlin_identifier, kotlin_native_class, kotlin_wire_class, native_enum_value_name,
};
use bindings_generator_common::{BaseKind, Enum, Field, Message, Multiplicity, SchemaFile};
use std::collections::HashSet;

const INDENT: &str = "    ";

/// Kotlin conversion emitter
pub struct KotlinEmitter<'a> {
    schema: &'a SchemaFile,
}

impl<'a> KotlinEmitter<'a> {
    pub fn new(schema: &'a SchemaFile) -> Self {
        Self { schema }
    }

    /// Emit one block per enum/message, each holding both extension functions
    pub fn emit(&self) -> Vec<String> {
        let mut blocks = Vec::with_capacity(self.schema.type_count());
        for enum_def in &self.schema.enums {
            self.emit_enum(enum_def, &mut blocks);
        }
        for message in &self.schema.messages {
            self.emit_message(message, &mut blocks);
        }
        blocks
    }

    fn native_class(&self, full_name: &str) -> String {
        kotlin_native_class(&self.schema.package_name, full_name)
    }

    fn wire_class(&self, full_name: &str) -> String {
        kotlin_wire_class(self.schema, full_name)
    }

    fn emit_enum(&self, enum_def: &Enum, blocks: &mut Vec<String>) {
        let native = self.native_class(&enum_def.full_name);
        let wire = self.wire_class(&enum_def.full_name);

        let mut to_proto = vec![format!("fun {native}.toProto(): {wire} = when (this) {{")];
        let mut seen_names = HashSet::new();
        for value in &enum_def.values {
            let native_value = native_enum_value_name(&value.name);
            if !seen_names.insert(native_value.clone()) {
                continue;
            }
            to_proto.push(format!(
                "{INDENT}{native}.{} -> {wire}.{}",
                kotlin_identifier(&native_value),
                kotlin_identifier(&value.name)
            ));
        }
        to_proto.push("}".to_string());

        let mut to_native = vec![format!("fun {wire}.toNative(): {native} = when (this) {{")];
        // Aliases are static fields in protobuf-java, not enum constants
        let mut seen_numbers = HashSet::new();
        for value in &enum_def.values {
            if !seen_numbers.insert(value.number) {
                continue;
            }
            to_native.push(format!(
                "{INDENT}{wire}.{} -> {native}.{}",
                kotlin_identifier(&value.name),
                kotlin_identifier(&native_enum_value_name(&value.name))
            ));
        }
        if self.schema.syntax.has_open_enums() {
            to_native.push(format!(
                "{INDENT}{wire}.UNRECOGNIZED -> throw IllegalArgumentException(\"Unrecognized proto enum value: $this\")"
            ));
        }
        to_native.push("}".to_string());

        blocks.push(format!("{}\n\n{}", to_proto.join("\n"), to_native.join("\n")));
    }

    /// Value type of a map field, `None` for every other field
    fn map_value(&self, field: &Field) -> Option<&BaseKind> {
        match (&field.classification.base, field.classification.multiplicity) {
            (BaseKind::Message(entry), Multiplicity::Repeated) => self.schema.map_value(entry),
            _ => None,
        }
    }

    fn emit_message(&self, message: &Message, blocks: &mut Vec<String>) {
        if message.is_map_entry {
            return;
        }
        let native = self.native_class(&message.full_name);
        let wire = self.wire_class(&message.full_name);

        let mut to_proto = vec![
            format!("fun {native}.toProto(): {wire} {{"),
            format!("{INDENT}val builder = {wire}.newBuilder()"),
        ];
        for field in &message.fields {
            to_proto.push(format!(
                "{INDENT}{}",
                field_to_proto(field, self.map_value(field))
            ));
        }
        to_proto.push(format!("{INDENT}return builder.build()"));
        to_proto.push("}".to_string());

        let to_native = if message.fields.is_empty() {
            format!("fun {wire}.toNative(): {native} = {native}()")
        } else {
            let last = message.fields.len() - 1;
            let mut lines = vec![format!("fun {wire}.toNative(): {native} = {native}(")];
            for (index, field) in message.fields.iter().enumerate() {
                let comma = if index < last { "," } else { "" };
                lines.push(format!(
                    "{INDENT}{}{comma}",
                    field_to_native(field, self.map_value(field))
                ));
            }
            lines.push(")".to_string());
            lines.join("\n")
        };

        blocks.push(format!("{}\n\n{}", to_proto.join("\n"), to_native));

        for nested in &message.nested_enums {
            self.emit_enum(nested, blocks);
        }
        for nested in &message.nested_messages {
            self.emit_message(nested, blocks);
        }
    }
}

/// Named constructor argument reading one field off the protobuf-java object
///
/// `map_value` is the value type when the field is a `map<K, V>`.
fn field_to_native(field: &Field, map_value: Option<&BaseKind>) -> String {
    let name = kotlin_identifier(&field.native_name);
    if let Some(value) = map_value {
        let map = java_map_property(&field.wire_name);
        return match value {
            BaseKind::Scalar(_) => format!("{name} = {map}"),
            BaseKind::Enum(_) | BaseKind::Message(_) => {
                format!("{name} = {map}.mapValues {{ it.value.toNative() }}")
            }
        };
    }

    let property = java_property_name(&field.wire_name);
    let list = java_list_property(&field.wire_name);
    let has = format!("has{}()", java_accessor_suffix(&field.wire_name));
    let classification = &field.classification;

    let value = match (&classification.base, classification.multiplicity) {
        (BaseKind::Scalar(_), Multiplicity::Singular) => property,
        (BaseKind::Scalar(_), Multiplicity::Optional) => {
            format!("if ({has}) {property} else null")
        }
        (BaseKind::Scalar(_), Multiplicity::Repeated) => list,
        (BaseKind::Enum(_), Multiplicity::Singular) => format!("{property}.toNative()"),
        (BaseKind::Enum(_), Multiplicity::Optional)
        | (BaseKind::Message(_), Multiplicity::Singular | Multiplicity::Optional) => {
            format!("if ({has}) {property}.toNative() else null")
        }
        (BaseKind::Enum(_) | BaseKind::Message(_), Multiplicity::Repeated) => {
            format!("{list}.map {{ it.toNative() }}")
        }
    };

    format!("{name} = {value}")
}

/// Builder statement writing one native property into the protobuf-java builder
fn field_to_proto(field: &Field, map_value: Option<&BaseKind>) -> String {
    let name = kotlin_identifier(&field.native_name);
    let suffix = java_accessor_suffix(&field.wire_name);
    if let Some(value) = map_value {
        return match value {
            BaseKind::Scalar(_) => format!("builder.putAll{suffix}(this.{name})"),
            BaseKind::Enum(_) | BaseKind::Message(_) => {
                format!("builder.putAll{suffix}(this.{name}.mapValues {{ it.value.toProto() }})")
            }
        };
    }
    let classification = &field.classification;

    match (&classification.base, classification.multiplicity) {
        (BaseKind::Scalar(_), Multiplicity::Singular) => {
            format!("builder.set{suffix}(this.{name})")
        }
        (BaseKind::Scalar(_), Multiplicity::Optional) => {
            format!("this.{name}?.let {{ builder.set{suffix}(it) }}")
        }
        (BaseKind::Scalar(_), Multiplicity::Repeated) => {
            format!("builder.addAll{suffix}(this.{name})")
        }
        (BaseKind::Enum(_), Multiplicity::Singular) => {
            format!("builder.set{suffix}(this.{name}.toProto())")
        }
        (BaseKind::Enum(_), Multiplicity::Optional)
        | (BaseKind::Message(_), Multiplicity::Singular | Multiplicity::Optional) => {
            format!("this.{name}?.let {{ builder.set{suffix}(it.toProto()) }}")
        }
        (BaseKind::Enum(_) | BaseKind::Message(_), Multiplicity::Repeated) => {
            format!("builder.addAll{suffix}(this.{name}.map {{ it.toProto() }})")
        }
    }
}
