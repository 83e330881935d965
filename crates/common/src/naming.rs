//! Naming rules shared by the emitters
//!
//! Every identifier that appears in generated code is derived here from a
//! fully-qualified descriptor name (`pkg.Outer.Inner`). The functions are
//! pure; the same input always yields the same identifier on a surface, and
//! distinct full names never map to the same identifier.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `p.Rec.Inner` | [`cpp_wire_type`] | `::p::Rec::Inner` |
//! | `p.Rec.Inner` | [`cpp_native_type`] | `::native::p::Rec::Inner` |
//! | `com.example` | [`include_guard`] | `PROTOBUF_HELPERS_HPP_COM_EXAMPLE` |
//! | `kStatusActive` | [`native_enum_value_name`] | `STATUS_ACTIVE` |
//! | `display_name` | [`java_accessor_suffix`] | `DisplayName` |
//! | `value2d` | [`java_accessor_suffix`] | `Value2D` |

use crate::schema::{JavaOptions, SchemaFile};
use heck::ToLowerCamelCase;
use std::path::PathBuf;

/// Token that prefixes every include guard
pub const INCLUDE_GUARD_TOKEN: &str = "PROTOBUF_HELPERS_HPP";

/// Name of the managed-surface file
pub const KOTLIN_FILE_NAME: &str = "NativeModelMapper.kt";

/// Wire prefix stripped from enum values on the native side
const ENUM_VALUE_PREFIX: char = 'k';

const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "asm", "auto", "bool", "break", "case", "catch", "char",
    "class", "const", "constexpr", "continue", "default", "delete", "do", "double", "else",
    "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto", "if",
    "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "nullptr",
    "operator", "or", "private", "protected", "public", "register", "return", "short",
    "signed", "sizeof", "static", "struct", "switch", "template", "this", "throw", "true",
    "try", "typedef", "typename", "union", "unsigned", "using", "virtual", "void", "volatile",
    "while", "xor",
];

const KOTLIN_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

/// Join the segments of a dotted name with `separator`
pub fn scope_path(full_name: &str, separator: &str) -> String {
    full_name
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Part of `full_name` below `package` (`p.Rec.Inner` in `p` -> `Rec.Inner`)
pub fn relative_name<'a>(package: &str, full_name: &'a str) -> &'a str {
    if package.is_empty() {
        return full_name;
    }
    full_name
        .strip_prefix(package)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(full_name)
}

/// Include guard for the declarations file of a schema package
///
/// The guard depends on the package only, so two files of one package
/// share a guard.
pub fn include_guard(token: &str, package: &str) -> String {
    let package: String = package
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();

    if package.is_empty() {
        token.to_string()
    } else {
        format!("{}_{}", token, package)
    }
}

/// Native spelling of a wire enum value
///
/// `kStatusActive` becomes `STATUS_ACTIVE`. Values without the `k` prefix
/// are returned unchanged, so `ACTIVE` and `kActive` both end up `ACTIVE`.
pub fn native_enum_value_name(wire_name: &str) -> String {
    let Some(stripped) = wire_name.strip_prefix(ENUM_VALUE_PREFIX) else {
        return wire_name.to_string();
    };

    let mut result = String::with_capacity(stripped.len() + 4);
    let mut previous_lowercase = false;
    for ch in stripped.chars() {
        if previous_lowercase && ch.is_ascii_uppercase() {
            result.push('_');
        }
        previous_lowercase = ch.is_ascii_lowercase();
        result.push(ch.to_ascii_uppercase());
    }
    result
}

/// lowerCamelCase field name used by native models
pub fn native_field_name(wire_name: &str) -> String {
    wire_name.to_lower_camel_case()
}

// C++

/// Fully-qualified protobuf C++ type (`::p::Rec::Inner`)
pub fn cpp_wire_type(full_name: &str) -> String {
    format!("::{}", scope_path(full_name, "::"))
}

/// Fully-qualified native C++ type below `native_namespace`
pub fn cpp_native_type(native_namespace: &str, full_name: &str) -> String {
    let root = scope_path(&native_namespace.replace("::", "."), "::");
    if root.is_empty() {
        cpp_wire_type(full_name)
    } else {
        format!("::{}::{}", root, scope_path(full_name, "::"))
    }
}

/// Forward declaration of the protobuf C++ class of a message
///
/// Nested messages are real classes named `Outer_Inner` at namespace scope,
/// so every message can be forward-declared regardless of depth.
pub fn cpp_forward_declaration(package: &str, full_name: &str) -> String {
    let class_name = relative_name(package, full_name).replace('.', "_");
    let namespace = scope_path(package, "::");
    if namespace.is_empty() {
        format!("class {};", class_name)
    } else {
        format!("namespace {} {{ class {}; }}", namespace, class_name)
    }
}

/// Protobuf C++ enumerator for `value` of enum `enum_full_name`
///
/// Enumerators live in the enclosing scope of the enum: the package
/// namespace for top-level enums, the message class for nested ones.
pub fn cpp_wire_enum_value(enum_full_name: &str, value: &str) -> String {
    let parent = enum_full_name
        .rsplit_once('.')
        .map(|(parent, _)| parent)
        .unwrap_or("");
    let scope = scope_path(parent, "::");
    if scope.is_empty() {
        format!("::{}", value)
    } else {
        format!("::{}::{}", scope, value)
    }
}

/// Protobuf C++ accessor base name of a field
pub fn cpp_field_accessor(wire_name: &str) -> String {
    let lower = wire_name.to_ascii_lowercase();
    if CPP_KEYWORDS.contains(&lower.as_str()) {
        format!("{}_", lower)
    } else {
        lower
    }
}

/// Native C++ member name for a field's native name
pub fn cpp_native_member(native_name: &str) -> String {
    if CPP_KEYWORDS.contains(&native_name) {
        format!("{}_", native_name)
    } else {
        native_name.to_string()
    }
}

// Kotlin

/// Escape Kotlin hard keywords with backticks
pub fn kotlin_identifier(name: &str) -> String {
    if KOTLIN_KEYWORDS.contains(&name) {
        format!("`{}`", name)
    } else {
        name.to_string()
    }
}

/// protobuf-java's camel casing of a schema name
///
/// Underscores and other separators are dropped and the next letter is
/// capitalized, as is a letter following a digit. Existing capitals are
/// kept, so `HTTP_status` becomes `HTTPStatus` rather than `HttpStatus`.
/// The first letter is lowercased unless `cap_first` is set.
pub fn java_camel_case(name: &str, cap_first: bool) -> String {
    let mut result = String::with_capacity(name.len());
    let mut cap_next = cap_first;
    for (index, ch) in name.chars().enumerate() {
        if ch.is_ascii_lowercase() {
            result.push(if cap_next { ch.to_ascii_uppercase() } else { ch });
            cap_next = false;
        } else if ch.is_ascii_uppercase() {
            if index == 0 && !cap_next {
                result.push(ch.to_ascii_lowercase());
            } else {
                result.push(ch);
            }
            cap_next = false;
        } else if ch.is_ascii_digit() {
            result.push(ch);
            cap_next = true;
        } else {
            cap_next = true;
        }
    }
    result
}

/// Kotlin's property name for a Java getter suffix (`HTTPStatus` -> `httpStatus`)
///
/// A leading run of capitals is lowercased except for its last letter,
/// which starts the next word unless the run is the whole name.
fn kotlin_getter_property(suffix: &str) -> String {
    let chars: Vec<char> = suffix.chars().collect();
    let leading_upper = chars.iter().take_while(|c| c.is_ascii_uppercase()).count();
    let lowered = match leading_upper {
        0 => return suffix.to_string(),
        1 => 1,
        n if n == chars.len() => n,
        n => n - 1,
    };
    chars
        .iter()
        .enumerate()
        .map(|(index, c)| if index < lowered { c.to_ascii_lowercase() } else { *c })
        .collect()
}

/// PascalCase part of protobuf-java accessors (`getDisplayName`)
pub fn java_accessor_suffix(wire_name: &str) -> String {
    java_camel_case(wire_name, true)
}

/// Kotlin property for a protobuf-java getter (`getDisplayName` -> `displayName`)
pub fn java_property_name(wire_name: &str) -> String {
    kotlin_identifier(&kotlin_getter_property(&java_accessor_suffix(wire_name)))
}

/// Kotlin property for a repeated field's list getter (`getTagsList` -> `tagsList`)
pub fn java_list_property(wire_name: &str) -> String {
    kotlin_getter_property(&format!("{}List", java_accessor_suffix(wire_name)))
}

/// Kotlin property for a map field's getter (`getLabelsMap` -> `labelsMap`)
pub fn java_map_property(wire_name: &str) -> String {
    kotlin_getter_property(&format!("{}Map", java_accessor_suffix(wire_name)))
}

/// Outer class that protobuf-java wraps the file's types in, if any
pub fn java_outer_class(schema: &SchemaFile) -> Option<String> {
    java_outer_class_for(
        &schema.java_options,
        schema.file_stem(),
        schema
            .messages
            .iter()
            .map(|m| m.name.as_str())
            .chain(schema.enums.iter().map(|e| e.name.as_str())),
    )
}

fn java_outer_class_for<'a>(
    options: &JavaOptions,
    file_stem: &str,
    mut top_level_names: impl Iterator<Item = &'a str>,
) -> Option<String> {
    if options.multiple_files {
        return None;
    }
    if let Some(name) = &options.outer_classname {
        return Some(name.clone());
    }

    let derived = java_camel_case(file_stem, true);
    if top_level_names.any(|name| name == derived) {
        Some(format!("{}OuterClass", derived))
    } else {
        Some(derived)
    }
}

/// Java package of the protobuf-java classes
pub fn java_wire_package(schema: &SchemaFile) -> String {
    schema
        .java_options
        .package
        .clone()
        .unwrap_or_else(|| schema.package_name.clone())
}

/// Fully-qualified protobuf-java class of a message or enum
pub fn kotlin_wire_class(schema: &SchemaFile, full_name: &str) -> String {
    let mut parts = Vec::new();
    let package = java_wire_package(schema);
    if !package.is_empty() {
        parts.push(package);
    }
    if let Some(outer) = java_outer_class(schema) {
        parts.push(outer);
    }
    parts.push(relative_name(&schema.package_name, full_name).to_string());
    parts.join(".")
}

/// Kotlin package holding the native model and the generated mapper
pub fn kotlin_native_package(configured: Option<&str>, proto_package: &str) -> String {
    match configured {
        Some(package) => package.to_string(),
        None => proto_package.to_lowercase(),
    }
}

/// Native class name relative to the native package (`Rec.Inner`)
pub fn kotlin_native_class(package: &str, full_name: &str) -> String {
    relative_name(package, full_name).to_string()
}

/// Location of the managed-surface file below the output directory
pub fn managed_output_path(native_package: &str) -> PathBuf {
    let mut path: PathBuf = native_package
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect();
    path.push(KOTLIN_FILE_NAME);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Enum, Message};

    #[test]
    fn test_scope_path() {
        assert_eq!(scope_path("a.b.C", "::"), "a::b::C");
        assert_eq!(scope_path("a.b.C", "."), "a.b.C");
        assert_eq!(scope_path("", "::"), "");
    }

    #[test]
    fn test_relative_name() {
        assert_eq!(relative_name("p", "p.Rec.Inner"), "Rec.Inner");
        assert_eq!(relative_name("", "Rec"), "Rec");
        assert_eq!(relative_name("p", "pq.Rec"), "pq.Rec");
    }

    #[test]
    fn test_include_guard() {
        assert_eq!(
            include_guard(INCLUDE_GUARD_TOKEN, "com.test.one"),
            "PROTOBUF_HELPERS_HPP_COM_TEST_ONE"
        );
        assert_eq!(include_guard(INCLUDE_GUARD_TOKEN, "p"), "PROTOBUF_HELPERS_HPP_P");
        assert_eq!(include_guard(INCLUDE_GUARD_TOKEN, ""), "PROTOBUF_HELPERS_HPP");
        assert_ne!(
            include_guard(INCLUDE_GUARD_TOKEN, "com.test.one"),
            include_guard(INCLUDE_GUARD_TOKEN, "com.test.two")
        );
    }

    #[test]
    fn test_native_enum_value_name() {
        assert_eq!(native_enum_value_name("kStatusActive"), "STATUS_ACTIVE");
        assert_eq!(native_enum_value_name("kFarAway"), "FAR_AWAY");
        assert_eq!(native_enum_value_name("kHttp2Server"), "HTTP2SERVER");
        assert_eq!(native_enum_value_name("ACTIVE"), "ACTIVE");
        assert_eq!(native_enum_value_name("UNKNOWN"), "UNKNOWN");
    }

    #[test]
    fn test_native_enum_value_name_collision_passes_through() {
        // Both reduce to the same native name; the collision is not rejected.
        assert_eq!(
            native_enum_value_name("kActive"),
            native_enum_value_name("ACTIVE")
        );
    }

    #[test]
    fn test_cpp_types() {
        assert_eq!(cpp_wire_type("p.Rec.Inner"), "::p::Rec::Inner");
        assert_eq!(cpp_native_type("native", "p.Rec"), "::native::p::Rec");
        assert_eq!(cpp_native_type("app::model", "p.Rec"), "::app::model::p::Rec");
        assert_eq!(cpp_native_type("", "p.Rec"), "::p::Rec");
    }

    #[test]
    fn test_cpp_forward_declaration() {
        assert_eq!(
            cpp_forward_declaration("com.test", "com.test.Outer.Inner"),
            "namespace com::test { class Outer_Inner; }"
        );
        assert_eq!(cpp_forward_declaration("", "Rec"), "class Rec;");
    }

    #[test]
    fn test_cpp_wire_enum_value() {
        assert_eq!(cpp_wire_enum_value("p.Status", "ACTIVE"), "::p::ACTIVE");
        assert_eq!(cpp_wire_enum_value("p.Rec.Kind", "FOO"), "::p::Rec::FOO");
        assert_eq!(cpp_wire_enum_value("Status", "ACTIVE"), "::ACTIVE");
    }

    #[test]
    fn test_cpp_field_names() {
        assert_eq!(cpp_field_accessor("DisplayName"), "displayname");
        assert_eq!(cpp_field_accessor("class"), "class_");
        assert_eq!(cpp_native_member("displayName"), "displayName");
        assert_eq!(cpp_native_member("delete"), "delete_");
    }

    #[test]
    fn test_kotlin_identifier() {
        assert_eq!(kotlin_identifier("in"), "`in`");
        assert_eq!(kotlin_identifier("name"), "name");
    }

    #[test]
    fn test_java_accessor_suffix() {
        assert_eq!(java_accessor_suffix("display_name"), "DisplayName");
        assert_eq!(java_accessor_suffix("tags"), "Tags");
    }

    #[test]
    fn test_java_camel_case() {
        assert_eq!(java_camel_case("value2d", true), "Value2D");
        assert_eq!(java_camel_case("HTTPStatus", true), "HTTPStatus");
        assert_eq!(java_camel_case("myURL", true), "MyURL");
        assert_eq!(java_camel_case("rec2d", true), "Rec2D");
        assert_eq!(java_camel_case("line_items", false), "lineItems");
        assert_eq!(java_camel_case("Rec", false), "rec");
        assert_eq!(java_camel_case("my-file.v1", true), "MyFileV1");
    }

    #[test]
    fn test_java_names_keep_acronyms_and_digits() {
        assert_eq!(java_accessor_suffix("value2d"), "Value2D");
        assert_eq!(java_accessor_suffix("HTTPStatus"), "HTTPStatus");
        assert_eq!(java_accessor_suffix("myURL"), "MyURL");
        assert_eq!(java_property_name("value2d"), "value2D");
        assert_eq!(java_property_name("HTTPStatus"), "httpStatus");
        assert_eq!(java_property_name("myURL"), "myURL");
        assert_eq!(java_property_name("URL"), "url");
        assert_eq!(java_list_property("URL"), "urlList");
        assert_eq!(kotlin_getter_property("AB2c"), "aB2c");
        assert_eq!(java_map_property("labels"), "labelsMap");
    }

    #[test]
    fn test_java_outer_class_after_digit() {
        let schema = SchemaFile {
            source_name: "rec2d.proto".to_string(),
            package_name: "p".to_string(),
            ..Default::default()
        };
        assert_eq!(java_outer_class(&schema), Some("Rec2D".to_string()));
    }

    #[test]
    fn test_java_property_name() {
        assert_eq!(java_property_name("display_name"), "displayName");
        assert_eq!(java_property_name("in"), "`in`");
        assert_eq!(java_list_property("line_items"), "lineItemsList");
        assert_eq!(java_list_property("in"), "inList");
    }

    fn schema_with(options: JavaOptions) -> SchemaFile {
        SchemaFile {
            source_name: "protos/rec.proto".to_string(),
            package_name: "p".to_string(),
            messages: vec![Message {
                name: "Rec".to_string(),
                full_name: "p.Rec".to_string(),
                ..Default::default()
            }],
            enums: vec![Enum {
                name: "Status".to_string(),
                full_name: "p.Status".to_string(),
                values: vec![],
            }],
            java_options: options,
            ..Default::default()
        }
    }

    #[test]
    fn test_java_outer_class_collision() {
        let schema = schema_with(JavaOptions::default());
        assert_eq!(java_outer_class(&schema), Some("RecOuterClass".to_string()));
    }

    #[test]
    fn test_kotlin_wire_class() {
        let schema = schema_with(JavaOptions {
            package: Some("com.example.protos".to_string()),
            outer_classname: None,
            multiple_files: true,
        });
        assert_eq!(
            kotlin_wire_class(&schema, "p.Rec.Inner"),
            "com.example.protos.Rec.Inner"
        );

        let schema = schema_with(JavaOptions {
            package: None,
            outer_classname: Some("Records".to_string()),
            multiple_files: false,
        });
        assert_eq!(kotlin_wire_class(&schema, "p.Status"), "p.Records.Status");
    }

    #[test]
    fn test_kotlin_native_names() {
        assert_eq!(kotlin_native_package(None, "Com.Example"), "com.example");
        assert_eq!(
            kotlin_native_package(Some("app.model"), "com.example"),
            "app.model"
        );
        assert_eq!(kotlin_native_class("p", "p.Rec.Inner"), "Rec.Inner");
    }

    #[test]
    fn test_managed_output_path() {
        assert_eq!(
            managed_output_path("com.example"),
            PathBuf::from("com/example/NativeModelMapper.kt")
        );
        assert_eq!(managed_output_path(""), PathBuf::from("NativeModelMapper.kt"));
    }
}
