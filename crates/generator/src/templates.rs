//! Template loading and management

use bindings_generator_common::{GeneratorError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Template name of the C++ declarations file
pub const CPP_HEADER: &str = "cpp_header.hpp";
/// Template name of the C++ definitions file
pub const CPP_SOURCE: &str = "cpp_source.cpp";
/// Template name of the Kotlin mapper file
pub const KOTLIN_MAPPER: &str = "kotlin_mapper.kt";

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();
    // Generated sources are not markup
    tera.autoescape_on(vec![]);

    // Register custom filters
    tera.register_filter("cpp_include", cpp_include_filter);
    tera.register_filter("line_comment", line_comment_filter);

    tera.add_raw_template(CPP_HEADER, include_str!("../templates/cpp_header.hpp.tera"))
        .map_err(|e| {
            GeneratorError::Generation(format!("Failed to load {} template: {}", CPP_HEADER, e))
        })?;

    tera.add_raw_template(CPP_SOURCE, include_str!("../templates/cpp_source.cpp.tera"))
        .map_err(|e| {
            GeneratorError::Generation(format!("Failed to load {} template: {}", CPP_SOURCE, e))
        })?;

    tera.add_raw_template(
        KOTLIN_MAPPER,
        include_str!("../templates/kotlin_mapper.kt.tera"),
    )
    .map_err(|e| {
        GeneratorError::Generation(format!("Failed to load {} template: {}", KOTLIN_MAPPER, e))
    })?;

    Ok(tera)
}

/// Filter to turn a header path into an `#include` operand
///
/// `<vector>` and `"model.hpp"` are kept as written; a bare path gets quotes.
fn cpp_include_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let header = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("cpp_include filter expects a string"))?
        .trim();

    let operand = if header.starts_with('<') || header.starts_with('"') {
        header.to_string()
    } else {
        format!("\"{}\"", header)
    };

    Ok(Value::String(operand))
}

/// Filter to prefix every line with `// `
fn line_comment_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("line_comment filter expects a string"))?;

    let commented: Vec<String> = text
        .lines()
        .map(|line| {
            if line.is_empty() {
                "//".to_string()
            } else {
                format!("// {}", line)
            }
        })
        .collect();

    Ok(Value::String(commented.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(
        filter: fn(&Value, &HashMap<String, Value>) -> tera::Result<Value>,
        input: &str,
    ) -> String {
        filter(&Value::String(input.to_string()), &HashMap::new())
            .unwrap()
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_load_templates() {
        let tera = load_templates().unwrap();
        let names: Vec<&str> = tera.get_template_names().collect();
        assert!(names.contains(&CPP_HEADER));
        assert!(names.contains(&CPP_SOURCE));
        assert!(names.contains(&KOTLIN_MAPPER));
    }

    #[test]
    fn test_cpp_include_filter() {
        assert_eq!(apply(cpp_include_filter, "model/rec.hpp"), "\"model/rec.hpp\"");
        assert_eq!(apply(cpp_include_filter, "<model/rec.hpp>"), "<model/rec.hpp>");
        assert_eq!(apply(cpp_include_filter, "\"rec.hpp\""), "\"rec.hpp\"");
    }

    #[test]
    fn test_line_comment_filter() {
        assert_eq!(
            apply(line_comment_filter, "DO NOT EDIT.\n\nSource: rec.proto"),
            "// DO NOT EDIT.\n//\n// Source: rec.proto"
        );
    }

    #[test]
    fn test_filter_rejects_non_string() {
        let result = cpp_include_filter(&Value::Bool(true), &HashMap::new());
        assert!(result.is_err());
    }
}
