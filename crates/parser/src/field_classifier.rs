//! Field classification
//!
//! Maps a raw protobuf field descriptor to its base kind and multiplicity.

use bindings_generator_common::{BaseKind, FieldClassification, Multiplicity, ScalarType, Syntax};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::FieldDescriptorProto;

/// Classifies raw field descriptors
pub struct FieldClassifier;

impl FieldClassifier {
    /// Classify a field declared in a file of the given syntax
    ///
    /// Never fails: a type number outside the known set becomes
    /// `Scalar(Unknown)`.
    ///
    /// # Examples
    /// ```
    /// use bindings_generator_common::{BaseKind, Multiplicity, ScalarType, Syntax};
    /// use bindings_generator_parser::FieldClassifier;
    /// use prost_types::field_descriptor_proto::{Label, Type};
    /// use prost_types::FieldDescriptorProto;
    ///
    /// let field = FieldDescriptorProto {
    ///     name: Some("tags".to_string()),
    ///     label: Some(Label::Repeated as i32),
    ///     r#type: Some(Type::String as i32),
    ///     ..Default::default()
    /// };
    /// let classification = FieldClassifier::classify(&field, Syntax::Proto3);
    /// assert_eq!(classification.base, BaseKind::Scalar(ScalarType::String));
    /// assert_eq!(classification.multiplicity, Multiplicity::Repeated);
    /// ```
    pub fn classify(field: &FieldDescriptorProto, syntax: Syntax) -> FieldClassification {
        FieldClassification::new(Self::base_kind(field), Self::multiplicity(field, syntax))
    }

    /// Base kind from the declared wire type
    pub fn base_kind(field: &FieldDescriptorProto) -> BaseKind {
        let Some(field_type) = field.r#type.and_then(|t| Type::try_from(t).ok()) else {
            return BaseKind::Scalar(ScalarType::Unknown);
        };

        match field_type {
            Type::Message | Type::Group => BaseKind::Message(type_reference(field)),
            Type::Enum => BaseKind::Enum(type_reference(field)),
            Type::Double => BaseKind::Scalar(ScalarType::Double),
            Type::Float => BaseKind::Scalar(ScalarType::Float),
            Type::Int64 => BaseKind::Scalar(ScalarType::Int64),
            Type::Uint64 => BaseKind::Scalar(ScalarType::Uint64),
            Type::Int32 => BaseKind::Scalar(ScalarType::Int32),
            Type::Fixed64 => BaseKind::Scalar(ScalarType::Fixed64),
            Type::Fixed32 => BaseKind::Scalar(ScalarType::Fixed32),
            Type::Bool => BaseKind::Scalar(ScalarType::Bool),
            Type::String => BaseKind::Scalar(ScalarType::String),
            Type::Bytes => BaseKind::Scalar(ScalarType::Bytes),
            Type::Uint32 => BaseKind::Scalar(ScalarType::Uint32),
            Type::Sfixed32 => BaseKind::Scalar(ScalarType::Sfixed32),
            Type::Sfixed64 => BaseKind::Scalar(ScalarType::Sfixed64),
            Type::Sint32 => BaseKind::Scalar(ScalarType::Sint32),
            Type::Sint64 => BaseKind::Scalar(ScalarType::Sint64),
        }
    }

    /// Multiplicity from the label and explicit-presence markers
    ///
    /// proto3 labels every singular field `LABEL_OPTIONAL`, so only the
    /// `proto3_optional` flag and oneof membership mark explicit presence
    /// there.
    pub fn multiplicity(field: &FieldDescriptorProto, syntax: Syntax) -> Multiplicity {
        let label = field.label.and_then(|l| Label::try_from(l).ok());

        if label == Some(Label::Repeated) {
            return Multiplicity::Repeated;
        }

        let explicitly_optional = match syntax {
            Syntax::Proto3 => {
                field.proto3_optional.unwrap_or(false) || field.oneof_index.is_some()
            }
            Syntax::Proto2 | Syntax::Editions => label == Some(Label::Optional),
        };

        if explicitly_optional {
            Multiplicity::Optional
        } else {
            Multiplicity::Singular
        }
    }
}

/// Fully-qualified type name without protoc's leading dot
fn type_reference(field: &FieldDescriptorProto) -> String {
    let type_name = field.type_name.as_deref().unwrap_or_default();
    type_name.strip_prefix('.').unwrap_or(type_name).to_string()
}
