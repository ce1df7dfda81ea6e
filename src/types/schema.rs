//! Attribute sets by element kind and arity.
//!
//! Everything here is a pure mapping from classification to attributes; the
//! metadata resolver unions the pieces with whatever the plugin contributes.

use super::attribute::{Attribute, AttributeType};
use super::fundamental::FundamentalType;
use crate::element::ElementContext;
use crate::item::{ElementKind, Value};

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
pub const ABSTRACT: &str = "abstract";
pub const FUNDAMENTAL_NAME: &str = "fundamental_name";
pub const DEFAULT_FUNDAMENTAL_NAME: &str = "simple_value";
pub const DEFAULT: &str = "default";
pub const AS_DICTIONARY: &str = "as_dictionary";
pub const KEY: &str = "key";
pub const VALUE: &str = "value";
pub const REFINES_ARITY: &str = "refines_arity";

/// Attributes every item accepts.
pub fn universal_attributes() -> Vec<Attribute> {
    vec![
        Attribute::optional(NAME, AttributeType::String),
        Attribute::optional(DESCRIPTION, AttributeType::String).metadata_only(),
    ]
}

/// Attributes specific to an element kind.
///
/// `fundamental` is the fundamental type the item ultimately wraps, if any;
/// it contributes its constraint attributes to Fundamental and Simple kinds.
pub fn kind_attributes(kind: ElementKind, fundamental: Option<FundamentalType>) -> Vec<Attribute> {
    let constraints = || fundamental.map(|ty| ty.attributes()).unwrap_or_default();
    match kind {
        ElementKind::Fundamental => constraints(),
        ElementKind::Compound => {
            vec![Attribute::optional(ABSTRACT, AttributeType::Bool).with_default(false)]
        }
        ElementKind::Simple => {
            let mut attributes = vec![
                Attribute::optional(FUNDAMENTAL_NAME, AttributeType::String)
                    .with_default(DEFAULT_FUNDAMENTAL_NAME)
                    .with_check(identifier),
            ];
            attributes.extend(constraints());
            attributes
        }
        ElementKind::Variant
        | ElementKind::Reference
        | ElementKind::List
        | ElementKind::Any
        | ElementKind::Custom
        | ElementKind::Extension => Vec::new(),
    }
}

/// Attributes available when the resolved arity allows zero occurrences.
pub fn optional_attributes() -> Vec<Attribute> {
    vec![Attribute::optional(DEFAULT, AttributeType::String).with_element_check(default_matches_type)]
}

/// Attributes available when the resolved arity allows many occurrences.
pub fn collection_attributes() -> Vec<Attribute> {
    vec![
        Attribute::optional(AS_DICTIONARY, AttributeType::Bool).with_default(false),
        Attribute::optional(KEY, AttributeType::String).with_element_check(key_names_field),
        Attribute::optional(VALUE, AttributeType::String).with_element_check(key_names_field),
        Attribute::optional(REFINES_ARITY, AttributeType::Bool),
    ]
}

fn identifier(value: &Value, _metadata: &crate::item::Metadata) -> Result<(), String> {
    let text = value.as_text().unwrap_or_default();
    let mut chars = text.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(format!("'{}' is not a valid identifier", text))
    }
}

fn default_matches_type(value: &Value, context: &ElementContext<'_>) -> Result<(), String> {
    match (value.as_text(), context.fundamental) {
        (Some(text), Some(fundamental)) => fundamental
            .ty
            .validate_literal(text, &fundamental.constraints)
            .map(|_| ()),
        _ => Ok(()),
    }
}

fn key_names_field(value: &Value, context: &ElementContext<'_>) -> Result<(), String> {
    let Some(name) = value.as_text() else {
        return Ok(());
    };
    match context.field_names() {
        Some(fields) if fields.iter().any(|field| field == name) => Ok(()),
        Some(_) => Err(format!("'{}' is not a field of the collection's item type", name)),
        None => Err(format!(
            "'{}' cannot be used because the collection's item type has no fields",
            name
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(attributes: Vec<Attribute>) -> Vec<String> {
        attributes.into_iter().map(|a| a.name.to_string()).collect()
    }

    #[test]
    fn test_simple_includes_fundamental_constraints() {
        let attributes = kind_attributes(ElementKind::Simple, Some(FundamentalType::String));
        assert_eq!(
            names(attributes),
            vec!["fundamental_name", "min_length", "max_length", "validation_expression"]
        );
    }

    #[test]
    fn test_kinds_without_attributes() {
        for kind in [ElementKind::List, ElementKind::Variant, ElementKind::Any] {
            assert!(kind_attributes(kind, None).is_empty());
        }
    }

    #[test]
    fn test_description_is_metadata_only() {
        let universal = universal_attributes();
        assert!(!universal[0].metadata_only);
        assert!(universal[1].metadata_only);
    }

    #[test]
    fn test_fundamental_name_must_be_identifier() {
        let metadata = crate::item::Metadata::new();
        assert!(identifier(&Value::from("value"), &metadata).is_ok());
        assert!(identifier(&Value::from("1value"), &metadata).is_err());
        assert!(identifier(&Value::from(""), &metadata).is_err());
    }
}
