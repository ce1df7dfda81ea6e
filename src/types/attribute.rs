//! Attribute schemas: the typed, named metadata an item may carry.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::element::ElementContext;
use crate::item::{Metadata, Value};

/// Item-local validation hook, run after every value on the item is typed.
pub type ValueCheck = fn(&Value, &Metadata) -> Result<(), String>;

/// Graph-context validation hook, run once the element graph exists.
pub type ElementCheck = fn(&Value, &ElementContext<'_>) -> Result<(), String>;

/// Ordered attribute schema for one item, keyed by attribute name.
pub type AttributeSchema = IndexMap<SmolStr, Attribute>;

// ============================================================================
// ATTRIBUTE TYPES
// ============================================================================

/// Declared type of an attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Bool,
    Int,
    Number,
    /// Inner type restricted to a fixed set of values.
    OneOf(Box<AttributeType>, Vec<Value>),
    List(Box<AttributeType>),
}

impl AttributeType {
    pub fn one_of(inner: AttributeType, values: Vec<Value>) -> Self {
        AttributeType::OneOf(Box::new(inner), values)
    }

    pub fn list_of(inner: AttributeType) -> Self {
        AttributeType::List(Box::new(inner))
    }

    /// Convert `value` to this type.
    ///
    /// Text is parsed; values that already have the target shape are
    /// validated and returned unchanged, so deserializing a deserialized
    /// value is the identity.
    pub fn deserialize(&self, value: &Value) -> Result<Value, String> {
        match (self, value) {
            (AttributeType::String, Value::Text(_)) => Ok(value.clone()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(value.clone()),
            (AttributeType::Bool, Value::Text(text)) => parse_bool(text).map(Value::Bool),
            (AttributeType::Int, Value::Int(_)) => Ok(value.clone()),
            (AttributeType::Int, Value::Text(text)) => text
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| format!("'{}' is not a valid int ({})", text, e)),
            (AttributeType::Number, Value::Number(_)) => Ok(value.clone()),
            (AttributeType::Number, Value::Int(i)) => Ok(Value::Number(*i as f64)),
            (AttributeType::Number, Value::Text(text)) => text
                .trim()
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|e| format!("'{}' is not a valid number ({})", text, e)),
            (AttributeType::OneOf(inner, values), _) => {
                let converted = inner.deserialize(value)?;
                if values.contains(&converted) {
                    Ok(converted)
                } else {
                    Err(format!("'{}' is not {}", converted, self))
                }
            }
            (AttributeType::List(inner), Value::List(items)) => items
                .iter()
                .map(|item| inner.deserialize(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            (AttributeType::List(inner), Value::Text(text)) => text
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| inner.deserialize(&Value::Text(part.to_string())))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            (AttributeType::List(inner), scalar) => {
                inner.deserialize(scalar).map(|item| Value::List(vec![item]))
            }
            (expected, found) => Err(format!(
                "expected {} but found {} '{}'",
                expected,
                found.type_name(),
                found
            )),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::String => f.write_str("string"),
            AttributeType::Bool => f.write_str("bool"),
            AttributeType::Int => f.write_str("int"),
            AttributeType::Number => f.write_str("number"),
            AttributeType::OneOf(_, values) => {
                f.write_str("one of ")?;
                write!(f, "{}", Value::List(values.clone()))
            }
            AttributeType::List(inner) => write!(f, "list of {}", inner),
        }
    }
}

fn parse_bool(text: &str) -> Result<bool, String> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(format!("'{}' is not a valid bool", text)),
    }
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// A named, typed metadata attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: SmolStr,
    pub ty: AttributeType,
    pub required: bool,
    pub default: Option<Value>,
    /// Documentation-only; never makes a reference augmenting.
    pub metadata_only: bool,
    pub validate: Option<ValueCheck>,
    pub validate_element: Option<ElementCheck>,
}

impl Attribute {
    pub fn required(name: impl Into<SmolStr>, ty: AttributeType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
            metadata_only: false,
            validate: None,
            validate_element: None,
        }
    }

    pub fn optional(name: impl Into<SmolStr>, ty: AttributeType) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty)
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn metadata_only(mut self) -> Self {
        self.metadata_only = true;
        self
    }

    pub fn with_check(mut self, check: ValueCheck) -> Self {
        self.validate = Some(check);
        self
    }

    pub fn with_element_check(mut self, check: ElementCheck) -> Self {
        self.validate_element = Some(check);
        self
    }
}

/// Collect attributes into a schema; later entries replace earlier ones.
pub fn schema_from(attributes: impl IntoIterator<Item = Attribute>) -> AttributeSchema {
    attributes
        .into_iter()
        .map(|attribute| (attribute.name.clone(), attribute))
        .collect()
}
