//! Metadata values and the ordered metadata map carried by every item.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::SourceLocation;

// ============================================================================
// VALUES
// ============================================================================

/// A metadata value.
///
/// The front end produces [`Value::Text`] for most literals; validation
/// deserializes text in place against the attribute's declared type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(untagged))]
pub enum Value {
    Text(String),
    Bool(bool),
    Int(i64),
    Number(f64),
    List(Vec<Value>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view that also accepts integers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Number(_) => "number",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", n),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

// ============================================================================
// METADATA
// ============================================================================

/// Where a metadata value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Written on the item in source.
    Explicit,
    /// Filled from the active plugin's configuration section.
    Config,
    /// Filled from the attribute's declared default.
    Default,
    /// Copied from a referenced item during metadata squashing.
    Cloned,
}

/// A single metadata entry: value, provenance, and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataItem {
    pub value: Value,
    pub provenance: Provenance,
    pub location: SourceLocation,
}

impl MetadataItem {
    pub fn explicit(value: impl Into<Value>, location: SourceLocation) -> Self {
        Self {
            value: value.into(),
            provenance: Provenance::Explicit,
            location,
        }
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }
}

/// Ordered mapping of attribute name to metadata entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    items: IndexMap<SmolStr, MetadataItem>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&MetadataItem> {
        self.items.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MetadataItem> {
        self.items.get_mut(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.items.get(name).map(|item| &item.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Insert or replace an entry, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<SmolStr>, item: MetadataItem) {
        self.items.insert(name.into(), item);
    }

    /// Remove an entry, preserving the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<MetadataItem> {
        self.items.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &MetadataItem)> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&SmolStr, &mut MetadataItem)> {
        self.items.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &SmolStr> {
        self.items.keys()
    }

    /// Names of entries that were written in source.
    pub fn explicit_keys(&self) -> Vec<SmolStr> {
        self.items
            .iter()
            .filter(|(_, item)| item.provenance == Provenance::Explicit)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
