//! Builtin fundamental types and their constraint attributes.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::attribute::{Attribute, AttributeType};
use crate::item::{Metadata, Value};

/// Scalar leaf types available to every schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FundamentalType {
    String,
    Enum,
    Int,
    Number,
    Bool,
    Guid,
    DateTime,
    Date,
    Time,
    Duration,
    Uri,
    Filename,
    Directory,
}

/// Reserved type names that resolve to builtin descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Fundamental(FundamentalType),
    Any,
    Custom,
}

impl BuiltinType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "any" => Some(BuiltinType::Any),
            "custom" => Some(BuiltinType::Custom),
            other => FundamentalType::from_keyword(other).map(BuiltinType::Fundamental),
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            BuiltinType::Fundamental(ty) => ty.keyword(),
            BuiltinType::Any => "any",
            BuiltinType::Custom => "custom",
        }
    }

    pub fn is_fundamental(&self) -> bool {
        matches!(self, BuiltinType::Fundamental(_))
    }

    pub fn as_fundamental(&self) -> Option<FundamentalType> {
        match self {
            BuiltinType::Fundamental(ty) => Some(*ty),
            BuiltinType::Any | BuiltinType::Custom => None,
        }
    }

    /// True if `name` collides with a builtin type name.
    pub fn is_reserved(name: &str) -> bool {
        Self::from_keyword(name).is_some()
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FundamentalType {
    pub const ALL: [FundamentalType; 13] = [
        FundamentalType::String,
        FundamentalType::Enum,
        FundamentalType::Int,
        FundamentalType::Number,
        FundamentalType::Bool,
        FundamentalType::Guid,
        FundamentalType::DateTime,
        FundamentalType::Date,
        FundamentalType::Time,
        FundamentalType::Duration,
        FundamentalType::Uri,
        FundamentalType::Filename,
        FundamentalType::Directory,
    ];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.keyword() == keyword)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            FundamentalType::String => "string",
            FundamentalType::Enum => "enum",
            FundamentalType::Int => "int",
            FundamentalType::Number => "number",
            FundamentalType::Bool => "bool",
            FundamentalType::Guid => "guid",
            FundamentalType::DateTime => "datetime",
            FundamentalType::Date => "date",
            FundamentalType::Time => "time",
            FundamentalType::Duration => "duration",
            FundamentalType::Uri => "uri",
            FundamentalType::Filename => "filename",
            FundamentalType::Directory => "directory",
        }
    }

    /// Constraint attributes accepted by this type.
    pub fn attributes(&self) -> Vec<Attribute> {
        match self {
            FundamentalType::String => vec![
                Attribute::optional("min_length", AttributeType::Int)
                    .with_default(1i64)
                    .with_check(non_negative),
                Attribute::optional("max_length", AttributeType::Int)
                    .with_check(max_length_not_below_min),
                Attribute::optional("validation_expression", AttributeType::String),
            ],
            FundamentalType::Enum => vec![
                Attribute::required("values", AttributeType::list_of(AttributeType::String))
                    .with_check(unique_non_empty),
                Attribute::optional(
                    "friendly_values",
                    AttributeType::list_of(AttributeType::String),
                )
                .with_check(friendly_values_match),
            ],
            FundamentalType::Int => vec![
                Attribute::optional("min", AttributeType::Int),
                Attribute::optional("max", AttributeType::Int).with_check(max_not_below_min),
                Attribute::optional(
                    "bytes",
                    AttributeType::one_of(
                        AttributeType::Int,
                        vec![Value::Int(1), Value::Int(2), Value::Int(4), Value::Int(8)],
                    ),
                ),
            ],
            FundamentalType::Number => vec![
                Attribute::optional("min", AttributeType::Number),
                Attribute::optional("max", AttributeType::Number).with_check(max_not_below_min),
                Attribute::optional(
                    "bits",
                    AttributeType::one_of(
                        AttributeType::Int,
                        vec![Value::Int(16), Value::Int(32), Value::Int(64)],
                    ),
                ),
            ],
            FundamentalType::Filename => vec![
                Attribute::optional("ensure_exists", AttributeType::Bool).with_default(true),
                Attribute::optional("match_any", AttributeType::Bool).with_default(false),
            ],
            FundamentalType::Directory => {
                vec![Attribute::optional("ensure_exists", AttributeType::Bool).with_default(true)]
            }
            FundamentalType::Bool
            | FundamentalType::Guid
            | FundamentalType::DateTime
            | FundamentalType::Date
            | FundamentalType::Time
            | FundamentalType::Duration
            | FundamentalType::Uri => Vec::new(),
        }
    }

    /// Whether `name` is one of this type's constraint attributes.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes().iter().any(|attribute| attribute.name == name)
    }

    /// Parse and check a literal of this type against `constraints`.
    pub fn validate_literal(
        &self,
        text: &str,
        constraints: &IndexMap<SmolStr, Value>,
    ) -> Result<Value, String> {
        let number_bound = |name: &str| constraints.get(name).and_then(Value::as_number);
        match self {
            FundamentalType::String => {
                let len = text.chars().count() as i64;
                if let Some(min) = constraints.get("min_length").and_then(Value::as_int) {
                    if len < min {
                        return Err(format!("'{}' is shorter than {} characters", text, min));
                    }
                }
                if let Some(max) = constraints.get("max_length").and_then(Value::as_int) {
                    if len > max {
                        return Err(format!("'{}' is longer than {} characters", text, max));
                    }
                }
                Ok(Value::Text(text.to_string()))
            }
            FundamentalType::Enum => {
                let values = constraints
                    .get("values")
                    .and_then(Value::as_list)
                    .unwrap_or_default();
                if values.iter().any(|v| v.as_text() == Some(text)) {
                    Ok(Value::Text(text.to_string()))
                } else {
                    Err(format!("'{}' is not a valid enum value", text))
                }
            }
            FundamentalType::Int => {
                let value = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| format!("'{}' is not a valid int ({})", text, e))?;
                check_bounds(value as f64, number_bound("min"), number_bound("max"))?;
                Ok(Value::Int(value))
            }
            FundamentalType::Number => {
                let value = text
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| format!("'{}' is not a valid number ({})", text, e))?;
                check_bounds(value, number_bound("min"), number_bound("max"))?;
                Ok(Value::Number(value))
            }
            FundamentalType::Bool => AttributeType::Bool.deserialize(&Value::from(text)),
            FundamentalType::Guid => check_text(text, is_guid, "guid"),
            FundamentalType::Date => check_text(text, is_date, "date"),
            FundamentalType::Time => check_text(text, is_time, "time"),
            FundamentalType::DateTime => check_text(text, is_datetime, "datetime"),
            FundamentalType::Duration => check_text(text, is_duration, "duration"),
            FundamentalType::Uri => check_text(text, is_uri, "uri"),
            FundamentalType::Filename | FundamentalType::Directory => {
                check_text(text, |t| !t.trim().is_empty(), self.keyword())
            }
        }
    }
}

impl fmt::Display for FundamentalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ============================================================================
// CONSTRAINT CHECKS
// ============================================================================

fn non_negative(value: &Value, _metadata: &Metadata) -> Result<(), String> {
    match value.as_int() {
        Some(i) if i < 0 => Err(format!("{} must be greater than or equal to 0", i)),
        _ => Ok(()),
    }
}

fn max_length_not_below_min(value: &Value, metadata: &Metadata) -> Result<(), String> {
    let Some(max) = value.as_int() else {
        return Ok(());
    };
    if max < 1 {
        return Err(format!("{} must be greater than 0", max));
    }
    match metadata.value("min_length").and_then(Value::as_int) {
        Some(min) if max < min => Err(format!("{} is less than min_length ({})", max, min)),
        _ => Ok(()),
    }
}

fn max_not_below_min(value: &Value, metadata: &Metadata) -> Result<(), String> {
    match (value.as_number(), metadata.value("min").and_then(Value::as_number)) {
        (Some(max), Some(min)) if max < min => {
            Err(format!("{} is less than min ({})", value, min))
        }
        _ => Ok(()),
    }
}

fn unique_non_empty(value: &Value, _metadata: &Metadata) -> Result<(), String> {
    let items = value.as_list().unwrap_or_default();
    if items.is_empty() {
        return Err("at least one value must be provided".to_string());
    }
    for (index, item) in items.iter().enumerate() {
        if items[..index].contains(item) {
            return Err(format!("the value '{}' appears more than once", item));
        }
    }
    Ok(())
}

fn friendly_values_match(value: &Value, metadata: &Metadata) -> Result<(), String> {
    let friendly = value.as_list().map_or(0, <[Value]>::len);
    let values = metadata
        .value("values")
        .and_then(Value::as_list)
        .map_or(0, <[Value]>::len);
    if friendly == values {
        Ok(())
    } else {
        Err(format!(
            "{} friendly values were provided for {} values",
            friendly, values
        ))
    }
}

fn check_bounds(value: f64, min: Option<f64>, max: Option<f64>) -> Result<(), String> {
    if let Some(min) = min {
        if value < min {
            return Err(format!("{} is less than {}", value, min));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(format!("{} is greater than {}", value, max));
        }
    }
    Ok(())
}

fn check_text(text: &str, valid: impl Fn(&str) -> bool, what: &str) -> Result<Value, String> {
    if valid(text) {
        Ok(Value::Text(text.to_string()))
    } else {
        Err(format!("'{}' is not a valid {}", text, what))
    }
}

// ============================================================================
// LITERAL FORMATS
// ============================================================================

fn digits_in_range(part: &str, len: usize, min: u32, max: u32) -> bool {
    part.len() == len
        && part.bytes().all(|b| b.is_ascii_digit())
        && part.parse::<u32>().is_ok_and(|n| (min..=max).contains(&n))
}

fn is_guid(text: &str) -> bool {
    let groups: Vec<&str> = text.split('-').collect();
    let lengths = [8, 4, 4, 4, 12];
    groups.len() == lengths.len()
        && groups
            .iter()
            .zip(lengths)
            .all(|(group, len)| group.len() == len && group.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn is_date(text: &str) -> bool {
    let parts: Vec<&str> = text.split('-').collect();
    matches!(parts.as_slice(), [year, month, day]
        if digits_in_range(year, 4, 0, 9999)
            && digits_in_range(month, 2, 1, 12)
            && digits_in_range(day, 2, 1, 31))
}

fn is_time(text: &str) -> bool {
    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };
    if fraction.is_some_and(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit())) {
        return false;
    }
    let parts: Vec<&str> = clock.split(':').collect();
    matches!(parts.as_slice(), [hours, minutes, seconds]
        if digits_in_range(hours, 2, 0, 23)
            && digits_in_range(minutes, 2, 0, 59)
            && digits_in_range(seconds, 2, 0, 59))
}

fn is_datetime(text: &str) -> bool {
    let text = text.strip_suffix('Z').unwrap_or(text);
    match text.split_once(['T', ' ']) {
        Some((date, time)) => is_date(date) && is_time(time),
        None => false,
    }
}

fn is_duration(text: &str) -> bool {
    let clock = match text.split_once('.') {
        Some((days, rest)) if days.bytes().all(|b| b.is_ascii_digit()) && !days.is_empty() => rest,
        _ => text,
    };
    let parts: Vec<&str> = clock.split(':').collect();
    matches!(parts.as_slice(), [hours, minutes, seconds]
        if digits_in_range(hours, 2, 0, 23)
            && digits_in_range(minutes, 2, 0, 59)
            && digits_in_range(seconds, 2, 0, 59))
}

fn is_uri(text: &str) -> bool {
    match text.split_once(':') {
        Some((scheme, rest)) => {
            !rest.is_empty()
                && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
