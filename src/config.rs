//! Pipeline configuration: leniency flags and per-plugin attribute defaults.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::item::Value;

/// Section applied to every plugin, before the plugin's own section.
pub const ALL_PLUGINS_SECTION: &str = "*";

/// Configuration-supplied attribute values, grouped by plugin name.
///
/// Values fill attributes an item does not set explicitly; explicit values
/// always win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    sections: IndexMap<SmolStr, IndexMap<SmolStr, Value>>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` in `section`, replacing any previous value.
    pub fn set(
        &mut self,
        section: impl Into<SmolStr>,
        key: impl Into<SmolStr>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    pub fn section(&self, name: &str) -> Option<&IndexMap<SmolStr, Value>> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.sections.keys()
    }

    /// Values visible to `plugin`: the shared section overlaid by the plugin's own.
    pub fn values_for(&self, plugin: &str) -> IndexMap<SmolStr, Value> {
        let mut values = self
            .section(ALL_PLUGINS_SECTION)
            .cloned()
            .unwrap_or_default();
        if let Some(section) = self.section(plugin) {
            for (key, value) in section {
                values.insert(key.clone(), value.clone());
            }
        }
        values
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Options for one pipeline invocation.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Mark unsupported extensions as ignored instead of failing.
    pub filter_unsupported_extensions: bool,
    /// Drop unsupported metadata attributes instead of failing.
    pub filter_unsupported_attributes: bool,
    pub config: Config,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_unsupported_extensions(mut self, filter: bool) -> Self {
        self.filter_unsupported_extensions = filter;
        self
    }

    pub fn filter_unsupported_attributes(mut self, filter: bool) -> Self {
        self.filter_unsupported_attributes = filter;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
}

// ============================================================================
// LOADING (interchange feature)
// ============================================================================

#[cfg(feature = "interchange")]
mod load {
    use std::path::Path;

    use super::Config;
    use crate::base::SourceLocation;
    use crate::errors::{ErrorKind, Result};
    use crate::item::Value;

    const CONFIG_SOURCE: &str = "<config>";

    impl Config {
        /// Parse a YAML document of `section: { key: value }` mappings.
        pub fn from_yaml_str(text: &str) -> Result<Self> {
            Self::from_yaml_with_source(text, CONFIG_SOURCE)
        }

        /// Parse a JSON object of `"section": { "key": value }` objects.
        pub fn from_json_str(text: &str) -> Result<Self> {
            Self::from_json_with_source(text, CONFIG_SOURCE)
        }

        /// Load a `.json` file as JSON and anything else as YAML.
        pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref();
            let source = path.display().to_string();
            let text = std::fs::read_to_string(path).map_err(|e| {
                ErrorKind::InvalidConfig {
                    reason: e.to_string(),
                }
                .at(&SourceLocation::new(source.as_str(), 0, 0))
            })?;
            if path.extension().is_some_and(|ext| ext == "json") {
                Self::from_json_with_source(&text, &source)
            } else {
                Self::from_yaml_with_source(&text, &source)
            }
        }

        fn from_yaml_with_source(text: &str, source: &str) -> Result<Self> {
            let document: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| {
                let (line, column) = e
                    .location()
                    .map_or((0, 0), |loc| (loc.line() as u32, loc.column() as u32));
                invalid(e.to_string(), &SourceLocation::new(source, line, column))
            })?;
            let location = SourceLocation::new(source, 1, 1);
            let serde_yaml::Value::Mapping(sections) = document else {
                return Err(invalid("expected a mapping of sections", &location));
            };

            let mut config = Config::new();
            for (section, entries) in sections {
                let section = yaml_key(&section, &location)?;
                let serde_yaml::Value::Mapping(entries) = entries else {
                    return Err(invalid(
                        format!("section '{}' must be a mapping", section),
                        &location,
                    ));
                };
                for (key, value) in entries {
                    let key = yaml_key(&key, &location)?;
                    let value = yaml_value(&value).ok_or_else(|| {
                        invalid(format!("unsupported value for '{}'", key), &location)
                    })?;
                    config.set(section.as_str(), key, value);
                }
            }
            Ok(config)
        }

        fn from_json_with_source(text: &str, source: &str) -> Result<Self> {
            let document: serde_json::Value = serde_json::from_str(text).map_err(|e| {
                invalid(
                    e.to_string(),
                    &SourceLocation::new(source, e.line() as u32, e.column() as u32),
                )
            })?;
            let location = SourceLocation::new(source, 1, 1);
            let serde_json::Value::Object(sections) = document else {
                return Err(invalid("expected an object of sections", &location));
            };

            let mut config = Config::new();
            for (section, entries) in sections {
                let serde_json::Value::Object(entries) = entries else {
                    return Err(invalid(
                        format!("section '{}' must be an object", section),
                        &location,
                    ));
                };
                for (key, value) in entries {
                    let value = json_value(&value).ok_or_else(|| {
                        invalid(format!("unsupported value for '{}'", key), &location)
                    })?;
                    config.set(section.as_str(), key, value);
                }
            }
            Ok(config)
        }
    }

    fn invalid(reason: impl Into<String>, location: &SourceLocation) -> crate::errors::Error {
        ErrorKind::InvalidConfig {
            reason: reason.into(),
        }
        .at(location)
    }

    fn yaml_key(key: &serde_yaml::Value, location: &SourceLocation) -> Result<String> {
        match key {
            serde_yaml::Value::String(s) => Ok(s.clone()),
            other => Err(invalid(format!("invalid key {:?}", other), location)),
        }
    }

    fn yaml_value(value: &serde_yaml::Value) -> Option<Value> {
        match value {
            serde_yaml::Value::String(s) => Some(Value::Text(s.clone())),
            serde_yaml::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_yaml::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Number)),
            serde_yaml::Value::Sequence(items) => items
                .iter()
                .map(yaml_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            _ => None,
        }
    }

    fn json_value(value: &serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Number)),
            serde_json::Value::Array(items) => items
                .iter()
                .map(json_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            _ => None,
        }
    }
}
