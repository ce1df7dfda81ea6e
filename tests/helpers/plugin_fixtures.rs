//! A configurable plugin for driving the pipeline from tests.

use sdl::types::Attribute;
use sdl::{ExtensionInfo, Item, Plugin, PluginFlags};

/// Plugin whose name, flags, extensions, and metadata are set per test.
#[derive(Debug, Clone)]
pub struct TestPlugin {
    name: String,
    flags: PluginFlags,
    extensions: Vec<ExtensionInfo>,
    required: Vec<(String, Attribute)>,
    optional: Vec<Attribute>,
}

impl TestPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flags: PluginFlags::ALL_ELEMENTS,
            extensions: Vec::new(),
            required: Vec::new(),
            optional: Vec::new(),
        }
    }

    pub fn with_flags(mut self, flags: PluginFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_extension(mut self, name: &str, allow_duplicates: bool) -> Self {
        self.extensions.push(ExtensionInfo::new(name, allow_duplicates));
        self
    }

    /// Require `attribute` on every item named `item`.
    pub fn with_required(mut self, item: &str, attribute: Attribute) -> Self {
        self.required.push((item.to_string(), attribute));
        self
    }

    /// Accept `attribute` on every item.
    pub fn with_optional(mut self, attribute: Attribute) -> Self {
        self.optional.push(attribute);
        self
    }
}

impl Plugin for TestPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn flags(&self) -> PluginFlags {
        self.flags
    }

    fn extensions(&self) -> Vec<ExtensionInfo> {
        self.extensions.clone()
    }

    fn required_metadata_for(&self, item: &Item) -> Vec<Attribute> {
        self.required
            .iter()
            .filter(|(name, _)| item.name() == Some(name.as_str()))
            .map(|(_, attribute)| attribute.clone())
            .collect()
    }

    fn optional_metadata_for(&self, _item: &Item) -> Vec<Attribute> {
        self.optional.clone()
    }
}

/// Accepts every element kind and an optional `mutable` flag.
pub fn everything() -> TestPlugin {
    TestPlugin::new("Everything").with_optional(Attribute::optional(
        "mutable",
        sdl::types::AttributeType::Bool,
    ))
}

/// [`everything`] plus the `index` extension used by the library schema.
pub fn library_plugin() -> TestPlugin {
    everything().with_extension("index", true)
}
