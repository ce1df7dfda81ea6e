//! Plugin contract: what a consuming generator tells the pipeline.
//!
//! A plugin is consulted during resolution and validation only: its
//! capability flags gate element kinds, its name selects the configuration
//! section, its extension list decides which extensions are legal, and its
//! metadata hooks add attributes to each item's schema.

use bitflags::bitflags;
use smol_str::SmolStr;

use crate::item::{ElementKind, Item};
use crate::types::Attribute;

bitflags! {
    /// Element kinds and behaviors a plugin supports.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct PluginFlags: u32 {
        /// `custom` elements.
        const CUSTOM = 1 << 0;
        /// `any` elements.
        const ANY = 1 << 1;
        /// Declarations referencing other items.
        const REFERENCE = 1 << 2;
        /// Collections of other items.
        const LIST = 1 << 3;
        /// `(a | b)` variants.
        const VARIANT = 1 << 4;
        /// Keep pure references as elements instead of replacing them by their target.
        const PRESERVE_REFERENCES = 1 << 5;

        /// Every element kind.
        const ALL_ELEMENTS = Self::CUSTOM.bits()
            | Self::ANY.bits()
            | Self::REFERENCE.bits()
            | Self::LIST.bits()
            | Self::VARIANT.bits();
    }
}

impl PluginFlags {
    /// Flag a plugin must set to accept `kind`, if any.
    pub fn required_for(kind: ElementKind) -> Option<PluginFlags> {
        match kind {
            ElementKind::Custom => Some(PluginFlags::CUSTOM),
            ElementKind::Any => Some(PluginFlags::ANY),
            ElementKind::Reference => Some(PluginFlags::REFERENCE),
            ElementKind::List => Some(PluginFlags::LIST),
            ElementKind::Variant => Some(PluginFlags::VARIANT),
            ElementKind::Fundamental
            | ElementKind::Compound
            | ElementKind::Simple
            | ElementKind::Extension => None,
        }
    }
}

/// An extension a plugin understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionInfo {
    pub name: SmolStr,
    /// Whether the extension may appear more than once in a scope.
    pub allow_duplicates: bool,
}

impl ExtensionInfo {
    pub fn new(name: impl Into<SmolStr>, allow_duplicates: bool) -> Self {
        Self {
            name: name.into(),
            allow_duplicates,
        }
    }
}

/// A consumer of the finished element graph.
///
/// The hooks receive items after classification and arity resolution, so
/// [`Item::element_kind`] and [`Item::arity`] are populated.
pub trait Plugin {
    /// Name used to select the configuration section.
    fn name(&self) -> &str;

    fn flags(&self) -> PluginFlags;

    fn extensions(&self) -> Vec<ExtensionInfo> {
        Vec::new()
    }

    /// Attributes that must be present on `item`.
    fn required_metadata_for(&self, _item: &Item) -> Vec<Attribute> {
        Vec::new()
    }

    /// Attributes that may be present on `item`.
    fn optional_metadata_for(&self, _item: &Item) -> Vec<Attribute> {
        Vec::new()
    }
}
