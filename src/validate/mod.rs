//! Validate phase: check a resolved item tree against the plugin.
//!
//! Every item is checked exactly once, in tree order, and the first failure
//! aborts the phase. Per item the checks run in this order:
//!
//! 1. Capability: the element kind must be enabled by the plugin's flags
//! 2. Name uniqueness within the scope, including names inherited from bases
//! 3. Variant alternatives must have an arity of exactly one
//! 4. Metadata: required present, unknown dropped or rejected, values typed
//!    in place, item-local checks run, defaults filled
//! 5. Simple shape and attribute items
//! 6. Extension legality
//! 7. No reference chain may end at an extension
//!
//! Two failures are policy controlled by [`PipelineOptions`]: unknown
//! extensions and unknown attributes can be filtered with a warning instead.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use crate::config::PipelineOptions;
use crate::errors::{ErrorKind, Result};
use crate::item::{
    Arity, DeclarationKind, ElementKind, ItemId, ItemKind, ItemTree, MetadataItem, Provenance,
    Target,
};
use crate::plugin::{ExtensionInfo, Plugin, PluginFlags};
use crate::resolve::{
    ChainEnd, leads_to_fundamental, reference_terminal, simple_sources, synthetic_child,
};

/// Validate every item of a resolved `tree` for `plugin`.
///
/// Metadata values are deserialized in place and defaults are filled, so the
/// tree leaves this phase ready for transformation.
pub fn validate(
    tree: &mut ItemTree,
    plugin: &dyn Plugin,
    options: &PipelineOptions,
) -> Result<()> {
    debug!(plugin = plugin.name(), items = tree.len(), "[VALIDATE] starting");

    let validator = Validator {
        plugin,
        options,
        flags: plugin.flags(),
        extensions: plugin.extensions(),
    };
    let order = tree.walk();
    for &id in &order {
        validator.check_item(tree, id)?;
    }

    debug!(items = order.len(), "[VALIDATE] done");
    Ok(())
}

struct Validator<'a> {
    plugin: &'a dyn Plugin,
    options: &'a PipelineOptions,
    flags: PluginFlags,
    extensions: Vec<ExtensionInfo>,
}

impl Validator<'_> {
    fn extension(&self, name: &str) -> Option<&ExtensionInfo> {
        self.extensions.iter().find(|info| info.name == name)
    }

    fn check_item(&self, tree: &mut ItemTree, id: ItemId) -> Result<()> {
        if tree[id].ignore {
            return Ok(());
        }
        trace!("[VALIDATE] {}", tree.qualified_name(id));

        self.check_capability(tree, id)?;
        self.check_unique_names(tree, id)?;
        self.check_variant(tree, id)?;
        self.check_metadata(tree, id)?;
        self.check_simple(tree, id)?;
        self.check_attribute_item(tree, id)?;
        self.check_extension(tree, id)?;
        self.check_references(tree, id)
    }

    // ------------------------------------------------------------------------
    // 1. Capability
    // ------------------------------------------------------------------------

    fn check_capability(&self, tree: &ItemTree, id: ItemId) -> Result<()> {
        let item = &tree[id];
        let Some(kind) = item.element_kind else {
            return Ok(());
        };
        // Variant alternatives are part of their variant, not elements of their own kind.
        let is_alternative = item
            .parent
            .is_some_and(|parent| tree[parent].alternatives.contains(&id));
        if is_alternative {
            return Ok(());
        }
        match PluginFlags::required_for(kind) {
            Some(flag) if !self.flags.contains(flag) => Err(ErrorKind::UnsupportedElementKind {
                name: tree.qualified_name(id),
                kind,
                plugin: self.plugin.name().to_string(),
            }
            .at(&item.location)),
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // 2. Name uniqueness
    // ------------------------------------------------------------------------

    fn check_unique_names(&self, tree: &ItemTree, id: ItemId) -> Result<()> {
        let mut names: FxHashSet<SmolStr> = inherited_names(tree, id);
        let mut extensions: FxHashSet<SmolStr> = FxHashSet::default();

        for &child in &tree[id].children {
            let item = &tree[child];
            if item.ignore || item.is_synthetic_fundamental {
                continue;
            }
            if item.declaration_kind == DeclarationKind::Extension {
                let Some(name) = item.name.as_ref() else {
                    continue;
                };
                let allow_duplicates = match self.extension(name) {
                    Some(info) => info.allow_duplicates,
                    None => continue,
                };
                if !extensions.insert(name.clone()) && !allow_duplicates {
                    return Err(ErrorKind::DuplicateExtension {
                        name: name.to_string(),
                    }
                    .at(&item.location));
                }
                continue;
            }

            // Elements and class fields are keyed by the effective name.
            let Some(name) = item.effective_name() else {
                continue;
            };
            if !names.insert(name.clone()) {
                return Err(ErrorKind::DuplicateName {
                    name: name.to_string(),
                }
                .at(&item.location));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // 3. Variant arity
    // ------------------------------------------------------------------------

    fn check_variant(&self, tree: &ItemTree, id: ItemId) -> Result<()> {
        if tree[id].element_kind != Some(ElementKind::Variant) {
            return Ok(());
        }
        for alternative in flattened_alternatives(tree, id) {
            let arity = tree[alternative].arity.unwrap_or(Arity::ONE);
            if !arity.is_exactly_one() {
                return Err(ErrorKind::InvalidVariantArity {
                    name: alternative_name(tree, alternative),
                    arity: arity.to_string(),
                }
                .at(&tree[alternative].location));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // 4. Metadata
    // ------------------------------------------------------------------------

    fn check_metadata(&self, tree: &mut ItemTree, id: ItemId) -> Result<()> {
        let name = tree.qualified_name(id);
        let item = &mut tree[id];
        if item.parent.is_none() || item.declaration_kind == DeclarationKind::Extension {
            return Ok(());
        }

        for attribute in item.schema.values() {
            if attribute.required && !item.metadata.contains(&attribute.name) {
                return Err(ErrorKind::MissingRequiredAttribute {
                    name,
                    attribute: attribute.name.to_string(),
                }
                .at(&item.location));
            }
        }

        let unknown: Vec<SmolStr> = item
            .metadata
            .keys()
            .filter(|key| !item.schema.contains_key(key.as_str()))
            .cloned()
            .collect();
        for key in unknown {
            if !self.options.filter_unsupported_attributes {
                let location = item
                    .metadata
                    .get(&key)
                    .map(|entry| entry.location.clone())
                    .unwrap_or_else(|| item.location.clone());
                return Err(ErrorKind::UnsupportedAttribute {
                    name,
                    attribute: key.to_string(),
                }
                .at(&location));
            }
            warn!("[VALIDATE] dropping unsupported attribute '{}' on '{}'", key, name);
            item.metadata.remove(&key);
        }

        for (key, entry) in item.metadata.iter_mut() {
            let Some(attribute) = item.schema.get(key.as_str()) else {
                continue;
            };
            entry.value = attribute.ty.deserialize(&entry.value).map_err(|reason| {
                ErrorKind::InvalidAttributeValue {
                    attribute: key.to_string(),
                    reason,
                }
                .at(&entry.location)
            })?;
        }

        for (key, entry) in item.metadata.iter() {
            let check = item
                .schema
                .get(key.as_str())
                .and_then(|attribute| attribute.validate);
            if let Some(check) = check {
                check(&entry.value, &item.metadata).map_err(|reason| {
                    ErrorKind::InvalidAttributeValue {
                        attribute: key.to_string(),
                        reason,
                    }
                    .at(&entry.location)
                })?;
            }
        }

        let defaults: Vec<(SmolStr, MetadataItem)> = item
            .schema
            .values()
            .filter(|attribute| !item.metadata.contains(&attribute.name))
            .filter_map(|attribute| {
                let value = attribute.default.clone()?;
                let entry = MetadataItem::explicit(value, item.location.clone())
                    .with_provenance(Provenance::Default);
                Some((attribute.name.clone(), entry))
            })
            .collect();
        for (key, entry) in defaults {
            item.metadata.insert(key, entry);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // 5. Simple shape and attribute items
    // ------------------------------------------------------------------------

    fn check_simple(&self, tree: &ItemTree, id: ItemId) -> Result<()> {
        let item = &tree[id];
        if item.element_kind != Some(ElementKind::Simple) {
            return Ok(());
        }
        let name = tree.qualified_name(id);

        let synthetic = synthetic_child(tree, id);
        let sources = simple_sources(tree, id);
        if sources.len() + usize::from(synthetic.is_some()) > 1 {
            return Err(ErrorKind::MultipleSimpleSources { name }.at(&item.location));
        }

        for target in &item.references {
            let base = match target {
                Target::Item(base) if leads_to_fundamental(tree, *base) => continue,
                Target::Item(base) => tree.qualified_name(*base),
                Target::Builtin(builtin) => builtin.keyword().to_string(),
            };
            return Err(ErrorKind::InvalidSimpleBase { name, base }.at(&item.location));
        }

        for &child in &item.children {
            let child_item = &tree[child];
            let allowed = child_item.is_synthetic_fundamental
                || child_item.item_kind == ItemKind::Attribute
                || child_item.declaration_kind == DeclarationKind::Extension;
            if !allowed {
                return Err(ErrorKind::InvalidAttributeItem {
                    name: tree.qualified_name(child),
                    reason: "simple objects may only contain attributes".to_string(),
                }
                .at(&child_item.location));
            }
        }
        Ok(())
    }

    fn check_attribute_item(&self, tree: &ItemTree, id: ItemId) -> Result<()> {
        let item = &tree[id];
        if item.item_kind != ItemKind::Attribute {
            return Ok(());
        }
        let invalid = |reason: &str| {
            ErrorKind::InvalidAttributeItem {
                name: tree.qualified_name(id),
                reason: reason.to_string(),
            }
            .at(&item.location)
        };

        let terminal_is_fundamental = match reference_terminal(tree, id)? {
            ChainEnd::Item(end) => tree[end].element_kind == Some(ElementKind::Fundamental),
            ChainEnd::Builtin(builtin) => builtin.is_fundamental(),
        };
        if !terminal_is_fundamental {
            return Err(invalid("attributes must resolve to a fundamental type"));
        }
        if !item.arity.unwrap_or(Arity::ONE).is_single() {
            return Err(invalid("attributes cannot be collections"));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // 6. Extensions
    // ------------------------------------------------------------------------

    fn check_extension(&self, tree: &mut ItemTree, id: ItemId) -> Result<()> {
        let item = &mut tree[id];
        if item.declaration_kind != DeclarationKind::Extension {
            return Ok(());
        }
        let name = item.name.clone().unwrap_or_default();
        if self.extension(&name).is_some() {
            return Ok(());
        }
        if self.options.filter_unsupported_extensions {
            warn!(
                "[VALIDATE] ignoring extension '{}' unsupported by '{}'",
                name,
                self.plugin.name()
            );
            item.ignore = true;
            return Ok(());
        }
        Err(ErrorKind::InvalidExtension {
            name: name.to_string(),
        }
        .at(&item.location))
    }

    // ------------------------------------------------------------------------
    // 7. References
    // ------------------------------------------------------------------------

    fn check_references(&self, tree: &ItemTree, id: ItemId) -> Result<()> {
        let item = &tree[id];
        for target in &item.references {
            let Target::Item(target) = target else {
                continue;
            };
            if let ChainEnd::Item(end) = reference_terminal(tree, *target)? {
                if tree[end].declaration_kind == DeclarationKind::Extension {
                    return Err(ErrorKind::ReferenceToExtension {
                        name: tree.qualified_name(id),
                        extension: tree[end].name().unwrap_or_default().to_string(),
                    }
                    .at(&item.location));
                }
            }
        }
        Ok(())
    }
}

/// Names a compound inherits through its object bases, transitively.
///
/// Bases reached through declaration aliases are followed to their targets.
fn inherited_names(tree: &ItemTree, id: ItemId) -> FxHashSet<SmolStr> {
    let mut names = FxHashSet::default();
    if tree[id].declaration_kind != DeclarationKind::Object {
        return names;
    }
    let mut seen = FxHashSet::default();
    let mut stack: Vec<ItemId> = tree[id]
        .references
        .iter()
        .filter_map(Target::as_item)
        .collect();
    while let Some(base) = stack.pop() {
        if base == id || !seen.insert(base) {
            continue;
        }
        let base_item = &tree[base];
        match base_item.declaration_kind {
            DeclarationKind::Object => {}
            DeclarationKind::Declaration => {
                stack.extend(base_item.references.iter().filter_map(Target::as_item));
                continue;
            }
            _ => continue,
        }
        for &child in &base_item.children {
            let child_item = &tree[child];
            if child_item.declaration_kind == DeclarationKind::Extension
                || child_item.is_synthetic_fundamental
            {
                continue;
            }
            if let Some(name) = child_item.effective_name() {
                names.insert(name);
            }
        }
        stack.extend(base_item.references.iter().filter_map(Target::as_item));
    }
    names
}

/// Alternatives of a variant with nested variants expanded in place.
fn flattened_alternatives(tree: &ItemTree, id: ItemId) -> Vec<ItemId> {
    let mut seen = FxHashSet::default();
    let mut flattened = Vec::new();
    let mut stack: Vec<ItemId> = tree[id].alternatives.iter().rev().copied().collect();
    while let Some(alternative) = stack.pop() {
        if !seen.insert(alternative) {
            continue;
        }
        let nested = match reference_terminal(tree, alternative) {
            Ok(ChainEnd::Item(end))
                if end != alternative && tree[end].element_kind == Some(ElementKind::Variant) =>
            {
                Some(end)
            }
            _ => None,
        };
        match nested {
            Some(variant) if tree[alternative].arity.is_none_or(|a| a.is_exactly_one()) => {
                stack.extend(tree[variant].alternatives.iter().rev().copied());
            }
            _ => flattened.push(alternative),
        }
    }
    flattened
}

fn alternative_name(tree: &ItemTree, id: ItemId) -> String {
    match tree[id].target() {
        Some(Target::Item(target)) => tree.qualified_name(target),
        Some(Target::Builtin(builtin)) => builtin.keyword().to_string(),
        None => tree.qualified_name(id),
    }
}
