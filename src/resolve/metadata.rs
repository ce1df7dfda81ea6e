//! Metadata resolution.
//!
//! Every non-extension item gets an attribute schema: the universal
//! attributes, those of its element kind (a reference uses its terminal's
//! kind), whatever the plugin adds, and the optional or collection set its
//! arity calls for. Values from the plugin's configuration section then fill
//! keys the schema knows but the item left unset.
//!
//! A second pass squashes metadata along chains: simple objects inherit from
//! their single simple source and references from their target, for keys in
//! their own schema they do not set themselves.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use super::{fundamental_of, simple_sources, synthetic_child, terminal_kind};
use crate::config::Config;
use crate::errors::Result;
use crate::item::{Arity, ElementKind, ItemId, ItemTree, MetadataItem, Provenance};
use crate::plugin::Plugin;
use crate::types::schema::{
    NAME, collection_attributes, kind_attributes, optional_attributes, universal_attributes,
};
use crate::types::{AttributeSchema, schema_from};

pub(crate) fn resolve_metadata(
    tree: &mut ItemTree,
    plugin: &dyn Plugin,
    config: &Config,
) -> Result<()> {
    let configured = config.values_for(plugin.name());

    for id in tree.walk() {
        let item = &tree[id];
        if item.parent.is_none() || item.element_kind == Some(ElementKind::Extension) {
            continue;
        }
        let schema = build_schema(tree, id, plugin)?;

        let item = &mut tree[id];
        for (key, value) in &configured {
            if schema.contains_key(key) && !item.metadata.contains(key.as_str()) {
                trace!("[METADATA] {} <- config {}={}", id, key, value);
                let entry = MetadataItem::explicit(value.clone(), item.location.clone())
                    .with_provenance(Provenance::Config);
                item.metadata.insert(key.clone(), entry);
            }
        }
        item.schema = schema;
    }

    let mut done = FxHashSet::default();
    for id in tree.walk() {
        let mut visiting = FxHashSet::default();
        squash(tree, id, &mut done, &mut visiting);
    }
    Ok(())
}

fn build_schema(tree: &ItemTree, id: ItemId, plugin: &dyn Plugin) -> Result<AttributeSchema> {
    let item = &tree[id];
    let kind = match item.element_kind {
        Some(ElementKind::Reference) => terminal_kind(tree, id)?,
        other => other,
    };

    let mut attributes = universal_attributes();
    if let Some(kind) = kind {
        attributes.extend(kind_attributes(kind, fundamental_of(tree, id)));
    }
    attributes.extend(plugin.required_metadata_for(item).into_iter().map(|mut attribute| {
        attribute.required = true;
        attribute
    }));
    attributes.extend(plugin.optional_metadata_for(item).into_iter().map(|mut attribute| {
        attribute.required = false;
        attribute
    }));

    let arity = item.arity.unwrap_or(Arity::ONE);
    if arity.is_collection() {
        attributes.extend(collection_attributes());
    } else if arity.is_optional() {
        attributes.extend(optional_attributes());
    }
    Ok(schema_from(attributes))
}

// ============================================================================
// SQUASH
// ============================================================================

fn squash(
    tree: &mut ItemTree,
    id: ItemId,
    done: &mut FxHashSet<ItemId>,
    visiting: &mut FxHashSet<ItemId>,
) {
    if done.contains(&id) {
        return;
    }
    let source = match tree[id].element_kind {
        Some(ElementKind::Simple) => simple_source(tree, id),
        Some(ElementKind::Reference) => tree[id].target().and_then(|target| target.as_item()),
        _ => None,
    };
    let Some(source) = source else {
        done.insert(id);
        return;
    };
    if !visiting.insert(id) {
        return;
    }
    squash(tree, source, done, visiting);

    let item = &tree[id];
    let inherited: Vec<(SmolStr, MetadataItem)> = tree[source]
        .metadata
        .iter()
        .filter(|(key, _)| {
            key.as_str() != NAME
                && !item.metadata.contains(key.as_str())
                && item.schema.contains_key(key.as_str())
        })
        .map(|(key, entry)| (key.clone(), entry.clone().with_provenance(Provenance::Cloned)))
        .collect();

    if !inherited.is_empty() {
        trace!(
            "[METADATA] {} <- {} cloned {} keys",
            tree.qualified_name(id),
            tree.qualified_name(source),
            inherited.len()
        );
    }
    let item = &mut tree[id];
    for (key, entry) in inherited {
        item.metadata.insert(key, entry);
    }
    visiting.remove(&id);
    done.insert(id);
}

/// The single source a simple object inherits from, when unambiguous.
fn simple_source(tree: &ItemTree, id: ItemId) -> Option<ItemId> {
    let chains = simple_sources(tree, id);
    match (synthetic_child(tree, id), chains.as_slice()) {
        (Some(child), []) => Some(child),
        (None, [single]) => Some(*single),
        _ => None,
    }
}
