//! Resolve phase: turn a freshly built item tree into a fully classified one.
//!
//! The passes run in a fixed order, each reading what the previous ones
//! wrote on the items:
//!
//! 1. [`references`]: bind raw names to items or builtins
//! 2. [`element_kind`]: assign each item its [`ElementKind`]
//! 3. [`arity`]: give every item an arity
//! 4. [`metadata`]: compute attribute schemas, fill config values, clone
//!    metadata along simple and reference chains
//! 5. [`reference_kind`]: mark references as augmenting or pure
//!
//! Every pass is fail-fast; the first error aborts the whole phase.

mod arity;
mod element_kind;
mod metadata;
mod reference_kind;
mod references;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::config::PipelineOptions;
use crate::errors::{ErrorKind, Result};
use crate::item::{DeclarationKind, ElementKind, ItemId, ItemTree, Target};
use crate::plugin::Plugin;
use crate::types::{BuiltinType, FundamentalType};

/// Run every resolve pass over `tree` for `plugin`.
pub fn resolve(tree: &mut ItemTree, plugin: &dyn Plugin, options: &PipelineOptions) -> Result<()> {
    debug!(plugin = plugin.name(), items = tree.len(), "[RESOLVE] starting");

    references::resolve_references(tree)?;
    element_kind::classify(tree)?;
    arity::resolve_arities(tree)?;
    metadata::resolve_metadata(tree, plugin, &options.config)?;
    reference_kind::classify_references(tree)?;

    debug!(items = tree.len(), "[RESOLVE] done");
    Ok(())
}

// ============================================================================
// CHAIN HELPERS
// ============================================================================

/// Where a chain of references ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChainEnd {
    Item(ItemId),
    Builtin(BuiltinType),
}

/// Follow Reference-kind items from `id` to the first item that is not one.
///
/// Requires classification; `id` itself is returned when it is not a
/// reference.
pub(crate) fn reference_terminal(tree: &ItemTree, id: ItemId) -> Result<ChainEnd> {
    let mut seen = FxHashSet::default();
    let mut current = id;
    loop {
        let item = &tree[current];
        if item.element_kind != Some(ElementKind::Reference) {
            return Ok(ChainEnd::Item(current));
        }
        if !seen.insert(current) {
            return Err(circular(tree, id));
        }
        match item.target() {
            Some(Target::Item(next)) => current = next,
            Some(Target::Builtin(builtin)) => return Ok(ChainEnd::Builtin(builtin)),
            None => return Ok(ChainEnd::Item(current)),
        }
    }
}

/// Kind of the item a reference chain ends at.
pub(crate) fn terminal_kind(tree: &ItemTree, id: ItemId) -> Result<Option<ElementKind>> {
    Ok(match reference_terminal(tree, id)? {
        ChainEnd::Item(end) => tree[end].element_kind,
        ChainEnd::Builtin(BuiltinType::Fundamental(_)) => Some(ElementKind::Fundamental),
        ChainEnd::Builtin(BuiltinType::Any) => Some(ElementKind::Any),
        ChainEnd::Builtin(BuiltinType::Custom) => Some(ElementKind::Custom),
    })
}

/// The fundamental type an item ultimately wraps, if any.
///
/// Fundamentals answer with their own type, simple objects with their
/// synthetic child's or their simple base's, references with their
/// terminal's.
pub(crate) fn fundamental_of(tree: &ItemTree, id: ItemId) -> Option<FundamentalType> {
    let mut seen = FxHashSet::default();
    fundamental_inner(tree, id, &mut seen)
}

fn fundamental_inner(
    tree: &ItemTree,
    id: ItemId,
    seen: &mut FxHashSet<ItemId>,
) -> Option<FundamentalType> {
    if !seen.insert(id) {
        return None;
    }
    let item = &tree[id];
    match item.element_kind? {
        ElementKind::Fundamental => match item.target()? {
            Target::Builtin(BuiltinType::Fundamental(ty)) => Some(ty),
            _ => None,
        },
        ElementKind::Reference => match item.target()? {
            Target::Item(next) => fundamental_inner(tree, next, seen),
            Target::Builtin(_) => None,
        },
        ElementKind::Simple => {
            if let Some(child) = synthetic_child(tree, id) {
                return fundamental_inner(tree, child, seen);
            }
            let source = simple_sources(tree, id).into_iter().next()?;
            fundamental_inner(tree, source, seen)
        }
        _ => None,
    }
}

/// The synthetic fundamental child of a simple object.
pub(crate) fn synthetic_child(tree: &ItemTree, id: ItemId) -> Option<ItemId> {
    tree[id]
        .children
        .iter()
        .copied()
        .find(|&child| tree[child].is_synthetic_fundamental)
}

/// Item references of `id` whose chains end at a fundamental type.
pub(crate) fn simple_sources(tree: &ItemTree, id: ItemId) -> Vec<ItemId> {
    tree[id]
        .references
        .iter()
        .filter_map(Target::as_item)
        .filter(|&target| leads_to_fundamental(tree, target))
        .collect()
}

/// Whether any reference path from `id` reaches a fundamental type.
pub(crate) fn leads_to_fundamental(tree: &ItemTree, id: ItemId) -> bool {
    let mut seen = FxHashSet::default();
    leads_inner(tree, id, &mut seen)
}

fn leads_inner(tree: &ItemTree, id: ItemId, seen: &mut FxHashSet<ItemId>) -> bool {
    if !seen.insert(id) {
        return false;
    }
    let item = &tree[id];
    if matches!(
        item.element_kind,
        Some(ElementKind::Simple | ElementKind::Fundamental)
    ) {
        return true;
    }
    if item.declaration_kind == DeclarationKind::Extension || !item.alternatives.is_empty() {
        return false;
    }
    item.references.iter().any(|target| match target {
        Target::Builtin(builtin) => builtin.is_fundamental(),
        Target::Item(next) => leads_inner(tree, *next, seen),
    })
}

pub(crate) fn circular(tree: &ItemTree, id: ItemId) -> crate::errors::Error {
    ErrorKind::CircularReference {
        name: tree.qualified_name(id),
    }
    .at(&tree[id].location)
}
