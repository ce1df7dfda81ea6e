//! Element-kind classification.
//!
//! Objects become Simple when any reference path reaches a fundamental type
//! and Compound otherwise. A Simple object that names its fundamental type
//! directly gets it split off into a synthetic first child, together with the
//! constraint attributes meant for it. Declarations are classified by what
//! their single reference resolved to.

use rustc_hash::FxHashSet;
use tracing::trace;

use super::circular;
use crate::errors::{ErrorKind, Result};
use crate::item::{
    Arity, DeclarationKind, ElementKind, Item, ItemId, ItemTree, Metadata, ReferenceInfo, Target,
};
use crate::types::schema::REFINES_ARITY;
use crate::types::{AttributeType, BuiltinType, FundamentalType};

pub(crate) fn classify(tree: &mut ItemTree) -> Result<()> {
    for id in tree.walk() {
        classify_item(tree, id)?;
    }
    Ok(())
}

fn classify_item(tree: &mut ItemTree, id: ItemId) -> Result<()> {
    if tree[id].element_kind.is_some() {
        return Ok(());
    }
    let kind = match tree[id].declaration_kind {
        DeclarationKind::Extension => ElementKind::Extension,
        DeclarationKind::Object => classify_object(tree, id)?,
        DeclarationKind::Declaration => classify_declaration(tree, id)?,
    };
    trace!("[KIND] {} -> {}", tree.qualified_name(id), kind);
    tree[id].element_kind = Some(kind);
    Ok(())
}

// ============================================================================
// OBJECTS
// ============================================================================

fn classify_object(tree: &mut ItemTree, id: ItemId) -> Result<ElementKind> {
    if tree[id].parent.is_none() || !reaches_fundamental(tree, id) {
        return Ok(ElementKind::Compound);
    }

    let fundamentals: Vec<(usize, FundamentalType)> = tree[id]
        .references
        .iter()
        .enumerate()
        .filter_map(|(index, target)| match target {
            Target::Builtin(BuiltinType::Fundamental(ty)) => Some((index, *ty)),
            _ => None,
        })
        .collect();

    match fundamentals.as_slice() {
        [] => {}
        [(index, ty)] => split_fundamental(tree, id, *index, *ty),
        _ => {
            return Err(ErrorKind::MultipleFundamentalReferences {
                name: tree.qualified_name(id),
            }
            .at(&tree[id].location));
        }
    }
    Ok(ElementKind::Simple)
}

/// Whether any reference path from object `id` ends at a fundamental type or
/// an already classified Simple object.
fn reaches_fundamental(tree: &ItemTree, id: ItemId) -> bool {
    let mut seen = FxHashSet::default();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        let item = &tree[current];
        if current != id && item.element_kind == Some(ElementKind::Simple) {
            return true;
        }
        if item.declaration_kind == DeclarationKind::Extension || !item.alternatives.is_empty() {
            continue;
        }
        for target in &item.references {
            match target {
                Target::Builtin(builtin) if builtin.is_fundamental() => return true,
                Target::Builtin(_) => {}
                Target::Item(next) => stack.push(*next),
            }
        }
    }
    false
}

/// Move the fundamental reference at `index` into a synthetic first child.
fn split_fundamental(tree: &mut ItemTree, id: ItemId, index: usize, ty: FundamentalType) {
    let item = &mut tree[id];
    let target = item.references.remove(index);

    let mut moved = Metadata::new();
    let keys: Vec<_> = item
        .metadata
        .keys()
        .filter(|key| ty.has_attribute(key.as_str()))
        .cloned()
        .collect();
    for key in keys {
        if let Some(entry) = item.metadata.remove(&key) {
            moved.insert(key, entry);
        }
    }

    let mut child = Item::anonymous_declaration(ty.keyword()).at(item.location.clone());
    child.raw_references.clear();
    child.references.push(target);
    child.metadata = moved;
    child.is_synthetic_fundamental = true;
    child.element_kind = Some(ElementKind::Fundamental);

    let child_id = tree.insert_child(id, 0, child);
    trace!(
        "[KIND] {} -> synthetic {} child {}",
        tree.qualified_name(id),
        ty,
        child_id
    );
}

// ============================================================================
// DECLARATIONS
// ============================================================================

fn classify_declaration(tree: &mut ItemTree, id: ItemId) -> Result<ElementKind> {
    if !tree[id].alternatives.is_empty() {
        return Ok(ElementKind::Variant);
    }

    let target = match tree[id].target() {
        Some(target) => target,
        None => {
            return Err(ErrorKind::UnresolvedReference {
                name: tree[id].name().unwrap_or_default().to_string(),
            }
            .at(&tree[id].location));
        }
    };

    let target_id = match target {
        Target::Builtin(BuiltinType::Fundamental(_)) => return Ok(ElementKind::Fundamental),
        Target::Builtin(BuiltinType::Any) => return Ok(ElementKind::Any),
        Target::Builtin(BuiltinType::Custom) => return Ok(ElementKind::Custom),
        Target::Item(target_id) => target_id,
    };

    // `refines_arity` only steers this decision and is never kept.
    let refines = match tree[id].metadata.remove(REFINES_ARITY) {
        Some(entry) => AttributeType::Bool
            .deserialize(&entry.value)
            .map_err(|reason| {
                ErrorKind::InvalidAttributeValue {
                    attribute: REFINES_ARITY.to_string(),
                    reason,
                }
                .at(&entry.location)
            })?
            .as_bool()
            .unwrap_or(false),
        None => false,
    };

    let item = &tree[id];
    let explicit_collection =
        item.has_explicit_arity && item.arity.is_some_and(|arity| arity.is_collection());
    let is_list =
        explicit_collection && declared_arity(tree, target_id)?.is_collection() && !refines;

    if is_list {
        return Ok(ElementKind::List);
    }

    let info = ReferenceInfo {
        had_explicit_arity: item.has_explicit_arity,
        explicit_keys: item.metadata.explicit_keys(),
    };
    tree[id].reference_info = Some(info);
    Ok(ElementKind::Reference)
}

/// Arity an item declares, looking through unaritied plain declarations.
fn declared_arity(tree: &ItemTree, id: ItemId) -> Result<Arity> {
    let mut seen = FxHashSet::default();
    let mut current = id;
    loop {
        let item = &tree[current];
        if let Some(arity) = item.arity {
            return Ok(arity);
        }
        if !seen.insert(current) {
            return Err(circular(tree, id));
        }
        let plain_declaration =
            item.declaration_kind == DeclarationKind::Declaration && item.alternatives.is_empty();
        match item.target() {
            Some(Target::Item(next)) if plain_declaration => current = next,
            _ => return Ok(Arity::ONE),
        }
    }
}
