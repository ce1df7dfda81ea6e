//! Reference resolution: bind every raw name to an item or builtin.

use tracing::trace;

use crate::base::SourceLocation;
use crate::errors::{ErrorKind, Result};
use crate::item::{DeclarationKind, Item, ItemId, ItemTree, RawReference, Target};
use crate::types::BuiltinType;

pub(crate) fn resolve_references(tree: &mut ItemTree) -> Result<()> {
    for id in tree.walk() {
        resolve_item(tree, id)?;
    }
    Ok(())
}

fn resolve_item(tree: &mut ItemTree, id: ItemId) -> Result<()> {
    let item = &tree[id];
    if item.declaration_kind != DeclarationKind::Extension {
        if let Some(name) = item.name() {
            if BuiltinType::is_reserved(name) {
                return Err(ErrorKind::ReservedName {
                    name: name.to_string(),
                }
                .at(&item.location));
            }
        }
    }

    let raw = std::mem::take(&mut tree[id].raw_references);
    for reference in raw {
        match reference {
            RawReference::Name { name, location } => {
                let target = lookup(tree, id, &name, &location)?;
                tree[id].references.push(target);
            }
            RawReference::Variant(alternatives) => {
                for alternative in alternatives {
                    let mut synthetic = Item::anonymous_declaration(alternative.name)
                        .at(alternative.location);
                    synthetic.metadata = alternative.metadata;
                    let alternative_id = tree.alloc(id, synthetic);
                    tree[id].alternatives.push(alternative_id);
                    resolve_item(tree, alternative_id)?;
                }
            }
        }
    }
    Ok(())
}

/// Resolve `name` as seen from `from`.
///
/// Builtin keywords win. Otherwise the dotted segments are matched starting
/// at `from`'s own children, then at each enclosing scope up to the root.
/// `from` never matches itself.
fn lookup(
    tree: &mut ItemTree,
    from: ItemId,
    name: &str,
    location: &SourceLocation,
) -> Result<Target> {
    trace!("[RESOLVE] name='{}' from={}", name, from);

    if let Some(builtin) = BuiltinType::from_keyword(name) {
        trace!("[RESOLVE] -> builtin {}", builtin);
        return Ok(Target::Builtin(builtin));
    }

    let segments: Vec<&str> = name.split('.').collect();
    let mut scope = Some(from);
    while let Some(scope_id) = scope {
        if let Some(found) = match_path(tree, scope_id, &segments, from) {
            trace!(
                "[RESOLVE] -> {} in scope {}",
                tree.qualified_name(found),
                tree.qualified_name(scope_id)
            );
            tree[found].referenced_by.push(from);
            return Ok(Target::Item(found));
        }
        scope = tree[scope_id].parent;
    }

    trace!("[RESOLVE] -> unresolved");
    Err(ErrorKind::UnresolvedReference {
        name: name.to_string(),
    }
    .at(location))
}

fn match_path(tree: &ItemTree, scope: ItemId, segments: &[&str], from: ItemId) -> Option<ItemId> {
    let mut current = scope;
    for segment in segments {
        current = tree[current]
            .children
            .iter()
            .copied()
            .find(|&child| child != from && tree[child].name() == Some(segment))?;
    }
    Some(current)
}
