//! Arity resolution: explicit arities stay, references inherit their
//! target's, everything else is exactly one.

use rustc_hash::FxHashSet;
use tracing::trace;

use super::circular;
use crate::errors::Result;
use crate::item::{Arity, ElementKind, ItemId, ItemTree, Target};

pub(crate) fn resolve_arities(tree: &mut ItemTree) -> Result<()> {
    for id in tree.walk() {
        let mut visiting = FxHashSet::default();
        resolve_arity(tree, id, &mut visiting)?;
    }
    Ok(())
}

fn resolve_arity(
    tree: &mut ItemTree,
    id: ItemId,
    visiting: &mut FxHashSet<ItemId>,
) -> Result<Arity> {
    if let Some(arity) = tree[id].arity {
        return Ok(arity);
    }
    if !visiting.insert(id) {
        return Err(circular(tree, id));
    }

    let arity = match (tree[id].element_kind, tree[id].target()) {
        (Some(ElementKind::Reference), Some(Target::Item(target))) => {
            resolve_arity(tree, target, visiting)?
        }
        _ => Arity::ONE,
    };

    trace!("[ARITY] {} -> '{}'", tree.qualified_name(id), arity);
    tree[id].arity = Some(arity);
    Ok(arity)
}
