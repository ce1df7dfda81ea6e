//! Reference-kind classification.
//!
//! A reference is augmenting when it changes something about its target:
//! an explicit arity, or an explicit value for an attribute its target's kind
//! defines that is not documentation-only. Anything else is a pure alias.

use tracing::trace;

use super::{fundamental_of, terminal_kind};
use crate::errors::Result;
use crate::item::{ElementKind, ItemTree};
use crate::types::schema::kind_attributes;

pub(crate) fn classify_references(tree: &mut ItemTree) -> Result<()> {
    for id in tree.walk() {
        if tree[id].element_kind != Some(ElementKind::Reference) {
            continue;
        }
        let Some(info) = tree[id].reference_info.as_ref() else {
            continue;
        };

        let augmenting = info.had_explicit_arity || {
            let attributes = match terminal_kind(tree, id)? {
                Some(kind) => kind_attributes(kind, fundamental_of(tree, id)),
                None => Vec::new(),
            };
            info.explicit_keys.iter().any(|key| {
                attributes
                    .iter()
                    .any(|attribute| attribute.name == *key && !attribute.metadata_only)
            })
        };

        trace!(
            "[KIND] {} -> {} reference",
            tree.qualified_name(id),
            if augmenting { "augmenting" } else { "pure" }
        );
        tree[id].is_augmenting_reference = augmenting;
    }
    Ok(())
}
