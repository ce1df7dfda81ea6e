//! Passes over the built graph, run after every deferred link is wired.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use super::{FUNDAMENTAL_PLACEHOLDER, Transformer};
use crate::element::{ElementContext, ElementData, ElementId, walk_from};
use crate::errors::{ErrorKind, Result};
use crate::item::{Arity, DeclarationKind, Value};
use crate::types::schema::{DEFAULT_FUNDAMENTAL_NAME, FUNDAMENTAL_NAME};
use crate::types::{Shape, TypeInfo, TypeInfoId};

/// Copy typed metadata onto each element and run graph-context checks.
///
/// Extensions keep their raw values; everything else keeps only keys its
/// schema declares.
pub(super) fn apply_metadata(transformer: &mut Transformer<'_>, root: ElementId) -> Result<()> {
    let order = walk_from(root, |id| transformer.elements[id.index()].edges());
    let tree = transformer.tree;

    for id in order {
        let Some(item) = transformer.elements[id.index()].source else {
            continue;
        };
        let source = &tree[item];
        let metadata: IndexMap<SmolStr, Value> = source
            .metadata
            .iter()
            .filter(|(key, _)| {
                source.declaration_kind == DeclarationKind::Extension
                    || source.schema.contains_key(key.as_str())
            })
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect();
        transformer.elements[id.index()].metadata = metadata;

        let fundamental = transformer.fundamental_view(id);
        let element = &transformer.elements[id.index()];
        let context = ElementContext {
            element,
            type_infos: &transformer.type_infos,
            fundamental: fundamental.as_ref(),
        };
        for (key, value) in &element.metadata {
            let Some(check) = source
                .schema
                .get(key.as_str())
                .and_then(|attribute| attribute.validate_element)
            else {
                continue;
            };
            if let Err(reason) = check(value, &context) {
                let location = source
                    .metadata
                    .get(key.as_str())
                    .map_or(&element.location, |entry| &entry.location);
                return Err(ErrorKind::InvalidAttributeValue {
                    attribute: key.to_string(),
                    reason,
                }
                .at(location));
            }
        }
    }
    Ok(())
}

/// Name each simple object's fundamental field and complete narrowed
/// fundamentals inherited through other simple objects.
pub(super) fn merge_simple(transformer: &mut Transformer<'_>, root: ElementId) -> Result<()> {
    let order = walk_from(root, |id| transformer.elements[id.index()].edges());

    for id in order {
        let element = &transformer.elements[id.index()];
        let (ElementData::Simple { .. }, Some(item)) = (&element.data, element.source) else {
            continue;
        };
        let name = element
            .metadata
            .get(FUNDAMENTAL_NAME)
            .and_then(Value::as_text)
            .map_or_else(|| SmolStr::new(DEFAULT_FUNDAMENTAL_NAME), SmolStr::new);
        let type_info = element.type_info;
        let location = element.location.clone();

        if let Some(field) = transformer.simple_fields.get(&item).copied() {
            if transformer.merges.contains_key(&field) {
                let info = transformer
                    .fundamental_at(field, &mut FxHashSet::default())
                    .ok_or_else(|| {
                        ErrorKind::UnresolvedTypeInfo {
                            name: element_name(transformer, id),
                        }
                        .at(&location)
                    })?;
                transformer
                    .type_infos
                    .fill(field, TypeInfo::new(Arity::ONE, Shape::Fundamental(info)));
                transformer.merges.remove(&field);
            }
        }

        if let Some(TypeInfo {
            shape: Shape::Class(class),
            ..
        }) = transformer.type_infos.get_mut(type_info)
        {
            if name != FUNDAMENTAL_PLACEHOLDER && class.fields.contains_key(&name) {
                return Err(ErrorKind::DuplicateName {
                    name: name.to_string(),
                }
                .at(&location));
            }
            class.fields = std::mem::take(&mut class.fields)
                .into_iter()
                .map(|(key, value)| {
                    if key == FUNDAMENTAL_PLACEHOLDER {
                        (name.clone(), value)
                    } else {
                        (key, value)
                    }
                })
                .collect();
        }

        trace!("[TRANSFORM] simple {} value field '{}'", id, name);
        if let ElementData::Simple {
            fundamental_attribute_name,
            ..
        } = &mut transformer.elements[id.index()].data
        {
            *fundamental_attribute_name = name;
        }
    }
    Ok(())
}

/// Inline nested variants and drop the build-time item back-pointers.
pub(super) fn flatten_variants(transformer: &mut Transformer<'_>, root: ElementId) {
    let order = walk_from(root, |id| transformer.elements[id.index()].edges());

    for &id in &order {
        if !matches!(transformer.elements[id.index()].data, ElementData::Variant { .. }) {
            continue;
        }
        let type_info = transformer.elements[id.index()].type_info;
        let mut seen = FxHashSet::default();
        seen.insert(type_info);
        let flattened = flatten(transformer, type_info, &mut seen);
        if let Some(TypeInfo {
            shape: Shape::AnyOf(alternatives),
            ..
        }) = transformer.type_infos.get_mut(type_info)
        {
            *alternatives = flattened;
        }
    }

    for element in &mut transformer.elements {
        element.source = None;
    }
}

fn flatten(
    transformer: &Transformer<'_>,
    id: TypeInfoId,
    seen: &mut FxHashSet<TypeInfoId>,
) -> Vec<TypeInfoId> {
    let Some(TypeInfo {
        shape: Shape::AnyOf(alternatives),
        ..
    }) = transformer.type_infos.get(id)
    else {
        return Vec::new();
    };

    let mut flat = Vec::with_capacity(alternatives.len());
    for &alternative in alternatives {
        match nested_any_of(transformer, alternative) {
            Some(inner) if seen.insert(inner) => flat.extend(flatten(transformer, inner, seen)),
            _ => flat.push(alternative),
        }
    }
    flat
}

/// The variant TypeInfo `id` stands for, through single-valued references.
fn nested_any_of(transformer: &Transformer<'_>, mut id: TypeInfoId) -> Option<TypeInfoId> {
    for _ in 0..=transformer.type_infos.len() {
        match transformer.type_infos.get(id)? {
            TypeInfo {
                shape: Shape::AnyOf(_),
                arity,
            } if arity.is_exactly_one() => return Some(id),
            TypeInfo {
                shape: Shape::Ref(target),
                arity,
            } if arity.is_exactly_one() => id = *target,
            _ => return None,
        }
    }
    None
}

fn element_name(transformer: &Transformer<'_>, id: ElementId) -> String {
    transformer.elements[id.index()]
        .name()
        .unwrap_or("<anonymous>")
        .to_string()
}
