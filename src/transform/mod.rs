//! Transform phase: build the element graph from a validated item tree.
//!
//! Each item produces at most one element. The transformer keeps a map from
//! [`ItemId`] to the element being built or already finished, and pre-registers
//! an item before building it so cycles terminate. Owned children are built
//! recursively; cross links (bases, reference targets, replaced variations)
//! are wired immediately when the target is finished and otherwise deferred
//! to a FIFO queue of closures that capture only ids.
//!
//! TypeInfo slots are reserved per item on first use and filled once the
//! item's shape is known, so a recursive type embeds its own TypeInfo id.
//!
//! After the queue drains, three passes run over the graph (see [`post`]).

mod post;

use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::base::SourceLocation;
use crate::element::{Element, ElementData, ElementGraph, ElementId};
use crate::errors::{ErrorKind, Result};
use crate::item::{
    Arity, DeclarationKind, ElementKind, Item, ItemId, ItemKind, ItemTree, Provenance, Target,
    Value,
};
use crate::pipeline::Compiled;
use crate::plugin::{Plugin, PluginFlags};
use crate::resolve::{
    ChainEnd, fundamental_of, reference_terminal, simple_sources, synthetic_child,
};
use crate::types::{
    BuiltinType, ClassTypeInfo, FundamentalType, FundamentalTypeInfo, Shape, TypeInfo,
    TypeInfoArena, TypeInfoId,
};

/// Field key of a simple object's fundamental value until its name is known.
const FUNDAMENTAL_PLACEHOLDER: &str = "<fundamental>";

/// Build the element graph for a resolved and validated `tree`.
///
/// The tree is only read, so transforming the same tree twice yields two
/// equal graphs.
pub fn transform(tree: &ItemTree, plugin: &dyn Plugin) -> Result<Compiled> {
    debug!(plugin = plugin.name(), items = tree.len(), "[TRANSFORM] starting");

    let preserve_references = plugin.flags().contains(PluginFlags::PRESERVE_REFERENCES);
    let mut transformer = Transformer::new(tree, preserve_references);

    let root = transformer.element_for(tree.root(), None)?;
    let drained = transformer.drain()?;
    let included = transformer.included(root);

    post::apply_metadata(&mut transformer, root)?;
    post::merge_simple(&mut transformer, root)?;
    post::flatten_variants(&mut transformer, root);

    let graph = transformer.finish()?;
    debug!(
        elements = graph.len(),
        type_infos = graph.type_infos().len(),
        drained,
        "[TRANSFORM] done"
    );
    Ok(Compiled {
        graph,
        root,
        included,
    })
}

type Deferred<'a> = Box<dyn FnOnce(&mut Transformer<'a>) -> Result<()> + 'a>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    InProgress(ElementId),
    Done(ElementId),
}

/// Which link of an element a deferred closure fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkSlot {
    Base(usize),
    Variation(usize),
    Reference,
}

/// A simple object's fundamental value that narrows its source's constraints.
#[derive(Debug, Clone)]
struct PendingMerge {
    source: TypeInfoId,
    overlay: IndexMap<SmolStr, Value>,
}

pub(crate) struct Transformer<'a> {
    tree: &'a ItemTree,
    preserve_references: bool,
    elements: Vec<Element>,
    slots: FxHashMap<ItemId, Slot>,
    type_infos: TypeInfoArena,
    type_info_of: FxHashMap<ItemId, TypeInfoId>,
    /// TypeInfo of each simple object's fundamental value.
    simple_fields: FxHashMap<ItemId, TypeInfoId>,
    merges: FxHashMap<TypeInfoId, PendingMerge>,
    queue: VecDeque<Deferred<'a>>,
}

impl<'a> Transformer<'a> {
    fn new(tree: &'a ItemTree, preserve_references: bool) -> Self {
        Self {
            tree,
            preserve_references,
            elements: Vec::new(),
            slots: FxHashMap::default(),
            type_infos: TypeInfoArena::new(),
            type_info_of: FxHashMap::default(),
            simple_fields: FxHashMap::default(),
            merges: FxHashMap::default(),
            queue: VecDeque::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------------

    /// The element for `item`, building it on first request.
    ///
    /// `parent` is the owning element when called from the owner; the parent
    /// link of an element built early through a cross link is set once its
    /// owner asks for it.
    fn element_for(&mut self, item: ItemId, parent: Option<ElementId>) -> Result<ElementId> {
        if let Some(Slot::InProgress(id) | Slot::Done(id)) = self.slots.get(&item).copied() {
            if parent.is_some() {
                self.elements[id.index()].parent = parent;
            }
            return Ok(id);
        }

        let id = ElementId::new(self.elements.len());
        self.slots.insert(item, Slot::InProgress(id));
        let type_info = self.type_info_for(item);

        let source = &self.tree[item];
        self.elements.push(Element {
            name: source.effective_name(),
            parent,
            type_info,
            metadata: IndexMap::new(),
            attribute_names: Vec::new(),
            extensions: Vec::new(),
            is_definition: source.item_kind == ItemKind::Definition,
            location: source.location.clone(),
            data: ElementData::Any,
            source: Some(item),
        });

        self.build(item, id, type_info)?;
        self.slots.insert(item, Slot::Done(id));
        trace!(
            "[TRANSFORM] {} -> {} ({})",
            self.tree.qualified_name(item),
            id,
            self.elements[id.index()].kind()
        );
        Ok(id)
    }

    fn build(&mut self, item: ItemId, id: ElementId, type_info: TypeInfoId) -> Result<()> {
        let tree = self.tree;
        let source = &tree[item];
        let arity = source.arity.unwrap_or(Arity::ONE);
        let Some(kind) = source.element_kind else {
            return Err(unresolved(tree, item));
        };

        match kind {
            ElementKind::Fundamental => {
                let ty = fundamental_type(source).ok_or_else(|| unresolved(tree, item))?;
                let info = FundamentalTypeInfo {
                    ty,
                    constraints: constraints(source, ty),
                };
                self.type_infos
                    .fill(type_info, TypeInfo::new(arity, Shape::Fundamental(info)));
                self.set_data(id, ElementData::Fundamental { fundamental: ty });
            }
            ElementKind::Compound => self.build_compound(item, id, type_info, arity)?,
            ElementKind::Simple => self.build_simple(item, id, type_info, arity)?,
            ElementKind::Variant => self.build_variant(item, id, type_info, arity)?,
            ElementKind::Reference => self.build_reference(item, id, type_info, arity)?,
            ElementKind::List => {
                let target = item_target(tree, item)?;
                let target_info = self.type_info_for(self.replacement(target));
                self.type_infos
                    .fill(type_info, TypeInfo::new(arity, Shape::Ref(target_info)));
                self.set_data(
                    id,
                    ElementData::List {
                        reference: ElementId::DANGLING,
                    },
                );
                self.link(id, LinkSlot::Reference, target);
            }
            ElementKind::Any => {
                self.type_infos.fill(type_info, TypeInfo::new(arity, Shape::Any));
                self.set_data(id, ElementData::Any);
            }
            ElementKind::Custom => {
                self.type_infos
                    .fill(type_info, TypeInfo::new(arity, Shape::Custom));
                self.set_data(id, ElementData::Custom);
            }
            ElementKind::Extension => {
                self.type_infos
                    .fill(type_info, TypeInfo::new(Arity::ONE, Shape::Extension));
                self.set_data(
                    id,
                    ElementData::Extension {
                        arguments: source.arguments.clone(),
                    },
                );
            }
        }
        Ok(())
    }

    fn build_compound(
        &mut self,
        item: ItemId,
        id: ElementId,
        type_info: TypeInfoId,
        arity: Arity,
    ) -> Result<()> {
        let tree = self.tree;
        let source = &tree[item];
        let mut class = ClassTypeInfo::default();
        let mut children = Vec::new();
        let mut definitions = Vec::new();

        for &child in &source.children {
            let child_item = &tree[child];
            if child_item.ignore {
                continue;
            }
            let element = self.element_for(child, Some(id))?;
            if child_item.declaration_kind == DeclarationKind::Extension {
                self.elements[id.index()].extensions.push(element);
                continue;
            }
            if child_item.item_kind == ItemKind::Definition {
                definitions.push(element);
                continue;
            }
            children.push(element);
            if let Some(name) = child_item.effective_name() {
                class.fields.insert(name.clone(), self.type_info_for(child));
                if child_item.item_kind == ItemKind::Attribute {
                    self.elements[id.index()].attribute_names.push(name);
                }
            }
        }

        let bases: Vec<ItemId> = source.references.iter().filter_map(Target::as_item).collect();
        for &base in &bases {
            class.bases.push(self.type_info_for(base));
        }
        self.type_infos
            .fill(type_info, TypeInfo::new(arity, Shape::Class(class)));
        self.set_data(
            id,
            ElementData::Compound {
                children,
                definitions,
                bases: vec![ElementId::DANGLING; bases.len()],
                derived: Vec::new(),
            },
        );
        for (index, base) in bases.into_iter().enumerate() {
            self.link(id, LinkSlot::Base(index), base);
        }
        Ok(())
    }

    fn build_simple(
        &mut self,
        item: ItemId,
        id: ElementId,
        type_info: TypeInfoId,
        arity: Arity,
    ) -> Result<()> {
        let tree = self.tree;
        let source = &tree[item];
        let mut class = ClassTypeInfo::default();

        let field = self.simple_field(item);
        class
            .fields
            .insert(SmolStr::new(FUNDAMENTAL_PLACEHOLDER), field);

        let synthetic = synthetic_child(tree, item);
        match synthetic {
            Some(child) => {
                let child_item = &tree[child];
                let ty = fundamental_type(child_item).ok_or_else(|| unresolved(tree, child))?;
                let info = FundamentalTypeInfo {
                    ty,
                    constraints: constraints(child_item, ty),
                };
                self.type_infos
                    .fill(field, TypeInfo::new(Arity::ONE, Shape::Fundamental(info)));
            }
            None => {
                let base = simple_sources(tree, item)
                    .into_iter()
                    .next()
                    .ok_or_else(|| unresolved(tree, item))?;
                let base_field = self.fundamental_type_info(base);
                let overlay = fundamental_of(tree, item)
                    .map(|ty| explicit_constraints(source, ty))
                    .unwrap_or_default();
                if overlay.is_empty() {
                    self.type_infos
                        .fill(field, TypeInfo::new(Arity::ONE, Shape::Ref(base_field)));
                } else {
                    self.merges.insert(
                        field,
                        PendingMerge {
                            source: base_field,
                            overlay,
                        },
                    );
                }
                self.ensure(base);
            }
        }

        let mut attributes = Vec::new();
        for &child in &source.children {
            let child_item = &tree[child];
            if child_item.ignore || Some(child) == synthetic {
                continue;
            }
            let element = self.element_for(child, Some(id))?;
            if child_item.declaration_kind == DeclarationKind::Extension {
                self.elements[id.index()].extensions.push(element);
                continue;
            }
            attributes.push(element);
            if let Some(name) = child_item.effective_name() {
                class.fields.insert(name.clone(), self.type_info_for(child));
                self.elements[id.index()].attribute_names.push(name);
            }
        }

        self.type_infos
            .fill(type_info, TypeInfo::new(arity, Shape::Class(class)));
        self.set_data(
            id,
            ElementData::Simple {
                attributes,
                fundamental_attribute_name: SmolStr::new(FUNDAMENTAL_PLACEHOLDER),
            },
        );
        Ok(())
    }

    fn build_variant(
        &mut self,
        item: ItemId,
        id: ElementId,
        type_info: TypeInfoId,
        arity: Arity,
    ) -> Result<()> {
        let alternatives = self.tree[item].alternatives.clone();
        let mut infos = Vec::with_capacity(alternatives.len());
        let mut variations = Vec::with_capacity(alternatives.len());
        let mut replaced = Vec::new();

        for (index, &alternative) in alternatives.iter().enumerate() {
            let target = self.replacement(alternative);
            infos.push(self.type_info_for(target));
            if target == alternative {
                variations.push(self.element_for(alternative, Some(id))?);
            } else {
                variations.push(ElementId::DANGLING);
                replaced.push((index, alternative));
            }
        }

        self.type_infos
            .fill(type_info, TypeInfo::new(arity, Shape::AnyOf(infos)));
        self.set_data(id, ElementData::Variant { variations });
        for (index, alternative) in replaced {
            self.link(id, LinkSlot::Variation(index), alternative);
        }
        Ok(())
    }

    fn build_reference(
        &mut self,
        item: ItemId,
        id: ElementId,
        type_info: TypeInfoId,
        arity: Arity,
    ) -> Result<()> {
        let tree = self.tree;
        let source = &tree[item];
        let target = item_target(tree, item)?;

        let terminal_fundamental = match reference_terminal(tree, item)? {
            ChainEnd::Item(end) if tree[end].element_kind == Some(ElementKind::Fundamental) => {
                fundamental_type(&tree[end])
            }
            _ => None,
        };
        let info = match terminal_fundamental {
            Some(ty) if source.is_augmenting_reference => {
                let info = FundamentalTypeInfo {
                    ty,
                    constraints: constraints(source, ty),
                };
                TypeInfo::new(arity, Shape::Fundamental(info))
            }
            _ => {
                let target_info = self.type_info_for(self.replacement(target));
                TypeInfo::new(arity, Shape::Ref(target_info))
            }
        };
        self.type_infos.fill(type_info, info);
        self.set_data(
            id,
            ElementData::Reference {
                reference: ElementId::DANGLING,
            },
        );
        self.link(id, LinkSlot::Reference, target);
        Ok(())
    }

    fn set_data(&mut self, id: ElementId, data: ElementData) {
        self.elements[id.index()].data = data;
    }

    // ------------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------------

    /// First item along `item`'s chain that is not a pure reference.
    fn replacement(&self, item: ItemId) -> ItemId {
        if self.preserve_references {
            return item;
        }
        let mut seen = FxHashSet::default();
        let mut current = item;
        loop {
            let candidate = &self.tree[current];
            let pure = candidate.element_kind == Some(ElementKind::Reference)
                && !candidate.is_augmenting_reference;
            if !pure || !seen.insert(current) {
                return current;
            }
            match candidate.target() {
                Some(Target::Item(next)) => current = next,
                _ => return current,
            }
        }
    }

    /// Point `slot` of `owner` at the element for `target`, now or once built.
    fn link(&mut self, owner: ElementId, slot: LinkSlot, target: ItemId) {
        let target = self.replacement(target);
        if let Some(Slot::Done(element)) = self.slots.get(&target).copied() {
            self.wire(owner, slot, element);
            return;
        }
        trace!("[TRANSFORM] deferring {:?} of {} to {}", slot, owner, target);
        self.queue.push_back(Box::new(move |transformer: &mut Transformer<'a>| {
            let element = transformer.element_for(target, None)?;
            transformer.wire(owner, slot, element);
            Ok(())
        }));
    }

    /// Make sure `item` gets an element even if nothing links to it.
    fn ensure(&mut self, item: ItemId) {
        if self.slots.contains_key(&item) {
            return;
        }
        self.queue.push_back(Box::new(move |transformer: &mut Transformer<'a>| {
            transformer.element_for(item, None).map(|_| ())
        }));
    }

    fn wire(&mut self, owner: ElementId, slot: LinkSlot, element: ElementId) {
        match (slot, &mut self.elements[owner.index()].data) {
            (LinkSlot::Base(index), ElementData::Compound { bases, .. }) => bases[index] = element,
            (LinkSlot::Variation(index), ElementData::Variant { variations }) => {
                variations[index] = element
            }
            (
                LinkSlot::Reference,
                ElementData::Reference { reference } | ElementData::List { reference },
            ) => *reference = element,
            _ => return,
        }
        if let LinkSlot::Base(_) = slot {
            if let ElementData::Compound { derived, .. } = &mut self.elements[element.index()].data
            {
                derived.push(owner);
            }
        }
    }

    fn drain(&mut self) -> Result<usize> {
        let mut drained = 0;
        while let Some(job) = self.queue.pop_front() {
            job(self)?;
            drained += 1;
        }
        Ok(drained)
    }

    // ------------------------------------------------------------------------
    // TypeInfo
    // ------------------------------------------------------------------------

    /// TypeInfo id of `item`, reserved on first request.
    fn type_info_for(&mut self, item: ItemId) -> TypeInfoId {
        if let Some(&id) = self.type_info_of.get(&item) {
            return id;
        }
        let id = self.type_infos.reserve();
        self.type_info_of.insert(item, id);
        id
    }

    fn simple_field(&mut self, item: ItemId) -> TypeInfoId {
        if let Some(&id) = self.simple_fields.get(&item) {
            return id;
        }
        let id = self.type_infos.reserve();
        self.simple_fields.insert(item, id);
        id
    }

    /// TypeInfo carrying the fundamental value of `item`.
    fn fundamental_type_info(&mut self, item: ItemId) -> TypeInfoId {
        if self.tree[item].element_kind == Some(ElementKind::Simple) {
            self.simple_field(item)
        } else {
            self.type_info_for(item)
        }
    }

    /// Resolved fundamental TypeInfo at `id`, completing pending merges.
    fn fundamental_at(
        &self,
        id: TypeInfoId,
        seen: &mut FxHashSet<TypeInfoId>,
    ) -> Option<FundamentalTypeInfo> {
        let resolved = self.type_infos.resolve(id);
        if let Some(merge) = self.merges.get(&resolved) {
            if !seen.insert(resolved) {
                return None;
            }
            let mut info = self.fundamental_at(merge.source, seen)?;
            for (key, value) in &merge.overlay {
                info.constraints.insert(key.clone(), value.clone());
            }
            return Some(info);
        }
        match self.type_infos.get(resolved) {
            Some(TypeInfo {
                shape: Shape::Fundamental(info),
                ..
            }) => Some(info.clone()),
            _ => None,
        }
    }

    /// The fundamental type `element` wraps, if any.
    fn fundamental_view(&self, element: ElementId) -> Option<FundamentalTypeInfo> {
        let element = &self.elements[element.index()];
        let id = match element.data {
            ElementData::Simple { .. } => *self.simple_fields.get(&element.source?)?,
            _ => element.type_info,
        };
        self.fundamental_at(id, &mut FxHashSet::default())
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// Root children a generator should emit.
    fn included(&self, root: ElementId) -> Vec<ElementId> {
        let ElementData::Compound { children, .. } = &self.elements[root.index()].data else {
            return Vec::new();
        };
        children
            .iter()
            .copied()
            .filter(|child| {
                self.elements[child.index()]
                    .source
                    .is_some_and(|item| !self.tree[item].is_external)
            })
            .collect()
    }

    fn finish(self) -> Result<ElementGraph> {
        let elements = self.elements;
        for element in &elements {
            if element.links().iter().any(|link| link.is_dangling()) {
                return Err(ErrorKind::UnresolvedElementLink {
                    name: element.name().unwrap_or("<anonymous>").to_string(),
                }
                .at(&element.location));
            }
        }

        let type_infos = match self.type_infos.finish() {
            Ok(table) => table,
            Err(pending) => {
                let owner = elements.iter().find(|element| element.type_info == pending);
                let name = owner
                    .and_then(Element::name)
                    .map_or_else(|| pending.to_string(), str::to_string);
                let location = owner
                    .map_or_else(SourceLocation::builtin, |element| element.location.clone());
                return Err(ErrorKind::UnresolvedTypeInfo { name }.at(&location));
            }
        };
        Ok(ElementGraph {
            elements,
            type_infos,
        })
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn fundamental_type(item: &Item) -> Option<FundamentalType> {
    match item.target()? {
        Target::Builtin(BuiltinType::Fundamental(ty)) => Some(ty),
        _ => None,
    }
}

fn item_target(tree: &ItemTree, item: ItemId) -> Result<ItemId> {
    tree[item]
        .target()
        .and_then(|target| target.as_item())
        .ok_or_else(|| unresolved(tree, item))
}

/// Constraint values of `item` that belong to `ty`.
fn constraints(item: &Item, ty: FundamentalType) -> IndexMap<SmolStr, Value> {
    let names: Vec<SmolStr> = ty.attributes().into_iter().map(|a| a.name).collect();
    item.metadata
        .iter()
        .filter(|(key, _)| names.contains(key))
        .map(|(key, entry)| (key.clone(), entry.value.clone()))
        .collect()
}

/// Constraint values written on `item` itself.
fn explicit_constraints(item: &Item, ty: FundamentalType) -> IndexMap<SmolStr, Value> {
    let names: Vec<SmolStr> = ty.attributes().into_iter().map(|a| a.name).collect();
    item.metadata
        .iter()
        .filter(|(key, entry)| entry.provenance == Provenance::Explicit && names.contains(key))
        .map(|(key, entry)| (key.clone(), entry.value.clone()))
        .collect()
}

fn unresolved(tree: &ItemTree, item: ItemId) -> crate::errors::Error {
    ErrorKind::UnresolvedTypeInfo {
        name: tree.qualified_name(item),
    }
    .at(&tree[item].location)
}
