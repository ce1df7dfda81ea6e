//! Elements: the immutable, semantically complete output graph.
//!
//! ## Key Types
//!
//! - [`ElementGraph`] - Arena of [`Element`]s plus the finished TypeInfo table
//! - [`Element`] - Common fields (name, parent, TypeInfo, metadata) and kind-specific [`ElementData`]
//! - [`ElementContext`] - What graph-context attribute checks get to see
//!
//! Owned edges (children, definitions, attributes, variations, extensions)
//! form a tree from the root. Bases, derived types, and reference targets are
//! non-owning cross links, so the graph as a whole may be cyclic.

use std::ops::Index;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::SourceLocation;
use crate::item::{ElementKind, ItemId, Value};
use crate::types::{
    FundamentalType, FundamentalTypeInfo, Shape, TypeInfo, TypeInfoArena, TypeInfoId,
    TypeInfoTable,
};

/// Identity of an element within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    /// Link target not yet wired.
    pub(crate) const DANGLING: ElementId = ElementId(u32::MAX);

    pub(crate) fn new(index: usize) -> Self {
        ElementId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn is_dangling(self) -> bool {
        self == Self::DANGLING
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// ============================================================================
// ELEMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) name: Option<SmolStr>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) type_info: TypeInfoId,
    pub(crate) metadata: IndexMap<SmolStr, Value>,
    pub(crate) attribute_names: Vec<SmolStr>,
    pub(crate) extensions: Vec<ElementId>,
    pub(crate) is_definition: bool,
    pub(crate) location: SourceLocation,
    pub(crate) data: ElementData,
    /// Back-pointer used while building; cleared before the graph is handed out.
    pub(crate) source: Option<ItemId>,
}

/// Kind-specific part of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementData {
    Fundamental {
        fundamental: FundamentalType,
    },
    Compound {
        children: Vec<ElementId>,
        definitions: Vec<ElementId>,
        bases: Vec<ElementId>,
        derived: Vec<ElementId>,
    },
    Simple {
        attributes: Vec<ElementId>,
        fundamental_attribute_name: SmolStr,
    },
    Variant {
        variations: Vec<ElementId>,
    },
    Reference {
        reference: ElementId,
    },
    List {
        reference: ElementId,
    },
    Any,
    Custom,
    Extension {
        arguments: Vec<Value>,
    },
}

impl ElementData {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementData::Fundamental { .. } => ElementKind::Fundamental,
            ElementData::Compound { .. } => ElementKind::Compound,
            ElementData::Simple { .. } => ElementKind::Simple,
            ElementData::Variant { .. } => ElementKind::Variant,
            ElementData::Reference { .. } => ElementKind::Reference,
            ElementData::List { .. } => ElementKind::List,
            ElementData::Any => ElementKind::Any,
            ElementData::Custom => ElementKind::Custom,
            ElementData::Extension { .. } => ElementKind::Extension,
        }
    }
}

impl Element {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn type_info(&self) -> TypeInfoId {
        self.type_info
    }

    pub fn metadata(&self) -> &IndexMap<SmolStr, Value> {
        &self.metadata
    }

    pub fn attribute_names(&self) -> &[SmolStr] {
        &self.attribute_names
    }

    pub fn extensions(&self) -> &[ElementId] {
        &self.extensions
    }

    /// Defines a reusable type rather than a field of its parent.
    pub fn is_definition(&self) -> bool {
        self.is_definition
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn data(&self) -> &ElementData {
        &self.data
    }

    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }

    /// Owned children, definitions, attributes, variations, and extensions.
    pub fn owned(&self) -> Vec<ElementId> {
        let mut owned = match &self.data {
            ElementData::Compound {
                children,
                definitions,
                ..
            } => children.iter().chain(definitions).copied().collect(),
            ElementData::Simple { attributes, .. } => attributes.clone(),
            ElementData::Variant { variations } => variations.clone(),
            _ => Vec::new(),
        };
        owned.extend(&self.extensions);
        owned
    }

    /// Every element this one points at, owned or not, excluding its parent.
    pub fn edges(&self) -> Vec<ElementId> {
        let mut edges = self.owned();
        match &self.data {
            ElementData::Compound { bases, derived, .. } => {
                edges.extend(bases);
                edges.extend(derived);
            }
            ElementData::Reference { reference } | ElementData::List { reference } => {
                edges.push(*reference);
            }
            _ => {}
        }
        edges
    }

    /// Links that must be wired before the graph is complete.
    pub(crate) fn links(&self) -> Vec<ElementId> {
        match &self.data {
            ElementData::Compound { bases, .. } => bases.clone(),
            ElementData::Variant { variations } => variations.clone(),
            ElementData::Reference { reference } | ElementData::List { reference } => {
                vec![*reference]
            }
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// GRAPH
// ============================================================================

/// The finished element graph together with the TypeInfo every element uses.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementGraph {
    pub(crate) elements: Vec<Element>,
    pub(crate) type_infos: TypeInfoTable,
}

impl ElementGraph {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (ElementId::new(index), element))
    }

    pub fn type_infos(&self) -> &TypeInfoTable {
        &self.type_infos
    }

    /// TypeInfo of `id`.
    pub fn type_info(&self, id: ElementId) -> &TypeInfo {
        &self.type_infos[self[id].type_info]
    }

    /// Direct child of a compound (or attribute of a simple) by name.
    pub fn child_named(&self, parent: ElementId, name: &str) -> Option<ElementId> {
        self[parent]
            .owned()
            .into_iter()
            .find(|&child| self[child].name() == Some(name))
    }

    /// Every element reachable from `start`, each visited once.
    pub fn walk(&self, start: ElementId) -> Vec<ElementId> {
        walk_from(start, |id| self[id].edges())
    }
}

impl Index<ElementId> for ElementGraph {
    type Output = Element;

    fn index(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }
}

/// Depth-first order from `start` over `edges`, guarded by a visited set.
pub(crate) fn walk_from(
    start: ElementId,
    edges: impl Fn(ElementId) -> Vec<ElementId>,
) -> Vec<ElementId> {
    let mut visited = FxHashSet::default();
    let mut order = Vec::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if id.is_dangling() || !visited.insert(id) {
            continue;
        }
        order.push(id);
        let mut next = edges(id);
        next.reverse();
        stack.extend(next);
    }
    order
}

// ============================================================================
// CHECK CONTEXT
// ============================================================================

/// What a graph-context attribute check can inspect.
pub struct ElementContext<'a> {
    pub element: &'a Element,
    pub type_infos: &'a TypeInfoArena,
    /// The fundamental type the element wraps, with resolved constraints.
    pub fundamental: Option<&'a FundamentalTypeInfo>,
}

impl ElementContext<'_> {
    /// Field names of the class the element's TypeInfo resolves to,
    /// including inherited ones; `None` when it is not a class.
    pub fn field_names(&self) -> Option<Vec<SmolStr>> {
        let start = self.type_infos.resolve(self.element.type_info);
        if !matches!(
            self.type_infos.get(start),
            Some(TypeInfo {
                shape: Shape::Class(_),
                ..
            })
        ) {
            return None;
        }

        let mut names = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let id = self.type_infos.resolve(id);
            if !seen.insert(id) {
                continue;
            }
            if let Some(TypeInfo {
                shape: Shape::Class(class),
                ..
            }) = self.type_infos.get(id)
            {
                names.extend(class.fields.keys().cloned());
                stack.extend(class.bases.iter().copied());
            }
        }
        Some(names)
    }
}
