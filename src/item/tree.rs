//! Items: the mutable declaration tree every pass operates on.
//!
//! Items live in an [`ItemTree`] arena and refer to each other by [`ItemId`],
//! the stable identity key used by every later pass. Parents own their
//! children (by id); all other links (`references`, `referenced_by`) are
//! non-owning.

use std::fmt;
use std::ops::{Index, IndexMut};

use smol_str::SmolStr;

use super::arity::Arity;
use super::value::{Metadata, MetadataItem, Value};
use crate::base::SourceLocation;
use crate::types::schema::NAME;
use crate::types::{AttributeSchema, BuiltinType};

// ============================================================================
// IDENTIFIERS AND KINDS
// ============================================================================

/// Stable identity of an item within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u32);

impl ItemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an item was declared in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// `name [: bases] { children }`
    Object,
    /// `name target[arity]`, always exactly one reference.
    Declaration,
    /// `name(args...)`, consumed by plugins.
    Extension,
}

/// The role an item plays inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemKind {
    #[default]
    Standard,
    /// A scalar attribute of a simple or compound object.
    Attribute,
    /// Defines a type for reuse; not a field of its parent.
    Definition,
}

/// Semantic kind assigned by the element-kind classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Fundamental,
    Compound,
    Simple,
    Variant,
    Reference,
    List,
    Any,
    Custom,
    Extension,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Fundamental => "fundamental",
            ElementKind::Compound => "compound",
            ElementKind::Simple => "simple",
            ElementKind::Variant => "variant",
            ElementKind::Reference => "reference",
            ElementKind::List => "list",
            ElementKind::Any => "any",
            ElementKind::Custom => "custom",
            ElementKind::Extension => "extension",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// REFERENCES
// ============================================================================

/// A reference as written in source, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum RawReference {
    /// A possibly dotted name (`Outer.Inner`) or builtin keyword.
    Name {
        name: SmolStr,
        location: SourceLocation,
    },
    /// `(a | b | c)` where each alternative carries its own metadata.
    Variant(Vec<VariantAlternative>),
}

impl RawReference {
    pub fn name(name: impl Into<SmolStr>, location: SourceLocation) -> Self {
        RawReference::Name {
            name: name.into(),
            location,
        }
    }
}

/// One alternative of a raw variant reference.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantAlternative {
    pub name: SmolStr,
    pub metadata: Metadata,
    pub location: SourceLocation,
}

impl VariantAlternative {
    pub fn new(name: impl Into<SmolStr>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            metadata: Metadata::new(),
            location,
        }
    }

    pub fn with_metadata(mut self, name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        let item = MetadataItem::explicit(value, self.location.clone());
        self.metadata.insert(name, item);
        self
    }
}

/// A resolved reference target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Item(ItemId),
    Builtin(BuiltinType),
}

impl Target {
    pub fn as_item(&self) -> Option<ItemId> {
        match self {
            Target::Item(id) => Some(*id),
            Target::Builtin(_) => None,
        }
    }
}

/// Bookkeeping recorded when a declaration is classified as a reference.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceInfo {
    pub had_explicit_arity: bool,
    pub explicit_keys: Vec<SmolStr>,
}

// ============================================================================
// ITEM
// ============================================================================

/// A declaration node, mutated in place by every resolution pass.
#[derive(Debug, Clone)]
pub struct Item {
    pub(crate) id: ItemId,
    pub(crate) name: Option<SmolStr>,
    pub(crate) parent: Option<ItemId>,
    pub(crate) declaration_kind: DeclarationKind,
    pub(crate) item_kind: ItemKind,
    pub(crate) raw_references: Vec<RawReference>,
    pub(crate) references: Vec<Target>,
    pub(crate) alternatives: Vec<ItemId>,
    pub(crate) referenced_by: Vec<ItemId>,
    pub(crate) metadata: Metadata,
    pub(crate) arity: Option<Arity>,
    pub(crate) has_explicit_arity: bool,
    pub(crate) children: Vec<ItemId>,
    pub(crate) element_kind: Option<ElementKind>,
    pub(crate) reference_info: Option<ReferenceInfo>,
    pub(crate) is_augmenting_reference: bool,
    pub(crate) schema: AttributeSchema,
    pub(crate) arguments: Vec<Value>,
    pub(crate) ignore: bool,
    pub(crate) is_external: bool,
    pub(crate) is_synthetic_fundamental: bool,
    pub(crate) location: SourceLocation,
}

impl Item {
    fn new(name: Option<SmolStr>, declaration_kind: DeclarationKind) -> Self {
        Self {
            id: ItemId(0),
            name,
            parent: None,
            declaration_kind,
            item_kind: ItemKind::Standard,
            raw_references: Vec::new(),
            references: Vec::new(),
            alternatives: Vec::new(),
            referenced_by: Vec::new(),
            metadata: Metadata::new(),
            arity: None,
            has_explicit_arity: false,
            children: Vec::new(),
            element_kind: None,
            reference_info: None,
            is_augmenting_reference: false,
            schema: AttributeSchema::default(),
            arguments: Vec::new(),
            ignore: false,
            is_external: false,
            is_synthetic_fundamental: false,
            location: SourceLocation::builtin(),
        }
    }

    /// `name [: bases...] { ... }`
    pub fn object<S: Into<SmolStr>>(name: impl Into<Option<S>>) -> Self {
        Self::new(name.into().map(Into::into), DeclarationKind::Object)
    }

    /// `name target`
    pub fn declaration<S: Into<SmolStr>>(
        name: impl Into<Option<S>>,
        target: impl Into<SmolStr>,
    ) -> Self {
        let mut item = Self::new(name.into().map(Into::into), DeclarationKind::Declaration);
        item.raw_references
            .push(RawReference::name(target, SourceLocation::builtin()));
        item
    }

    /// An unnamed `target` declaration, such as a variant alternative or a
    /// synthetic fundamental child.
    pub fn anonymous_declaration(target: impl Into<SmolStr>) -> Self {
        let mut item = Self::new(None, DeclarationKind::Declaration);
        item.raw_references
            .push(RawReference::name(target, SourceLocation::builtin()));
        item
    }

    /// `name (a | b | ...)`
    pub fn variant<S: Into<SmolStr>>(
        name: impl Into<Option<S>>,
        alternatives: Vec<VariantAlternative>,
    ) -> Self {
        let mut item = Self::new(name.into().map(Into::into), DeclarationKind::Declaration);
        item.raw_references.push(RawReference::Variant(alternatives));
        item
    }

    /// `name(args...)`
    pub fn extension(name: impl Into<SmolStr>, arguments: Vec<Value>) -> Self {
        let mut item = Self::new(Some(name.into()), DeclarationKind::Extension);
        item.arguments = arguments;
        item
    }

    /// Add a base reference (objects only).
    pub fn with_base(mut self, name: impl Into<SmolStr>) -> Self {
        self.raw_references
            .push(RawReference::name(name, self.location.clone()));
        self
    }

    pub fn with_arity(mut self, arity: Arity) -> Self {
        self.arity = Some(arity);
        self.has_explicit_arity = true;
        self
    }

    pub fn with_metadata(mut self, name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        let item = MetadataItem::explicit(value, self.location.clone());
        self.metadata.insert(name, item);
        self
    }

    pub fn with_item_kind(mut self, item_kind: ItemKind) -> Self {
        self.item_kind = item_kind;
        self
    }

    /// Mark as declared through an include rather than the main source.
    pub fn external(mut self) -> Self {
        self.is_external = true;
        self
    }

    /// Set the source location of the item and its raw references.
    pub fn at(mut self, location: SourceLocation) -> Self {
        for reference in &mut self.raw_references {
            if let RawReference::Name { location: loc, .. } = reference {
                *loc = location.clone();
            }
        }
        for (_, item) in self.metadata.iter_mut() {
            item.location = location.clone();
        }
        self.location = location;
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The `name` metadata override if present, else the declared name.
    pub fn effective_name(&self) -> Option<SmolStr> {
        self.metadata
            .value(NAME)
            .and_then(Value::as_text)
            .map(SmolStr::new)
            .or_else(|| self.name.clone())
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub fn declaration_kind(&self) -> DeclarationKind {
        self.declaration_kind
    }

    pub fn item_kind(&self) -> ItemKind {
        self.item_kind
    }

    pub fn references(&self) -> &[Target] {
        &self.references
    }

    pub fn alternatives(&self) -> &[ItemId] {
        &self.alternatives
    }

    pub fn referenced_by(&self) -> &[ItemId] {
        &self.referenced_by
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn arity(&self) -> Option<Arity> {
        self.arity
    }

    pub fn has_explicit_arity(&self) -> bool {
        self.has_explicit_arity
    }

    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    pub fn element_kind(&self) -> Option<ElementKind> {
        self.element_kind
    }

    pub fn is_augmenting_reference(&self) -> bool {
        self.is_augmenting_reference
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore
    }

    pub fn is_external(&self) -> bool {
        self.is_external
    }

    pub fn is_synthetic_fundamental(&self) -> bool {
        self.is_synthetic_fundamental
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// The single reference of a declaration, once resolved.
    pub fn target(&self) -> Option<Target> {
        match self.references.as_slice() {
            [target] => Some(*target),
            _ => None,
        }
    }
}

// ============================================================================
// ITEM TREE
// ============================================================================

/// Arena owning every item reachable from one root.
///
/// Cloning the tree produces an independent copy, which is how a caller runs
/// the pipeline once per plugin.
#[derive(Debug, Clone)]
pub struct ItemTree {
    items: Vec<Item>,
    root: ItemId,
}

impl ItemTree {
    /// Create a tree with an unnamed root object for `source`.
    pub fn new(source: impl Into<std::sync::Arc<str>>) -> Self {
        let root = Item::new(None, DeclarationKind::Object).at(SourceLocation::new(source, 1, 1));
        Self {
            items: vec![root],
            root: ItemId(0),
        }
    }

    pub fn root(&self) -> ItemId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.index())
    }

    /// Append `item` as the last child of `parent`.
    pub fn push(&mut self, parent: ItemId, item: Item) -> ItemId {
        let id = self.alloc(parent, item);
        self.items[parent.index()].children.push(id);
        id
    }

    /// Insert `item` as a child of `parent` at `position`.
    pub(crate) fn insert_child(&mut self, parent: ItemId, position: usize, item: Item) -> ItemId {
        let id = self.alloc(parent, item);
        self.items[parent.index()].children.insert(position, id);
        id
    }

    /// Allocate `item` under `parent` without listing it as a child.
    pub(crate) fn alloc(&mut self, parent: ItemId, mut item: Item) -> ItemId {
        let id = ItemId(self.items.len() as u32);
        item.id = id;
        item.parent = Some(parent);
        self.items.push(item);
        id
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + use<> {
        (0..self.items.len() as u32).map(ItemId)
    }

    /// Find a direct child of `parent` by name.
    pub fn child_named(&self, parent: ItemId, name: &str) -> Option<ItemId> {
        self[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self[child].name() == Some(name))
    }

    /// Dotted path of names from the root, for messages.
    pub fn qualified_name(&self, id: ItemId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(item_id) = current {
            let item = &self[item_id];
            if item.parent.is_none() {
                break;
            }
            parts.push(item.name().unwrap_or("<anonymous>"));
            current = item.parent;
        }
        if parts.is_empty() {
            return "<root>".to_string();
        }
        parts.reverse();
        parts.join(".")
    }

    /// Items in pre-order from the root, including variant alternatives.
    pub fn walk(&self) -> Vec<ItemId> {
        let mut order = Vec::with_capacity(self.items.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            let item = &self[id];
            stack.extend(item.children.iter().rev());
            stack.extend(item.alternatives.iter().rev());
        }
        order
    }
}

impl Index<ItemId> for ItemTree {
    type Output = Item;

    fn index(&self, id: ItemId) -> &Item {
        &self.items[id.index()]
    }
}

impl IndexMut<ItemId> for ItemTree {
    fn index_mut(&mut self, id: ItemId) -> &mut Item {
        &mut self.items[id.index()]
    }
}
