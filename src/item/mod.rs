//! Item model: the mutable intermediate tree produced by the parser.
//!
//! ## Key Types
//!
//! - [`ItemTree`] - Arena owning every item; [`ItemId`] is the stable identity key
//! - [`Item`] - One declaration: kinds, references, metadata, arity, children
//! - [`Arity`] - `(min, max)` repetition bound
//! - [`Metadata`] / [`Value`] - Ordered attribute values with provenance

mod arity;
mod tree;
mod value;

pub use arity::Arity;
pub use tree::{
    DeclarationKind, ElementKind, Item, ItemId, ItemKind, ItemTree, RawReference, ReferenceInfo,
    Target, VariantAlternative,
};
pub use value::{Metadata, MetadataItem, Provenance, Value};
