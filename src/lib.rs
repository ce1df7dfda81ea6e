//! # sdl-base
//!
//! Semantic core of a schema definition language: name resolution, kind
//! classification, validation, and construction of an immutable element graph.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! pipeline  → compile(): Resolve → Validate → Transform for one plugin
//!   ↓
//! transform → Item tree → ElementGraph (deferred links, placeholder TypeInfo)
//!   ↓
//! validate  → Capability, scope, metadata, and shape checks
//!   ↓
//! resolve   → References, element kinds, arity, metadata, reference kinds
//!   ↓
//! element   → Output graph: Element, ElementData, ElementGraph
//!   ↓
//! types     → Fundamentals, attribute schemas, TypeInfo arena
//!   ↓
//! item      → Input tree: Item, ItemTree, Arity, Metadata
//!   ↓
//! base      → SourceLocation, multi-line text normalization
//! ```
//!
//! The front end populates an [`ItemTree`]; a [`Plugin`] describes which
//! element kinds and metadata a downstream generator accepts. Each pass mutates
//! the tree in place, so running for several plugins means cloning the
//! populated tree once per plugin.

// ============================================================================
// MODULES (dependency order: base → item → types → resolve → validate → transform)
// ============================================================================

/// Foundation types: SourceLocation, text normalization
pub mod base;

/// Errors: ErrorKind, ErrorCode, located Error
pub mod errors;

/// Input model: Items, the item tree, arity, metadata values
pub mod item;

/// Type layer: fundamentals, attribute schemas, TypeInfo
pub mod types;

/// Consumer contract: capability flags, extensions, plugin metadata
pub mod plugin;

/// Pipeline options and per-plugin attribute configuration
pub mod config;

/// Resolution passes over the item tree
pub mod resolve;

/// Structural and metadata validation
pub mod validate;

/// Output model: the immutable element graph
pub mod element;

/// Item tree → element graph
pub mod transform;

/// Driver for one full pipeline run
pub mod pipeline;

/// JSON dump of finished element graphs
#[cfg(feature = "interchange")]
pub mod interchange;

// Re-export the pipeline entry points
pub use pipeline::{Compiled, compile};
pub use resolve::resolve;
pub use transform::transform;
pub use validate::validate;

// Re-export commonly needed types
pub use base::SourceLocation;
pub use config::{Config, PipelineOptions};
pub use element::{Element, ElementData, ElementGraph, ElementId};
pub use errors::{Error, ErrorCode, ErrorKind, Result};
pub use item::{Arity, ElementKind, Item, ItemId, ItemKind, ItemTree, Value};
pub use plugin::{ExtensionInfo, Plugin, PluginFlags};
pub use types::{FundamentalType, Shape, TypeInfo, TypeInfoId};
