//! Pipeline driver: Resolve → Validate → Transform for one plugin.
//!
//! Every pass mutates the tree in place, so running the pipeline for another
//! plugin needs a fresh clone of the populated tree.

use tracing::debug;

use crate::config::PipelineOptions;
use crate::element::{Element, ElementGraph, ElementId};
use crate::errors::Result;
use crate::item::ItemTree;
use crate::plugin::Plugin;

/// The finished output of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub graph: ElementGraph,
    pub root: ElementId,
    /// Root children a generator should emit: not external, not definitions,
    /// not ignored.
    pub included: Vec<ElementId>,
}

impl Compiled {
    pub fn root_element(&self) -> &Element {
        &self.graph[self.root]
    }

    pub fn included_elements(&self) -> impl Iterator<Item = &Element> {
        self.included.iter().map(|&id| &self.graph[id])
    }

    /// Included root child by element name.
    pub fn included_named(&self, name: &str) -> Option<ElementId> {
        self.included
            .iter()
            .copied()
            .find(|&id| self.graph[id].name() == Some(name))
    }
}

/// Run every pass over `tree` for `plugin`.
pub fn compile(
    tree: &mut ItemTree,
    plugin: &dyn Plugin,
    options: &PipelineOptions,
) -> Result<Compiled> {
    crate::resolve(tree, plugin, options)?;
    crate::validate(tree, plugin, options)?;
    let compiled = crate::transform(tree, plugin)?;
    debug!(
        plugin = plugin.name(),
        elements = compiled.graph.len(),
        included = compiled.included.len(),
        "[PIPELINE] compiled"
    );
    Ok(compiled)
}
