//! Shared fixtures for pipeline tests.

pub mod graph_assertions;
pub mod plugin_fixtures;
pub mod tree_builders;
