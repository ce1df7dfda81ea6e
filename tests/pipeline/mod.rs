//! End-to-end pipeline tests
//!
//! Tests drive `compile` (Resolve → Validate → Transform) through the public
//! API:
//! - A realistic library schema and the graph it produces
//! - Error kinds, codes, and rendered messages
//! - Per-plugin runs, capability flags, extensions, and configuration
//! - Graph-level properties: recursion, squashing, idempotence

pub mod tests_errors;
pub mod tests_library;
pub mod tests_plugins;
pub mod tests_properties;

#[cfg(feature = "interchange")]
pub mod tests_interchange;
