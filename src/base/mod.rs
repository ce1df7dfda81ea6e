//! Foundation types for the sdl toolchain.
//!
//! This module provides fundamental types used throughout the compiler:
//! - [`SourceLocation`] - Source/line/column triple attached to every item and error
//! - [`normalize_multiline`] - Indentation stripping for front-end multi-line literals
//!
//! This module has NO dependencies on other sdl modules except [`crate::errors`].

mod location;
mod text;

pub use location::SourceLocation;
pub use text::normalize_multiline;
