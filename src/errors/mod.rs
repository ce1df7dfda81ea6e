//! Error handling for the resolution pipeline.
//!
//! Every failure in Resolve, Validate, or Transform is fail-fast and carries:
//! - A categorized [`ErrorKind`] with the named fields of its message template
//! - The [`SourceLocation`](crate::base::SourceLocation) of the offending item
//! - A stable [`ErrorCode`] for filtering and documentation
//!
//! Errors render as `"<message> (<source> [<line> <column>])"`.

mod codes;
mod error;

pub use codes::ErrorCode;
pub use error::{Error, ErrorKind, Result};
