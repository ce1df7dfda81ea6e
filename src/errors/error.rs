//! Structured pipeline errors
//!
//! Each [`ErrorKind`] variant is a message template whose named fields are
//! substituted at construction; [`Error`] pairs it with the location of the
//! offending item.

use thiserror::Error;

use super::codes::ErrorCode;
use crate::base::SourceLocation;
use crate::item::ElementKind;

/// Result alias used by every fallible pipeline operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The kind of failure, with the fields substituted into its message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    #[error("The reference '{name}' could not be resolved")]
    UnresolvedReference { name: String },

    #[error("The reference chain starting at '{name}' is circular")]
    CircularReference { name: String },

    #[error("The name '{name}' is reserved for a builtin type")]
    ReservedName { name: String },

    #[error("The arity '{arity}' is invalid: {reason}")]
    InvalidArity { arity: String, reason: String },

    #[error("The name '{name}' has already been defined in this scope")]
    DuplicateName { name: String },

    #[error("'{name}' references more than one fundamental type")]
    MultipleFundamentalReferences { name: String },

    #[error("'{name}' is a simple object with more than one simple source")]
    MultipleSimpleSources { name: String },

    #[error("'{name}' is a simple object and cannot be based on '{base}'")]
    InvalidSimpleBase { name: String, base: String },

    #[error("The attribute '{name}' is invalid: {reason}")]
    InvalidAttributeItem { name: String, reason: String },

    #[error("'{name}' is a {kind} element, which is not supported by the '{plugin}' plugin")]
    UnsupportedElementKind {
        name: String,
        kind: ElementKind,
        plugin: String,
    },

    #[error("The variant alternative '{name}' must have an arity of exactly one (found '{arity}')")]
    InvalidVariantArity { name: String, arity: String },

    #[error("The required attribute '{attribute}' is missing on '{name}'")]
    MissingRequiredAttribute { name: String, attribute: String },

    #[error("The attribute '{attribute}' is not supported on '{name}'")]
    UnsupportedAttribute { name: String, attribute: String },

    #[error("The value for the attribute '{attribute}' is invalid: {reason}")]
    InvalidAttributeValue { attribute: String, reason: String },

    #[error("The extension '{name}' is not supported")]
    InvalidExtension { name: String },

    #[error("The extension '{name}' may only appear once in a scope")]
    DuplicateExtension { name: String },

    #[error("'{name}' references the extension '{extension}'")]
    ReferenceToExtension { name: String, extension: String },

    #[error("The multi-line string is not properly indented on line {line}")]
    InvalidMultilineString { line: u32 },

    #[error("The type information for '{name}' was never resolved")]
    UnresolvedTypeInfo { name: String },

    #[error("The element link from '{name}' was never resolved")]
    UnresolvedElementLink { name: String },

    #[error("The configuration is invalid: {reason}")]
    InvalidConfig { reason: String },
}

impl ErrorKind {
    /// Attach a location, producing a reportable [`Error`].
    pub fn at(self, location: &SourceLocation) -> Error {
        Error::new(self, location.clone())
    }

    /// Stable diagnostic code for this kind.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnresolvedReference { .. } => ErrorCode::E0101,
            Self::ReservedName { .. } => ErrorCode::E0102,
            Self::DuplicateName { .. } => ErrorCode::E0103,
            Self::CircularReference { .. } => ErrorCode::E0104,
            Self::InvalidArity { .. } => ErrorCode::E0201,
            Self::MultipleFundamentalReferences { .. } => ErrorCode::E0202,
            Self::UnsupportedElementKind { .. } => ErrorCode::E0203,
            Self::InvalidVariantArity { .. } => ErrorCode::E0204,
            Self::MissingRequiredAttribute { .. } => ErrorCode::E0301,
            Self::UnsupportedAttribute { .. } => ErrorCode::E0302,
            Self::InvalidAttributeValue { .. } => ErrorCode::E0303,
            Self::MultipleSimpleSources { .. } => ErrorCode::E0401,
            Self::InvalidSimpleBase { .. } => ErrorCode::E0402,
            Self::InvalidAttributeItem { .. } => ErrorCode::E0403,
            Self::InvalidExtension { .. } => ErrorCode::E0404,
            Self::DuplicateExtension { .. } => ErrorCode::E0405,
            Self::ReferenceToExtension { .. } => ErrorCode::E0406,
            Self::UnresolvedTypeInfo { .. } => ErrorCode::E0501,
            Self::UnresolvedElementLink { .. } => ErrorCode::E0502,
            Self::InvalidMultilineString { .. } => ErrorCode::E0901,
            Self::InvalidConfig { .. } => ErrorCode::E0902,
        }
    }
}

/// A pipeline error: what went wrong and where.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} ({location})")]
pub struct Error {
    pub kind: ErrorKind,
    pub location: SourceLocation,
}

impl Error {
    pub fn new(kind: ErrorKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    /// Source name, line, and column of the failure.
    pub fn position(&self) -> (&str, u32, u32) {
        (&self.location.source, self.location.line, self.location.column)
    }
}
