//! Error code definitions for pipeline diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Reference/name resolution errors
//! - E02xx: Arity and classification errors
//! - E03xx: Metadata errors
//! - E04xx: Structural validation errors
//! - E05xx: Transform errors
//! - E09xx: Front-end and configuration errors

use std::fmt;

/// Error codes for pipeline diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Reference/name resolution errors
    // =========================================================================
    /// Reference did not match any visible item
    E0101,
    /// Declaration uses a builtin type name
    E0102,
    /// Duplicate name within a scope
    E0103,
    /// Reference chain that loops back on itself
    E0104,

    // =========================================================================
    // E02xx: Arity and classification errors
    // =========================================================================
    /// Non-positive or inverted arity bounds
    E0201,
    /// More than one raw fundamental reference on an object
    E0202,
    /// Element kind not enabled by the active plugin
    E0203,
    /// Variant alternative without exactly-one arity
    E0204,

    // =========================================================================
    // E03xx: Metadata errors
    // =========================================================================
    /// Required attribute missing
    E0301,
    /// Attribute not recognized for the item
    E0302,
    /// Attribute value failed deserialization or validation
    E0303,

    // =========================================================================
    // E04xx: Structural validation errors
    // =========================================================================
    /// More than one simple source on a simple object
    E0401,
    /// Simple object based on a non-simple item
    E0402,
    /// Attribute item that does not resolve to a single fundamental
    E0403,
    /// Extension name not declared by the plugin
    E0404,
    /// Extension repeated where duplicates are not allowed
    E0405,
    /// Reference chain terminating at an extension
    E0406,

    // =========================================================================
    // E05xx: Transform errors
    // =========================================================================
    /// Type info still a placeholder after transform
    E0501,
    /// Element link never resolved
    E0502,

    // =========================================================================
    // E09xx: Front-end and configuration errors
    // =========================================================================
    /// Malformed multi-line string indentation
    E0901,
    /// Configuration could not be loaded
    E0902,
}

impl ErrorCode {
    /// Get the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0104 => "E0104",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0303 => "E0303",
            Self::E0401 => "E0401",
            Self::E0402 => "E0402",
            Self::E0403 => "E0403",
            Self::E0404 => "E0404",
            Self::E0405 => "E0405",
            Self::E0406 => "E0406",
            Self::E0501 => "E0501",
            Self::E0502 => "E0502",
            Self::E0901 => "E0901",
            Self::E0902 => "E0902",
        }
    }

    /// Whether the error category can be downgraded by a leniency flag.
    pub fn is_filterable(&self) -> bool {
        matches!(self, Self::E0302 | Self::E0404)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
