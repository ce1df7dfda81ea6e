/// Source location tracking for items, elements, and errors.
///
/// Lines and columns are 1-indexed, matching what the front end reports.
use std::fmt;
use std::sync::Arc;

/// Name used for locations that do not come from a source file.
const BUILTIN_SOURCE: &str = "<builtin>";

/// A position in a source file (1-indexed).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub source: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(source: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            source: source.into(),
            line,
            column,
        }
    }

    /// Location used for synthesized or builtin constructs.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_SOURCE, 0, 0)
    }

    pub fn is_builtin(&self) -> bool {
        &*self.source == BUILTIN_SOURCE
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} {}]", self.source, self.line, self.column)
    }
}
