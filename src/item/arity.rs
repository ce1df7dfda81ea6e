//! Repetition bounds for items and type information.

use std::fmt;

use crate::errors::ErrorKind;

/// A `(min, max)` repetition bound; `max == None` is unbounded.
///
/// Constructed through [`Arity::new`], which rejects a zero maximum and a
/// maximum below the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arity {
    min: u32,
    max: Option<u32>,
}

impl Arity {
    /// Exactly one (`[1,1]`).
    pub const ONE: Arity = Arity {
        min: 1,
        max: Some(1),
    };
    /// Zero or one (`?`).
    pub const OPTIONAL: Arity = Arity {
        min: 0,
        max: Some(1),
    };
    /// Zero or more (`*`).
    pub const ZERO_OR_MORE: Arity = Arity { min: 0, max: None };
    /// One or more (`+`).
    pub const ONE_OR_MORE: Arity = Arity { min: 1, max: None };

    pub fn new(min: u32, max: Option<u32>) -> Result<Self, ErrorKind> {
        let candidate = Self { min, max };
        match max {
            Some(0) => Err(ErrorKind::InvalidArity {
                arity: candidate.to_string(),
                reason: "the maximum must be greater than zero".to_string(),
            }),
            Some(max) if max < min => Err(ErrorKind::InvalidArity {
                arity: candidate.to_string(),
                reason: "the maximum must not be less than the minimum".to_string(),
            }),
            _ => Ok(candidate),
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> Option<u32> {
        self.max
    }

    pub fn is_exactly_one(&self) -> bool {
        *self == Self::ONE
    }

    /// Zero occurrences allowed.
    pub fn is_optional(&self) -> bool {
        self.min == 0
    }

    /// More than one occurrence allowed.
    pub fn is_collection(&self) -> bool {
        self.max.is_none_or(|max| max > 1)
    }

    /// At most one occurrence.
    pub fn is_single(&self) -> bool {
        self.max == Some(1)
    }
}

impl Default for Arity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (1, Some(1)) => Ok(()),
            (0, Some(1)) => f.write_str("?"),
            (0, None) => f.write_str("*"),
            (1, None) => f.write_str("+"),
            (min, None) => write!(f, "{{{},}}", min),
            (min, Some(max)) => write!(f, "{{{},{}}}", min, max),
        }
    }
}
