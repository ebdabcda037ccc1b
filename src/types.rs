//! Type-safe wrappers for MDD variables.
//!
//! A [`Var`] is the position of a variable in the ordering of one manager,
//! while an [`MddVariable`] describes the variable itself (its key and the
//! number of values it can take).
use std::fmt;

/// A variable position in the ordering of a manager (0-indexed).
///
/// Variables with a smaller position are closer to the root.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Creates a new variable with the given position.
    pub fn new(id: u32) -> Self {
        Var(id)
    }

    /// Returns the raw position as a `u32`.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Returns the raw position as a `usize`, suitable for indexing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

impl From<usize> for Var {
    fn from(index: usize) -> Self {
        Var(index as u32)
    }
}

/// Description of a decision variable: a unique key and its number of values.
///
/// # Invariants
///
/// - `nbval >= 2`; a variable with `nbval == 2` is Boolean.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MddVariable {
    pub key: String,
    pub nbval: u8,
}

impl MddVariable {
    pub fn new(key: impl Into<String>, nbval: u8) -> Self {
        Self {
            key: key.into(),
            nbval,
        }
    }

    /// Creates a Boolean variable.
    pub fn boolean(key: impl Into<String>) -> Self {
        Self::new(key, 2)
    }

    pub fn is_boolean(&self) -> bool {
        self.nbval == 2
    }
}

impl fmt::Display for MddVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.key, self.nbval)
    }
}
