use std::fmt::{Display, Formatter};

/// Bit marking a handle as a leaf; the low bits then carry the leaf value.
const LEAF_BIT: u32 = 1 << 31;

/// Handle to a node of an [`Mdd`][crate::mdd::Mdd].
///
/// Internal nodes are indices into the manager's unique table.
/// Leaves are not stored at all: their value lives in the handle itself,
/// so a leaf handle is meaningful for every manager with enough leaves.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref(u32);

impl Ref {
    pub const ZERO: Ref = Ref::leaf(0);
    pub const ONE: Ref = Ref::leaf(1);

    /// Handle for the leaf carrying `value`.
    pub const fn leaf(value: u8) -> Self {
        Self(LEAF_BIT | value as u32)
    }

    /// Handle for the internal node stored at `index`.
    pub(crate) const fn node(index: u32) -> Self {
        assert!(index & LEAF_BIT == 0, "Node index overflows the handle");
        Self(index)
    }

    pub const fn is_leaf(self) -> bool {
        self.0 & LEAF_BIT != 0
    }

    /// Return the value carried by a leaf, or `None` for internal nodes.
    pub const fn leaf_value(self) -> Option<u8> {
        if self.is_leaf() {
            Some((self.0 & !LEAF_BIT) as u8)
        } else {
            None
        }
    }

    /// Return the internal representation of the reference.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Return the storage index of an internal node.
    pub const fn index(self) -> usize {
        (self.0 & !LEAF_BIT) as usize
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.leaf_value() {
            Some(value) => write!(f, "#{}", value),
            None => write!(f, "@{}", self.0),
        }
    }
}
