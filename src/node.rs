use crate::reference::Ref;
use crate::types::Var;
use crate::utils::{pairing_many, MyHash};

/// Internal node of a multi-valued decision diagram.
///
/// `children[i]` is followed when the variable takes the value `i`,
/// so there are exactly as many children as the variable has values.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    pub variable: Var,
    pub children: Box<[Ref]>,
}

impl Node {
    pub fn new(variable: Var, children: &[Ref]) -> Self {
        Self {
            variable,
            children: children.into(),
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self {
            variable: Var::new(0),
            children: Box::new([]),
        }
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        pairing_many(
            self.variable.id() as u64,
            self.children.iter().map(|c| c.get() as u64),
        )
    }
}
