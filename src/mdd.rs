//! The multi-valued decision diagram manager.
//!
//! All diagrams live in a single [`Mdd`] manager. Nodes are hash-consed in a
//! unique table, so that structurally identical diagrams always get the very
//! same [`Ref`] handle, and they are reference counted: every handle returned
//! by a constructor (`mk_*`, `apply*`) is *owned* by the caller, who must
//! eventually give it back with [`Mdd::free`] (or keep it forever).
//!
//! Leaves carry small integer values (`0..leaf_count`) and are encoded in the
//! handle itself, so they are never counted nor reclaimed.
//!
//! ```
//! use mdd_booleanize::mdd::Mdd;
//! use mdd_booleanize::reference::Ref;
//! use mdd_booleanize::types::{MddVariable, Var};
//!
//! let mdd = Mdd::new(vec![MddVariable::boolean("A"), MddVariable::new("X", 3)], 3).unwrap();
//! let a = mdd.mk_var(Var::new(0));
//! let x = mdd.mk_var(Var::new(1));
//!
//! // min(A, X) is 1 only when A is set and X is positive.
//! let f = mdd.apply_and(a, x);
//! assert_eq!(mdd.reach(f, &[1, 2]), 1);
//! assert_eq!(mdd.reach(f, &[0, 2]), 0);
//! assert_eq!(mdd.reach(f, &[1, 0]), 0);
//! ```

use std::cell::RefCell;
use std::cmp::min;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use log::{debug, trace};

use crate::apply::OpKey;
use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::reference::Ref;
use crate::table::Table;
use crate::types::{MddVariable, Var};

pub struct Mdd {
    variables: Vec<MddVariable>,
    keys: HashMap<String, Var>,
    leaf_count: u8,
    storage: RefCell<Table<Node>>,
    pub(crate) cache: RefCell<Cache<OpKey, Ref>>,
}

impl Mdd {
    pub const DEFAULT_STORAGE_BITS: usize = 16;

    /// Create an empty manager over the given ordered variables.
    pub fn new(variables: Vec<MddVariable>, leaf_count: u8) -> Result<Self> {
        Self::with_storage_bits(variables, leaf_count, Self::DEFAULT_STORAGE_BITS)
    }

    /// Create an empty manager whose unique table has `2^storage_bits` buckets.
    pub fn with_storage_bits(
        variables: Vec<MddVariable>,
        leaf_count: u8,
        storage_bits: usize,
    ) -> Result<Self> {
        assert!(
            storage_bits <= 31,
            "Storage bits should be in the range 0..=31"
        );
        if leaf_count == 0 {
            return Err(Error::NoLeaves);
        }

        let mut keys = HashMap::with_capacity(variables.len());
        for (i, variable) in variables.iter().enumerate() {
            if variable.nbval < 2 {
                return Err(Error::DegenerateVariable(variable.key.clone()));
            }
            if keys.insert(variable.key.clone(), Var::from(i)).is_some() {
                return Err(Error::DuplicateVariable(variable.key.clone()));
            }
        }

        debug!(
            "Mdd::new(variables = {}, leaf_count = {}, storage_bits = {})",
            variables.len(),
            leaf_count,
            storage_bits
        );

        let cache_bits = min(storage_bits, 16);
        Ok(Self {
            variables,
            keys,
            leaf_count,
            storage: RefCell::new(Table::new(storage_bits)),
            cache: RefCell::new(Cache::new(cache_bits)),
        })
    }
}

impl Debug for Mdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.borrow();
        f.debug_struct("Mdd")
            .field("variables", &self.variables.len())
            .field("leaf_count", &self.leaf_count)
            .field("capacity", &storage.capacity())
            .field("real_size", &storage.real_size())
            .finish()
    }
}

impl Mdd {
    pub fn variables(&self) -> &[MddVariable] {
        &self.variables
    }
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
    pub fn variable(&self, var: Var) -> &MddVariable {
        &self.variables[var.index()]
    }
    pub fn variable_for_key(&self, key: &str) -> Option<Var> {
        self.keys.get(key).copied()
    }
    pub fn leaf_count(&self) -> u8 {
        self.leaf_count
    }

    /// Number of live internal nodes.
    pub fn node_count(&self) -> usize {
        self.storage.borrow().real_size()
    }

    pub fn is_leaf(&self, node: Ref) -> bool {
        node.is_leaf()
    }
    pub fn leaf_value(&self, node: Ref) -> Option<u8> {
        node.leaf_value()
    }

    /// The leaf with the largest value.
    pub fn max_leaf(&self) -> Ref {
        Ref::leaf(self.leaf_count - 1)
    }

    pub fn mk_leaf(&self, value: u8) -> Ref {
        assert!(
            value < self.leaf_count,
            "Leaf {} is out of range (leaf count is {})",
            value,
            self.leaf_count
        );
        Ref::leaf(value)
    }

    /// Variable tested by an internal node, `None` for leaves.
    pub fn node_variable(&self, node: Ref) -> Option<Var> {
        if node.is_leaf() {
            None
        } else {
            Some(self.storage.borrow().value(node.index()).variable)
        }
    }

    /// Child followed when the variable of `node` takes `value`.
    ///
    /// A leaf does not depend on anything and is its own child.
    pub fn child(&self, node: Ref, value: u8) -> Ref {
        if node.is_leaf() {
            return node;
        }
        self.storage.borrow().value(node.index()).children[value as usize]
    }

    /// All children of an internal node, indexed by value.
    pub fn children(&self, node: Ref) -> Vec<Ref> {
        assert!(!node.is_leaf(), "Leaf {} has no children", node);
        self.storage.borrow().value(node.index()).children.to_vec()
    }

    /// Reference count of an internal node, `None` for leaves.
    pub fn ref_count(&self, node: Ref) -> Option<u32> {
        if node.is_leaf() {
            None
        } else {
            Some(self.storage.borrow().refs(node.index()))
        }
    }

    /// Take one more reference on `node`, and return it for convenience.
    pub fn reference(&self, node: Ref) -> Ref {
        if !node.is_leaf() {
            self.storage.borrow_mut().inc_ref(node.index());
        }
        node
    }

    /// Release one reference on `node`.
    ///
    /// Nodes which are no longer referenced are removed from the unique table,
    /// releasing their own children in turn.
    pub fn free(&self, node: Ref) {
        if node.is_leaf() {
            return;
        }

        let mut reclaimed = 0usize;
        let mut stack = vec![node];
        let mut storage = self.storage.borrow_mut();
        while let Some(node) = stack.pop() {
            if storage.dec_ref(node.index()) == 0 {
                trace!("free: reclaiming {}", node);
                let removed = storage.remove(node.index());
                stack.extend(removed.children.iter().filter(|c| !c.is_leaf()));
                reclaimed += 1;
            }
        }
        drop(storage);

        if reclaimed > 0 {
            debug!("free({}): reclaimed {} nodes", node, reclaimed);
            // Cached results may point to reclaimed cells.
            self.cache.borrow_mut().clear();
        }
    }

    /// Create (or find) the node testing `var` with the given children.
    ///
    /// The caller does not give away its references to `children`.
    pub fn mk_node(&self, var: Var, children: &[Ref]) -> Ref {
        trace!("mk_node(var = {}, children = {:?})", var, children);

        let nbval = self.variable(var).nbval as usize;
        assert_eq!(
            children.len(),
            nbval,
            "Variable {} expects {} children",
            self.variable(var).key,
            nbval
        );
        debug_assert!(
            children
                .iter()
                .all(|&c| self.node_variable(c).map_or(true, |v| v > var)),
            "Children of a node must test later variables"
        );

        // Handle duplicates
        let first = children[0];
        if children.iter().all(|&c| c == first) {
            trace!("mk_node: all children are {}", first);
            return self.reference(first);
        }

        let mut storage = self.storage.borrow_mut();
        let (index, created) = storage.put(Node::new(var, children));
        if created {
            for c in children.iter().filter(|c| !c.is_leaf()) {
                storage.inc_ref(c.index());
            }
        }
        storage.inc_ref(index);
        Ref::node(index as u32)
    }

    /// Same as [`Mdd::mk_node`], but also releases one reference to each child.
    pub fn mk_node_free(&self, var: Var, children: &[Ref]) -> Ref {
        let node = self.mk_node(var, children);
        for &c in children {
            self.free(c);
        }
        node
    }

    /// Identity function of a variable: child `i` is the leaf `i`.
    pub fn mk_var(&self, var: Var) -> Ref {
        let nbval = self.variable(var).nbval;
        assert!(
            nbval <= self.leaf_count,
            "Variable {} has more values than leaves",
            self.variable(var).key
        );
        let children: Vec<Ref> = (0..nbval).map(Ref::leaf).collect();
        self.mk_node(var, &children)
    }

    /// Evaluate the function rooted at `node` for the valuation `values`,
    /// indexed by variable position.
    pub fn reach(&self, node: Ref, values: &[u8]) -> u8 {
        assert_eq!(
            values.len(),
            self.variables.len(),
            "Valuation must assign every variable"
        );
        let storage = self.storage.borrow();
        let mut current = node;
        while !current.is_leaf() {
            let node = storage.value(current.index());
            current = node.children[values[node.variable.index()] as usize];
        }
        current.leaf_value().unwrap_or_default()
    }

    /// Set of all internal nodes reachable from `roots`.
    pub fn descendants(&self, roots: impl IntoIterator<Item = Ref>) -> HashSet<Ref> {
        let storage = self.storage.borrow();
        let mut visited = HashSet::new();
        let mut stack: Vec<Ref> = roots.into_iter().collect();
        while let Some(node) = stack.pop() {
            if node.is_leaf() || !visited.insert(node) {
                continue;
            }
            stack.extend(storage.value(node.index()).children.iter().copied());
        }
        visited
    }

    /// Number of internal nodes of the diagram rooted at `node`.
    pub fn size(&self, node: Ref) -> usize {
        self.descendants([node]).len()
    }

    pub fn to_bracket_string(&self, node: Ref) -> String {
        if let Some(value) = node.leaf_value() {
            return value.to_string();
        }
        let var = self.variable(self.node_variable(node).unwrap_or(Var::new(0)));
        let children = self
            .children(node)
            .into_iter()
            .map(|c| self.to_bracket_string(c))
            .collect::<Vec<_>>();
        format!("{}({})", var.key, children.join(", "))
    }
}
