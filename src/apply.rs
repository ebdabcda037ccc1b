//! Binary combination of diagrams.
//!
//! On multi-valued leaves, `AND` is the pointwise minimum and `OR` the pointwise
//! maximum, which coincide with the usual connectives on Boolean leaves.

use std::fmt;

use log::{debug, trace};

use crate::mdd::Mdd;
use crate::reference::Ref;
use crate::types::Var;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    /// Combine two leaf values.
    pub fn combine_leaves(self, a: u8, b: u8) -> u8 {
        match self {
            Operator::And => a.min(b),
            Operator::Or => a.max(b),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => write!(f, "AND"),
            Operator::Or => write!(f, "OR"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpKey {
    Apply(Operator, Ref, Ref),
}

impl Mdd {
    /// Combine `f` and `g` with `op`. The caller keeps its references to the
    /// operands and owns the result.
    pub fn apply(&self, op: Operator, f: Ref, g: Ref) -> Ref {
        debug!("apply(op = {}, f = {}, g = {})", op, f, g);
        self.apply_(op, f, g)
    }

    pub fn apply_and(&self, f: Ref, g: Ref) -> Ref {
        self.apply(Operator::And, f, g)
    }

    pub fn apply_or(&self, f: Ref, g: Ref) -> Ref {
        self.apply(Operator::Or, f, g)
    }

    /// Combine any number of diagrams, starting from the neutral element of `op`.
    pub fn apply_many(&self, op: Operator, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = match op {
            Operator::And => self.max_leaf(),
            Operator::Or => Ref::ZERO,
        };
        for node in nodes {
            let next = self.apply(op, res, node);
            self.free(res);
            res = next;
        }
        res
    }

    /// Result of `op` when it does not require any recursion (not yet referenced).
    fn terminal_case(&self, op: Operator, f: Ref, g: Ref) -> Option<Ref> {
        if let (Some(a), Some(b)) = (f.leaf_value(), g.leaf_value()) {
            return Some(Ref::leaf(op.combine_leaves(a, b)));
        }
        if f == g {
            return Some(f);
        }
        let top = self.max_leaf();
        match op {
            Operator::And => {
                if f == Ref::ZERO || g == Ref::ZERO {
                    return Some(Ref::ZERO);
                }
                if f == top {
                    return Some(g);
                }
                if g == top {
                    return Some(f);
                }
            }
            Operator::Or => {
                if f == Ref::ZERO {
                    return Some(g);
                }
                if g == Ref::ZERO {
                    return Some(f);
                }
                if f == top || g == top {
                    return Some(top);
                }
            }
        }
        None
    }

    fn apply_(&self, op: Operator, f: Ref, g: Ref) -> Ref {
        if let Some(res) = self.terminal_case(op, f, g) {
            trace!("apply: terminal case {} {} {} => {}", f, op, g, res);
            return self.reference(res);
        }

        // Both operators are commutative.
        let (f, g) = if f <= g { (f, g) } else { (g, f) };
        let key = OpKey::Apply(op, f, g);
        let cached = self.cache.borrow_mut().get(&key);
        if let Some(res) = cached {
            trace!("apply: cache hit {} {} {} => {}", f, op, g, res);
            return self.reference(res);
        }

        let var: Var = match (self.node_variable(f), self.node_variable(g)) {
            (Some(v), Some(w)) => v.min(w),
            (Some(v), None) | (None, Some(v)) => v,
            (None, None) => unreachable!("leaves are terminal cases"),
        };
        let nbval = self.variable(var).nbval;

        let cofactor = |node: Ref, value: u8| {
            if self.node_variable(node) == Some(var) {
                self.child(node, value)
            } else {
                node
            }
        };
        let children: Vec<Ref> = (0..nbval)
            .map(|value| self.apply_(op, cofactor(f, value), cofactor(g, value)))
            .collect();

        let res = self.mk_node_free(var, &children);
        self.cache.borrow_mut().insert(key, res);
        trace!("apply: computed {} {} {} => {}", f, op, g, res);
        res
    }
}
