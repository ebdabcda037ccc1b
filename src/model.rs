//! Logical models: ordered components, each associated with a regulatory function.
//!
//! A [`LogicalModel`] has two groups of components: the *core* components, which
//! define the state of the model, and the *extra* components, which are readouts
//! computed from the core state. Every component owns one function, stored as a
//! diagram of the model's shared [`Mdd`] manager.

use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::error::{Error, Result};
use crate::mdd::Mdd;
use crate::reference::Ref;
use crate::types::MddVariable;

/// A component of a logical model: a unique identifier and its maximal value.
///
/// A component is Boolean when `max == 1`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct NodeInfo {
    id: String,
    max: u8,
}

impl NodeInfo {
    /// Create a Boolean component.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_max(id, 1)
    }

    /// Create a component with values `0..=max`, where `max` is in `1..=254`.
    pub fn with_max(id: impl Into<String>, max: u8) -> Self {
        assert!(
            (1..=254).contains(&max),
            "A component takes between 2 and 255 values (max = {})",
            max
        );
        Self { id: id.into(), max }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn is_boolean(&self) -> bool {
        self.max == 1
    }

    /// The decision variable standing for this component.
    pub fn to_variable(&self) -> MddVariable {
        MddVariable::new(self.id.clone(), self.max + 1)
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[derive(Debug)]
pub struct LogicalModel {
    mdd: Rc<Mdd>,
    core: Vec<NodeInfo>,
    core_functions: Vec<Ref>,
    extra: Vec<NodeInfo>,
    extra_functions: Vec<Ref>,
    /// For each manager variable, the index of the matching core component.
    positions: Vec<Option<usize>>,
}

impl LogicalModel {
    /// Assemble a model.
    ///
    /// The model takes over one reference on each function, and releases them
    /// when dropped.
    pub fn new(
        mdd: Rc<Mdd>,
        core: Vec<NodeInfo>,
        core_functions: Vec<Ref>,
        extra: Vec<NodeInfo>,
        extra_functions: Vec<Ref>,
    ) -> Result<Self> {
        if core.len() != core_functions.len() {
            return Err(Error::FunctionCount {
                group: "core",
                expected: core.len(),
                found: core_functions.len(),
            });
        }
        if extra.len() != extra_functions.len() {
            return Err(Error::FunctionCount {
                group: "extra",
                expected: extra.len(),
                found: extra_functions.len(),
            });
        }
        for node in core.iter().chain(extra.iter()) {
            if let Some(var) = mdd.variable_for_key(node.id()) {
                let nbval = mdd.variable(var).nbval as usize;
                if nbval != node.max() as usize + 1 {
                    return Err(Error::DomainMismatch {
                        key: node.id().to_string(),
                        expected: node.max() as usize + 1,
                        found: nbval,
                    });
                }
            }
        }

        let positions = mdd
            .variables()
            .iter()
            .map(|v| core.iter().position(|n| n.id() == v.key))
            .collect();

        debug!(
            "LogicalModel::new(core = {}, extra = {}, mdd = {:?})",
            core.len(),
            extra.len(),
            mdd
        );

        Ok(Self {
            mdd,
            core,
            core_functions,
            extra,
            extra_functions,
            positions,
        })
    }

    /// Build a model without extra components, over a fresh manager whose
    /// variables are the core components.
    pub fn from_components(
        core: Vec<NodeInfo>,
        leaf_count: u8,
        build: impl FnOnce(&Mdd) -> Vec<Ref>,
    ) -> Result<Self> {
        let variables = core.iter().map(NodeInfo::to_variable).collect();
        let mdd = Rc::new(Mdd::new(variables, leaf_count)?);
        let functions = build(&mdd);
        Self::new(mdd, core, functions, vec![], vec![])
    }
}

impl LogicalModel {
    pub fn mdd(&self) -> &Rc<Mdd> {
        &self.mdd
    }
    pub fn components(&self) -> &[NodeInfo] {
        &self.core
    }
    pub fn functions(&self) -> &[Ref] {
        &self.core_functions
    }
    pub fn extra_components(&self) -> &[NodeInfo] {
        &self.extra
    }
    pub fn extra_functions(&self) -> &[Ref] {
        &self.extra_functions
    }

    /// A model is Boolean if neither its components nor its decision variables
    /// take more than two values.
    pub fn is_boolean(&self) -> bool {
        self.core.iter().chain(self.extra.iter()).all(NodeInfo::is_boolean)
            && self.mdd.variables().iter().all(MddVariable::is_boolean)
    }

    pub fn component_index(&self, id: &str) -> Option<usize> {
        self.core.iter().position(|n| n.id() == id)
    }

    /// Function of a core or extra component.
    pub fn function(&self, id: &str) -> Option<Ref> {
        if let Some(i) = self.component_index(id) {
            return Some(self.core_functions[i]);
        }
        self.extra
            .iter()
            .position(|n| n.id() == id)
            .map(|i| self.extra_functions[i])
    }

    /// Replace the function of a core or extra component.
    ///
    /// The model takes over the reference on `function`. The new function is
    /// installed before the previous one is released.
    pub fn replace_function(&mut self, id: &str, function: Ref) -> Result<()> {
        let slot = if let Some(i) = self.component_index(id) {
            &mut self.core_functions[i]
        } else if let Some(i) = self.extra.iter().position(|n| n.id() == id) {
            &mut self.extra_functions[i]
        } else {
            return Err(Error::UnknownComponent(id.to_string()));
        };

        let old = std::mem::replace(slot, function);
        self.mdd.free(old);
        Ok(())
    }

    /// Valuation of the manager variables matching a state of the core components.
    ///
    /// Variables without a core component read as 0.
    pub fn valuation(&self, state: &[u8]) -> Vec<u8> {
        assert_eq!(
            state.len(),
            self.core.len(),
            "State must assign every core component"
        );
        self.positions
            .iter()
            .map(|p| p.map_or(0, |i| state[i]))
            .collect()
    }

    /// Value targeted by the function of the core component `index` in `state`.
    pub fn target_value(&self, index: usize, state: &[u8]) -> u8 {
        let valuation = self.valuation(state);
        self.mdd.reach(self.core_functions[index], &valuation)
    }

    /// Targets of every core component in `state`.
    pub fn target_values(&self, state: &[u8]) -> Vec<u8> {
        let valuation = self.valuation(state);
        self.core_functions
            .iter()
            .map(|&f| self.mdd.reach(f, &valuation))
            .collect()
    }

    /// Values of the extra components in `state`.
    pub fn extra_values(&self, state: &[u8]) -> Vec<u8> {
        let valuation = self.valuation(state);
        self.extra_functions
            .iter()
            .map(|&f| self.mdd.reach(f, &valuation))
            .collect()
    }
}

impl Clone for LogicalModel {
    fn clone(&self) -> Self {
        for &f in self.core_functions.iter().chain(self.extra_functions.iter()) {
            self.mdd.reference(f);
        }
        Self {
            mdd: Rc::clone(&self.mdd),
            core: self.core.clone(),
            core_functions: self.core_functions.clone(),
            extra: self.extra.clone(),
            extra_functions: self.extra_functions.clone(),
            positions: self.positions.clone(),
        }
    }
}

impl Drop for LogicalModel {
    fn drop(&mut self) {
        for &f in self.core_functions.iter().chain(self.extra_functions.iter()) {
            self.mdd.free(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::Var;

    /// A = 1, B = 1, C = A & B
    fn model() -> LogicalModel {
        let core = vec![NodeInfo::new("A"), NodeInfo::new("B"), NodeInfo::new("C")];
        LogicalModel::from_components(core, 2, |mdd| {
            let a = mdd.mk_var(Var::new(0));
            let b = mdd.mk_var(Var::new(1));
            let c = mdd.apply_and(a, b);
            mdd.free(a);
            mdd.free(b);
            vec![Ref::ONE, Ref::ONE, c]
        })
        .unwrap()
    }

    #[test]
    fn test_node_info() {
        let a = NodeInfo::new("A");
        let x = NodeInfo::with_max("X", 2);
        assert!(a.is_boolean());
        assert!(!x.is_boolean());
        assert_eq!(x.to_variable(), MddVariable::new("X", 3));
        assert_eq!(x.to_string(), "X");

        let widest = NodeInfo::with_max("W", 254);
        assert_eq!(widest.to_variable(), MddVariable::new("W", 255));
    }

    #[test]
    #[should_panic(expected = "between 2 and 255 values")]
    fn test_node_info_too_many_values() {
        NodeInfo::with_max("R", 255);
    }

    #[test]
    fn test_targets() {
        let model = model();
        assert!(model.is_boolean());
        assert_eq!(model.target_values(&[0, 0, 0]), vec![1, 1, 0]);
        assert_eq!(model.target_values(&[1, 1, 0]), vec![1, 1, 1]);
        assert_eq!(model.target_value(2, &[1, 0, 1]), 0);
    }

    #[test]
    fn test_function_count_mismatch() {
        let mdd = Rc::new(Mdd::new(vec![MddVariable::boolean("A")], 2).unwrap());
        let res = LogicalModel::new(mdd, vec![NodeInfo::new("A")], vec![], vec![], vec![]);
        assert_eq!(
            res.unwrap_err(),
            Error::FunctionCount {
                group: "core",
                expected: 1,
                found: 0
            }
        );
    }

    #[test]
    fn test_domain_mismatch() {
        let mdd = Rc::new(Mdd::new(vec![MddVariable::boolean("X")], 3).unwrap());
        let res = LogicalModel::new(
            mdd,
            vec![NodeInfo::with_max("X", 2)],
            vec![Ref::ZERO],
            vec![],
            vec![],
        );
        assert!(matches!(res, Err(Error::DomainMismatch { .. })));
    }

    #[test]
    fn test_extra_components() {
        let core = vec![NodeInfo::new("A"), NodeInfo::new("B")];
        let variables = core.iter().map(NodeInfo::to_variable).collect();
        let mdd = Rc::new(Mdd::new(variables, 2).unwrap());
        let a = mdd.mk_var(Var::new(0));
        let b = mdd.mk_var(Var::new(1));
        let readout = mdd.apply_or(a, b);
        let model = LogicalModel::new(
            Rc::clone(&mdd),
            core,
            vec![b, a],
            vec![NodeInfo::new("R")],
            vec![readout],
        )
        .unwrap();

        assert_eq!(model.extra_values(&[0, 0]), vec![0]);
        assert_eq!(model.extra_values(&[0, 1]), vec![1]);
        assert_eq!(model.function("R"), Some(readout));
        assert_eq!(model.function("Z"), None);
    }

    #[test]
    fn test_clone_and_drop_keep_counts() {
        let model = model();
        let mdd = Rc::clone(model.mdd());
        let c = model.functions()[2];
        let before = mdd.ref_count(c);

        let copy = model.clone();
        assert_eq!(mdd.ref_count(c), before.map(|n| n + 1));
        drop(copy);
        assert_eq!(mdd.ref_count(c), before);

        drop(model);
        assert_eq!(mdd.node_count(), 0);
    }

    #[test]
    fn test_replace_function() {
        let mut model = model();
        let mdd = Rc::clone(model.mdd());
        model.replace_function("C", Ref::ZERO).unwrap();
        assert_eq!(model.function("C"), Some(Ref::ZERO));
        // The conjunction was only held by the model.
        assert_eq!(mdd.node_count(), 0);

        let res = model.replace_function("D", Ref::ONE);
        assert_eq!(res.unwrap_err(), Error::UnknownComponent("D".to_string()));
    }
}
