//! Boolean mapping of multi-valued logical models.
//!
//! Every component with `max > 1` is replaced by `max` Boolean proxies
//! `X_b1 .. X_bmax`, where `X_bi` stands for "X ≥ i" (the Van Ham, or
//! thermometer, encoding). Boolean components are kept as they are.
//!
//! Functions are rewritten in three steps:
//!
//! 1. the variables of the source manager are encoded, giving the ordering of a
//!    fresh Boolean manager ([`Booleanizer::proxies`]);
//! 2. the function of each component is thresholded for each of its values,
//!    giving the predicate "f ≥ v" over the proxies ([`Booleanizer::transform`]);
//! 3. the proxies of one component are stitched together so that a proxy can
//!    only be set when the previous one is, and can only be cleared when the
//!    next one is clear. This keeps every reachable state a valid encoding.
//!
//! ```
//! use std::borrow::Cow;
//!
//! use mdd_booleanize::booleanize::booleanize;
//! use mdd_booleanize::model::{LogicalModel, NodeInfo};
//! use mdd_booleanize::reference::Ref;
//!
//! // X in {0, 1, 2}, with a constant target 2
//! let model = LogicalModel::from_components(vec![NodeInfo::with_max("X", 2)], 3, |_| {
//!     vec![Ref::leaf(2)]
//! })
//! .unwrap();
//!
//! let boolean = booleanize(&model).unwrap();
//! assert!(matches!(boolean, Cow::Owned(_)));
//! let ids: Vec<_> = boolean.components().iter().map(|n| n.id()).collect();
//! assert_eq!(ids, ["X_b1", "X_b2"]);
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info, trace};

use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::mdd::Mdd;
use crate::model::{LogicalModel, NodeInfo};
use crate::reference::Ref;
use crate::types::{MddVariable, Var};

/// Construct a Boolean version of a multi-valued model.
///
/// A model without multi-valued components is returned as is (borrowed).
/// Otherwise, a new model is built over a fresh manager.
pub fn booleanize(model: &LogicalModel) -> Result<Cow<'_, LogicalModel>> {
    if model.is_boolean() {
        debug!("booleanize: the model is already Boolean");
        return Ok(Cow::Borrowed(model));
    }

    let booleanizer = Booleanizer::new(model)?;
    booleanizer.into_model().map(Cow::Owned)
}

/// State of one Boolean mapping.
///
/// The proxy registry and the memo table live here and are never shared
/// between runs.
pub struct Booleanizer<'a> {
    source: &'a LogicalModel,
    target: Rc<Mdd>,
    /// Proxies of each multi-valued variable, by key.
    proxies: HashMap<String, Rc<[NodeInfo]>>,
    /// Thresholded functions by (source node, threshold). Each entry holds a reference.
    memo: Cache<(Ref, u8), Ref>,
}

impl<'a> Booleanizer<'a> {
    /// Encode the variables of `source` and create the target manager.
    pub fn new(source: &'a LogicalModel) -> Result<Self> {
        let mut proxies = HashMap::new();
        let mut variables = Self::boolean_variables(source.mdd(), &mut proxies);

        // Multi-valued components which are not decision variables (readouts)
        // still need their proxies to be stitched together.
        for node in source.components().iter().chain(source.extra_components()) {
            if !node.is_boolean() && source.mdd().variable_for_key(node.id()).is_none() {
                let mapped = Self::mapped(&mut proxies, node.id(), node.max() + 1);
                variables.extend(mapped.iter().map(NodeInfo::to_variable));
            }
        }

        debug!(
            "Booleanizer::new: {} source variables mapped to {} Boolean variables",
            source.mdd().variable_count(),
            variables.len()
        );
        // Thresholded functions only ever reach the leaves 0 and 1.
        let target = Mdd::new(variables, 2)?;

        Ok(Self {
            source,
            target: Rc::new(target),
            proxies,
            memo: Cache::default(),
        })
    }

    /// The manager in which Boolean functions are built.
    pub fn target(&self) -> &Rc<Mdd> {
        &self.target
    }

    /// Ordering of the target manager: the source ordering, with each
    /// multi-valued variable replaced in place by its proxies.
    fn boolean_variables(
        source: &Mdd,
        proxies: &mut HashMap<String, Rc<[NodeInfo]>>,
    ) -> Vec<MddVariable> {
        let mut variables = Vec::new();
        for variable in source.variables() {
            if variable.is_boolean() {
                variables.push(variable.clone());
            } else {
                let mapped = Self::mapped(proxies, &variable.key, variable.nbval);
                variables.extend(mapped.iter().map(NodeInfo::to_variable));
            }
        }
        variables
    }

    fn mapped(
        proxies: &mut HashMap<String, Rc<[NodeInfo]>>,
        key: &str,
        nbval: u8,
    ) -> Rc<[NodeInfo]> {
        let mapped = proxies.entry(key.to_string()).or_insert_with(|| {
            trace!("mapping {} ({} values) to Boolean proxies", key, nbval);
            (1..nbval)
                .map(|v| NodeInfo::new(format!("{}_b{}", key, v)))
                .collect()
        });
        Rc::clone(mapped)
    }

    /// Boolean proxies of a variable with `nbval` values, or `None` if it is
    /// already Boolean.
    ///
    /// Proxies are created once per key: asking again returns the same sequence.
    pub fn proxies(&mut self, key: &str, nbval: u8) -> Option<Rc<[NodeInfo]>> {
        if nbval < 3 {
            return None;
        }
        Some(Self::mapped(&mut self.proxies, key, nbval))
    }

    /// Replace multi-valued components by their proxies, keeping the order.
    pub fn boolean_components(&mut self, nodes: &[NodeInfo]) -> Vec<NodeInfo> {
        let mut components = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.proxies(node.id(), node.max() + 1) {
                Some(mapped) => components.extend(mapped.iter().cloned()),
                None => components.push(node.clone()),
            }
        }
        components
    }

    /// Boolean function, in the target manager, which is true when the source
    /// function `node` evaluates to at least `v`.
    ///
    /// The caller owns the returned reference.
    pub fn transform(&mut self, node: Ref, v: u8) -> Result<Ref> {
        let model: &'a LogicalModel = self.source;
        let source: &'a Mdd = model.mdd();
        let var = match source.node_variable(node) {
            Some(var) => var,
            None => {
                let value = node.leaf_value().unwrap_or_default();
                return Ok(if value >= v { Ref::ONE } else { Ref::ZERO });
            }
        };

        if let Some(res) = self.memo.get(&(node, v)) {
            trace!("transform({}, {}): cached {}", node, v, res);
            return Ok(self.target.reference(res));
        }

        let variable = source.variable(var);
        let children = source.children(node);

        let res = if variable.is_boolean() {
            let new_var = self
                .target
                .variable_for_key(&variable.key)
                .ok_or_else(|| Error::MissingVariable(variable.key.clone()))?;
            let low = self.transform(children[0], v)?;
            let high = self.transform(children[1], v)?;
            self.target.mk_node_free(new_var, &[low, high])
        } else {
            // Replace the multi-valued variable by its Boolean proxies.
            let proxies = self
                .proxies
                .get(&variable.key)
                .cloned()
                .ok_or_else(|| Error::MissingProxies(variable.key.clone()))?;
            if proxies.len() + 1 != children.len() {
                return Err(Error::DomainMismatch {
                    key: variable.key.clone(),
                    expected: proxies.len() + 1,
                    found: children.len(),
                });
            }
            let proxy_vars = proxies
                .iter()
                .map(|p| self.proxy_var(p))
                .collect::<Result<Vec<_>>>()?;

            let mut values = Vec::with_capacity(children.len());
            for &child in &children {
                values.push(self.transform(child, v)?);
            }

            // Proxy i clear selects r_{i-1}, proxy i set falls through to the larger values.
            let mut cur = values[values.len() - 1];
            for i in (0..proxy_vars.len()).rev() {
                cur = self.target.mk_node_free(proxy_vars[i], &[values[i], cur]);
            }
            cur
        };

        trace!("transform({}, {}) = {}", node, v, res);
        self.memo.insert((node, v), self.target.reference(res));
        Ok(res)
    }

    fn proxy_var(&self, proxy: &NodeInfo) -> Result<Var> {
        self.target
            .variable_for_key(proxy.id())
            .ok_or_else(|| Error::MissingVariable(proxy.id().to_string()))
    }

    /// Boolean functions of all components of a group, in order.
    fn transform_functions(&mut self, nodes: &[NodeInfo], functions: &[Ref]) -> Result<Vec<Ref>> {
        let mut targets = Vec::with_capacity(nodes.len());
        for (node, &f) in nodes.iter().zip(functions) {
            match self.proxies.get(node.id()).cloned() {
                None => targets.push(self.transform(f, 1)?),
                Some(proxies) => {
                    debug!("booleanize: {} -> {} proxies", node, proxies.len());
                    for i in 0..proxies.len() {
                        let bf = self.transform(f, i as u8 + 1)?;
                        targets.push(self.stitch(&proxies, i, bf)?);
                    }
                }
            }
        }
        Ok(targets)
    }

    /// Force the proxy `proxies[i]` (whose raw function is `bf`) to stay a valid
    /// encoding: it can not be set if the previous proxy is clear, and can not be
    /// cleared while the next proxy is set.
    fn stitch(&self, proxies: &[NodeInfo], i: usize, bf: Ref) -> Result<Ref> {
        let mut bf = bf;
        if i > 0 {
            let prev = self.target.mk_var(self.proxy_var(&proxies[i - 1])?);
            let res = self.target.apply_and(bf, prev);
            self.target.free(bf);
            self.target.free(prev);
            bf = res;
        }
        if i + 1 < proxies.len() {
            let next = self.target.mk_var(self.proxy_var(&proxies[i + 1])?);
            let res = self.target.apply_or(bf, next);
            self.target.free(bf);
            self.target.free(next);
            bf = res;
        }
        Ok(bf)
    }

    /// Build the Boolean model.
    pub fn into_model(mut self) -> Result<LogicalModel> {
        let source = self.source;
        let core = self.boolean_components(source.components());
        let extra = self.boolean_components(source.extra_components());

        let core_functions = self.transform_functions(source.components(), source.functions())?;
        let extra_functions =
            self.transform_functions(source.extra_components(), source.extra_functions())?;

        info!(
            "booleanize: {} + {} components mapped to {} + {} Boolean components ({} nodes)",
            source.components().len(),
            source.extra_components().len(),
            core.len(),
            extra.len(),
            self.target.node_count()
        );

        LogicalModel::new(
            Rc::clone(&self.target),
            core,
            core_functions,
            extra,
            extra_functions,
        )
    }
}

impl Drop for Booleanizer<'_> {
    fn drop(&mut self) {
        let target = Rc::clone(&self.target);
        for res in self.memo.drain() {
            target.free(res);
        }
    }
}
