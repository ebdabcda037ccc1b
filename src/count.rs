use std::collections::HashMap;

use num_bigint::BigUint;

use crate::mdd::Mdd;
use crate::reference::Ref;

impl Mdd {
    /// Number of full assignments of the manager variables on which the
    /// function rooted at `node` evaluates to `value`.
    pub fn count(&self, node: Ref, value: u8) -> BigUint {
        let mut cache = HashMap::new();
        let below = self.count_(node, value, &mut cache);
        below * self.span(0, self.level(node))
    }

    /// Position of the variable tested by `node`, or the number of variables for leaves.
    fn level(&self, node: Ref) -> usize {
        self.node_variable(node)
            .map_or(self.variable_count(), |var| var.index())
    }

    /// Number of valuations of the variables in `from..to`.
    fn span(&self, from: usize, to: usize) -> BigUint {
        self.variables()[from..to]
            .iter()
            .fold(BigUint::from(1u32), |acc, v| acc * BigUint::from(v.nbval))
    }

    fn count_(&self, node: Ref, value: u8, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        if let Some(leaf) = node.leaf_value() {
            return BigUint::from((leaf == value) as u32);
        }
        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        let level = self.level(node);
        let count = self
            .children(node)
            .into_iter()
            .map(|child| self.count_(child, value, cache) * self.span(level + 1, self.level(child)))
            .sum::<BigUint>();

        cache.insert(node, count.clone());
        count
    }
}
