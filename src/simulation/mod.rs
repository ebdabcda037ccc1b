//! Simulation of logical models.
//!
//! A state assigns a value to every core component of a model, in the order of
//! [`LogicalModel::components`](crate::model::LogicalModel::components).

use std::collections::{HashSet, VecDeque};

use log::debug;

pub mod updater;

pub use updater::*;

pub type State = Vec<u8>;

/// Trace of a deterministic updater, starting from an initial state.
pub struct SingleSuccessorSimulation<U> {
    updater: U,
    init: State,
    max_steps: usize,
}

impl<U: DeterministicUpdater> SingleSuccessorSimulation<U> {
    pub fn new(updater: U, init: State, max_steps: usize) -> Self {
        Self {
            updater,
            init,
            max_steps,
        }
    }

    /// The initial state, followed by at most `max_steps` successors.
    /// The trace stops early on a stable state.
    pub fn iter(&self) -> Trace<'_, U> {
        Trace {
            updater: &self.updater,
            state: Some(self.init.clone()),
            steps: self.max_steps,
        }
    }
}

impl<'a, U: DeterministicUpdater> IntoIterator for &'a SingleSuccessorSimulation<U> {
    type Item = State;
    type IntoIter = Trace<'a, U>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Trace<'a, U> {
    updater: &'a U,
    state: Option<State>,
    steps: usize,
}

impl<U: DeterministicUpdater> Iterator for Trace<'_, U> {
    type Item = State;

    fn next(&mut self) -> Option<Self::Item> {
        let state = self.state.take()?;
        if self.steps > 0 {
            self.steps -= 1;
            self.state = self.updater.successor(&state);
        }
        Some(state)
    }
}

/// Breadth-first exploration of the states reachable with a non-deterministic updater.
pub struct MultipleSuccessorsSimulation<U> {
    updater: U,
    init: Vec<State>,
    max_states: usize,
    expand: Option<Box<dyn Fn(&[u8]) -> bool>>,
}

impl<U: MultipleSuccessorsUpdater> MultipleSuccessorsSimulation<U> {
    pub fn new(updater: U, init: State, max_states: usize) -> Self {
        Self::from_states(updater, vec![init], max_states)
    }

    pub fn from_states(updater: U, init: Vec<State>, max_states: usize) -> Self {
        Self {
            updater,
            init,
            max_states,
            expand: None,
        }
    }

    /// Only follow the successors of the states accepted by `predicate`.
    /// Rejected states are still visited.
    pub fn expand_if(mut self, predicate: impl Fn(&[u8]) -> bool + 'static) -> Self {
        self.expand = Some(Box::new(predicate));
        self
    }

    /// Every reachable state, each visited once, up to `max_states` states.
    pub fn iter(&self) -> Exploration<'_, U> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        for state in &self.init {
            if visited.insert(state.clone()) {
                queue.push_back(state.clone());
            }
        }
        Exploration {
            updater: &self.updater,
            expand: self.expand.as_deref(),
            queue,
            visited,
            remaining: self.max_states,
        }
    }

    /// Stable states reachable from the initial states.
    pub fn stable_states(&self) -> Vec<State> {
        let stable: Vec<State> = self
            .iter()
            .filter(|s| self.updater.successors(s).is_empty())
            .collect();
        debug!("found {} stable states", stable.len());
        stable
    }
}

impl<'a, U: MultipleSuccessorsUpdater> IntoIterator for &'a MultipleSuccessorsSimulation<U> {
    type Item = State;
    type IntoIter = Exploration<'a, U>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Exploration<'a, U> {
    updater: &'a U,
    expand: Option<&'a dyn Fn(&[u8]) -> bool>,
    queue: VecDeque<State>,
    visited: HashSet<State>,
    remaining: usize,
}

impl<U: MultipleSuccessorsUpdater> Iterator for Exploration<'_, U> {
    type Item = State;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let state = self.queue.pop_front()?;
        self.remaining -= 1;
        if let Some(expand) = self.expand {
            if !expand(&state[..]) {
                return Some(state);
            }
        }
        for successor in self.updater.successors(&state) {
            if self.visited.insert(successor.clone()) {
                self.queue.push_back(successor);
            }
        }
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::model::{LogicalModel, NodeInfo};
    use crate::types::Var;

    /// A = 1, B = 1, C = A & B
    fn model() -> LogicalModel {
        let core = ["A", "B", "C"].map(NodeInfo::new).to_vec();
        LogicalModel::from_components(core, 2, |mdd| {
            let a = mdd.mk_var(Var::new(0));
            let b = mdd.mk_var(Var::new(1));
            let c = mdd.apply_and(a, b);
            mdd.free(a);
            mdd.free(b);
            vec![mdd.mk_leaf(1), mdd.mk_leaf(1), c]
        })
        .unwrap()
    }

    #[test]
    fn test_synchronous_trace() {
        let model = model();
        let updater = SynchronousUpdater::new(&model);
        let simulation = SingleSuccessorSimulation::new(updater, vec![0, 0, 0], 10);
        let trace: Vec<State> = simulation.iter().collect();
        assert_eq!(trace, vec![vec![0, 0, 0], vec![1, 1, 0], vec![1, 1, 1]]);
    }

    #[test]
    fn test_trace_max_steps() {
        let model = model();
        let updater = SynchronousUpdater::new(&model);
        let simulation = SingleSuccessorSimulation::new(updater, vec![0, 0, 0], 1);
        let trace: Vec<State> = (&simulation).into_iter().collect();
        assert_eq!(trace, vec![vec![0, 0, 0], vec![1, 1, 0]]);
    }

    #[test]
    fn test_asynchronous_exploration() {
        let model = model();
        let updater = AsynchronousUpdater::new(&model);
        let simulation = MultipleSuccessorsSimulation::new(updater, vec![0, 0, 0], 100);
        let states: HashSet<State> = simulation.iter().collect();
        let expected: HashSet<State> = [
            vec![0, 0, 0],
            vec![1, 0, 0],
            vec![0, 1, 0],
            vec![1, 1, 0],
            vec![1, 1, 1],
        ]
        .into_iter()
        .collect();
        assert_eq!(states, expected);
        assert_eq!(simulation.stable_states(), vec![vec![1, 1, 1]]);
    }

    #[test]
    fn test_exploration_bound() {
        let model = model();
        let updater = AsynchronousUpdater::new(&model);
        let simulation = MultipleSuccessorsSimulation::new(updater, vec![0, 0, 0], 2);
        assert_eq!(simulation.iter().count(), 2);
    }

    #[test]
    fn test_exploration_expand_if() {
        let model = model();
        // Do not go past states where A is set.
        let updater = AsynchronousUpdater::new(&model);
        let simulation = MultipleSuccessorsSimulation::new(updater, vec![0, 0, 0], 100)
            .expand_if(|state| state[0] == 0);
        let states: HashSet<State> = simulation.iter().collect();
        let expected: HashSet<State> = [vec![0, 0, 0], vec![1, 0, 0], vec![0, 1, 0], vec![1, 1, 0]]
            .into_iter()
            .collect();
        assert_eq!(states, expected);
    }
}
