//! Updating policies: which components change, and when.
//!
//! Transitions are unitary: a component whose target differs from its current
//! value moves one step towards it.

use crate::error::{Error, Result};
use crate::model::LogicalModel;
use crate::simulation::State;

/// Updater with at most one successor for each state.
pub trait DeterministicUpdater {
    /// The successor of `state`, or `None` if it is stable.
    fn successor(&self, state: &[u8]) -> Option<State>;
}

/// Updater with any number of successors for each state.
pub trait MultipleSuccessorsUpdater {
    /// All successors of `state`; empty if it is stable.
    fn successors(&self, state: &[u8]) -> Vec<State>;
}

/// One step from `current` towards `target`.
pub fn next_value(current: u8, target: u8) -> u8 {
    if target > current {
        current + 1
    } else if target < current {
        current - 1
    } else {
        current
    }
}

fn component_indices(model: &LogicalModel, ids: &[String]) -> Result<Vec<usize>> {
    ids.iter()
        .map(|id| {
            model
                .component_index(id)
                .ok_or_else(|| Error::UnknownComponent(id.clone()))
        })
        .collect()
}

/// All components are updated at once.
pub struct SynchronousUpdater<'a> {
    model: &'a LogicalModel,
}

impl<'a> SynchronousUpdater<'a> {
    pub fn new(model: &'a LogicalModel) -> Self {
        Self { model }
    }
}

impl DeterministicUpdater for SynchronousUpdater<'_> {
    fn successor(&self, state: &[u8]) -> Option<State> {
        let next: State = self
            .model
            .target_values(state)
            .into_iter()
            .zip(state)
            .map(|(target, &current)| next_value(current, target))
            .collect();
        if next == state {
            None
        } else {
            Some(next)
        }
    }
}

impl MultipleSuccessorsUpdater for SynchronousUpdater<'_> {
    fn successors(&self, state: &[u8]) -> Vec<State> {
        self.successor(state).into_iter().collect()
    }
}

/// A single component is updated at a time, in all possible ways.
pub struct AsynchronousUpdater<'a> {
    model: &'a LogicalModel,
}

impl<'a> AsynchronousUpdater<'a> {
    pub fn new(model: &'a LogicalModel) -> Self {
        Self { model }
    }
}

impl MultipleSuccessorsUpdater for AsynchronousUpdater<'_> {
    fn successors(&self, state: &[u8]) -> Vec<State> {
        let targets = self.model.target_values(state);
        let mut successors = Vec::new();
        for (i, &target) in targets.iter().enumerate() {
            let next = next_value(state[i], target);
            if next != state[i] {
                let mut successor = state.to_vec();
                successor[i] = next;
                successors.push(successor);
            }
        }
        successors
    }
}

/// Blocks of components are updated one after the other; the components of a
/// block are updated together, and see the changes made by earlier blocks.
pub struct SequentialUpdater<'a> {
    model: &'a LogicalModel,
    blocks: Vec<Vec<usize>>,
}

impl<'a> SequentialUpdater<'a> {
    /// Each component in its own block, in the order of the model.
    pub fn new(model: &'a LogicalModel) -> Self {
        let blocks = (0..model.components().len()).map(|i| vec![i]).collect();
        Self { model, blocks }
    }

    /// Block-sequential updater; components left out of every block are never updated.
    pub fn with_blocks(model: &'a LogicalModel, blocks: &[Vec<String>]) -> Result<Self> {
        let blocks = blocks
            .iter()
            .map(|block| component_indices(model, block))
            .collect::<Result<_>>()?;
        Ok(Self { model, blocks })
    }
}

impl DeterministicUpdater for SequentialUpdater<'_> {
    fn successor(&self, state: &[u8]) -> Option<State> {
        let mut next = state.to_vec();
        for block in &self.blocks {
            let targets = self.model.target_values(&next);
            for &i in block {
                next[i] = next_value(next[i], targets[i]);
            }
        }
        if next == state {
            None
        } else {
            Some(next)
        }
    }
}

impl MultipleSuccessorsUpdater for SequentialUpdater<'_> {
    fn successors(&self, state: &[u8]) -> Vec<State> {
        self.successor(state).into_iter().collect()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UpdateMode {
    Synchronous,
    Asynchronous,
}

/// Components sharing the same priority.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PriorityClass {
    pub components: Vec<String>,
    pub mode: UpdateMode,
}

impl PriorityClass {
    pub fn new<S: Into<String>>(components: impl IntoIterator<Item = S>, mode: UpdateMode) -> Self {
        Self {
            components: components.into_iter().map(Into::into).collect(),
            mode,
        }
    }
}

/// Only the components of the first class (by rank) which can change are updated.
///
/// Components missing from every class form an implicit asynchronous class of
/// lowest priority.
pub struct PriorityUpdater<'a> {
    model: &'a LogicalModel,
    classes: Vec<(Vec<usize>, UpdateMode)>,
}

impl<'a> PriorityUpdater<'a> {
    pub fn new(model: &'a LogicalModel, classes: &[PriorityClass]) -> Result<Self> {
        let mut resolved = classes
            .iter()
            .map(|class| Ok((component_indices(model, &class.components)?, class.mode)))
            .collect::<Result<Vec<_>>>()?;

        let rest: Vec<usize> = (0..model.components().len())
            .filter(|i| !resolved.iter().any(|(members, _)| members.contains(i)))
            .collect();
        if !rest.is_empty() {
            resolved.push((rest, UpdateMode::Asynchronous));
        }

        Ok(Self {
            model,
            classes: resolved,
        })
    }
}

impl MultipleSuccessorsUpdater for PriorityUpdater<'_> {
    fn successors(&self, state: &[u8]) -> Vec<State> {
        let targets = self.model.target_values(state);
        for (members, mode) in &self.classes {
            let changes: Vec<(usize, u8)> = members
                .iter()
                .map(|&i| (i, next_value(state[i], targets[i])))
                .filter(|&(i, next)| next != state[i])
                .collect();
            if changes.is_empty() {
                continue;
            }
            return match mode {
                UpdateMode::Synchronous => {
                    let mut successor = state.to_vec();
                    for (i, next) in changes {
                        successor[i] = next;
                    }
                    vec![successor]
                }
                UpdateMode::Asynchronous => changes
                    .into_iter()
                    .map(|(i, next)| {
                        let mut successor = state.to_vec();
                        successor[i] = next;
                        successor
                    })
                    .collect(),
            };
        }
        Vec::new()
    }
}
