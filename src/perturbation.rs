//! Perturbations: modifications of the functions of a logical model.

use log::debug;

use crate::error::{Error, Result};
use crate::model::{LogicalModel, NodeInfo};
use crate::reference::Ref;

pub trait Perturbation {
    /// Apply the perturbation to `model`, in place.
    fn update(&self, model: &mut LogicalModel) -> Result<()>;

    /// Return a perturbed copy of `model`, leaving it untouched.
    fn apply(&self, model: &LogicalModel) -> Result<LogicalModel> {
        let mut perturbed = model.clone();
        self.update(&mut perturbed)?;
        Ok(perturbed)
    }
}

/// Fix the value of a component, whatever its regulators.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FixedValuePerturbation {
    component: NodeInfo,
    value: u8,
}

impl FixedValuePerturbation {
    pub fn new(component: NodeInfo, value: u8) -> Result<Self> {
        if value > component.max() {
            return Err(Error::InvalidPerturbation {
                component: component.id().to_string(),
                value,
                max: component.max(),
            });
        }
        Ok(Self { component, value })
    }

    /// Knock-out: fix the component to 0.
    pub fn knockout(component: NodeInfo) -> Self {
        Self {
            component,
            value: 0,
        }
    }

    pub fn component(&self) -> &NodeInfo {
        &self.component
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}

impl Perturbation for FixedValuePerturbation {
    fn update(&self, model: &mut LogicalModel) -> Result<()> {
        debug!("fixing {} to {}", self.component, self.value);
        model.replace_function(self.component.id(), Ref::leaf(self.value))
    }
}
