use thiserror::Error;

/// Errors raised while building diagrams and models, or while booleanizing them.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum Error {
    /// A Boolean source variable has no counterpart in the target diagram.
    #[error("no matching variable `{0}` during Boolean conversion")]
    MissingVariable(String),

    /// A multi-valued source variable has no registered Boolean proxies.
    #[error("no mapped Boolean variables found for `{0}`")]
    MissingProxies(String),

    #[error("variable `{key}` has {found} values, expected {expected}")]
    DomainMismatch {
        key: String,
        expected: usize,
        found: usize,
    },

    #[error("duplicate variable `{0}`")]
    DuplicateVariable(String),

    #[error("variable `{0}` must have at least two values")]
    DegenerateVariable(String),

    #[error("a diagram needs at least one leaf")]
    NoLeaves,

    #[error("expected {expected} {group} functions, got {found}")]
    FunctionCount {
        group: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid perturbation settings for {component}: {value} (max is {max})")]
    InvalidPerturbation {
        component: String,
        value: u8,
        max: u8,
    },

    #[error("could not find the target component `{0}`")]
    UnknownComponent(String),
}

pub type Result<T> = std::result::Result<T, Error>;
