//! # mdd-booleanize: Boolean mapping of multi-valued logical models
//!
//! **`mdd-booleanize`** turns a logical model of a regulatory network, whose components
//! may take more than two activity levels, into an equivalent model with Boolean
//! components only.
//!
//! ## Multi-valued Decision Diagrams
//!
//! The functions of a model are stored in a shared, hash-consed **MDD** manager
//! ([`Mdd`][crate::mdd::Mdd]). A node tests one variable and has one child per value of
//! that variable; leaves are small integers. For a fixed variable ordering, every
//! function has exactly one representation, so equality of functions is equality of
//! [`Ref`][crate::reference::Ref] handles.
//!
//! Handles are reference-counted: every function built by the manager is owned by the
//! caller, which releases it with [`Mdd::free`][crate::mdd::Mdd::free].
//!
//! ## Boolean mapping
//!
//! A component `X` with values `0..=max` is replaced by `max` proxies `X_b1 .. X_bmax`,
//! where `X_bi` reads "X ≥ i". See [`booleanize`][crate::booleanize] for the details.
//!
//! ```rust
//! use mdd_booleanize::booleanize::booleanize;
//! use mdd_booleanize::model::{LogicalModel, NodeInfo};
//! use mdd_booleanize::types::Var;
//!
//! // A is Boolean, X in {0, 1, 2} follows A: X = 2 * A
//! let core = vec![NodeInfo::new("A"), NodeInfo::with_max("X", 2)];
//! let model = LogicalModel::from_components(core, 3, |mdd| {
//!     let a = mdd.mk_var(Var::new(0));
//!     let x = mdd.mk_node(Var::new(0), &[mdd.mk_leaf(0), mdd.mk_leaf(2)]);
//!     vec![a, x]
//! })
//! .unwrap();
//!
//! let boolean = booleanize(&model).unwrap();
//! assert!(boolean.is_boolean());
//! assert_eq!(boolean.components().len(), 3);
//!
//! // With A set, both proxies of X are targeted (X_b2 once X_b1 is set).
//! assert_eq!(boolean.target_values(&[1, 1, 0]), vec![1, 1, 1]);
//! assert_eq!(boolean.target_values(&[1, 0, 0]), vec![1, 1, 0]);
//! ```
//!
//! ## Core Components
//!
//! - **[`mdd`]**: The manager, with node construction and reference counting.
//! - **[`apply`]**: Min/max combination of functions.
//! - **[`model`]**: Logical models: components and their functions.
//! - **[`booleanize`]**: The Boolean mapping.
//! - **[`perturbation`]**: Fixed-value perturbations.
//! - **[`simulation`]**: Updating policies and state-space exploration.

pub mod apply;
pub mod booleanize;
pub mod cache;
pub mod count;
pub mod error;
pub mod mdd;
pub mod model;
pub mod node;
pub mod perturbation;
pub mod reference;
pub mod simulation;
pub mod table;
pub mod types;
pub mod utils;
