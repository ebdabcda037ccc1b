use std::borrow::Cow;
use std::collections::HashMap;

use num_bigint::BigUint;
use test_log::test;

use mdd_booleanize::booleanize::{booleanize, Booleanizer};
use mdd_booleanize::model::{LogicalModel, NodeInfo};
use mdd_booleanize::perturbation::{FixedValuePerturbation, Perturbation};
use mdd_booleanize::reference::Ref;
use mdd_booleanize::simulation::{
    AsynchronousUpdater, DeterministicUpdater, MultipleSuccessorsSimulation,
    MultipleSuccessorsUpdater, SingleSuccessorSimulation, State, SynchronousUpdater,
};
use mdd_booleanize::types::Var;

/// A = !X_ge2, B = A & (X >= 1), X in {0, 1, 2} = A + B
fn cascade() -> LogicalModel {
    let core = vec![NodeInfo::new("A"), NodeInfo::new("B"), NodeInfo::with_max("X", 2)];
    LogicalModel::from_components(core, 3, |mdd| {
        let a = Var::new(0);
        let b = Var::new(1);
        let x = Var::new(2);
        let fa = mdd.mk_node(x, &[Ref::ONE, Ref::ONE, Ref::ZERO]);
        let x_ge1 = mdd.mk_node(x, &[Ref::ZERO, Ref::ONE, Ref::ONE]);
        let fb = mdd.mk_node(a, &[Ref::ZERO, x_ge1]);
        mdd.free(x_ge1);
        let b_low = mdd.mk_node(b, &[Ref::ZERO, Ref::leaf(1)]);
        let b_high = mdd.mk_node(b, &[Ref::leaf(1), Ref::leaf(2)]);
        let fx = mdd.mk_node_free(a, &[b_low, b_high]);
        vec![fa, fb, fx]
    })
    .unwrap()
}

/// Two multi-valued components, X in {0, 1, 2} and Y in {0, 1, 2, 3}:
/// Y = X + 1, X = 2 - Y / 2.
fn two_levels() -> LogicalModel {
    let core = vec![NodeInfo::with_max("X", 2), NodeInfo::with_max("Y", 3)];
    LogicalModel::from_components(core, 4, |mdd| {
        let fx = mdd.mk_node(
            Var::new(1),
            &[Ref::leaf(2), Ref::leaf(2), Ref::leaf(1), Ref::leaf(1)],
        );
        let fy = mdd.mk_node(Var::new(0), &[Ref::leaf(1), Ref::leaf(2), Ref::leaf(3)]);
        vec![fx, fy]
    })
    .unwrap()
}

/// All states of the core components of `model`.
fn all_states(model: &LogicalModel) -> Vec<State> {
    let mut states = vec![vec![]];
    for node in model.components() {
        states = states
            .into_iter()
            .flat_map(|s| {
                (0..=node.max()).map(move |v| {
                    let mut s = s.clone();
                    s.push(v);
                    s
                })
            })
            .collect();
    }
    states
}

/// Thermometer encoding of a state of `model`.
fn encode(model: &LogicalModel, state: &[u8]) -> State {
    let mut encoded = Vec::new();
    for (node, &value) in model.components().iter().zip(state) {
        if node.is_boolean() {
            encoded.push(value);
        } else {
            encoded.extend((1..=node.max()).map(|i| (value >= i) as u8));
        }
    }
    encoded
}

/// A Boolean state is valid if the proxies of each component of `model` never go
/// from clear to set.
fn is_valid(model: &LogicalModel, state: &[u8]) -> bool {
    let mut offset = 0;
    for node in model.components() {
        let width = node.max().max(1) as usize;
        let proxies = &state[offset..offset + width];
        if proxies.windows(2).any(|w| w[0] < w[1]) {
            return false;
        }
        offset += width;
    }
    offset == state.len()
}

#[test]
fn test_boolean_result_is_fixed_point() {
    let model = cascade();
    let boolean = booleanize(&model).unwrap();
    assert!(matches!(boolean, Cow::Owned(_)));
    let again = booleanize(&boolean).unwrap();
    match again {
        Cow::Borrowed(m) => assert!(std::ptr::eq(m, &*boolean)),
        Cow::Owned(_) => panic!("a Boolean model must be returned as is"),
    }
}

#[test]
fn test_domains() {
    for model in [cascade(), two_levels()] {
        let boolean = booleanize(&model).unwrap();
        let expected: usize = model.components().iter().map(|n| n.max() as usize).sum();
        assert_eq!(boolean.components().len(), expected);
        assert!(boolean.components().iter().all(NodeInfo::is_boolean));
        assert!(boolean.mdd().variables().iter().all(|v| v.nbval == 2));
        assert_eq!(boolean.mdd().leaf_count(), 2);
    }
}

#[test]
fn test_component_names() {
    let boolean = booleanize(&two_levels()).unwrap().into_owned();
    let ids: Vec<_> = boolean.components().iter().map(|n| n.id()).collect();
    assert_eq!(ids, ["X_b1", "X_b2", "Y_b1", "Y_b2", "Y_b3"]);
}

#[test]
fn test_transform_matches_thresholds() {
    for model in [cascade(), two_levels()] {
        let mut booleanizer = Booleanizer::new(&model).unwrap();
        let target = booleanizer.target().clone();

        for (node, &f) in model.components().iter().zip(model.functions()) {
            for v in 1..=node.max() {
                let bf = booleanizer.transform(f, v).unwrap();
                for state in all_states(&model) {
                    let source_value = model.mdd().reach(f, &model.valuation(&state));
                    let mut by_key = HashMap::new();
                    for (n, &value) in model.components().iter().zip(&state) {
                        if n.is_boolean() {
                            by_key.insert(n.id().to_string(), value);
                        } else {
                            for i in 1..=n.max() {
                                by_key.insert(format!("{}_b{}", n.id(), i), (value >= i) as u8);
                            }
                        }
                    }
                    let valuation: Vec<u8> = target
                        .variables()
                        .iter()
                        .map(|var| by_key[&var.key])
                        .collect();
                    assert_eq!(
                        target.reach(bf, &valuation),
                        (source_value >= v) as u8,
                        "{} >= {} in {:?}",
                        node,
                        v,
                        state
                    );
                }
                target.free(bf);
            }
        }
    }
}

#[test]
fn test_synchronous_dynamics_are_preserved() {
    for model in [cascade(), two_levels()] {
        let boolean = booleanize(&model).unwrap();
        let source = SynchronousUpdater::new(&model);
        let mapped = SynchronousUpdater::new(&boolean);
        for state in all_states(&model) {
            let expected = source.successor(&state).map(|s| encode(&model, &s));
            assert_eq!(mapped.successor(&encode(&model, &state)), expected, "from {:?}", state);
        }
    }
}

#[test]
fn test_asynchronous_dynamics_are_preserved() {
    for model in [cascade(), two_levels()] {
        let boolean = booleanize(&model).unwrap();
        let source = AsynchronousUpdater::new(&model);
        let mapped = AsynchronousUpdater::new(&boolean);
        for state in all_states(&model) {
            let expected: Vec<State> = source
                .successors(&state)
                .iter()
                .map(|s| encode(&model, s))
                .collect();
            assert_eq!(mapped.successors(&encode(&model, &state)), expected, "from {:?}", state);
        }
    }
}

#[test]
fn test_reachable_states_are_valid() {
    let model = two_levels();
    let boolean = booleanize(&model).unwrap();
    let init: Vec<State> = all_states(&model).iter().map(|s| encode(&model, s)).collect();

    let updater = AsynchronousUpdater::new(&boolean);
    let simulation = MultipleSuccessorsSimulation::from_states(updater, init, 1 << 10);
    for state in &simulation {
        assert!(is_valid(&model, &state), "{:?} is not a valid encoding", state);
    }
    let updater = SynchronousUpdater::new(&boolean);
    let simulation = MultipleSuccessorsSimulation::new(updater, vec![0; 5], 1 << 10);
    for state in &simulation {
        assert!(is_valid(&model, &state), "{:?} is not a valid encoding", state);
    }
}

#[test]
fn test_stable_states_are_preserved() {
    let model = cascade();
    let boolean = booleanize(&model).unwrap();
    let updater = AsynchronousUpdater::new(&model);
    let mut source: Vec<State> = all_states(&model)
        .into_iter()
        .filter(|s| updater.successors(s).is_empty())
        .map(|s| encode(&model, &s))
        .collect();
    source.sort();
    let init: Vec<State> = all_states(&model).iter().map(|s| encode(&model, s)).collect();
    let mapped_updater = AsynchronousUpdater::new(&boolean);
    let mut mapped =
        MultipleSuccessorsSimulation::from_states(mapped_updater, init, 1 << 10).stable_states();
    mapped.sort();
    assert_eq!(mapped, source);
}

#[test]
fn test_shared_subgraphs_stay_shared() {
    // A = A ? (B & X >= 1) : 0, B = A ? 1 : (B & X >= 1)
    let core = vec![NodeInfo::new("A"), NodeInfo::new("B"), NodeInfo::with_max("X", 2)];
    let model = LogicalModel::from_components(core, 3, |mdd| {
        let x_ge1 = mdd.mk_node(Var::new(2), &[Ref::ZERO, Ref::ONE, Ref::ONE]);
        let g = mdd.mk_node_free(Var::new(1), &[Ref::ZERO, x_ge1]);
        let fa = mdd.mk_node(Var::new(0), &[Ref::ZERO, g]);
        let fb = mdd.mk_node(Var::new(0), &[g, Ref::ONE]);
        mdd.free(g);
        vec![fa, fb, Ref::ZERO]
    })
    .unwrap();

    let boolean = booleanize(&model).unwrap();
    let mdd = boolean.mdd();
    let fa = boolean.functions()[0];
    let fb = boolean.functions()[1];
    let shared = mdd.children(fa)[1];
    assert!(!shared.is_leaf());
    assert_eq!(mdd.children(fb)[0], shared);
}

#[test]
fn test_and_of_booleans_keeps_its_shape() {
    // C = A & B, with a multi-valued readout elsewhere forcing the mapping.
    let core = vec![
        NodeInfo::new("A"),
        NodeInfo::new("B"),
        NodeInfo::new("C"),
        NodeInfo::with_max("X", 2),
    ];
    let model = LogicalModel::from_components(core, 3, |mdd| {
        let a = mdd.mk_var(Var::new(0));
        let b = mdd.mk_var(Var::new(1));
        let c = mdd.apply_and(a, b);
        mdd.free(a);
        mdd.free(b);
        vec![Ref::ONE, Ref::ONE, c, Ref::ZERO]
    })
    .unwrap();

    let boolean = booleanize(&model).unwrap();
    let source = model.mdd();
    let target = boolean.mdd();
    assert_eq!(
        source.to_bracket_string(model.functions()[2]),
        target.to_bracket_string(boolean.functions()[2])
    );
    assert_eq!(target.size(boolean.functions()[2]), source.size(model.functions()[2]));
}

#[test]
fn test_count_after_mapping() {
    let model = two_levels();
    // Y = X + 1 reaches 2 on the 4 valuations with X == 1.
    let fy = model.functions()[1];
    assert_eq!(model.mdd().count(fy, 2), BigUint::from(4u32));

    let boolean = booleanize(&model).unwrap();
    let f = boolean.functions()[4];
    // Y_b3 = X_b1 & X_b2 & Y_b2, leaving Y_b1 and Y_b3 free.
    assert_eq!(boolean.mdd().count(f, 1), BigUint::from(4u32));
    assert_eq!(boolean.mdd().count(f, 0), BigUint::from(28u32));
}

#[test]
fn test_perturbation_before_mapping() {
    let model = two_levels();
    let knockout = FixedValuePerturbation::knockout(model.components()[0].clone());
    let perturbed = knockout.apply(&model).unwrap();
    let boolean = booleanize(&perturbed).unwrap();
    let mdd = boolean.mdd();

    // X_b1 = 0 | X_b2, X_b2 = 0 & X_b1
    let b2 = mdd.variable_for_key("X_b2").unwrap();
    let expected = mdd.mk_var(b2);
    assert_eq!(boolean.functions()[0], expected);
    assert_eq!(boolean.functions()[1], Ref::ZERO);
    mdd.free(expected);

    // From X = 2, the encoding walks down to 0.
    let trace: Vec<State> = SingleSuccessorSimulation::new(
        SynchronousUpdater::new(&boolean),
        vec![1, 1, 0, 0, 0],
        10,
    )
    .iter()
    .map(|s| s[..2].to_vec())
    .take(3)
    .collect();
    assert_eq!(trace, vec![vec![1, 1], vec![1, 0], vec![0, 0]]);
}
