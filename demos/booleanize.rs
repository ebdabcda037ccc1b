use clap::Parser;

use mdd_booleanize::booleanize::booleanize;
use mdd_booleanize::model::{LogicalModel, NodeInfo};
use mdd_booleanize::perturbation::{FixedValuePerturbation, Perturbation};
use mdd_booleanize::reference::Ref;
use mdd_booleanize::simulation::{
    AsynchronousUpdater, MultipleSuccessorsSimulation, SingleSuccessorSimulation,
    SynchronousUpdater,
};
use mdd_booleanize::types::Var;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Initial value of the input A.
    #[arg(value_name = "INT", default_value = "1")]
    input: u8,

    /// Maximal number of synchronous steps.
    #[clap(long, value_name = "INT", default_value = "10")]
    steps: usize,

    /// Knock out a component before the mapping.
    #[clap(long, value_name = "ID")]
    knockout: Option<String>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    // A = A, B = (X == 2), X = 2 * A
    let core = vec![NodeInfo::new("A"), NodeInfo::new("B"), NodeInfo::with_max("X", 2)];
    let mut model = LogicalModel::from_components(core, 3, |mdd| {
        let a = mdd.mk_var(Var::new(0));
        let b = mdd.mk_node(Var::new(2), &[Ref::ZERO, Ref::ZERO, Ref::ONE]);
        let x = mdd.mk_node(Var::new(0), &[Ref::ZERO, Ref::leaf(2)]);
        vec![a, b, x]
    })?;

    if let Some(id) = &args.knockout {
        let index = model
            .component_index(id)
            .ok_or_else(|| color_eyre::eyre::eyre!("unknown component {}", id))?;
        let perturbation = FixedValuePerturbation::knockout(model.components()[index].clone());
        perturbation.update(&mut model)?;
        println!("knocked out {}", id);
    }

    println!("mdd = {:?}", model.mdd());
    for (node, &f) in model.components().iter().zip(model.functions()) {
        println!("{} = {}", node, model.mdd().to_bracket_string(f));
    }

    let boolean = booleanize(&model)?;
    println!("boolean mdd = {:?}", boolean.mdd());
    for (node, &f) in boolean.components().iter().zip(boolean.functions()) {
        println!("{} = {}", node, boolean.mdd().to_bracket_string(f));
    }

    let mut init = vec![0; boolean.components().len()];
    init[0] = args.input;

    println!("Synchronous trace from {:?}:", init);
    let updater = SynchronousUpdater::new(&boolean);
    let simulation = SingleSuccessorSimulation::new(updater, init.clone(), args.steps);
    for state in &simulation {
        println!("  {:?}", state);
    }

    let updater = AsynchronousUpdater::new(&boolean);
    let simulation = MultipleSuccessorsSimulation::new(updater, init, 1 << 16);
    println!("Asynchronous stable states: {:?}", simulation.stable_states());

    Ok(())
}
