//! `hdag sample`: draw one tree from a DAG.

use std::path::Path;

use hdag_core::{Madag, NodeId, ParsimonyScore, SubtreeWeight, TreeCount, WeightError, WeightOps};

use crate::cli::SampleStrategy;
use crate::error::CliError;
use crate::io::{read_madag, write_madag};

pub fn run(
    file: &Path,
    output: &Path,
    seed: Option<u64>,
    strategy: SampleStrategy,
) -> Result<(), CliError> {
    let madag = read_madag(file)?;
    let (sampled, _) = draw(&madag, seed, strategy)?;
    write_madag(output, &sampled)?;
    println!(
        "sampled tree with {} nodes, {} edges",
        sampled.node_count(),
        sampled.edge_count()
    );
    Ok(())
}

fn draw(
    madag: &Madag,
    seed: Option<u64>,
    strategy: SampleStrategy,
) -> Result<(Madag, Vec<NodeId>), WeightError> {
    match strategy {
        SampleStrategy::Uniform => engine(madag, TreeCount, seed).sample_tree(),
        SampleStrategy::TreeUniform => engine(madag, TreeCount, seed).uniform_sample_tree(),
        SampleStrategy::MinWeight => {
            engine(madag, ParsimonyScore, seed).min_weight_sample_tree()
        }
        SampleStrategy::MinWeightUniform => {
            engine(madag, ParsimonyScore, seed).min_weight_uniform_sample_tree()
        }
    }
}

fn engine<Ops: WeightOps>(madag: &Madag, ops: Ops, seed: Option<u64>) -> SubtreeWeight<'_, Ops> {
    match seed {
        Some(seed) => SubtreeWeight::with_seed(madag, ops, seed),
        None => SubtreeWeight::new(madag, ops),
    }
}
