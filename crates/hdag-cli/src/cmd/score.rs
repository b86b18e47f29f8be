//! `hdag score`: minimum parsimony score, optionally with the full
//! distribution.

use std::path::Path;

use hdag_core::{ParsimonyScore, SubtreeWeight, WeightAccumulator, WeightError};

use crate::error::CliError;
use crate::io::read_madag;

pub fn run(file: &Path, distribution: bool) -> Result<(), CliError> {
    let madag = read_madag(file)?;
    let root = madag.root().ok_or(CliError::Weight(WeightError::MissingUa))?;

    let mut engine = SubtreeWeight::new(&madag, ParsimonyScore);
    let best = engine.compute_weight_below(root)?;
    println!("minimum parsimony: {best}");
    let optimal = engine.min_weight_count(root)?;
    println!("trees attaining it: {optimal}");

    if distribution {
        let mut accumulated =
            SubtreeWeight::new(&madag, WeightAccumulator::new(ParsimonyScore));
        let counter = accumulated.compute_weight_below(root)?;
        println!("distribution: {counter}");
    }
    Ok(())
}
