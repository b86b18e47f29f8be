//! `hdag rf`: summed Robinson-Foulds distance against a reference DAG.

use std::path::Path;

use hdag_core::{Madag, MaxSumRfDistance, Merge, SubtreeWeight, SumRfDistance, WeightError};

use crate::error::CliError;
use crate::io::read_madag;

pub fn run(file: &Path, reference: &Path, max: bool) -> Result<(), CliError> {
    let subject_madag = read_madag(file)?;
    let reference_madag = read_madag(reference)?;

    let subject = single_merge(&subject_madag)?;
    let reference = single_merge(&reference_madag)?;
    let root = subject
        .result()
        .root()
        .ok_or(CliError::Weight(WeightError::MissingUa))?;

    if max {
        let ops = MaxSumRfDistance::new(&reference, &subject)?;
        let shift = ops.shift_sum().clone();
        let mut engine = SubtreeWeight::new(subject.result(), ops);
        let distance = engine.compute_weight_below(root)? + shift;
        println!("max summed rf distance: {distance}");
    } else {
        let ops = SumRfDistance::new(&reference, &subject)?;
        let shift = ops.shift_sum().clone();
        let mut engine = SubtreeWeight::new(subject.result(), ops);
        let distance = engine.compute_weight_below(root)? + shift;
        println!("summed rf distance: {distance}");
    }
    Ok(())
}

fn single_merge(madag: &Madag) -> Result<Merge, CliError> {
    let mut merge = Merge::new(madag.reference_sequence().clone());
    merge.add_dags(&[madag])?;
    Ok(merge)
}
