//! `hdag trim`: keep only the minimum-parsimony trees.

use std::path::Path;

use hdag_core::{ParsimonyScore, SubtreeWeight};

use crate::error::CliError;
use crate::io::{read_madag, write_madag};

pub fn run(file: &Path, output: &Path) -> Result<(), CliError> {
    let madag = read_madag(file)?;
    let mut engine = SubtreeWeight::new(&madag, ParsimonyScore);
    let trimmed = engine.trim_to_min_weight()?;
    write_madag(output, &trimmed)?;
    println!(
        "trimmed to {} nodes, {} edges",
        trimmed.node_count(),
        trimmed.edge_count()
    );
    Ok(())
}
