//! `hdag merge`: combine DAG files into one history DAG.

use std::path::{Path, PathBuf};

use hdag_core::{Madag, Merge};

use crate::error::CliError;
use crate::io::{read_madag, write_madag};

pub fn run(files: &[PathBuf], output: &Path) -> Result<(), CliError> {
    let inputs: Vec<Madag> = files
        .iter()
        .map(|f| read_madag(f))
        .collect::<Result<_, _>>()?;
    let views: Vec<&Madag> = inputs.iter().collect();

    let mut merge = Merge::new(views[0].reference_sequence().clone());
    merge.add_dags(&views)?;
    merge.compute_result_edge_mutations()?;

    write_madag(output, merge.result())?;
    println!(
        "merged {} inputs: {} nodes, {} edges",
        files.len(),
        merge.result().node_count(),
        merge.result().edge_count()
    );
    Ok(())
}
