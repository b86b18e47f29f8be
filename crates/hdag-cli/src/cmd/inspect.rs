//! `hdag inspect`: summary statistics of a DAG file.

use std::path::Path;

use hdag_core::{SubtreeWeight, TreeCount};

use crate::error::CliError;
use crate::io::read_madag;

pub fn run(file: &Path) -> Result<(), CliError> {
    let madag = read_madag(file)?;
    println!("reference length: {}", madag.reference_sequence().len());
    println!("nodes: {}", madag.node_count());
    println!("edges: {}", madag.edge_count());
    println!("leaves: {}", madag.leafs().len());
    match madag.root() {
        Some(root) => {
            println!("root: {root}");
            let mut counter = SubtreeWeight::new(&madag, TreeCount);
            let trees = counter.compute_weight_below(root)?;
            println!("trees: {trees}");
        }
        None => println!("root: none"),
    }
    Ok(())
}
