//! Command-line argument definitions for the `hdag` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// History-DAG phylogenetics toolkit.
#[derive(Debug, Parser)]
#[command(name = "hdag", version, about = "Merge, score, trim and sample history DAGs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// The `hdag` subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print node, edge, leaf and tree counts of a DAG file.
    Inspect {
        /// The JSON DAG file to inspect.
        file: PathBuf,
    },
    /// Merge DAG files into one history DAG.
    Merge {
        /// The JSON DAG files to merge; all must share one reference
        /// sequence and be UA-rooted.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Where to write the merged DAG.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Compute the minimum parsimony score of a DAG.
    Score {
        /// The JSON DAG file to score.
        file: PathBuf,
        /// Also print the full parsimony distribution over all trees.
        #[arg(long)]
        distribution: bool,
    },
    /// Trim a DAG to its minimum-parsimony trees.
    Trim {
        /// The JSON DAG file to trim.
        file: PathBuf,
        /// Where to write the trimmed DAG.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Sample one tree from a DAG.
    Sample {
        /// The JSON DAG file to sample from.
        file: PathBuf,
        /// Where to write the sampled tree.
        #[arg(short, long)]
        output: PathBuf,
        /// RNG seed for reproducible sampling; nondeterministic when
        /// omitted.
        #[arg(long)]
        seed: Option<u64>,
        /// How edges are chosen within each clade.
        #[arg(long, value_enum, default_value_t)]
        strategy: SampleStrategy,
    },
    /// Compute the summed Robinson-Foulds distance of a DAG's trees
    /// against a reference DAG.
    Rf {
        /// The subject JSON DAG file.
        file: PathBuf,
        /// The reference JSON DAG file.
        reference: PathBuf,
        /// Report the maximum over the subject's trees instead of the
        /// minimum.
        #[arg(long)]
        max: bool,
    },
}

/// Edge-selection strategies for `hdag sample`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SampleStrategy {
    /// Choose uniformly among each clade's edges.
    #[default]
    Uniform,
    /// Choose each tree with equal probability (weighted by subtree tree
    /// counts).
    TreeUniform,
    /// Choose uniformly among each clade's minimum-parsimony edges.
    MinWeight,
    /// Choose each minimum-parsimony tree with equal probability.
    MinWeightUniform,
}
