//! CLI error type with exit codes.

use std::fmt;
use std::path::PathBuf;

use hdag_core::{JsonError, MergeError, RfError, WeightError};

/// Errors surfaced to the user by the `hdag` binary.
#[derive(Debug)]
pub enum CliError {
    /// Reading or writing a file failed.
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// A DAG file could not be parsed or validated.
    Json {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: JsonError,
    },
    /// Merging the inputs failed.
    Merge(MergeError),
    /// A weight computation or sampling operation failed.
    Weight(WeightError),
    /// Preparing the RF distance table failed.
    Rf(RfError),
}

impl CliError {
    /// The message printed to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::Io { path, source } => format!("{}: {source}", path.display()),
            Self::Json { path, source } => format!("{}: {source}", path.display()),
            Self::Merge(e) => format!("merge failed: {e}"),
            Self::Weight(e) => format!("computation failed: {e}"),
            Self::Rf(e) => format!("rf distance failed: {e}"),
        }
    }

    /// The process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { .. } => 2,
            Self::Json { .. } => 3,
            Self::Merge(_) | Self::Weight(_) | Self::Rf(_) => 4,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Merge(e) => Some(e),
            Self::Weight(e) => Some(e),
            Self::Rf(e) => Some(e),
        }
    }
}

impl From<MergeError> for CliError {
    fn from(e: MergeError) -> Self {
        Self::Merge(e)
    }
}

impl From<WeightError> for CliError {
    fn from(e: WeightError) -> Self {
        Self::Weight(e)
    }
}

impl From<RfError> for CliError {
    fn from(e: RfError) -> Self {
        Self::Rf(e)
    }
}
