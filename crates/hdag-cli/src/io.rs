//! File input/output for DAG JSON documents.

use std::path::Path;

use hdag_core::{Madag, from_json, to_json};

use crate::error::CliError;

/// Reads and validates a MADAG from a JSON file.
pub fn read_madag(path: &Path) -> Result<Madag, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_json(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a MADAG to a JSON file.
pub fn write_madag(path: &Path, madag: &Madag) -> Result<(), CliError> {
    let text = to_json(madag).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
