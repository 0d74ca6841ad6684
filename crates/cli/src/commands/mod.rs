//! Command implementations.

pub mod cart;
pub mod catalog;

use std::path::Path;

use techmart_core::{Catalog, CatalogError};
use thiserror::Error;

/// Errors a command can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to read {path}: {source}")]
    ReadCatalog {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("invalid event {input:?}: {reason}")]
    InvalidEvent { input: String, reason: String },
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Load a catalog file, or the demo catalog when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, CommandError> {
    let Some(path) = path else {
        tracing::debug!("Using built-in demo catalog");
        return Ok(Catalog::demo());
    };

    tracing::info!(path = %path.display(), "Loading catalog");
    let json = std::fs::read_to_string(path).map_err(|source| CommandError::ReadCatalog {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Catalog::from_json(&json)?)
}
