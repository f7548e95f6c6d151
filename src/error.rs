use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. Everything recoverable (unparseable tax strings, historical
/// lookup misses, unmapped zips) is handled in place and logged instead.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("missing required parameters: {0}. Provide them via CLI or the config file.")]
    MissingParameters(String),

    #[error("could not read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("listings database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("property with address '{0}' not found in the listings database")]
    PropertyNotFound(String),

    #[error("purchase price missing or invalid for '{0}'")]
    MissingPrice(String),
}
