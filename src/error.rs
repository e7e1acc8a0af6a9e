// ============================================================================
// Erreurs typées : fetch, normalisation, export
// ============================================================================
// Chaque erreur ne termine que l'action en cours : la session l'attrape dans
// App::apply_outcome et affiche un diagnostic.
// ============================================================================

use thiserror::Error;

/// Failure while talking to the market-data provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("symbol is empty")]
    EmptySymbol,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider error {code}: {description}")]
    Provider { code: String, description: String },

    #[error("unexpected response format: {0}")]
    ResponseFormat(String),
}

/// Failure while turning a raw table into a normalized table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no data returned for {symbol}")]
    EmptyResult { symbol: String },

    /// Internal invariant: every normalized column has `expected` values.
    #[error("internal error: column {column} has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Failure while writing the CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer could not be flushed: {0}")]
    Buffer(String),

    #[error("could not write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
