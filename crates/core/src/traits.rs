use crate::models::*;
use async_trait::async_trait;
use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Data Provider Trait
// ---------------------------------------------------------------------------

/// Errors that can occur during data operations.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Data not found: {0}")]
    NotFound(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid series: {0}")]
    InvalidSeries(#[from] SeriesError),
    #[error(transparent)]
    InvalidSymbol(#[from] SymbolError),
}

/// Supplies raw daily bars for a symbol.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Load the daily series for `symbol` with bars dated within `start..=end`.
    ///
    /// A symbol that exists but has no bars in range yields an empty series;
    /// an unknown symbol is `DataError::NotFound`.
    async fn load_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series, DataError>;

    /// List available symbols.
    async fn available_symbols(&self) -> Result<Vec<String>, DataError>;
}
