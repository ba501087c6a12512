use stockview_core::DataError;

/// Errors from building an indicator table.
///
/// Short history is not an error: it shows up as `None` cells.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No data for '{symbol}'")]
    EmptyInput { symbol: String },
    #[error(transparent)]
    Data(#[from] DataError),
}
