use crate::{compute_indicators, trim_to_display, EngineError, FetchWindow, LookbackPolicy};
use chrono::NaiveDate;
use serde::Serialize;
use stockview_core::{DataProvider, DisplayPeriod, IndicatorTable};
use tracing::{info, warn};

/// The display-ready result of one chart request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTable {
    pub period: DisplayPeriod,
    pub window: FetchWindow,
    /// Bars fetched, lookback included.
    pub fetched_bars: usize,
    pub table: IndicatorTable,
}

/// Fetch with lookback, compute every indicator, then cut to the display range.
pub async fn build_display_table(
    provider: &dyn DataProvider,
    symbol: &str,
    period: DisplayPeriod,
    today: NaiveDate,
    policy: LookbackPolicy,
) -> Result<DisplayTable, EngineError> {
    let window = FetchWindow::plan(today, period, policy);
    info!(
        %symbol,
        %period,
        fetch_start = %window.fetch_start,
        display_start = %window.display_start,
        "Loading series"
    );

    let series = provider
        .load_series(symbol, window.fetch_start, window.end)
        .await?;
    if series.is_empty() {
        warn!(%symbol, "No bars returned for requested range");
        return Err(EngineError::EmptyInput {
            symbol: symbol.to_string(),
        });
    }

    let full = compute_indicators(&series)?;
    let fetched_bars = full.len();
    let table = trim_to_display(full, window.display_start);

    info!(%symbol, fetched = fetched_bars, shown = table.len(), "Built display table");

    Ok(DisplayTable {
        period,
        window,
        fetched_bars,
        table,
    })
}
