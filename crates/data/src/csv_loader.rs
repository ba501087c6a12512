use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use stockview_core::{Bar, DataError, Series};
use tracing::{debug, warn};

/// Load daily OHLCV bars from a CSV file, sorted by date.
///
/// Expected columns (case-insensitive, flexible ordering):
/// `date` (or `timestamp`, `datetime`), `open`, `high`, `low`, `close`,
/// and optionally `volume`. Extra columns such as `Adj Close` are ignored.
/// Rows with a blank or `null` price (exchange holidays in some exports) are
/// skipped.
pub fn load_bars_from_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::ParseError(format!("Failed to open CSV: {}", e)))?;

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(format!("Failed to read headers: {}", e)))?
        .clone();

    let col_map = resolve_bar_columns(&headers)?;

    let mut bars = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DataError::ParseError(format!("CSV record error: {}", e)))?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let prices = [col_map.open, col_map.high, col_map.low, col_map.close];
        if prices.iter().any(|&idx| is_missing(field(idx))) {
            skipped += 1;
            continue;
        }

        let date = parse_date(field(col_map.date))?;
        let open = parse_price(field(col_map.open), "open")?;
        let high = parse_price(field(col_map.high), "high")?;
        let low = parse_price(field(col_map.low), "low")?;
        let close = parse_price(field(col_map.close), "close")?;
        let volume = match col_map.volume {
            Some(idx) if !is_missing(field(idx)) => parse_volume(field(idx))?,
            _ => 0,
        };

        if high < low {
            warn!(%date, line = line + 2, "High below low in CSV row");
        }

        bars.push(Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "Skipped rows with missing prices");
    }
    debug!(path = %path.display(), bars = bars.len(), "Loaded CSV bars");

    // Sort by date
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Load a CSV file as a validated [`Series`]. Duplicate dates are rejected.
pub fn load_series_from_csv(path: &Path, symbol: &str) -> Result<Series, DataError> {
    let bars = load_bars_from_csv(path)?;
    Ok(Series::new(symbol, bars)?)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

struct BarColumnMap {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

fn resolve_bar_columns(headers: &csv::StringRecord) -> Result<BarColumnMap, DataError> {
    let date = find_column(headers, &["date", "timestamp", "datetime", "time"])
        .ok_or_else(|| DataError::ParseError("No date column found".into()))?;
    let open = find_column(headers, &["open", "o"])
        .ok_or_else(|| DataError::ParseError("No open column found".into()))?;
    let high = find_column(headers, &["high", "h"])
        .ok_or_else(|| DataError::ParseError("No high column found".into()))?;
    let low = find_column(headers, &["low", "l"])
        .ok_or_else(|| DataError::ParseError("No low column found".into()))?;
    let close = find_column(headers, &["close", "c"])
        .ok_or_else(|| DataError::ParseError("No close column found".into()))?;
    let volume = find_column(headers, &["volume", "vol", "v"]);

    Ok(BarColumnMap {
        date,
        open,
        high,
        low,
        close,
        volume,
    })
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let h = header.trim().to_lowercase();
        names.iter().any(|name| h == *name)
    })
}

fn is_missing(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("nan")
}

fn parse_price(s: &str, field: &str) -> Result<Decimal, DataError> {
    let value = Decimal::from_str(s.trim())
        .or_else(|_| Decimal::from_scientific(s.trim()))
        .map_err(|e| DataError::ParseError(format!("Failed to parse {} '{}': {}", field, s, e)))?;
    if value <= Decimal::ZERO {
        return Err(DataError::ParseError(format!(
            "Non-positive {} '{}'",
            field, s
        )));
    }
    Ok(value)
}

/// Volumes are whole shares, but some exports write them as `12345.0`.
fn parse_volume(s: &str) -> Result<u64, DataError> {
    let s = s.trim();
    if let Ok(v) = s.parse::<u64>() {
        return Ok(v);
    }
    Decimal::from_str(s)
        .ok()
        .filter(|d| d.fract().is_zero())
        .and_then(|d| d.to_u64())
        .ok_or_else(|| DataError::ParseError(format!("Failed to parse volume '{}'", s)))
}

fn parse_date(s: &str) -> Result<NaiveDate, DataError> {
    let s = s.trim();

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];
    for fmt in &date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    // Timestamps keep their local calendar date
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ];
    for fmt in &datetime_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.date_naive());
    }

    // Unix timestamp (seconds)
    if let Ok(ts) = s.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(ts, 0) {
            return Ok(dt.date_naive());
        }
    }

    Err(DataError::ParseError(format!("Unable to parse date: '{}'", s)))
}
