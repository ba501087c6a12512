use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// Errors produced when normalizing user-supplied ticker input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("Symbol must not be empty")]
    Empty,
    #[error("Invalid symbol '{0}'")]
    Invalid(String),
}

/// Check that `symbol` is a plain ticker.
///
/// Tickers are ASCII letters, digits and `.^=-` (`7203.T`, `^N225`, `JPY=X`,
/// `BRK-B`). Providers use the symbol as a file or key name, so anything that
/// could read as a path (a separator, a leading dot, `..`) is rejected.
pub fn validate_symbol(symbol: &str) -> Result<(), SymbolError> {
    if symbol.is_empty() {
        return Err(SymbolError::Empty);
    }
    let plain = symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-'));
    if !plain || symbol.starts_with('.') || symbol.contains("..") {
        return Err(SymbolError::Invalid(symbol.to_string()));
    }
    Ok(())
}

/// Normalize a ticker as typed by a user.
///
/// A four-digit numeric code is a Tokyo Stock Exchange listing and gets the
/// `.T` suffix (`7203` → `7203.T`). Anything else is passed through trimmed,
/// provided it is a valid ticker.
pub fn normalize_symbol(input: &str) -> Result<String, SymbolError> {
    let trimmed = input.trim();
    validate_symbol(trimmed)?;
    if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        Ok(format!("{}.T", trimmed))
    } else {
        Ok(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Market Data
// ---------------------------------------------------------------------------

/// One trading day of OHLCV data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// Precondition violations detected while building a [`Series`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeriesError {
    #[error("Bars out of order at index {index}: {date} follows {previous}")]
    Unsorted {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },
    #[error("Duplicate bar for {date} at index {index}")]
    DuplicateDate { index: usize, date: NaiveDate },
}

/// A daily bar series for one symbol, ascending by date with unique dates.
///
/// The only way to build one is [`Series::new`], which checks the ordering,
/// and nothing hands out mutable access afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: String,
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, pair) in bars.windows(2).enumerate() {
            let (previous, date) = (pair[0].date, pair[1].date);
            if date == previous {
                return Err(SeriesError::DuplicateDate {
                    index: index + 1,
                    date,
                });
            }
            if date < previous {
                return Err(SeriesError::Unsorted {
                    index: index + 1,
                    previous,
                    date,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

// ---------------------------------------------------------------------------
// Display Period
// ---------------------------------------------------------------------------

/// The chart ranges a user can choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayPeriod {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl DisplayPeriod {
    pub const ALL: [DisplayPeriod; 6] = [
        DisplayPeriod::OneMonth,
        DisplayPeriod::ThreeMonths,
        DisplayPeriod::SixMonths,
        DisplayPeriod::OneYear,
        DisplayPeriod::TwoYears,
        DisplayPeriod::FiveYears,
    ];

    /// Calendar days covered by the period.
    pub fn days(&self) -> i64 {
        match self {
            DisplayPeriod::OneMonth => 30,
            DisplayPeriod::ThreeMonths => 90,
            DisplayPeriod::SixMonths => 180,
            DisplayPeriod::OneYear => 365,
            DisplayPeriod::TwoYears => 730,
            DisplayPeriod::FiveYears => 1825,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DisplayPeriod::OneMonth => "1mo",
            DisplayPeriod::ThreeMonths => "3mo",
            DisplayPeriod::SixMonths => "6mo",
            DisplayPeriod::OneYear => "1y",
            DisplayPeriod::TwoYears => "2y",
            DisplayPeriod::FiveYears => "5y",
        }
    }
}

impl fmt::Display for DisplayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown display period '{0}' (expected one of 1mo, 3mo, 6mo, 1y, 2y, 5y)")]
pub struct PeriodParseError(pub String);

impl FromStr for DisplayPeriod {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DisplayPeriod::ALL
            .into_iter()
            .find(|p| p.label() == wanted)
            .ok_or_else(|| PeriodParseError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Indicator Table
// ---------------------------------------------------------------------------

/// Every derived column the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Ma5,
    Ma25,
    Ma75,
    VolumeMa20,
    BbUpper,
    BbMid,
    BbLower,
    IchimokuConversion,
    IchimokuBase,
    IchimokuSpanA,
    IchimokuSpanB,
    Rsi,
    Macd,
    MacdSignal,
    MacdHist,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::Ma5,
        Column::Ma25,
        Column::Ma75,
        Column::VolumeMa20,
        Column::BbUpper,
        Column::BbMid,
        Column::BbLower,
        Column::IchimokuConversion,
        Column::IchimokuBase,
        Column::IchimokuSpanA,
        Column::IchimokuSpanB,
        Column::Rsi,
        Column::Macd,
        Column::MacdSignal,
        Column::MacdHist,
    ];

    /// Header used in tabular output.
    pub fn name(&self) -> &'static str {
        match self {
            Column::Ma5 => "MA5",
            Column::Ma25 => "MA25",
            Column::Ma75 => "MA75",
            Column::VolumeMa20 => "Volume_MA20",
            Column::BbUpper => "BB_Upper",
            Column::BbMid => "BB_Mid",
            Column::BbLower => "BB_Lower",
            Column::IchimokuConversion => "Ichimoku_Conversion",
            Column::IchimokuBase => "Ichimoku_Base",
            Column::IchimokuSpanA => "Ichimoku_SpanA",
            Column::IchimokuSpanB => "Ichimoku_SpanB",
            Column::Rsi => "RSI",
            Column::Macd => "MACD",
            Column::MacdSignal => "MACD_Signal",
            Column::MacdHist => "MACD_Hist",
        }
    }
}

/// One bar enriched with its indicator values. `None` means "no data".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub bar: Bar,
    pub ma5: Option<Decimal>,
    pub ma25: Option<Decimal>,
    pub ma75: Option<Decimal>,
    pub volume_ma20: Option<Decimal>,
    pub bb_upper: Option<Decimal>,
    pub bb_mid: Option<Decimal>,
    pub bb_lower: Option<Decimal>,
    pub ichimoku_conversion: Option<Decimal>,
    pub ichimoku_base: Option<Decimal>,
    pub ichimoku_span_a: Option<Decimal>,
    pub ichimoku_span_b: Option<Decimal>,
    pub rsi: Option<Decimal>,
    pub macd: Option<Decimal>,
    pub macd_signal: Option<Decimal>,
    pub macd_hist: Option<Decimal>,
}

impl IndicatorRow {
    /// A row with every indicator column undefined.
    pub fn empty(bar: Bar) -> Self {
        Self {
            bar,
            ma5: None,
            ma25: None,
            ma75: None,
            volume_ma20: None,
            bb_upper: None,
            bb_mid: None,
            bb_lower: None,
            ichimoku_conversion: None,
            ichimoku_base: None,
            ichimoku_span_a: None,
            ichimoku_span_b: None,
            rsi: None,
            macd: None,
            macd_signal: None,
            macd_hist: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn value(&self, column: Column) -> Option<Decimal> {
        match column {
            Column::Ma5 => self.ma5,
            Column::Ma25 => self.ma25,
            Column::Ma75 => self.ma75,
            Column::VolumeMa20 => self.volume_ma20,
            Column::BbUpper => self.bb_upper,
            Column::BbMid => self.bb_mid,
            Column::BbLower => self.bb_lower,
            Column::IchimokuConversion => self.ichimoku_conversion,
            Column::IchimokuBase => self.ichimoku_base,
            Column::IchimokuSpanA => self.ichimoku_span_a,
            Column::IchimokuSpanB => self.ichimoku_span_b,
            Column::Rsi => self.rsi,
            Column::Macd => self.macd,
            Column::MacdSignal => self.macd_signal,
            Column::MacdHist => self.macd_hist,
        }
    }

    pub fn set(&mut self, column: Column, value: Option<Decimal>) {
        let slot = match column {
            Column::Ma5 => &mut self.ma5,
            Column::Ma25 => &mut self.ma25,
            Column::Ma75 => &mut self.ma75,
            Column::VolumeMa20 => &mut self.volume_ma20,
            Column::BbUpper => &mut self.bb_upper,
            Column::BbMid => &mut self.bb_mid,
            Column::BbLower => &mut self.bb_lower,
            Column::IchimokuConversion => &mut self.ichimoku_conversion,
            Column::IchimokuBase => &mut self.ichimoku_base,
            Column::IchimokuSpanA => &mut self.ichimoku_span_a,
            Column::IchimokuSpanB => &mut self.ichimoku_span_b,
            Column::Rsi => &mut self.rsi,
            Column::Macd => &mut self.macd,
            Column::MacdSignal => &mut self.macd_signal,
            Column::MacdHist => &mut self.macd_hist,
        };
        *slot = value;
    }
}

/// A series enriched with derived columns, aligned 1:1 by date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorTable {
    pub symbol: String,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The last `n` rows (fewer when the table is shorter).
    pub fn tail(&self, n: usize) -> &[IndicatorRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }

    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }
}

// ---------------------------------------------------------------------------
// Overlay Toggles
// ---------------------------------------------------------------------------

/// Which indicator groups a consumer wants rendered.
///
/// Toggles pick columns for presentation; they never change what is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overlays {
    pub ma5: bool,
    pub ma25: bool,
    pub ma75: bool,
    pub volume_ma20: bool,
    pub bollinger: bool,
    pub ichimoku: bool,
    pub rsi: bool,
    pub macd: bool,
}

impl Default for Overlays {
    fn default() -> Self {
        Self {
            ma5: true,
            ma25: true,
            ma75: true,
            volume_ma20: true,
            bollinger: true,
            ichimoku: true,
            rsi: true,
            macd: true,
        }
    }
}

impl Overlays {
    pub fn columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| self.shows(*c))
            .collect()
    }

    pub fn shows(&self, column: Column) -> bool {
        match column {
            Column::Ma5 => self.ma5,
            Column::Ma25 => self.ma25,
            Column::Ma75 => self.ma75,
            Column::VolumeMa20 => self.volume_ma20,
            Column::BbUpper | Column::BbMid | Column::BbLower => self.bollinger,
            Column::IchimokuConversion
            | Column::IchimokuBase
            | Column::IchimokuSpanA
            | Column::IchimokuSpanB => self.ichimoku,
            Column::Rsi => self.rsi,
            Column::Macd | Column::MacdSignal | Column::MacdHist => self.macd,
        }
    }
}
