use crate::EngineError;
use rust_decimal::Decimal;
use stockview_core::{Bar, Column, IndicatorRow, IndicatorTable, Series};
use stockview_indicators::batch;
use stockview_indicators::bollinger::BollingerBands;
use stockview_indicators::ichimoku::{Ichimoku, IchimokuLines};
use stockview_indicators::macd::{Macd, MacdOutput};
use stockview_indicators::rsi::Rsi;
use stockview_indicators::sma::Sma;
use tracing::debug;

/// Close-price moving averages and their windows.
pub const MA_PERIODS: [(Column, usize); 3] = [
    (Column::Ma5, 5),
    (Column::Ma25, 25),
    (Column::Ma75, 75),
];

pub const VOLUME_MA_PERIOD: usize = 20;

type ColumnValues = (Column, Vec<Option<Decimal>>);

/// Derive every indicator column from a daily series.
///
/// Each calculator reads the bars and fills its own columns, so the order
/// below does not matter. Cells without enough history are `None`.
pub fn compute_indicators(series: &Series) -> Result<IndicatorTable, EngineError> {
    if series.is_empty() {
        return Err(EngineError::EmptyInput {
            symbol: series.symbol().to_string(),
        });
    }
    let bars = series.bars();

    let mut columns: Vec<ColumnValues> = Vec::with_capacity(Column::ALL.len());
    columns.extend(moving_averages(bars));
    columns.extend(bollinger_bands(bars));
    columns.extend(ichimoku(bars));
    columns.push(rsi(bars));
    columns.extend(macd(bars));

    let mut rows: Vec<IndicatorRow> = bars.iter().cloned().map(IndicatorRow::empty).collect();
    for (column, values) in columns {
        debug_assert_eq!(values.len(), rows.len(), "{} misaligned", column.name());
        for (row, value) in rows.iter_mut().zip(values) {
            row.set(column, value);
        }
    }

    debug!(
        symbol = %series.symbol(),
        rows = rows.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        "Computed indicator table"
    );

    Ok(IndicatorTable {
        symbol: series.symbol().to_string(),
        rows,
    })
}

fn closes(bars: &[Bar]) -> impl Iterator<Item = Decimal> + '_ {
    bars.iter().map(|b| b.close)
}

fn moving_averages(bars: &[Bar]) -> Vec<ColumnValues> {
    let mut out: Vec<ColumnValues> = MA_PERIODS
        .iter()
        .map(|&(column, period)| (column, batch::run(&mut Sma::new(period), closes(bars))))
        .collect();
    let volumes = bars.iter().map(|b| Decimal::from(b.volume));
    out.push((
        Column::VolumeMa20,
        batch::run(&mut Sma::new(VOLUME_MA_PERIOD), volumes),
    ));
    out
}

fn bollinger_bands(bars: &[Bar]) -> [ColumnValues; 3] {
    let mut bb = BollingerBands::default_periods();
    let outputs: Vec<_> = closes(bars).map(|c| bb.next_output(c)).collect();
    [
        (Column::BbUpper, outputs.iter().map(|o| o.map(|o| o.upper)).collect()),
        (Column::BbMid, outputs.iter().map(|o| o.map(|o| o.middle)).collect()),
        (Column::BbLower, outputs.iter().map(|o| o.map(|o| o.lower)).collect()),
    ]
}

/// Conversion and base lines stay on their own bar; both leading spans are
/// re-projected `displacement` rows forward.
fn ichimoku(bars: &[Bar]) -> [ColumnValues; 4] {
    let mut ichimoku = Ichimoku::default_periods();
    let displacement = ichimoku.displacement();
    let lines: Vec<IchimokuLines> = bars
        .iter()
        .map(|b| ichimoku.next_hl(b.high, b.low))
        .collect();

    let leading_a: Vec<_> = lines.iter().map(|l| l.leading_a).collect();
    let leading_b: Vec<_> = lines.iter().map(|l| l.leading_b).collect();
    [
        (
            Column::IchimokuConversion,
            lines.iter().map(|l| l.conversion).collect(),
        ),
        (Column::IchimokuBase, lines.iter().map(|l| l.base).collect()),
        (
            Column::IchimokuSpanA,
            batch::shift_forward(&leading_a, displacement),
        ),
        (
            Column::IchimokuSpanB,
            batch::shift_forward(&leading_b, displacement),
        ),
    ]
}

fn rsi(bars: &[Bar]) -> ColumnValues {
    (Column::Rsi, batch::run(&mut Rsi::default_period(), closes(bars)))
}

fn macd(bars: &[Bar]) -> [ColumnValues; 3] {
    let mut macd = Macd::default_periods();
    let outputs: Vec<MacdOutput> = closes(bars).map(|c| macd.next_output(c)).collect();
    [
        (Column::Macd, outputs.iter().map(|o| Some(o.macd)).collect()),
        (Column::MacdSignal, outputs.iter().map(|o| Some(o.signal)).collect()),
        (Column::MacdHist, outputs.iter().map(|o| Some(o.histogram)).collect()),
    ]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Datelike, Duration, NaiveDate, Weekday};
    use rust_decimal_macros::dec;

    /// Weekday-only bars starting 2024-01-01 with a wobbling close.
    pub(crate) fn synthetic_series(len: usize) -> Series {
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut bars = Vec::with_capacity(len);
        for i in 0..len {
            while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                date += Duration::days(1);
            }
            let i_dec = Decimal::from(i);
            let close = dec!(100) + Decimal::from((i * 37) % 23) - Decimal::from((i * 11) % 7) * dec!(0.5)
                + i_dec * dec!(0.1);
            bars.push(Bar {
                date,
                open: close - dec!(0.3),
                high: close + dec!(1) + Decimal::from(i % 3),
                low: close - dec!(1) - Decimal::from(i % 4) * dec!(0.25),
                close,
                volume: 1_000 + (i as u64 * 37) % 500,
            });
            date += Duration::days(1);
        }
        Series::new("TEST", bars).unwrap()
    }

    fn flat_series(len: usize, close: Decimal) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = (0..len)
            .map(|i| Bar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 500,
            })
            .collect();
        Series::new("FLAT", bars).unwrap()
    }

    fn mean(values: &[Decimal]) -> Decimal {
        values.iter().sum::<Decimal>() / Decimal::from(values.len())
    }

    fn mid(bars: &[Bar]) -> Decimal {
        let high = bars.iter().map(|b| b.high).max().unwrap();
        let low = bars.iter().map(|b| b.low).min().unwrap();
        (high + low) / dec!(2)
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let series = Series::new("NONE", Vec::new()).unwrap();
        let err = compute_indicators(&series).unwrap_err();
        assert!(matches!(err, EngineError::EmptyInput { ref symbol } if symbol == "NONE"));
    }

    #[test]
    fn test_table_aligned_with_series() {
        let series = synthetic_series(120);
        let table = compute_indicators(&series).unwrap();
        assert_eq!(table.symbol, "TEST");
        assert_eq!(table.len(), series.len());
        for (row, bar) in table.rows.iter().zip(series.bars()) {
            assert_eq!(&row.bar, bar);
        }
    }

    #[test]
    fn test_moving_averages_use_exact_windows() {
        let series = synthetic_series(120);
        let closes: Vec<Decimal> = series.bars().iter().map(|b| b.close).collect();
        let table = compute_indicators(&series).unwrap();

        for (column, w) in MA_PERIODS {
            for (i, row) in table.rows.iter().enumerate() {
                if i + 1 < w {
                    assert_eq!(row.value(column), None, "{} row {i}", column.name());
                } else {
                    assert_eq!(row.value(column), Some(mean(&closes[i + 1 - w..=i])));
                }
            }
        }
    }

    #[test]
    fn test_volume_moving_average() {
        let series = synthetic_series(40);
        let volumes: Vec<Decimal> = series.bars().iter().map(|b| Decimal::from(b.volume)).collect();
        let table = compute_indicators(&series).unwrap();
        assert_eq!(table.rows[18].volume_ma20, None);
        assert_eq!(table.rows[19].volume_ma20, Some(mean(&volumes[0..20])));
        assert_eq!(table.rows[39].volume_ma20, Some(mean(&volumes[20..40])));
    }

    #[test]
    fn test_bollinger_bands_bracket_the_mid() {
        let series = synthetic_series(120);
        let table = compute_indicators(&series).unwrap();
        let tolerance = dec!(0.000000000001);
        for (i, row) in table.rows.iter().enumerate() {
            match (row.bb_upper, row.bb_mid, row.bb_lower) {
                (Some(upper), Some(mid), Some(lower)) => {
                    assert!(i >= 19);
                    assert_eq!(Some(mid), row.value(Column::BbMid));
                    assert!(upper >= mid && mid >= lower);
                    // upper − lower = 4σ and σ is symmetric around the mid
                    let sigma = (upper - mid) / dec!(2);
                    assert!(((upper - lower) - dec!(4) * sigma).abs() < tolerance);
                }
                (None, None, None) => assert!(i < 19),
                other => panic!("partially defined bands at row {i}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_bollinger_mid_is_twenty_bar_mean() {
        let series = synthetic_series(60);
        let closes: Vec<Decimal> = series.bars().iter().map(|b| b.close).collect();
        let table = compute_indicators(&series).unwrap();
        assert_eq!(table.rows[45].bb_mid, Some(mean(&closes[26..=45])));
    }

    #[test]
    fn test_ichimoku_lines_and_displaced_spans() {
        let series = synthetic_series(150);
        let bars = series.bars();
        let table = compute_indicators(&series).unwrap();

        for (i, row) in table.rows.iter().enumerate() {
            let conversion = (i >= 8).then(|| mid(&bars[i - 8..=i]));
            let base = (i >= 25).then(|| mid(&bars[i - 25..=i]));
            assert_eq!(row.ichimoku_conversion, conversion, "conversion row {i}");
            assert_eq!(row.ichimoku_base, base, "base row {i}");

            // spans plotted at row i come from data at row i − 26
            let span_a = i
                .checked_sub(26)
                .filter(|src| *src >= 25)
                .map(|src| (mid(&bars[src - 8..=src]) + mid(&bars[src - 25..=src])) / dec!(2));
            let span_b = i
                .checked_sub(26)
                .filter(|src| *src >= 51)
                .map(|src| mid(&bars[src - 51..=src]));
            assert_eq!(row.ichimoku_span_a, span_a, "span A row {i}");
            assert_eq!(row.ichimoku_span_b, span_b, "span B row {i}");
        }

        // first defined span B needs 52 + 26 bars
        assert!(table.rows[76].ichimoku_span_b.is_none());
        assert!(table.rows[77].ichimoku_span_b.is_some());
    }

    #[test]
    fn test_rsi_defined_everywhere_and_bounded() {
        let series = synthetic_series(200);
        let table = compute_indicators(&series).unwrap();
        for row in &table.rows {
            let rsi = row.rsi.expect("RSI defined from the first bar");
            assert!(rsi >= Decimal::ZERO && rsi <= dec!(100));
        }
    }

    #[test]
    fn test_macd_defined_everywhere_and_histogram_exact() {
        let series = synthetic_series(200);
        let table = compute_indicators(&series).unwrap();
        assert_eq!(table.rows[0].macd, Some(Decimal::ZERO));
        for row in &table.rows {
            let (macd, signal, hist) = (row.macd.unwrap(), row.macd_signal.unwrap(), row.macd_hist.unwrap());
            assert_eq!(hist, macd - signal);
        }
    }

    #[test]
    fn test_flat_series() {
        let c = dec!(1234.5);
        let table = compute_indicators(&flat_series(30, c)).unwrap();
        for (i, row) in table.rows.iter().enumerate() {
            if i >= 4 {
                assert_eq!(row.ma5, Some(c));
            }
            if i >= 24 {
                assert_eq!(row.ma25, Some(c));
            } else {
                assert_eq!(row.ma25, None);
            }
            assert_eq!(row.ma75, None);
            // no gains and no losses: the zero-loss rule gives 100
            assert_eq!(row.rsi, Some(dec!(100)));
            if i >= 19 {
                assert_eq!(row.bb_upper, row.bb_lower);
            }
            if i >= 8 {
                assert_eq!(row.ichimoku_conversion, Some(c));
            }
        }
    }

    #[test]
    fn test_two_rows_single_large_gain() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let bar = |day: i64, close: Decimal| Bar {
            date: start + Duration::days(day),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10,
        };
        let series = Series::new("UP", vec![bar(0, dec!(100)), bar(1, dec!(180))]).unwrap();
        let table = compute_indicators(&series).unwrap();
        assert_eq!(table.rows[1].rsi, Some(dec!(100)));
        assert_eq!(table.rows[1].ma5, None);
        assert!(table.rows[1].ichimoku_span_a.is_none());
    }

    #[test]
    fn test_recompute_is_reproducible() {
        let series = synthetic_series(250);
        assert_eq!(
            compute_indicators(&series).unwrap(),
            compute_indicators(&series).unwrap()
        );
    }
}
