use std::io::Write;
use stockview_core::{Column, DataError, IndicatorTable};

/// Write a table as CSV: OHLCV followed by the requested indicator columns.
///
/// Undefined cells are written empty.
pub fn write_table_csv<W: Write>(
    table: &IndicatorTable,
    columns: &[Column],
    writer: W,
) -> Result<(), DataError> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec!["Date", "Open", "High", "Low", "Close", "Volume"];
    header.extend(columns.iter().map(|c| c.name()));
    out.write_record(&header).map_err(std::io::Error::from)?;

    for row in &table.rows {
        let bar = &row.bar;
        let mut record = vec![
            bar.date.format("%Y-%m-%d").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ];
        record.extend(
            columns
                .iter()
                .map(|c| row.value(*c).map(|v| v.to_string()).unwrap_or_default()),
        );
        out.write_record(&record).map_err(std::io::Error::from)?;
    }

    out.flush()?;
    Ok(())
}
