use rust_decimal::Decimal;
use std::fmt::Write;
use stockview_core::Column;
use stockview_engine::DisplayTable;

/// Plain-text "Latest Prices" report for a display table.
pub fn render_summary(result: &DisplayTable, columns: &[Column], tail: usize) -> String {
    let table = &result.table;
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", table.symbol, result.period);
    let _ = writeln!(
        out,
        "Showing {} of {} fetched bars from {}",
        table.len(),
        result.fetched_bars,
        result.window.display_start
    );

    let sep = "=".repeat(66);
    let _ = writeln!(out, "{sep}");
    let _ = writeln!(out, "  Latest Prices");
    let _ = writeln!(out, "{sep}");
    let _ = writeln!(
        out,
        "  {:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    for row in table.tail(tail) {
        let bar = &row.bar;
        let _ = writeln!(
            out,
            "  {:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
            bar.date.to_string(),
            price(bar.open),
            price(bar.high),
            price(bar.low),
            price(bar.close),
            bar.volume
        );
    }

    if let Some(latest) = table.latest() {
        if !columns.is_empty() {
            let _ = writeln!(out, "{sep}");
            let _ = writeln!(out, "  Indicators ({})", latest.date());
            let _ = writeln!(out, "{sep}");
            for column in columns {
                let _ = writeln!(out, "  {:<20} {:>12}", column.name(), cell(latest.value(*column)));
            }
        }
    }
    let _ = writeln!(out, "{sep}");
    out
}

fn price(value: Decimal) -> String {
    value.round_dp(2).to_string()
}

fn cell(value: Option<Decimal>) -> String {
    value.map(price).unwrap_or_else(|| "-".to_string())
}
