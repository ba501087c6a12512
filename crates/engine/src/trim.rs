use chrono::NaiveDate;
use stockview_core::IndicatorTable;

/// Keep only the rows dated on or after `display_start`.
///
/// Row order and every computed value are preserved, including cells that are
/// still undefined because their window reaches back before the fetch start.
pub fn trim_to_display(mut table: IndicatorTable, display_start: NaiveDate) -> IndicatorTable {
    let first_shown = table.rows.partition_point(|r| r.date() < display_start);
    table.rows.drain(..first_shown);
    table
}
