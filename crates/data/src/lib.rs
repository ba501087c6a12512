pub mod csv_loader;
pub mod csv_writer;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;
use stockview_core::{validate_symbol, DataError, DataProvider, Series};
use tracing::debug;

/// A data provider reading one `<symbol>.csv` file per symbol from a directory.
#[derive(Debug, Clone)]
pub struct CsvDataProvider {
    pub directory: PathBuf,
}

impl CsvDataProvider {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// `<directory>/<symbol>.csv`, refusing symbols that would leave the directory.
    fn path_for(&self, symbol: &str) -> Result<PathBuf, DataError> {
        validate_symbol(symbol)?;
        Ok(self.directory.join(format!("{}.csv", symbol)))
    }
}

#[async_trait]
impl DataProvider for CsvDataProvider {
    async fn load_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series, DataError> {
        let file_path = self.path_for(symbol)?;
        if !file_path.exists() {
            debug!(path = %file_path.display(), "CSV file missing");
            return Err(DataError::NotFound(format!("No CSV data for '{}'", symbol)));
        }
        let series = csv_loader::load_series_from_csv(&file_path, symbol)?;
        let total = series.len();
        let filtered: Vec<_> = series
            .bars()
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        debug!(%symbol, total, in_range = filtered.len(), "Filtered CSV series");
        Ok(Series::new(symbol, filtered)?)
    }

    async fn available_symbols(&self) -> Result<Vec<String>, DataError> {
        let mut symbols = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "csv").unwrap_or(false) {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().to_string());
                }
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_fixture(dir: &std::path::Path, symbol: &str) {
        let mut contents = String::from("Date,Open,High,Low,Close,Volume\n");
        for day in 1..=20 {
            contents.push_str(&format!("2024-02-{:02},100,101,99,100.5,1000\n", day));
        }
        std::fs::write(dir.join(format!("{symbol}.csv")), contents).unwrap();
    }

    #[tokio::test]
    async fn test_load_series_filters_range() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "7203.T");
        let provider = CsvDataProvider::new(dir.path());

        let series = provider
            .load_series("7203.T", date(2024, 2, 5), date(2024, 2, 9))
            .await
            .unwrap();
        assert_eq!(series.symbol(), "7203.T");
        assert_eq!(series.len(), 5);
        assert_eq!(series.first_date(), Some(date(2024, 2, 5)));
        assert_eq!(series.last_date(), Some(date(2024, 2, 9)));
    }

    #[tokio::test]
    async fn test_out_of_range_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "AAPL");
        let provider = CsvDataProvider::new(dir.path());
        let series = provider
            .load_series("AAPL", date(2023, 1, 1), date(2023, 12, 31))
            .await
            .unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_symbol_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvDataProvider::new(dir.path());
        let err = provider
            .load_series("NOPE", date(2024, 1, 1), date(2024, 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::NotFound(ref msg) if !msg.contains(dir.path().to_str().unwrap())));
    }

    #[tokio::test]
    async fn test_symbol_cannot_escape_directory() {
        let root = tempfile::tempdir().unwrap();
        let data = root.path().join("data");
        std::fs::create_dir(&data).unwrap();
        write_fixture(root.path(), "secret");
        let provider = CsvDataProvider::new(&data);
        let absolute = root.path().join("secret");

        for symbol in ["../secret", absolute.to_str().unwrap()] {
            let err = provider
                .load_series(symbol, date(2024, 2, 1), date(2024, 2, 29))
                .await
                .unwrap_err();
            assert!(matches!(err, DataError::InvalidSymbol(_)), "{symbol}");
        }
    }

    #[tokio::test]
    async fn test_available_symbols_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "MSFT");
        write_fixture(dir.path(), "7203.T");
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let provider = CsvDataProvider::new(dir.path());
        assert_eq!(
            provider.available_symbols().await.unwrap(),
            vec!["7203.T".to_string(), "MSFT".to_string()]
        );
    }
}
