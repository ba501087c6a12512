use chrono::{Local, NaiveDate};
use std::sync::Arc;
use stockview_core::{DataProvider, DisplayPeriod};
use stockview_engine::LookbackPolicy;

/// Shared application state accessible by all route handlers.
pub struct AppState {
    pub provider: Arc<dyn DataProvider>,
    pub lookback: LookbackPolicy,
    pub default_period: DisplayPeriod,
    /// Pins "today" instead of reading the local clock.
    pub fixed_today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self {
            provider,
            lookback: LookbackPolicy::default(),
            default_period: DisplayPeriod::default(),
            fixed_today: None,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }
}
