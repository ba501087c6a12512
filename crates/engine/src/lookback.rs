use crate::compute::{MA_PERIODS, VOLUME_MA_PERIOD};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use stockview_core::DisplayPeriod;
use stockview_indicators::bollinger::BollingerBands;
use stockview_indicators::ichimoku::Ichimoku;
use stockview_indicators::Indicator;

/// Largest number of trailing bars any indicator needs before its first
/// defined value. Ichimoku span B (52-bar window displaced 26 bars) dominates.
pub fn max_lookback_bars() -> usize {
    let ma = MA_PERIODS.iter().map(|(_, w)| *w).max().unwrap_or(0);
    let bollinger = BollingerBands::default_periods().period();
    let ichimoku = Ichimoku::default_periods().lookback();
    ma.max(VOLUME_MA_PERIOD).max(bollinger).max(ichimoku)
}

/// How far before the display start to fetch.
///
/// Indicator windows count trading bars while fetches are in calendar days:
/// the bar count is stretched by 7/5 for weekends and `slack_days` covers
/// exchange holidays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookbackPolicy {
    pub slack_days: i64,
}

impl Default for LookbackPolicy {
    fn default() -> Self {
        Self { slack_days: 30 }
    }
}

impl LookbackPolicy {
    pub fn calendar_days(&self) -> i64 {
        let bars = max_lookback_bars() as i64;
        (bars * 7 + 4) / 5 + self.slack_days.max(0)
    }
}

/// The date range to fetch and the part of it to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchWindow {
    pub fetch_start: NaiveDate,
    pub display_start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    pub fn plan(today: NaiveDate, period: DisplayPeriod, policy: LookbackPolicy) -> Self {
        let display_start = today - Duration::days(period.days());
        let fetch_start = display_start - Duration::days(policy.calendar_days());
        Self {
            fetch_start,
            display_start,
            end: today,
        }
    }
}
