use crate::ema::Ema;
use crate::Indicator;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Relative Strength Index (RSI).
///
/// Gains and losses are smoothed with Wilder's EMA (`α = 1 / period`), each
/// seeded with its first value. The first input has no previous close and
/// counts as a zero change, so RSI is defined from the first bar on.
#[derive(Debug, Clone)]
pub struct Rsi {
    len: usize,
    prev_value: Option<Decimal>,
    avg_gain: Ema,
    avg_loss: Ema,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "RSI period must be > 0");
        Self {
            len: period,
            prev_value: None,
            avg_gain: Ema::wilder(period),
            avg_loss: Ema::wilder(period),
        }
    }

    /// Standard RSI (14).
    pub fn default_period() -> Self {
        Self::new(14)
    }

    pub fn avg_gain(&self) -> Option<Decimal> {
        self.avg_gain.value()
    }

    pub fn avg_loss(&self) -> Option<Decimal> {
        self.avg_loss.value()
    }

    /// RSI from the current averages.
    ///
    /// `100 - 100 / (1 + RS)` is evaluated as `100 * gain / (gain + loss)`.
    /// The two are equal, but RS itself overflows `Decimal` once the average
    /// loss has decayed to a few ulps. A zero average loss gives exactly 100,
    /// which also covers a perfectly flat series.
    pub fn value(&self) -> Option<Decimal> {
        let (ag, al) = (self.avg_gain.value()?, self.avg_loss.value()?);
        if al.is_zero() {
            return Some(dec!(100));
        }
        Some(dec!(100) * ag / (ag + al))
    }
}

impl Indicator for Rsi {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        let change = self
            .prev_value
            .map(|prev| value - prev)
            .unwrap_or(Decimal::ZERO);
        let gain = change.max(Decimal::ZERO);
        let loss = (-change).max(Decimal::ZERO);

        self.avg_gain.next(gain);
        self.avg_loss.next(loss);
        self.prev_value = Some(value);

        self.value()
    }

    fn reset(&mut self) {
        self.prev_value = None;
        self.avg_gain.reset();
        self.avg_loss.reset();
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.avg_gain.is_ready()
    }
}
