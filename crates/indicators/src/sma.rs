use crate::Indicator;
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Simple Moving Average (SMA) over the last `period` inputs.
///
/// Undefined until a full window has been seen. Keeps the window itself, not
/// only the running sum, so Bollinger Bands can take the deviation of the
/// same values through [`Sma::window`].
#[derive(Debug, Clone)]
pub struct Sma {
    len: usize,
    window: VecDeque<Decimal>,
    sum: Decimal,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be > 0");
        Self {
            len: period,
            window: VecDeque::with_capacity(period + 1),
            sum: Decimal::ZERO,
        }
    }

    /// Get the current SMA value without feeding new data.
    pub fn value(&self) -> Option<Decimal> {
        self.is_ready()
            .then(|| self.sum / Decimal::from(self.len))
    }

    /// The values currently inside the window, oldest first.
    pub fn window(&self) -> impl Iterator<Item = &Decimal> {
        self.window.iter()
    }
}

impl Indicator for Sma {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        self.window.push_back(value);
        self.sum += value;

        if self.window.len() > self.len {
            if let Some(removed) = self.window.pop_front() {
                self.sum -= removed;
            }
        }

        self.value()
    }

    fn reset(&mut self) {
        self.window.clear();
        self.sum = Decimal::ZERO;
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.window.len() == self.len
    }
}
