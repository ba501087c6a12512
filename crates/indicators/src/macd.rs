use crate::ema::Ema;
use crate::Indicator;
use rust_decimal::Decimal;

/// MACD (Moving Average Convergence Divergence).
///
/// Composed of three first-value-seeded EMAs:
/// - Fast EMA (default 12)
/// - Slow EMA (default 26)
/// - Signal EMA over the MACD line (default 9)
///
/// Every line is defined from the first input.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_ema: Ema,
    slow_ema: Ema,
    signal_ema: Ema,
    last: Option<MacdOutput>,
}

/// MACD output with all three components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdOutput {
    pub macd: Decimal,
    pub signal: Decimal,
    pub histogram: Decimal,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        assert!(fast_period < slow_period, "Fast period must be less than slow period");
        Self {
            fast_ema: Ema::new(fast_period),
            slow_ema: Ema::new(slow_period),
            signal_ema: Ema::new(signal_period),
            last: None,
        }
    }

    /// Standard MACD (12, 26, 9).
    pub fn default_periods() -> Self {
        Self::new(12, 26, 9)
    }

    /// Returns the latest full MACD output (macd, signal, histogram).
    pub fn output(&self) -> Option<MacdOutput> {
        self.last
    }

    /// Process next value and return the full output.
    pub fn next_output(&mut self, value: Decimal) -> MacdOutput {
        let fast = self.fast_ema.next(value).unwrap_or(value);
        let slow = self.slow_ema.next(value).unwrap_or(value);
        let macd = fast - slow;
        let signal = self.signal_ema.next(macd).unwrap_or(macd);
        let out = MacdOutput {
            macd,
            signal,
            histogram: macd - signal,
        };
        self.last = Some(out);
        out
    }
}

impl Indicator for Macd {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        Some(self.next_output(value).macd)
    }

    fn reset(&mut self) {
        self.fast_ema.reset();
        self.slow_ema.reset();
        self.signal_ema.reset();
        self.last = None;
    }

    fn period(&self) -> usize {
        self.slow_ema.period()
    }

    fn is_ready(&self) -> bool {
        self.last.is_some()
    }
}
