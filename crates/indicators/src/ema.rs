use crate::Indicator;
use rust_decimal::Decimal;

/// Exponential Moving Average (EMA).
///
/// `ema_t = α·x_t + (1 − α)·ema_{t−1}`, seeded with the first input, so the
/// average is defined from the very first value with no warm-up gap.
#[derive(Debug, Clone)]
pub struct Ema {
    len: usize,
    alpha: Decimal,
    current: Option<Decimal>,
}

impl Ema {
    /// EMA for a span of `period` inputs: `α = 2 / (period + 1)`.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "EMA period must be > 0");
        let alpha = Decimal::TWO / (Decimal::from(period) + Decimal::ONE);
        Self::with_alpha(period, alpha)
    }

    /// Wilder-style smoothing for `period` inputs: `α = 1 / period`.
    pub fn wilder(period: usize) -> Self {
        assert!(period > 0, "EMA period must be > 0");
        Self::with_alpha(period, Decimal::ONE / Decimal::from(period))
    }

    pub fn with_alpha(period: usize, alpha: Decimal) -> Self {
        assert!(
            alpha > Decimal::ZERO && alpha <= Decimal::ONE,
            "EMA smoothing factor must be in (0, 1]"
        );
        Self {
            len: period,
            alpha,
            current: None,
        }
    }

    pub fn alpha(&self) -> Decimal {
        self.alpha
    }

    pub fn value(&self) -> Option<Decimal> {
        self.current
    }
}

impl Indicator for Ema {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        let ema = match self.current {
            None => value,
            Some(prev) => self.alpha * value + (Decimal::ONE - self.alpha) * prev,
        };
        self.current = Some(ema);
        self.current
    }

    fn reset(&mut self) {
        self.current = None;
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.current.is_some()
    }
}
