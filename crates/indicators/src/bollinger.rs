use crate::sma::Sma;
use crate::Indicator;
use rust_decimal::{Decimal, MathematicalOps};

/// Bollinger Bands.
///
/// Middle band is the SMA; the bands sit `num_std` sample standard deviations
/// (n − 1 denominator) above and below it, computed over the same window.
/// Returns the middle band through [`Indicator::next`]. Use `next_output()`
/// for all bands.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    num_std: Decimal,
    sma: Sma,
    last: Option<BollingerOutput>,
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerOutput {
    pub upper: Decimal,
    pub middle: Decimal,
    pub lower: Decimal,
    pub std_dev: Decimal,
}

impl BollingerOutput {
    pub fn bandwidth(&self) -> Decimal {
        self.upper - self.lower
    }
}

impl BollingerBands {
    pub fn new(period: usize, num_std_dev: Decimal) -> Self {
        assert!(period > 1, "Bollinger period must be > 1");
        Self {
            num_std: num_std_dev,
            sma: Sma::new(period),
            last: None,
        }
    }

    /// Standard Bollinger Bands (20, 2).
    pub fn default_periods() -> Self {
        Self::new(20, Decimal::TWO)
    }

    /// Sample standard deviation of the current window around `mean`.
    fn std_dev(&self, mean: Decimal) -> Decimal {
        let sum_sq: Decimal = self
            .sma
            .window()
            .map(|v| {
                let diff = *v - mean;
                diff * diff
            })
            .sum();
        let variance = sum_sq / Decimal::from(self.sma.period() - 1);
        variance.sqrt().unwrap_or(Decimal::ZERO)
    }

    pub fn output(&self) -> Option<BollingerOutput> {
        self.last
    }

    pub fn next_output(&mut self, value: Decimal) -> Option<BollingerOutput> {
        self.last = self.sma.next(value).map(|mid| {
            let sd = self.std_dev(mid);
            BollingerOutput {
                upper: mid + self.num_std * sd,
                middle: mid,
                lower: mid - self.num_std * sd,
                std_dev: sd,
            }
        });
        self.last
    }
}

impl Indicator for BollingerBands {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        self.next_output(value).map(|o| o.middle)
    }

    fn reset(&mut self) {
        self.sma.reset();
        self.last = None;
    }

    fn period(&self) -> usize {
        self.sma.period()
    }

    fn is_ready(&self) -> bool {
        self.last.is_some()
    }
}
