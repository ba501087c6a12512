use crate::donchian::DonchianChannel;
use crate::Indicator;
use rust_decimal::Decimal;

/// Ichimoku Kinko Hyo lines, before any displacement.
///
/// `leading_a` and `leading_b` are the values computed from the current bar.
/// They are plotted `displacement` bars ahead; use
/// [`crate::batch::shift_forward`] to move a whole column into place.
#[derive(Debug, Clone)]
pub struct Ichimoku {
    conversion: DonchianChannel,
    base: DonchianChannel,
    span_b: DonchianChannel,
    displacement: usize,
}

/// Unshifted Ichimoku values for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IchimokuLines {
    /// Tenkan-sen: mid of the conversion window.
    pub conversion: Option<Decimal>,
    /// Kijun-sen: mid of the base window.
    pub base: Option<Decimal>,
    /// (conversion + base) / 2.
    pub leading_a: Option<Decimal>,
    /// Mid of the long window.
    pub leading_b: Option<Decimal>,
}

impl Ichimoku {
    pub fn new(conversion: usize, base: usize, span_b: usize, displacement: usize) -> Self {
        assert!(
            conversion < base && base < span_b,
            "Ichimoku windows must be increasing"
        );
        Self {
            conversion: DonchianChannel::new(conversion),
            base: DonchianChannel::new(base),
            span_b: DonchianChannel::new(span_b),
            displacement,
        }
    }

    /// Standard Ichimoku (9, 26, 52) displaced 26 bars.
    pub fn default_periods() -> Self {
        Self::new(9, 26, 52, 26)
    }

    pub fn displacement(&self) -> usize {
        self.displacement
    }

    /// Bars of history needed before a displaced leading span B is defined.
    pub fn lookback(&self) -> usize {
        self.span_b.period() + self.displacement
    }

    pub fn next_hl(&mut self, high: Decimal, low: Decimal) -> IchimokuLines {
        let conversion = self.conversion.next_hl(high, low).map(|o| o.middle);
        let base = self.base.next_hl(high, low).map(|o| o.middle);
        let leading_b = self.span_b.next_hl(high, low).map(|o| o.middle);
        let leading_a = match (conversion, base) {
            (Some(c), Some(b)) => Some((c + b) / Decimal::TWO),
            _ => None,
        };
        IchimokuLines {
            conversion,
            base,
            leading_a,
            leading_b,
        }
    }
}
