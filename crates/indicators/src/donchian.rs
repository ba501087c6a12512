use crate::Indicator;
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Donchian Channel.
///
/// Upper band = highest high over N periods.
/// Lower band = lowest low over N periods.
/// Middle band = (upper + lower) / 2, the Ichimoku "mid" line.
#[derive(Debug, Clone)]
pub struct DonchianChannel {
    len: usize,
    highs: VecDeque<Decimal>,
    lows: VecDeque<Decimal>,
    last: Option<DonchianOutput>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonchianOutput {
    pub upper: Decimal,
    pub middle: Decimal,
    pub lower: Decimal,
}

impl DonchianChannel {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Donchian period must be > 0");
        Self {
            len: period,
            highs: VecDeque::with_capacity(period + 1),
            lows: VecDeque::with_capacity(period + 1),
            last: None,
        }
    }

    pub fn next_hl(&mut self, high: Decimal, low: Decimal) -> Option<DonchianOutput> {
        self.highs.push_back(high);
        self.lows.push_back(low);

        if self.highs.len() > self.len {
            self.highs.pop_front();
            self.lows.pop_front();
        }

        self.last = match (self.highs.iter().max(), self.lows.iter().min()) {
            (Some(&upper), Some(&lower)) if self.highs.len() == self.len => Some(DonchianOutput {
                upper,
                middle: (upper + lower) / Decimal::TWO,
                lower,
            }),
            _ => None,
        };
        self.last
    }
}

impl Indicator for DonchianChannel {
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        self.next_hl(value, value).map(|o| o.middle)
    }

    fn reset(&mut self) {
        self.highs.clear();
        self.lows.clear();
        self.last = None;
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.last.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_donchian_basic() {
        let mut dc = DonchianChannel::new(3);
        assert!(dc.next_hl(dec!(10), dec!(8)).is_none());
        assert!(dc.next_hl(dec!(12), dec!(9)).is_none());
        let out = dc.next_hl(dec!(11), dec!(7)).unwrap();
        assert_eq!(out.upper, dec!(12));
        assert_eq!(out.lower, dec!(7));
        assert_eq!(out.middle, dec!(9.5));
    }

    #[test]
    fn test_donchian_window_rolls_off() {
        let mut dc = DonchianChannel::new(2);
        dc.next_hl(dec!(20), dec!(1));
        dc.next_hl(dec!(10), dec!(5));
        let out = dc.next_hl(dec!(11), dec!(6)).unwrap();
        assert_eq!(out.upper, dec!(11));
        assert_eq!(out.lower, dec!(5));
    }
}
