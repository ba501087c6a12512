//! Helpers that turn streaming indicators into whole-column results.

use crate::Indicator;
use rust_decimal::Decimal;

/// Feed every value through `indicator` in order, collecting one output per input.
pub fn run<I, V>(indicator: &mut I, values: V) -> Vec<Option<Decimal>>
where
    I: Indicator + ?Sized,
    V: IntoIterator<Item = Decimal>,
{
    values.into_iter().map(|v| indicator.next(v)).collect()
}

/// Re-project a column `offset` rows forward: `out[i] = values[i - offset]`.
///
/// Rows with `i < offset` have no source and are `None`. Values whose target
/// would land past the end are dropped. Output length equals input length.
pub fn shift_forward<T: Copy>(values: &[Option<T>], offset: usize) -> Vec<Option<T>> {
    (0..values.len())
        .map(|i| i.checked_sub(offset).and_then(|src| values[src]))
        .collect()
}
