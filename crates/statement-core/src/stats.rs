//! Order statistics over decimal samples.
//!
//! Everything here works on exact decimals so that candidate selection never
//! manufactures a value through float round-off. Functions taking `sorted`
//! expect ascending input; use [`sorted`] to prepare it.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Ascending copy of `values`.
pub fn sorted(values: &[Decimal]) -> Vec<Decimal> {
    let mut out = values.to_vec();
    out.sort();
    out
}

/// Percentile (0-100 scale) by linear interpolation between closest ranks.
pub fn percentile(sorted: &[Decimal], pct: Decimal) -> Option<Decimal> {
    if sorted.is_empty() || pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
        return None;
    }
    let last = sorted.len() - 1;
    let rank = pct.checked_mul(Decimal::from(last))? / Decimal::ONE_HUNDRED;
    let lo = rank.floor().to_usize()?.min(last);
    let hi = rank.ceil().to_usize()?.min(last);
    let frac = rank - rank.floor();
    let span = sorted[hi].checked_sub(sorted[lo])?;
    sorted[lo].checked_add(span.checked_mul(frac)?)
}

/// First and third quartiles.
pub fn quartiles(sorted: &[Decimal]) -> Option<(Decimal, Decimal)> {
    let q1 = percentile(sorted, Decimal::from(25))?;
    let q3 = percentile(sorted, Decimal::from(75))?;
    Some((q1, q3))
}

/// Tukey fence `[Q1 - k*IQR, Q3 + k*IQR]`. Saturates instead of overflowing.
pub fn iqr_fence(sorted: &[Decimal], multiplier: Decimal) -> Option<(Decimal, Decimal)> {
    let (q1, q3) = quartiles(sorted)?;
    let reach = (q3 - q1).checked_mul(multiplier).unwrap_or(Decimal::MAX);
    let lower = q1.checked_sub(reach).unwrap_or(Decimal::MIN);
    let upper = q3.checked_add(reach).unwrap_or(Decimal::MAX);
    Some((lower, upper))
}

/// Median that is always a member of the sample: the middle element, or the
/// upper of the two middle elements for even lengths.
pub fn upper_median(sorted: &[Decimal]) -> Option<Decimal> {
    sorted.get(sorted.len() / 2).copied()
}

/// `max / min` of a strictly positive sample. `None` for empty samples or a
/// non-positive minimum; `Decimal::MAX` if the quotient overflows.
pub fn dispersion(sorted: &[Decimal]) -> Option<Decimal> {
    let min = *sorted.first()?;
    let max = *sorted.last()?;
    if min <= Decimal::ZERO {
        return None;
    }
    Some(max.checked_div(min).unwrap_or(Decimal::MAX))
}
