use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use thiserror::Error;

/// Denominators closer to zero than this are treated as zero.
pub const DEFAULT_EPSILON: Decimal = dec!(0.0000000001);

/// Fractional digits kept on every ratio.
pub const DEFAULT_PRECISION: u32 = 4;

/// Why a guarded division produced no quotient.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivisionGuard {
    #[error("denominator {0} is within epsilon of zero")]
    NearZeroDenominator(Decimal),

    #[error("arithmetic overflow")]
    Overflow,
}

/// `(numerator / denominator) * scale`, rounded half away from zero to
/// `precision` fractional digits. Trailing zeros are dropped.
pub fn try_divide(
    numerator: Decimal,
    denominator: Decimal,
    scale: Decimal,
    precision: u32,
    epsilon: Decimal,
) -> Result<Decimal, DivisionGuard> {
    if denominator.abs() < epsilon {
        return Err(DivisionGuard::NearZeroDenominator(denominator));
    }
    let quotient = numerator
        .checked_div(denominator)
        .ok_or(DivisionGuard::Overflow)?;
    let scaled = quotient.checked_mul(scale).ok_or(DivisionGuard::Overflow)?;
    Ok(scaled
        .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
        .normalize())
}

/// Total version of [`try_divide`]: every guard reads as zero.
pub fn safe_divide(
    numerator: Decimal,
    denominator: Decimal,
    scale: Decimal,
    precision: u32,
    epsilon: Decimal,
) -> Decimal {
    try_divide(numerator, denominator, scale, precision, epsilon).unwrap_or(Decimal::ZERO)
}
