//! Checked monetary arithmetic.
//!
//! Decimal operators panic on overflow; every sum that involves caller
//! supplied amounts goes through these helpers instead.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Adds `amounts` together, failing with a `Validation` error on `field`
/// when the total does not fit in a `Decimal`.
pub(crate) fn checked_sum<I>(field: &str, amounts: I) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or_else(|| out_of_range(field))
}

/// Subtracts `amounts` from `minuend`, failing with a `Validation` error on
/// `field` when the result does not fit in a `Decimal`.
pub(crate) fn checked_difference<I>(
    field: &str,
    minuend: Decimal,
    amounts: I,
) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(minuend, |total, amount| total.checked_sub(amount))
        .ok_or_else(|| out_of_range(field))
}

fn out_of_range(field: &str) -> EngineError {
    EngineError::validation(field, "amount exceeds the representable range")
}
