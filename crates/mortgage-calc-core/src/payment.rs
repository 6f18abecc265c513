use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::types::{Money, Rate};

/// Level payment that amortizes `principal` over `total_payments` periods.
///
/// Standard annuity formula `P·r·(1+r)^n / ((1+r)^n − 1)`; a non-positive
/// periodic rate falls back to straight-line `P / n`. `total_payments` must be
/// positive (the caller derives it from frequency × years); zero returns zero.
pub fn level_payment(principal: Money, periodic_rate: Rate, total_payments: u32) -> Money {
    if total_payments == 0 {
        return Decimal::ZERO;
    }
    if periodic_rate <= Decimal::ZERO {
        return principal / Decimal::from(total_payments);
    }

    let Some(growth) = (Decimal::ONE + periodic_rate).checked_powu(u64::from(total_payments)) else {
        // Growth factor past Decimal range: the annuity converges to interest only.
        return principal * periodic_rate;
    };
    let denom = growth - Decimal::ONE;
    if denom.is_zero() {
        // Rate so small the factor rounds to 1 at 28 digits.
        return principal / Decimal::from(total_payments);
    }
    // Divide before scaling by principal; growth alone can sit near Decimal::MAX.
    let factor = periodic_rate * (growth / denom);
    principal.checked_mul(factor).unwrap_or(Decimal::MAX)
}

/// Interest-only payment for one period, grossed up by the extra fraction.
pub fn interest_only_payment(principal: Money, periodic_rate: Rate, extra_fraction: Decimal) -> Money {
    let interest = principal * periodic_rate;
    interest + interest * extra_fraction
}
