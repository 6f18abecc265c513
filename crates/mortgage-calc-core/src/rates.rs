//! Nominal-to-periodic rate conversion.
//!
//! A quoted mortgage rate is nominal and compounds at some frequency (semi-annual
//! by default). Payments fall at a possibly different frequency, so the rate is
//! first annualised to an effective rate and then de-annualised to the payment
//! period.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::types::Rate;

/// How often a nominal annual rate compounds.
///
/// Serialised as its per-year count (2, 12, 26, 52, 365). Any unrecognised
/// count falls back to semi-annual, the legal default for fixed-rate mortgages
/// in semi-annual-compounding markets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum CompoundingFrequency {
    #[default]
    SemiAnnual,
    Monthly,
    BiWeekly,
    Weekly,
    Daily,
}

impl CompoundingFrequency {
    /// Map a compounding code to a frequency; unknown codes are semi-annual.
    pub fn from_code(code: u32) -> Self {
        match code {
            12 => CompoundingFrequency::Monthly,
            26 => CompoundingFrequency::BiWeekly,
            52 => CompoundingFrequency::Weekly,
            365 => CompoundingFrequency::Daily,
            _ => CompoundingFrequency::SemiAnnual,
        }
    }

    /// Compounding periods per year.
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::SemiAnnual => 2,
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::BiWeekly => 26,
            CompoundingFrequency::Weekly => 52,
            CompoundingFrequency::Daily => 365,
        }
    }
}

impl From<u32> for CompoundingFrequency {
    fn from(code: u32) -> Self {
        CompoundingFrequency::from_code(code)
    }
}

impl From<CompoundingFrequency> for u32 {
    fn from(freq: CompoundingFrequency) -> Self {
        freq.periods_per_year()
    }
}

/// Annual effective rate: `(1 + nominal / m)^m - 1`.
pub fn effective_annual_rate(nominal_annual: Rate, compounding: CompoundingFrequency) -> Rate {
    let m = compounding.periods_per_year();
    let per_compounding = Decimal::ONE + nominal_annual / Decimal::from(m);
    per_compounding
        .checked_powu(u64::from(m))
        .unwrap_or(Decimal::MAX)
        - Decimal::ONE
}

/// Rate per payment period: `(1 + effective_annual)^(1 / payment_frequency) - 1`.
///
/// Total over its domain. A zero nominal rate yields exactly zero, and a
/// non-negative nominal rate never yields a negative periodic rate.
pub fn effective_periodic_rate(
    nominal_annual: Rate,
    compounding: CompoundingFrequency,
    payment_frequency: u32,
) -> Rate {
    let effective_annual = effective_annual_rate(nominal_annual, compounding);
    if effective_annual.is_zero() || payment_frequency == 0 {
        return Decimal::ZERO;
    }
    if payment_frequency == 1 {
        return effective_annual;
    }

    let growth = Decimal::ONE + effective_annual;
    if growth <= Decimal::ZERO {
        // Rate below -100% effective; nothing meaningful to de-annualise.
        return -Decimal::ONE;
    }

    let exponent = Decimal::ONE / Decimal::from(payment_frequency);
    let periodic = growth.powd(exponent) - Decimal::ONE;

    // ln/exp approximation in powd can undershoot by a few ulps near zero.
    if effective_annual > Decimal::ZERO && periodic < Decimal::ZERO {
        Decimal::ZERO
    } else {
        periodic
    }
}
