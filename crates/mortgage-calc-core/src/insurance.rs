//! Mortgage default insurance: tiered premium table and eligibility checks.
//!
//! The premium table is a frozen ascending list of inclusive LTV ceilings; the
//! first tier whose ceiling is at or above the LTV wins. Eligibility rules that
//! differ between markets (price ceiling, rental LTV cap) sit in front of the
//! table and are driven by [`CalculatorPolicy`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::policy::CalculatorPolicy;
use crate::types::{Money, Rate};

/// (inclusive LTV ceiling, premium rate), ascending.
const PREMIUM_TIERS: [(Rate, Rate); 4] = [
    (dec!(0.80), dec!(0.000)),
    (dec!(0.85), dec!(0.018)),
    (dec!(0.90), dec!(0.024)),
    (dec!(0.95), dec!(0.031)),
];

/// Premium rate for a loan-to-value ratio, or `None` when not insurable (LTV > 95%).
pub fn premium_rate(loan_to_value: Rate) -> Option<Rate> {
    PREMIUM_TIERS
        .iter()
        .find(|(ceiling, _)| loan_to_value <= *ceiling)
        .map(|(_, rate)| *rate)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceQuote {
    pub loan_to_value: Rate,
    /// `None` when the loan is not insurable.
    pub premium_rate: Option<Rate>,
    pub premium_amount: Money,
}

impl InsuranceQuote {
    pub fn is_insurable(&self) -> bool {
        self.premium_rate.is_some()
    }
}

/// Quote the premium for a loan against a property value.
pub fn quote(loan_amount: Money, property_value: Money) -> InsuranceQuote {
    let loan_to_value = if property_value > Decimal::ZERO {
        loan_amount / property_value
    } else {
        Decimal::ZERO
    };
    let rate = premium_rate(loan_to_value);
    InsuranceQuote {
        loan_to_value,
        premium_rate: rate,
        premium_amount: rate.map_or(Decimal::ZERO, |r| r * loan_amount),
    }
}

/// Why a premium was or was not charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceStatus {
    /// Down payment at or above the insured threshold.
    NotRequired,
    /// Nothing left to finance.
    NoLoan,
    Insured,
    /// LTV above the top tier.
    NotInsurable,
    PriceAboveCeiling,
    RentalLtvExceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceAssessment {
    pub status: InsuranceStatus,
    pub loan_amount: Money,
    pub premium: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<InsuranceQuote>,
}

impl InsuranceAssessment {
    /// Loan plus any premium rolled into it.
    pub fn financed_amount(&self) -> Money {
        self.loan_amount + self.premium
    }
}

/// Apply eligibility pre-checks, then the premium table.
pub fn assess(
    purchase_price: Money,
    down_payment: Money,
    is_rental: bool,
    policy: &CalculatorPolicy,
) -> InsuranceAssessment {
    let loan_amount = purchase_price - down_payment;
    let uninsured = |status| InsuranceAssessment {
        status,
        loan_amount,
        premium: Decimal::ZERO,
        quote: None,
    };

    if loan_amount <= Decimal::ZERO {
        return uninsured(InsuranceStatus::NoLoan);
    }
    if down_payment >= policy.insured_down_payment_threshold * purchase_price {
        return uninsured(InsuranceStatus::NotRequired);
    }
    if purchase_price > policy.insurance_price_ceiling {
        return uninsured(InsuranceStatus::PriceAboveCeiling);
    }

    let q = quote(loan_amount, purchase_price);
    if is_rental {
        if let Some(cap) = policy.rental_max_ltv {
            if q.loan_to_value > cap {
                return uninsured(InsuranceStatus::RentalLtvExceeded);
            }
        }
    }

    let status = if q.is_insurable() {
        InsuranceStatus::Insured
    } else {
        InsuranceStatus::NotInsurable
    };
    InsuranceAssessment {
        status,
        loan_amount,
        premium: q.premium_amount,
        quote: Some(q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        assert_eq!(premium_rate(dec!(0.80)), Some(dec!(0)));
        assert_eq!(premium_rate(dec!(0.80001)), Some(dec!(0.018)));
        assert_eq!(premium_rate(dec!(0.85)), Some(dec!(0.018)));
        assert_eq!(premium_rate(dec!(0.850001)), Some(dec!(0.024)));
        assert_eq!(premium_rate(dec!(0.90)), Some(dec!(0.024)));
        assert_eq!(premium_rate(dec!(0.95)), Some(dec!(0.031)));
        assert_eq!(premium_rate(dec!(0.950001)), None);
    }

    #[test]
    fn test_low_ltv_is_zero_rate() {
        assert_eq!(premium_rate(dec!(0.10)), Some(Decimal::ZERO));
        assert_eq!(premium_rate(Decimal::ZERO), Some(Decimal::ZERO));
    }

    #[test]
    fn test_quote_premium_amount() {
        // LTV 0.83 lands in the 1.8% tier; 350k loan → 6,300.
        let q = quote(dec!(350_000), dec!(350_000) / dec!(0.83));
        assert_eq!(q.premium_rate, Some(dec!(0.018)));
        assert_eq!(q.premium_amount, dec!(6300.000));
    }

    #[test]
    fn test_quote_not_insurable_has_zero_premium() {
        let q = quote(dec!(97_000), dec!(100_000));
        assert!(!q.is_insurable());
        assert_eq!(q.premium_amount, Decimal::ZERO);
    }

    #[test]
    fn test_assess_twenty_percent_down_not_required() {
        let a = assess(dec!(500_000), dec!(100_000), false, &CalculatorPolicy::default());
        assert_eq!(a.status, InsuranceStatus::NotRequired);
        assert_eq!(a.financed_amount(), dec!(400_000));
    }

    #[test]
    fn test_assess_ten_percent_down() {
        let a = assess(dec!(500_000), dec!(50_000), false, &CalculatorPolicy::default());
        assert_eq!(a.status, InsuranceStatus::Insured);
        // LTV 0.90 → 2.4% of 450k
        assert_eq!(a.premium, dec!(10_800.000));
        assert_eq!(a.financed_amount(), dec!(460_800.000));
    }

    #[test]
    fn test_assess_price_ceiling() {
        let a = assess(dec!(1_600_000), dec!(160_000), false, &CalculatorPolicy::default());
        assert_eq!(a.status, InsuranceStatus::PriceAboveCeiling);
        assert_eq!(a.premium, Decimal::ZERO);

        let strict = CalculatorPolicy {
            insurance_price_ceiling: dec!(1_000_000),
            ..CalculatorPolicy::default()
        };
        let b = assess(dec!(1_200_000), dec!(120_000), false, &strict);
        assert_eq!(b.status, InsuranceStatus::PriceAboveCeiling);
    }

    #[test]
    fn test_assess_rental_cap() {
        let policy = CalculatorPolicy {
            rental_max_ltv: Some(dec!(0.80)),
            ..CalculatorPolicy::default()
        };
        let rental = assess(dec!(400_000), dec!(40_000), true, &policy);
        assert_eq!(rental.status, InsuranceStatus::RentalLtvExceeded);

        let owner = assess(dec!(400_000), dec!(40_000), false, &policy);
        assert_eq!(owner.status, InsuranceStatus::Insured);
    }

    #[test]
    fn test_assess_below_five_percent_not_insurable() {
        let a = assess(dec!(400_000), dec!(10_000), false, &CalculatorPolicy::default());
        assert_eq!(a.status, InsuranceStatus::NotInsurable);
        assert_eq!(a.premium, Decimal::ZERO);
        assert_eq!(a.financed_amount(), dec!(390_000));
    }

    #[test]
    fn test_assess_no_loan() {
        let a = assess(dec!(300_000), dec!(300_000), false, &CalculatorPolicy::default());
        assert_eq!(a.status, InsuranceStatus::NoLoan);
    }
}
