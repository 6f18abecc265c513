//! Market conventions that callers may override.
//!
//! Every field has a default, so an empty JSON object (or an absent `policy`
//! key) yields the standard policy.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageCalcError;
use crate::types::{Money, Rate};
use crate::MortgageCalcResult;

/// Default safety cap for the payoff search. Not an amortization bound.
pub const DEFAULT_PAYOFF_ITERATION_CAP: u32 = 100_000;

/// Largest price, down payment, lump sum or expense accepted from a caller.
pub const MAX_AMOUNT: Money = dec!(1_000_000_000_000);

/// Reference horizon used to size the base payment for term snapshots and payoff search.
pub const DEFAULT_REFERENCE_AMORTIZATION_YEARS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorPolicy {
    /// Purchase prices above this are not eligible for insurance.
    pub insurance_price_ceiling: Money,
    /// Insurance applies when the down payment is below this share of price.
    pub insured_down_payment_threshold: Rate,
    /// Minimum down payment share; below it the forced-minimum comparison runs.
    pub minimum_down_payment: Rate,
    /// Added to the nominal rate for variable-rate quotes.
    pub variable_rate_premium: Rate,
    /// Maximum LTV for insuring a rental property. `None` disables the check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_max_ltv: Option<Rate>,
    pub reference_amortization_years: u32,
    pub payoff_iteration_cap: u32,
}

impl Default for CalculatorPolicy {
    fn default() -> Self {
        CalculatorPolicy {
            insurance_price_ceiling: dec!(1_500_000),
            insured_down_payment_threshold: dec!(0.20),
            minimum_down_payment: dec!(0.05),
            variable_rate_premium: dec!(0.01),
            rental_max_ltv: None,
            reference_amortization_years: DEFAULT_REFERENCE_AMORTIZATION_YEARS,
            payoff_iteration_cap: DEFAULT_PAYOFF_ITERATION_CAP,
        }
    }
}

impl CalculatorPolicy {
    pub fn validate(&self) -> MortgageCalcResult<()> {
        if self.insurance_price_ceiling < Decimal::ZERO {
            return Err(MortgageCalcError::invalid(
                "policy.insurance_price_ceiling",
                "Price ceiling cannot be negative",
            ));
        }
        if !(Decimal::ZERO..=Decimal::ONE).contains(&self.insured_down_payment_threshold) {
            return Err(MortgageCalcError::invalid(
                "policy.insured_down_payment_threshold",
                "Threshold must be between 0 and 1",
            ));
        }
        if !(Decimal::ZERO..=Decimal::ONE).contains(&self.minimum_down_payment) {
            return Err(MortgageCalcError::invalid(
                "policy.minimum_down_payment",
                "Minimum down payment must be between 0 and 1",
            ));
        }
        if let Some(cap) = self.rental_max_ltv {
            if cap <= Decimal::ZERO || cap > Decimal::ONE {
                return Err(MortgageCalcError::invalid(
                    "policy.rental_max_ltv",
                    "Rental LTV cap must be in (0, 1]",
                ));
            }
        }
        if self.reference_amortization_years == 0 {
            return Err(MortgageCalcError::invalid(
                "policy.reference_amortization_years",
                "Reference amortization must be at least one year",
            ));
        }
        if self.reference_amortization_years > 100 {
            return Err(MortgageCalcError::invalid(
                "policy.reference_amortization_years",
                "Reference amortization must be at most 100 years",
            ));
        }
        if self.payoff_iteration_cap == 0 || self.payoff_iteration_cap > DEFAULT_PAYOFF_ITERATION_CAP {
            return Err(MortgageCalcError::invalid(
                "policy.payoff_iteration_cap",
                format!("Iteration cap must be between 1 and {}", DEFAULT_PAYOFF_ITERATION_CAP),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default_policy() {
        let policy: CalculatorPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, CalculatorPolicy::default());
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let policy: CalculatorPolicy = serde_json::from_str(
            r#"{"insurance_price_ceiling": "1000000", "rental_max_ltv": "0.80"}"#,
        )
        .unwrap();
        assert_eq!(policy.insurance_price_ceiling, dec!(1_000_000));
        assert_eq!(policy.rental_max_ltv, Some(dec!(0.80)));
        assert_eq!(policy.payoff_iteration_cap, DEFAULT_PAYOFF_ITERATION_CAP);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let policy = CalculatorPolicy {
            insured_down_payment_threshold: dec!(1.5),
            ..CalculatorPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_iteration_cap() {
        let policy = CalculatorPolicy {
            payoff_iteration_cap: 0,
            ..CalculatorPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_iteration_cap_cannot_be_raised() {
        let policy: CalculatorPolicy =
            serde_json::from_str(r#"{"payoff_iteration_cap": 2000000}"#).unwrap();
        assert!(policy.validate().is_err());

        let lowered = CalculatorPolicy {
            payoff_iteration_cap: 5_000,
            ..CalculatorPolicy::default()
        };
        assert!(lowered.validate().is_ok());
    }
}
