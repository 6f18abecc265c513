//! Side-by-side comparisons built from repeated engine runs.
//!
//! - interest saved by a prepayment plan against paying nothing extra,
//! - a sub-minimum down payment against the forced minimum (insured) one,
//! - "Scenario B": the same calculation with a few inputs overridden.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{AmortizationResult, AmortizationSimulator, LoanType, PeriodicTerms, PrepaymentPlan};
use crate::calculator::{self, MortgageInput, MortgageOutput, PaymentFrequency, ResolvedScenario};
use crate::insurance::{self, InsuranceStatus};
use crate::types::{round_cents, with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageCalcResult;

// ---------------------------------------------------------------------------
// Interest savings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestSavings {
    pub baseline: AmortizationResult,
    pub actual: AmortizationResult,
    /// Baseline interest minus actual interest, floored at zero.
    pub interest_saved: Money,
}

/// Run the full term with and without the prepayment plan.
pub fn interest_savings(
    simulator: &AmortizationSimulator,
    terms: &PeriodicTerms,
    plan: &PrepaymentPlan,
    loan_type: LoanType,
) -> InterestSavings {
    let actual = simulator.full(terms, plan, loan_type);
    let baseline = if plan.is_empty() {
        actual.clone()
    } else {
        simulator.full(terms, &PrepaymentPlan::none(), loan_type)
    };
    let interest_saved = (baseline.total_interest - actual.total_interest).max(Decimal::ZERO);
    InterestSavings {
        baseline,
        actual,
        interest_saved,
    }
}

// ---------------------------------------------------------------------------
// Below-minimum down payment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimumDownPaymentComparison {
    pub user_down_payment: Money,
    /// Uninsured: the loan is above the insurable LTV.
    pub user_payment: Money,
    pub minimum_down_payment: Money,
    pub minimum_insurance_premium: Money,
    pub minimum_payment: Money,
}

/// Payment at the user's down payment next to the payment at the policy
/// minimum, where the loan becomes insurable and the premium is financed.
pub(crate) fn compare_minimum_down_payment(
    input: &MortgageInput,
    scenario: &ResolvedScenario,
    user_payment: Money,
) -> MinimumDownPaymentComparison {
    let minimum_down_payment = input.policy.minimum_down_payment * input.purchase_price;
    let forced = insurance::assess(
        input.purchase_price,
        minimum_down_payment,
        input.is_rental,
        &input.policy,
    );
    let minimum_payment = scenario.payment(forced.financed_amount());

    MinimumDownPaymentComparison {
        user_down_payment: round_cents(input.down_payment),
        user_payment: round_cents(user_payment),
        minimum_down_payment: round_cents(minimum_down_payment),
        minimum_insurance_premium: round_cents(forced.premium),
        minimum_payment: round_cents(minimum_payment),
    }
}

// ---------------------------------------------------------------------------
// Scenario B
// ---------------------------------------------------------------------------

/// Inputs a user may change for the what-if scenario; unset fields keep the
/// primary scenario's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioOverrides {
    pub purchase_price: Option<Money>,
    pub down_payment: Option<Money>,
    pub nominal_rate: Option<Rate>,
    pub amortization_years: Option<u32>,
    pub payment_frequency: Option<PaymentFrequency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBInput {
    pub primary: MortgageInput,
    #[serde(default)]
    pub overrides: ScenarioOverrides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub payment: Money,
    pub payment_frequency_label: String,
    pub total_interest: Money,
    pub insurance_status: InsuranceStatus,
    pub insurance_premium: Money,
}

impl From<&MortgageOutput> for ScenarioSummary {
    fn from(out: &MortgageOutput) -> Self {
        ScenarioSummary {
            payment: out.payment,
            payment_frequency_label: out.payment_frequency_label.clone(),
            total_interest: out.total_interest,
            insurance_status: out.insurance_status,
            insurance_premium: out.insurance_premium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBOutput {
    pub primary: ScenarioSummary,
    pub scenario_b: ScenarioSummary,
    /// Scenario B minus primary.
    pub payment_difference: Money,
    pub interest_difference: Money,
    pub insurance_difference: Money,
}

impl ScenarioOverrides {
    pub fn apply(&self, base: &MortgageInput) -> MortgageInput {
        let mut input = base.clone();
        if let Some(price) = self.purchase_price {
            input.purchase_price = price;
        }
        if let Some(down) = self.down_payment {
            input.down_payment = down;
        }
        if let Some(rate) = self.nominal_rate {
            input.nominal_rate = rate;
        }
        if let Some(years) = self.amortization_years {
            input.amortization_years = years;
        }
        if let Some(freq) = self.payment_frequency {
            input.payment_frequency = freq;
        }
        input
    }
}

/// Evaluate the primary inputs and the overridden copy side by side.
pub fn compare_scenario_b(input: &ScenarioBInput) -> MortgageCalcResult<ComputationOutput<ScenarioBOutput>> {
    let start = Instant::now();

    let (primary, mut warnings) = calculator::evaluate(&input.primary)?;
    let variant_input = input.overrides.apply(&input.primary);
    let (variant, variant_warnings) = calculator::evaluate(&variant_input)?;
    warnings.extend(variant_warnings.into_iter().map(|w| format!("Scenario B: {w}")));

    let primary = ScenarioSummary::from(&primary);
    let scenario_b = ScenarioSummary::from(&variant);
    let output = ScenarioBOutput {
        payment_difference: scenario_b.payment - primary.payment,
        interest_difference: scenario_b.total_interest - primary.total_interest,
        insurance_difference: scenario_b.insurance_premium - primary.insurance_premium,
        primary,
        scenario_b,
    };

    Ok(with_metadata(
        "Scenario comparison: primary vs overridden inputs",
        input,
        warnings,
        start,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{HomeExpenses, RateType};
    use crate::policy::CalculatorPolicy;
    use crate::rates::CompoundingFrequency;
    use rust_decimal_macros::dec;

    fn primary() -> MortgageInput {
        MortgageInput {
            purchase_price: dec!(600_000),
            down_payment: dec!(120_000),
            nominal_rate: dec!(0.045),
            rate_type: RateType::Fixed,
            payment_frequency: PaymentFrequency::Monthly,
            compounding: CompoundingFrequency::SemiAnnual,
            amortization_years: 25,
            rate_term_years: 5,
            loan_type: LoanType::Standard,
            one_time_prepayment: Decimal::ZERO,
            annual_prepayment: Decimal::ZERO,
            extra_payment_percent: Decimal::ZERO,
            accelerated_frequency: None,
            expenses: HomeExpenses::default(),
            rental_income: None,
            is_rental: false,
            start_date: None,
            policy: CalculatorPolicy::default(),
        }
    }

    fn terms() -> PeriodicTerms {
        PeriodicTerms {
            principal: dec!(300_000),
            periodic_rate: dec!(0.004),
            payment_frequency: 12,
            amortization_years: 25,
        }
    }

    #[test]
    fn test_empty_plan_saves_nothing() {
        let s = interest_savings(
            &AmortizationSimulator::default(),
            &terms(),
            &PrepaymentPlan::none(),
            LoanType::Standard,
        );
        assert_eq!(s.interest_saved, Decimal::ZERO);
        assert_eq!(s.baseline, s.actual);
    }

    #[test]
    fn test_lump_sums_save_interest() {
        let plan = PrepaymentPlan {
            one_time_lump_sum: dec!(20_000),
            annual_lump_sum: dec!(5_000),
            extra_payment_fraction: Decimal::ZERO,
        };
        let s = interest_savings(&AmortizationSimulator::default(), &terms(), &plan, LoanType::Standard);
        assert!(s.interest_saved > Decimal::ZERO);
        assert_eq!(
            s.interest_saved,
            s.baseline.total_interest - s.actual.total_interest
        );
    }

    #[test]
    fn test_no_overrides_matches_primary() {
        let out = compare_scenario_b(&ScenarioBInput {
            primary: primary(),
            overrides: ScenarioOverrides::default(),
        })
        .unwrap();
        assert_eq!(out.result.primary, out.result.scenario_b);
        assert_eq!(out.result.payment_difference, Decimal::ZERO);
    }

    #[test]
    fn test_higher_rate_costs_more() {
        let out = compare_scenario_b(&ScenarioBInput {
            primary: primary(),
            overrides: ScenarioOverrides {
                nominal_rate: Some(dec!(0.055)),
                ..ScenarioOverrides::default()
            },
        })
        .unwrap();
        assert!(out.result.payment_difference > Decimal::ZERO);
        assert!(out.result.interest_difference > Decimal::ZERO);
        assert_eq!(out.result.insurance_difference, Decimal::ZERO);
    }

    #[test]
    fn test_smaller_down_payment_adds_insurance() {
        let out = compare_scenario_b(&ScenarioBInput {
            primary: primary(),
            overrides: ScenarioOverrides {
                down_payment: Some(dec!(60_000)),
                payment_frequency: Some(PaymentFrequency::Weekly),
                ..ScenarioOverrides::default()
            },
        })
        .unwrap();
        let b = &out.result.scenario_b;
        assert_eq!(b.insurance_status, InsuranceStatus::Insured);
        // LTV 0.90 → 2.4% of 540k
        assert_eq!(b.insurance_premium, dec!(12_960));
        assert_eq!(b.payment_frequency_label, "/weekly");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let result = compare_scenario_b(&ScenarioBInput {
            primary: primary(),
            overrides: ScenarioOverrides {
                down_payment: Some(dec!(700_000)),
                ..ScenarioOverrides::default()
            },
        });
        assert!(result.is_err());
    }
}
