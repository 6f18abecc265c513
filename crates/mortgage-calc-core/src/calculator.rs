//! Full affordability recalculation for one set of form inputs.
//!
//! Builds a typed scenario from validated inputs, runs the amortization engine
//! in its three modes, prices insurance and assembles everything a front end
//! displays: payment, term snapshot, interest saving, effective amortization
//! and a monthly cost breakdown. All math in `rust_decimal::Decimal`.

use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{AmortizationSimulator, LoanType, PeriodicTerms, PrepaymentPlan};
use crate::error::MortgageCalcError;
use crate::insurance::{self, InsuranceAssessment, InsuranceStatus};
use crate::payment::{interest_only_payment, level_payment};
use crate::policy::{CalculatorPolicy, MAX_AMOUNT};
use crate::rates::{effective_periodic_rate, CompoundingFrequency};
use crate::scenarios::{self, MinimumDownPaymentComparison};
use crate::types::{round_cents, with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MIN_AMORTIZATION_YEARS: u32 = 5;
pub const MAX_AMORTIZATION_YEARS: u32 = 30;
pub const MAX_NOMINAL_RATE: Rate = dec!(1);
pub const MAX_PAYMENTS_PER_YEAR: u32 = 365;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    #[default]
    Fixed,
    /// Quoted with the policy's variable-rate premium on top.
    Variable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    #[serde(alias = "weekly-standard")]
    Weekly,
    Daily,
    #[serde(alias = "semi_annual")]
    Semiannual,
}

impl PaymentFrequency {
    pub fn payments_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::Daily => 365,
            PaymentFrequency::Semiannual => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentFrequency::Monthly => "/monthly",
            PaymentFrequency::Weekly => "/weekly",
            PaymentFrequency::Daily => "/daily",
            PaymentFrequency::Semiannual => "/semi-annually",
        }
    }
}

/// Recurring monthly home costs shown next to the mortgage payment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeExpenses {
    pub property_tax_annual: Money,
    pub condo_fees: Money,
    pub heat: Money,
    pub other: Money,
}

/// Rental income offset; the yearly figure wins when both are given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentalIncome {
    pub yearly: Money,
    pub monthly: Money,
}

impl RentalIncome {
    pub fn monthly_equivalent(&self) -> Money {
        if self.yearly > Decimal::ZERO {
            self.yearly / MONTHS_PER_YEAR
        } else {
            self.monthly
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageInput {
    pub purchase_price: Money,
    pub down_payment: Money,
    /// Quoted nominal annual rate (0.05 = 5%).
    pub nominal_rate: Rate,
    #[serde(default)]
    pub rate_type: RateType,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    #[serde(default)]
    pub compounding: CompoundingFrequency,
    /// Clamped to [5, 30].
    #[serde(default = "default_amortization_years")]
    pub amortization_years: u32,
    /// Rate term for the end-of-term snapshot.
    #[serde(default = "default_rate_term_years")]
    pub rate_term_years: u32,
    #[serde(default)]
    pub loan_type: LoanType,
    #[serde(default)]
    pub one_time_prepayment: Money,
    #[serde(default)]
    pub annual_prepayment: Money,
    /// Whole percent (10 = pay 10% extra each period).
    #[serde(default)]
    pub extra_payment_percent: Decimal,
    /// Payments per year overriding the selected frequency. Only honoured when
    /// an extra payment percent is set.
    #[serde(default)]
    pub accelerated_frequency: Option<u32>,
    #[serde(default)]
    pub expenses: HomeExpenses,
    #[serde(default)]
    pub rental_income: Option<RentalIncome>,
    #[serde(default)]
    pub is_rental: bool,
    /// First payment date; enables a projected payoff date.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub policy: CalculatorPolicy,
}

fn default_amortization_years() -> u32 {
    25
}

fn default_rate_term_years() -> u32 {
    5
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSummary {
    pub term_years: u32,
    pub payments: u32,
    pub interest_over_term: Money,
    pub balance_end_of_term: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffSummary {
    pub payments: u32,
    pub years: u32,
    pub months: u32,
    /// Nominal amortization years minus effective whole years, floored at zero.
    /// Taken after rounded months carry into `years`, so 10 years 12 months
    /// counts as 11 years here.
    pub years_faster: u32,
    /// The payoff search hit its safety cap; the loan never clears.
    pub reached_iteration_cap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCosts {
    /// Mortgage payment converted to a monthly equivalent.
    pub mortgage: Money,
    pub home_expenses: Money,
    pub other_expenses: Money,
    pub rental_income: Money,
    /// Floored at zero when rental income exceeds costs.
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageOutput {
    pub payment: Money,
    pub payment_frequency_label: String,
    pub payments_per_year: u32,
    pub nominal_rate: Rate,
    pub periodic_rate: Rate,
    pub amortization_years: u32,
    pub loan_amount: Money,
    pub insurance_status: InsuranceStatus,
    pub insurance_premium: Money,
    pub financed_amount: Money,
    pub total_interest: Money,
    pub interest_saving: Money,
    pub term: TermSummary,
    pub payoff: PayoffSummary,
    pub monthly_costs: MonthlyCosts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_down_payment_comparison: Option<MinimumDownPaymentComparison>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Recalculate every displayed figure for one set of inputs.
pub fn calculate_mortgage(input: &MortgageInput) -> MortgageCalcResult<ComputationOutput<MortgageOutput>> {
    let start = Instant::now();
    let (output, warnings) = evaluate(input)?;
    Ok(with_metadata(
        "Effective-rate annuity amortization with lump-sum prepayments",
        input,
        warnings,
        start,
        output,
    ))
}

/// Regular payment for a loan: level payment grossed up by the extra fraction,
/// or interest plus the extra fraction for interest-only loans.
pub fn regular_payment(terms: &PeriodicTerms, loan_type: LoanType, extra_fraction: Decimal) -> Money {
    match loan_type {
        LoanType::Standard => {
            let base = level_payment(terms.principal, terms.periodic_rate, terms.total_payments());
            base + base * extra_fraction
        }
        LoanType::InterestOnly => interest_only_payment(terms.principal, terms.periodic_rate, extra_fraction),
    }
}

// ---------------------------------------------------------------------------
// Scenario resolution
// ---------------------------------------------------------------------------

/// Inputs reduced to what the engine consumes.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedScenario {
    pub nominal_rate: Rate,
    pub payments_per_year: u32,
    pub periodic_rate: Rate,
    pub years: u32,
    /// Rate term, never longer than the amortization.
    pub term_years: u32,
    pub loan_type: LoanType,
    pub plan: PrepaymentPlan,
    pub simulator: AmortizationSimulator,
}

impl ResolvedScenario {
    pub fn terms(&self, principal: Money) -> PeriodicTerms {
        PeriodicTerms {
            principal,
            periodic_rate: self.periodic_rate,
            payment_frequency: self.payments_per_year,
            amortization_years: self.years,
        }
    }

    pub fn payment(&self, principal: Money) -> Money {
        regular_payment(&self.terms(principal), self.loan_type, self.plan.extra_payment_fraction)
    }
}

pub(crate) fn resolve(input: &MortgageInput, warnings: &mut Vec<String>) -> ResolvedScenario {
    let nominal_rate = match input.rate_type {
        RateType::Fixed => input.nominal_rate,
        RateType::Variable => input.nominal_rate + input.policy.variable_rate_premium,
    };

    let extra_fraction = input.extra_payment_percent / dec!(100);
    let selected = input.payment_frequency.payments_per_year();
    let payments_per_year = match input.accelerated_frequency {
        Some(freq) if freq > 0 && extra_fraction > Decimal::ZERO => freq,
        Some(freq) if freq > 0 => {
            warnings.push(format!(
                "Accelerated frequency of {} payments/year ignored without an extra payment percent",
                freq
            ));
            selected
        }
        _ => selected,
    };

    let years = input
        .amortization_years
        .clamp(MIN_AMORTIZATION_YEARS, MAX_AMORTIZATION_YEARS);
    if years != input.amortization_years {
        warnings.push(format!(
            "Amortization of {} years clamped to {}",
            input.amortization_years, years
        ));
    }

    let term_years = input.rate_term_years.min(years);
    if term_years != input.rate_term_years {
        warnings.push(format!(
            "Rate term of {} years shortened to the {}-year amortization",
            input.rate_term_years, years
        ));
    }

    ResolvedScenario {
        nominal_rate,
        payments_per_year,
        periodic_rate: effective_periodic_rate(nominal_rate, input.compounding, payments_per_year),
        years,
        term_years,
        loan_type: input.loan_type,
        plan: PrepaymentPlan {
            one_time_lump_sum: input.one_time_prepayment,
            annual_lump_sum: input.annual_prepayment,
            extra_payment_fraction: extra_fraction,
        },
        simulator: AmortizationSimulator::from(&input.policy),
    }
}

pub(crate) fn insurance_warning(assessment: &InsuranceAssessment) -> Option<String> {
    match assessment.status {
        InsuranceStatus::NotInsurable => Some(format!(
            "Loan-to-value of {} exceeds the highest insurable tier; no premium applied",
            assessment
                .quote
                .as_ref()
                .map_or(Decimal::ZERO, |q| q.loan_to_value.round_dp(4))
        )),
        InsuranceStatus::PriceAboveCeiling => {
            Some("Purchase price is above the insurance ceiling; loan is not insurable".into())
        }
        InsuranceStatus::RentalLtvExceeded => {
            Some("Rental property loan-to-value exceeds the insurable cap".into())
        }
        InsuranceStatus::NotRequired | InsuranceStatus::NoLoan | InsuranceStatus::Insured => None,
    }
}

pub(crate) fn evaluate(input: &MortgageInput) -> MortgageCalcResult<(MortgageOutput, Vec<String>)> {
    validate(input)?;
    let mut warnings: Vec<String> = Vec::new();

    let scenario = resolve(input, &mut warnings);
    let assessment = insurance::assess(
        input.purchase_price,
        input.down_payment,
        input.is_rental,
        &input.policy,
    );
    warnings.extend(insurance_warning(&assessment));

    let financed = assessment.financed_amount();
    let terms = scenario.terms(financed);
    tracing::debug!(
        financed = %financed,
        periodic_rate = %scenario.periodic_rate,
        payments = terms.total_payments(),
        "calculating mortgage"
    );

    let simulator = scenario.simulator;
    let savings = scenarios::interest_savings(&simulator, &terms, &scenario.plan, scenario.loan_type);

    let term_payments = scenario.payments_per_year.saturating_mul(scenario.term_years);
    let snapshot = simulator.partial(&terms, &scenario.plan, scenario.loan_type, term_payments);

    let payoff = payoff_summary(
        simulator.payoff_count(&terms, &scenario.plan, scenario.loan_type),
        scenario.payments_per_year,
        scenario.years,
        simulator.iteration_cap,
        input.start_date,
    );
    if payoff.reached_iteration_cap {
        warnings.push(format!(
            "Loan does not pay off within {} payments; payment does not cover accruing interest",
            simulator.iteration_cap
        ));
    }

    let payment = scenario.payment(financed);
    let monthly_costs = monthly_costs(payment, scenario.payments_per_year, input);

    let minimum_down_payment_comparison = if input.down_payment > Decimal::ZERO
        && input.down_payment < input.policy.minimum_down_payment * input.purchase_price
    {
        Some(scenarios::compare_minimum_down_payment(input, &scenario, payment))
    } else {
        None
    };

    let output = MortgageOutput {
        payment: round_cents(payment),
        payment_frequency_label: input.payment_frequency.label().to_string(),
        payments_per_year: scenario.payments_per_year,
        nominal_rate: scenario.nominal_rate,
        periodic_rate: scenario.periodic_rate,
        amortization_years: scenario.years,
        loan_amount: round_cents(assessment.loan_amount),
        insurance_status: assessment.status,
        insurance_premium: round_cents(assessment.premium),
        financed_amount: round_cents(financed),
        total_interest: round_cents(savings.actual.total_interest),
        interest_saving: round_cents(savings.interest_saved),
        term: TermSummary {
            term_years: scenario.term_years,
            payments: term_payments,
            interest_over_term: round_cents(snapshot.total_interest),
            balance_end_of_term: round_cents(snapshot.final_balance),
        },
        payoff,
        monthly_costs,
        minimum_down_payment_comparison,
    };

    Ok((output, warnings))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn payoff_summary(
    payments: u32,
    payments_per_year: u32,
    nominal_years: u32,
    iteration_cap: u32,
    start_date: Option<NaiveDate>,
) -> PayoffSummary {
    let per_year = payments_per_year.max(1);
    let mut years = payments / per_year;
    let remainder = Decimal::from(payments % per_year);
    let months_dec = (remainder * MONTHS_PER_YEAR / Decimal::from(per_year))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let mut months = months_dec.to_u32().unwrap_or(0);
    if months >= 12 {
        years += 1;
        months -= 12;
    }

    let payoff_date = start_date.and_then(|d| d.checked_add_months(Months::new(years * 12 + months)));

    PayoffSummary {
        payments,
        years,
        months,
        years_faster: nominal_years.saturating_sub(years),
        reached_iteration_cap: payments >= iteration_cap,
        payoff_date,
    }
}

fn monthly_costs(payment: Money, payments_per_year: u32, input: &MortgageInput) -> MonthlyCosts {
    let mortgage = payment * Decimal::from(payments_per_year) / MONTHS_PER_YEAR;
    let expenses = &input.expenses;
    let home_expenses = expenses.property_tax_annual / MONTHS_PER_YEAR + expenses.condo_fees + expenses.heat;
    let rental_income = input
        .rental_income
        .as_ref()
        .map_or(Decimal::ZERO, RentalIncome::monthly_equivalent);
    let total = (mortgage + home_expenses + expenses.other - rental_income).max(Decimal::ZERO);

    MonthlyCosts {
        mortgage: round_cents(mortgage),
        home_expenses: round_cents(home_expenses),
        other_expenses: round_cents(expenses.other),
        rental_income: round_cents(rental_income),
        total: round_cents(total),
    }
}

pub(crate) fn validate(input: &MortgageInput) -> MortgageCalcResult<()> {
    if input.purchase_price < Decimal::ZERO {
        return Err(MortgageCalcError::invalid(
            "purchase_price",
            "Purchase price cannot be negative",
        ));
    }
    let amounts = [
        ("purchase_price", input.purchase_price),
        ("one_time_prepayment", input.one_time_prepayment),
        ("annual_prepayment", input.annual_prepayment),
        ("expenses.property_tax_annual", input.expenses.property_tax_annual),
        ("expenses.condo_fees", input.expenses.condo_fees),
        ("expenses.heat", input.expenses.heat),
        ("expenses.other", input.expenses.other),
    ];
    let rental = input
        .rental_income
        .as_ref()
        .map(|r| [("rental_income.yearly", r.yearly), ("rental_income.monthly", r.monthly)]);
    if let Some((field, _)) = amounts
        .iter()
        .chain(rental.iter().flatten())
        .find(|(_, v)| v.abs() > MAX_AMOUNT)
    {
        return Err(MortgageCalcError::invalid(
            field,
            format!("Amount cannot exceed {}", MAX_AMOUNT),
        ));
    }
    if input.down_payment < Decimal::ZERO {
        return Err(MortgageCalcError::invalid(
            "down_payment",
            "Down payment cannot be negative",
        ));
    }
    if input.down_payment > input.purchase_price {
        return Err(MortgageCalcError::invalid(
            "down_payment",
            "Down payment cannot exceed the purchase price",
        ));
    }
    if input.nominal_rate <= dec!(-1) || input.nominal_rate > MAX_NOMINAL_RATE {
        return Err(MortgageCalcError::invalid(
            "nominal_rate",
            "Rate must be greater than -100% and at most 100%",
        ));
    }
    if input.accelerated_frequency.is_some_and(|f| f > MAX_PAYMENTS_PER_YEAR) {
        return Err(MortgageCalcError::invalid(
            "accelerated_frequency",
            format!("At most {} payments per year", MAX_PAYMENTS_PER_YEAR),
        ));
    }
    if input.rate_term_years == 0 {
        return Err(MortgageCalcError::invalid(
            "rate_term_years",
            "Rate term must be at least one year",
        ));
    }
    if input.one_time_prepayment < Decimal::ZERO || input.annual_prepayment < Decimal::ZERO {
        return Err(MortgageCalcError::invalid(
            "prepayment",
            "Lump-sum prepayments cannot be negative",
        ));
    }
    if input.extra_payment_percent < Decimal::ZERO || input.extra_payment_percent > dec!(100) {
        return Err(MortgageCalcError::invalid(
            "extra_payment_percent",
            "Extra payment percent must be between 0 and 100",
        ));
    }
    let expenses = &input.expenses;
    if [expenses.property_tax_annual, expenses.condo_fees, expenses.heat, expenses.other]
        .iter()
        .any(|v| *v < Decimal::ZERO)
    {
        return Err(MortgageCalcError::invalid(
            "expenses",
            "Home expenses cannot be negative",
        ));
    }
    input.policy.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: Decimal = dec!(0.01);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn standard_input() -> MortgageInput {
        MortgageInput {
            purchase_price: dec!(500_000),
            down_payment: dec!(100_000),
            nominal_rate: dec!(0.05),
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

    fn run(input: &MortgageInput) -> (MortgageOutput, Vec<String>) {
        let out = calculate_mortgage(input).unwrap();
        (out.result, out.warnings)
    }

    #[test]
    fn test_canadian_fixed_rate_payment() {
        // 400k at 5% compounded semi-annually, 25 years monthly ≈ 2,326.42
        let (out, warnings) = run(&standard_input());
        assert_close(out.payment, dec!(2326.42), TOL, "monthly payment");
        assert_eq!(out.payment_frequency_label, "/monthly");
        assert_eq!(out.insurance_status, InsuranceStatus::NotRequired);
        assert_eq!(out.financed_amount, dec!(400_000));
        assert_eq!(out.interest_saving, Decimal::ZERO);
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn test_insured_loan_rolls_premium_into_principal() {
        let mut input = standard_input();
        input.down_payment = dec!(50_000);
        let (out, _) = run(&input);
        assert_eq!(out.insurance_status, InsuranceStatus::Insured);
        assert_eq!(out.insurance_premium, dec!(10_800));
        assert_eq!(out.financed_amount, dec!(460_800));
    }

    #[test]
    fn test_variable_rate_adds_premium() {
        let mut input = standard_input();
        input.rate_type = RateType::Variable;
        let (out, _) = run(&input);
        assert_eq!(out.nominal_rate, dec!(0.06));
    }

    #[test]
    fn test_amortization_clamped_with_warning() {
        let mut input = standard_input();
        input.amortization_years = 40;
        let (out, warnings) = run(&input);
        assert_eq!(out.amortization_years, 30);
        assert!(warnings.iter().any(|w| w.contains("clamped")));
    }

    #[test]
    fn test_accelerated_frequency_requires_extra_percent() {
        let mut input = standard_input();
        input.accelerated_frequency = Some(26);
        let (ignored, warnings) = run(&input);
        assert_eq!(ignored.payments_per_year, 12);
        assert!(warnings.iter().any(|w| w.contains("ignored")));

        input.extra_payment_percent = dec!(10);
        let (honoured, _) = run(&input);
        assert_eq!(honoured.payments_per_year, 26);
        assert!(honoured.interest_saving > Decimal::ZERO);
    }

    #[test]
    fn test_prepayments_shorten_payoff() {
        let mut input = standard_input();
        input.annual_prepayment = dec!(10_000);
        input.extra_payment_percent = dec!(10);
        let (out, _) = run(&input);
        assert!(out.interest_saving > Decimal::ZERO);
        assert!(out.payoff.years < 25);
        assert!(out.payoff.years_faster > 0);
        assert!(!out.payoff.reached_iteration_cap);
    }

    #[test]
    fn test_payoff_summary_rounds_and_carries_months() {
        // 359 monthly payments = 29 years 11 months.
        let s = payoff_summary(359, 12, 25, 100_000, None);
        assert_eq!((s.years, s.months, s.years_faster), (29, 11, 0));
        // 51 of 52 weekly payments rounds to 12 months and carries.
        let carried = payoff_summary(52 * 10 + 51, 52, 25, 100_000, None);
        assert_eq!((carried.years, carried.months), (11, 0));
        assert_eq!(carried.years_faster, 14);
    }

    #[test]
    fn test_payoff_date_from_start_date() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 15);
        let s = payoff_summary(12 * 20 + 6, 12, 25, 100_000, start);
        assert_eq!(s.payoff_date, NaiveDate::from_ymd_opt(2046, 7, 15));
    }

    #[test]
    fn test_interest_only_never_pays_off() {
        let mut input = standard_input();
        input.loan_type = LoanType::InterestOnly;
        input.policy.payoff_iteration_cap = 1_000;
        let (out, warnings) = run(&input);
        assert!(out.payoff.reached_iteration_cap);
        assert_eq!(out.term.balance_end_of_term, dec!(400_000));
        assert!(warnings.iter().any(|w| w.contains("does not pay off")));
    }

    #[test]
    fn test_monthly_costs_with_rental_offset() {
        let mut input = standard_input();
        input.expenses = HomeExpenses {
            property_tax_annual: dec!(6_000),
            condo_fees: dec!(300),
            heat: dec!(100),
            other: dec!(50),
        };
        input.rental_income = Some(RentalIncome {
            yearly: dec!(12_000),
            monthly: dec!(5_000),
        });
        let (out, _) = run(&input);
        assert_eq!(out.monthly_costs.home_expenses, dec!(900));
        assert_eq!(out.monthly_costs.rental_income, dec!(1_000));
        assert_close(
            out.monthly_costs.total,
            out.monthly_costs.mortgage + dec!(900) + dec!(50) - dec!(1_000),
            TOL,
            "total monthly cost",
        );
    }

    #[test]
    fn test_monthly_costs_floor_at_zero() {
        let mut input = standard_input();
        input.rental_income = Some(RentalIncome {
            yearly: Decimal::ZERO,
            monthly: dec!(50_000),
        });
        let (out, _) = run(&input);
        assert_eq!(out.monthly_costs.total, Decimal::ZERO);
    }

    #[test]
    fn test_weekly_mortgage_converted_to_monthly_equivalent() {
        let mut input = standard_input();
        input.payment_frequency = PaymentFrequency::Weekly;
        let (out, _) = run(&input);
        assert_eq!(out.payment_frequency_label, "/weekly");
        assert_close(
            out.monthly_costs.mortgage,
            out.payment * dec!(52) / dec!(12),
            dec!(0.05),
            "monthly equivalent",
        );
    }

    #[test]
    fn test_below_minimum_down_payment_comparison() {
        let mut input = standard_input();
        input.down_payment = dec!(10_000);
        let (out, warnings) = run(&input);
        assert_eq!(out.insurance_status, InsuranceStatus::NotInsurable);
        assert!(warnings.iter().any(|w| w.contains("insurable")));
        let cmp = out.minimum_down_payment_comparison.unwrap();
        assert_eq!(cmp.minimum_down_payment, dec!(25_000));
        // 3.1% premium on 475k
        assert_eq!(cmp.minimum_insurance_premium, dec!(14_725));
        assert_eq!(cmp.user_payment, out.payment);
        assert!(cmp.minimum_payment > Decimal::ZERO);
    }

    #[test]
    fn test_validation_errors() {
        let mut input = standard_input();
        input.down_payment = dec!(600_000);
        assert!(calculate_mortgage(&input).is_err());

        let mut input = standard_input();
        input.purchase_price = dec!(-1);
        assert!(calculate_mortgage(&input).is_err());

        let mut input = standard_input();
        input.extra_payment_percent = dec!(-5);
        assert!(calculate_mortgage(&input).is_err());

        let mut input = standard_input();
        input.rate_term_years = 0;
        assert!(calculate_mortgage(&input).is_err());

        let mut input = standard_input();
        input.nominal_rate = dec!(1.5);
        assert!(calculate_mortgage(&input).is_err());

        let mut input = standard_input();
        input.rental_income = Some(RentalIncome {
            yearly: dec!(5_000_000_000_000),
            monthly: Decimal::ZERO,
        });
        assert!(calculate_mortgage(&input).is_err());

        let mut input = standard_input();
        input.accelerated_frequency = Some(1_000);
        input.extra_payment_percent = dec!(5);
        assert!(calculate_mortgage(&input).is_err());
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let input: MortgageInput = serde_json::from_str(
            r#"{"purchase_price": "500000", "down_payment": "100000", "nominal_rate": "0.05",
                "payment_frequency": "weekly-standard", "compounding": 12}"#,
        )
        .unwrap();
        assert_eq!(input.amortization_years, 25);
        assert_eq!(input.rate_term_years, 5);
        assert_eq!(input.payment_frequency, PaymentFrequency::Weekly);
        assert_eq!(input.compounding, CompoundingFrequency::Monthly);
        assert_eq!(input.policy, CalculatorPolicy::default());
    }

    #[test]
    fn test_oversized_price_is_rejected_not_overflowed() {
        let mut input = standard_input();
        input.purchase_price = dec!(100_000_000_000_000_000_000);
        input.down_payment = dec!(20_000_000_000_000_000_000);
        input.nominal_rate = dec!(1);
        input.amortization_years = 30;
        match calculate_mortgage(&input) {
            Err(MortgageCalcError::InvalidInput { field, .. }) => assert_eq!(field, "purchase_price"),
            other => panic!("expected purchase_price rejection, got {:?}", other.map(|o| o.result)),
        }
    }

    #[test]
    fn test_largest_accepted_price_at_top_rate_completes() {
        let mut input = standard_input();
        input.purchase_price = MAX_AMOUNT;
        input.down_payment = MAX_AMOUNT / dec!(5);
        input.nominal_rate = dec!(1);
        input.payment_frequency = PaymentFrequency::Daily;
        input.amortization_years = 30;
        let (out, _) = run(&input);
        assert!(out.payment > Decimal::ZERO);
    }

    #[test]
    fn test_rate_term_limited_to_amortization() {
        let mut input = standard_input();
        input.payment_frequency = PaymentFrequency::Daily;
        input.rate_term_years = 5_000;
        let (out, warnings) = run(&input);
        assert_eq!(out.term.term_years, 25);
        assert_eq!(out.term.payments, 365 * 25);
        assert!(warnings.iter().any(|w| w.contains("Rate term")));
    }

    #[test]
    fn test_raised_iteration_cap_is_rejected() {
        let input: MortgageInput = serde_json::from_str(
            r#"{"purchase_price": "500000", "down_payment": "100000", "nominal_rate": "0.05",
                "loan_type": "interest_only", "policy": {"payoff_iteration_cap": 2000000}}"#,
        )
        .unwrap();
        assert!(calculate_mortgage(&input).is_err());
    }

    #[test]
    fn test_payoff_summary_years_faster_follows_carry() {
        // 571 weekly payments: 10 years and 51 weeks, rounded to 11 years.
        let s = payoff_summary(571, 52, 25, 100_000, None);
        assert_eq!((s.years, s.months, s.years_faster), (11, 0, 14));
    }

    #[test]
    fn test_envelope_metadata() {
        let out = calculate_mortgage(&standard_input()).unwrap();
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert!(out.methodology.contains("amortization"));
    }
}
