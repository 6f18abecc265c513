//! Balance walk-down simulator.
//!
//! One stepping algorithm, three stopping rules:
//! - full term: `payment_frequency × amortization_years` periods,
//! - partial term: a caller-supplied number of periods (a rate term snapshot),
//! - payoff search: until the balance reaches zero, bounded by a safety cap.
//!
//! Every period charges interest on the opening balance and applies the
//! principal portion of the (possibly grossed-up) payment, clamped so it never
//! increases the balance. Once per payment-year an annual lump sum is applied.
//! A one-time lump sum comes off the opening balance before the first period.
//!
//! Partial-term and payoff modes size the base payment against a fixed
//! reference amortization (30 years by default) rather than the loan's own
//! horizon: they answer "what happens if I keep paying a normal payment", not
//! "what payment clears the loan in N periods".

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MortgageCalcError;
use crate::payment::level_payment;
use crate::policy::{
    CalculatorPolicy, DEFAULT_PAYOFF_ITERATION_CAP, DEFAULT_REFERENCE_AMORTIZATION_YEARS, MAX_AMOUNT,
};
use crate::rates::{effective_periodic_rate, CompoundingFrequency};
use crate::types::{Money, Rate};
use crate::MortgageCalcResult;

/// Upper bound on periods walked by any one full, partial or schedule run.
pub const MAX_SIMULATION_PERIODS: u32 = DEFAULT_PAYOFF_ITERATION_CAP;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    #[default]
    Standard,
    /// Regular payments cover interest only; only the extra fraction reduces principal.
    InterestOnly,
}

/// Loan as quoted: nominal rate with its compounding convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub nominal_annual_rate: Rate,
    #[serde(default)]
    pub compounding: CompoundingFrequency,
    /// Payments per year.
    pub payment_frequency: u32,
    pub amortization_years: u32,
}

impl LoanTerms {
    pub fn periodic_rate(&self) -> Rate {
        effective_periodic_rate(self.nominal_annual_rate, self.compounding, self.payment_frequency)
    }

    /// Resolve the nominal quote to a rate per payment period.
    pub fn resolve(&self) -> PeriodicTerms {
        PeriodicTerms {
            principal: self.principal,
            periodic_rate: self.periodic_rate(),
            payment_frequency: self.payment_frequency,
            amortization_years: self.amortization_years,
        }
    }
}

/// Loan expressed per payment period; what the simulator actually walks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicTerms {
    pub principal: Money,
    pub periodic_rate: Rate,
    pub payment_frequency: u32,
    pub amortization_years: u32,
}

impl PeriodicTerms {
    pub fn total_payments(&self) -> u32 {
        self.payment_frequency.saturating_mul(self.amortization_years)
    }

    fn payments_over(&self, years: u32) -> u32 {
        self.payment_frequency.saturating_mul(years)
    }
}

impl From<&LoanTerms> for PeriodicTerms {
    fn from(terms: &LoanTerms) -> Self {
        terms.resolve()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepaymentPlan {
    /// Paid against the balance at origination.
    pub one_time_lump_sum: Money,
    /// Paid at the end of every payment-year.
    pub annual_lump_sum: Money,
    /// Fractional increase of every regular payment (0.10 = 10% extra).
    pub extra_payment_fraction: Decimal,
}

impl PrepaymentPlan {
    pub fn none() -> Self {
        PrepaymentPlan::default()
    }

    pub fn is_empty(&self) -> bool {
        self.one_time_lump_sum.is_zero()
            && self.annual_lump_sum.is_zero()
            && self.extra_payment_fraction.is_zero()
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub final_balance: Money,
    pub total_interest: Money,
    /// Regular principal plus all lump sums.
    pub total_principal_paid: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialAmortization {
    pub final_balance: Money,
    pub total_interest: Money,
}

/// One payment-year of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleYear {
    pub year: u32,
    pub payments: u32,
    pub interest: Money,
    pub principal: Money,
    /// One-time (year 1) and annual lump sums applied in this year.
    pub lump_sums: Money,
    pub ending_balance: Money,
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Stateless simulator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmortizationSimulator {
    /// Horizon used to size the base payment in partial and payoff modes.
    pub reference_years: u32,
    /// Safety cap on payoff-search periods. Not a real amortization bound:
    /// reaching it means the configuration never pays off.
    pub iteration_cap: u32,
}

impl Default for AmortizationSimulator {
    fn default() -> Self {
        AmortizationSimulator {
            reference_years: DEFAULT_REFERENCE_AMORTIZATION_YEARS,
            iteration_cap: DEFAULT_PAYOFF_ITERATION_CAP,
        }
    }
}

impl From<&CalculatorPolicy> for AmortizationSimulator {
    fn from(policy: &CalculatorPolicy) -> Self {
        AmortizationSimulator {
            reference_years: policy.reference_amortization_years,
            iteration_cap: policy.payoff_iteration_cap,
        }
    }
}

impl AmortizationSimulator {
    /// Base payment for partial-term and payoff modes.
    pub fn reference_payment(&self, terms: &PeriodicTerms) -> Money {
        level_payment(
            terms.principal,
            terms.periodic_rate,
            terms.payments_over(self.reference_years),
        )
    }

    /// Walk the full amortization, stopping early once the balance is cleared.
    pub fn full(&self, terms: &PeriodicTerms, plan: &PrepaymentPlan, loan_type: LoanType) -> AmortizationResult {
        let total = terms.total_payments();
        let base = level_payment(terms.principal, terms.periodic_rate, total);
        let walk = BalanceWalk::new(terms, plan, loan_type, base);

        let mut state = walk.open(plan);
        walk.run(&mut state, total.min(MAX_SIMULATION_PERIODS), |_| {});
        AmortizationResult {
            final_balance: state.balance,
            total_interest: state.interest,
            total_principal_paid: state.principal,
        }
    }

    /// Balance and interest after `partial_payments` periods at the reference payment.
    pub fn partial(
        &self,
        terms: &PeriodicTerms,
        plan: &PrepaymentPlan,
        loan_type: LoanType,
        partial_payments: u32,
    ) -> PartialAmortization {
        let walk = BalanceWalk::new(terms, plan, loan_type, self.reference_payment(terms));

        let mut state = walk.open(plan);
        walk.run(&mut state, partial_payments.min(MAX_SIMULATION_PERIODS), |_| {});
        PartialAmortization {
            final_balance: state.balance,
            total_interest: state.interest,
        }
    }

    /// Periods until payoff at the reference payment.
    pub fn payoff_count(&self, terms: &PeriodicTerms, plan: &PrepaymentPlan, loan_type: LoanType) -> u32 {
        self.payoff_count_at(terms, plan, loan_type, self.reference_payment(terms))
    }

    /// Periods until payoff at an explicit base payment, or the iteration cap
    /// if the balance never clears.
    pub fn payoff_count_at(
        &self,
        terms: &PeriodicTerms,
        plan: &PrepaymentPlan,
        loan_type: LoanType,
        base_payment: Money,
    ) -> u32 {
        let walk = BalanceWalk::new(terms, plan, loan_type, base_payment);

        let mut state = walk.open(plan);
        walk.run(&mut state, self.iteration_cap, |_| {});
        if state.periods >= self.iteration_cap && state.balance > Decimal::ZERO {
            tracing::warn!(
                cap = self.iteration_cap,
                balance = %state.balance,
                "payoff search reached the iteration cap without clearing the balance"
            );
        }
        state.periods
    }

    /// Per-year summary of the full-term walk.
    pub fn yearly_schedule(
        &self,
        terms: &PeriodicTerms,
        plan: &PrepaymentPlan,
        loan_type: LoanType,
    ) -> Vec<ScheduleYear> {
        let total = terms.total_payments();
        let base = level_payment(terms.principal, terms.periodic_rate, total);
        let walk = BalanceWalk::new(terms, plan, loan_type, base);

        let mut state = walk.open(plan);
        let mut years: Vec<ScheduleYear> = Vec::with_capacity(terms.amortization_years as usize);
        let mut current = ScheduleYear {
            year: 1,
            payments: 0,
            interest: Decimal::ZERO,
            principal: Decimal::ZERO,
            lump_sums: state.principal,
            ending_balance: state.balance,
        };
        let frequency = terms.payment_frequency.max(1);

        walk.run(&mut state, total.min(MAX_SIMULATION_PERIODS), |step| {
            current.payments += 1;
            current.interest += step.interest;
            current.principal += step.principal;
            current.lump_sums += step.lump_sum;
            current.ending_balance = step.closing_balance;
            if step.period % frequency == 0 {
                let next_year = current.year + 1;
                years.push(std::mem::replace(
                    &mut current,
                    ScheduleYear {
                        year: next_year,
                        payments: 0,
                        interest: Decimal::ZERO,
                        principal: Decimal::ZERO,
                        lump_sums: Decimal::ZERO,
                        ending_balance: step.closing_balance,
                    },
                ));
            }
        });

        if current.payments > 0 || years.is_empty() {
            years.push(current);
        }
        years
    }
}

/// Check caller-supplied terms and plan before running the engine directly.
///
/// The calculator validates its own form inputs; this covers the raw engine
/// entry points.
pub fn validate_inputs(terms: &PeriodicTerms, plan: &PrepaymentPlan) -> MortgageCalcResult<()> {
    if terms.principal < Decimal::ZERO || terms.principal > MAX_AMOUNT {
        return Err(MortgageCalcError::invalid(
            "principal",
            format!("Principal must be between 0 and {}", MAX_AMOUNT),
        ));
    }
    if terms.periodic_rate <= -Decimal::ONE || terms.periodic_rate > Decimal::ONE {
        return Err(MortgageCalcError::invalid(
            "periodic_rate",
            "Periodic rate must be greater than -100% and at most 100%",
        ));
    }
    if terms.payment_frequency == 0 || terms.amortization_years == 0 {
        return Err(MortgageCalcError::invalid(
            "payment_frequency",
            "Payment frequency and amortization years must be positive",
        ));
    }
    if terms.total_payments() > MAX_SIMULATION_PERIODS {
        return Err(MortgageCalcError::invalid(
            "payment_frequency",
            format!("At most {} payments per amortization", MAX_SIMULATION_PERIODS),
        ));
    }
    let lumps = [plan.one_time_lump_sum, plan.annual_lump_sum];
    if lumps.iter().any(|v| *v < Decimal::ZERO || *v > MAX_AMOUNT) {
        return Err(MortgageCalcError::invalid(
            "prepayment",
            format!("Lump sums must be between 0 and {}", MAX_AMOUNT),
        ));
    }
    if plan.extra_payment_fraction < -Decimal::ONE || plan.extra_payment_fraction > Decimal::ONE {
        return Err(MortgageCalcError::invalid(
            "extra_payment_fraction",
            "Extra payment fraction must be between -1 and 1",
        ));
    }
    Ok(())
}

/// Full-term simulation with the default simulator.
pub fn simulate_full(terms: &PeriodicTerms, plan: &PrepaymentPlan, loan_type: LoanType) -> AmortizationResult {
    AmortizationSimulator::default().full(terms, plan, loan_type)
}

/// Partial-term snapshot with the default 30-year reference payment.
pub fn simulate_partial(
    terms: &PeriodicTerms,
    plan: &PrepaymentPlan,
    loan_type: LoanType,
    partial_payments: u32,
) -> PartialAmortization {
    AmortizationSimulator::default().partial(terms, plan, loan_type, partial_payments)
}

/// Payoff search with the default reference payment and 100,000-period safety cap.
pub fn find_payoff_count(terms: &PeriodicTerms, plan: &PrepaymentPlan, loan_type: LoanType) -> u32 {
    AmortizationSimulator::default().payoff_count(terms, plan, loan_type)
}

// ---------------------------------------------------------------------------
// Shared stepping
// ---------------------------------------------------------------------------

struct BalanceWalk {
    rate: Rate,
    base_payment: Money,
    extra: Decimal,
    loan_type: LoanType,
    frequency: u32,
    annual_lump_sum: Money,
    principal: Money,
}

struct WalkState {
    balance: Money,
    interest: Money,
    /// Principal reduction including lump sums.
    principal: Money,
    periods: u32,
}

struct PeriodStep {
    period: u32,
    interest: Money,
    principal: Money,
    lump_sum: Money,
    closing_balance: Money,
}

impl BalanceWalk {
    fn new(terms: &PeriodicTerms, plan: &PrepaymentPlan, loan_type: LoanType, base_payment: Money) -> Self {
        BalanceWalk {
            rate: terms.periodic_rate,
            base_payment,
            extra: plan.extra_payment_fraction,
            loan_type,
            frequency: terms.payment_frequency,
            annual_lump_sum: plan.annual_lump_sum,
            principal: terms.principal,
        }
    }

    /// Opening state with any one-time lump sum already applied.
    fn open(&self, plan: &PrepaymentPlan) -> WalkState {
        let mut balance = self.principal;
        let mut paid = Decimal::ZERO;
        if plan.one_time_lump_sum > Decimal::ZERO && balance > Decimal::ZERO {
            let used = balance.min(plan.one_time_lump_sum);
            balance = (balance - used).max(Decimal::ZERO);
            paid = used;
        }
        WalkState {
            balance,
            interest: Decimal::ZERO,
            principal: paid,
            periods: 0,
        }
    }

    /// Step until `limit` periods have run or the balance is cleared.
    fn run(&self, state: &mut WalkState, limit: u32, mut visit: impl FnMut(&PeriodStep)) {
        while state.periods < limit && state.balance > Decimal::ZERO {
            let interest = state.balance * self.rate;
            let payment = match self.loan_type {
                LoanType::Standard => self.base_payment + self.base_payment * self.extra,
                LoanType::InterestOnly => interest + interest * self.extra,
            };

            let principal = (payment - interest).max(Decimal::ZERO).min(state.balance);
            state.balance = (state.balance - principal).max(Decimal::ZERO);
            state.interest += interest;
            state.principal += principal;
            state.periods += 1;

            let mut lump_sum = Decimal::ZERO;
            if self.frequency > 0
                && state.periods % self.frequency == 0
                && self.annual_lump_sum > Decimal::ZERO
                && state.balance > Decimal::ZERO
            {
                lump_sum = state.balance.min(self.annual_lump_sum);
                state.balance = (state.balance - lump_sum).max(Decimal::ZERO);
                state.principal += lump_sum;
            }

            visit(&PeriodStep {
                period: state.periods,
                interest,
                principal,
                lump_sum,
                closing_balance: state.balance,
            });
        }
    }
}
