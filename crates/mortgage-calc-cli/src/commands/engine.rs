use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use mortgage_calc_core::amortization::{
    validate_inputs, AmortizationResult, AmortizationSimulator, LoanType, PartialAmortization,
    PeriodicTerms, PrepaymentPlan,
};
use mortgage_calc_core::insurance;
use mortgage_calc_core::payment::level_payment;
use mortgage_calc_core::policy::CalculatorPolicy;
use mortgage_calc_core::rates::{effective_annual_rate, effective_periodic_rate, CompoundingFrequency};
use mortgage_calc_core::types::Rate;

use crate::input;

/// Arguments for a level payment quote
#[derive(Args)]
pub struct PaymentArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Nominal annual rate as a decimal
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Decimal,

    /// Compounding periods per year (unrecognised values mean semi-annual)
    #[arg(long, default_value = "2")]
    pub compounding: u32,

    /// Payments per year
    #[arg(long, default_value = "12")]
    pub payments_per_year: u32,

    /// Amortization in years
    #[arg(long, default_value = "25")]
    pub years: u32,
}

/// Arguments for an insurance premium lookup
#[derive(Args)]
pub struct InsuranceArgs {
    /// Purchase price
    #[arg(long)]
    pub price: Decimal,

    /// Down payment amount
    #[arg(long)]
    pub down_payment: Decimal,

    /// Property is a rental
    #[arg(long)]
    pub rental: bool,

    /// Policy overrides (JSON/YAML CalculatorPolicy)
    #[arg(long)]
    pub policy: Option<String>,
}

/// Arguments for a raw amortization run
#[derive(Args)]
pub struct AmortizeArgs {
    #[arg(long)]
    pub principal: Decimal,

    /// Nominal annual rate as a decimal
    #[arg(long, required_unless_present = "periodic_rate", allow_hyphen_values = true)]
    pub rate: Option<Decimal>,

    /// Rate per payment period, bypassing compounding conversion
    #[arg(long, allow_hyphen_values = true)]
    pub periodic_rate: Option<Decimal>,

    #[arg(long, default_value = "2")]
    pub compounding: u32,

    #[arg(long, default_value = "12")]
    pub payments_per_year: u32,

    #[arg(long, default_value = "25")]
    pub years: u32,

    #[arg(long)]
    pub interest_only: bool,

    #[arg(long, default_value = "0")]
    pub one_time: Decimal,

    #[arg(long, default_value = "0")]
    pub annual: Decimal,

    /// Extra payment as a fraction (0.10 = 10% extra)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub extra_fraction: Decimal,

    /// Stop after this many payments and report the balance (rate-term snapshot)
    #[arg(long)]
    pub partial_payments: Option<u32>,

    /// Emit a per-year schedule instead of totals
    #[arg(long)]
    pub schedule: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct PaymentOutput {
    effective_annual_rate: Rate,
    periodic_rate: Rate,
    total_payments: u32,
    payment: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
struct AmortizeOutput {
    periodic_rate: Rate,
    total_payments: u32,
    full: AmortizationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial: Option<PartialAmortization>,
    payoff_count: u32,
    reached_iteration_cap: bool,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.payments_per_year == 0 || args.years == 0 {
        return Err("--payments-per-year and --years must be positive".into());
    }
    let compounding = CompoundingFrequency::from_code(args.compounding);
    let periodic_rate = effective_periodic_rate(args.rate, compounding, args.payments_per_year);
    let total_payments = args.payments_per_year.saturating_mul(args.years);

    let output = PaymentOutput {
        effective_annual_rate: effective_annual_rate(args.rate, compounding),
        periodic_rate,
        total_payments,
        payment: level_payment(args.principal, periodic_rate, total_payments).round_dp(2),
    };
    Ok(serde_json::to_value(output)?)
}

pub fn run_insurance(args: InsuranceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let policy = match args.policy.as_deref() {
        Some(path) => input::file::read_structured::<CalculatorPolicy>(path)?,
        None => CalculatorPolicy::default(),
    };
    policy.validate()?;
    if args.down_payment < Decimal::ZERO || args.down_payment > args.price {
        return Err("--down-payment must be between 0 and --price".into());
    }

    let assessment = insurance::assess(args.price, args.down_payment, args.rental, &policy);
    Ok(serde_json::to_value(assessment)?)
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.payments_per_year == 0 {
        return Err("--payments-per-year must be positive".into());
    }
    let periodic_rate = match (args.periodic_rate, args.rate) {
        (Some(r), _) => r,
        (None, Some(nominal)) => effective_periodic_rate(
            nominal,
            CompoundingFrequency::from_code(args.compounding),
            args.payments_per_year,
        ),
        (None, None) => return Err("--rate or --periodic-rate is required".into()),
    };

    let terms = PeriodicTerms {
        principal: args.principal,
        periodic_rate,
        payment_frequency: args.payments_per_year,
        amortization_years: args.years,
    };
    let plan = PrepaymentPlan {
        one_time_lump_sum: args.one_time,
        annual_lump_sum: args.annual,
        extra_payment_fraction: args.extra_fraction,
    };
    validate_inputs(&terms, &plan)?;
    let loan_type = if args.interest_only {
        LoanType::InterestOnly
    } else {
        LoanType::Standard
    };
    let simulator = AmortizationSimulator::default();

    if args.schedule {
        return Ok(serde_json::to_value(simulator.yearly_schedule(&terms, &plan, loan_type))?);
    }

    let payoff_count = simulator.payoff_count(&terms, &plan, loan_type);
    let output = AmortizeOutput {
        periodic_rate,
        total_payments: terms.total_payments(),
        full: simulator.full(&terms, &plan, loan_type),
        partial: args
            .partial_payments
            .map(|n| simulator.partial(&terms, &plan, loan_type, n)),
        payoff_count,
        reached_iteration_cap: payoff_count >= simulator.iteration_cap,
    };
    Ok(serde_json::to_value(output)?)
}
