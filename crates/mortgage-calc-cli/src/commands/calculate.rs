use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_calc_core::amortization::LoanType;
use mortgage_calc_core::calculator::{
    self, HomeExpenses, MortgageInput, RateType, RentalIncome,
};
use mortgage_calc_core::policy::CalculatorPolicy;
use mortgage_calc_core::rates::CompoundingFrequency;
use mortgage_calc_core::scenarios::{self, ScenarioBInput, ScenarioOverrides};

use super::FrequencyArg;
use crate::input;

/// Form inputs for a full recalculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to a JSON/YAML MortgageInput file (or pipe JSON on stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Policy overrides (JSON/YAML CalculatorPolicy); replaces any embedded policy
    #[arg(long)]
    pub policy: Option<String>,

    #[command(flatten)]
    pub form: FormArgs,
}

#[derive(Args)]
pub struct FormArgs {
    /// Purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment amount
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Nominal annual rate as a decimal (e.g. 0.0525 for 5.25%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Quote as a variable rate (adds the policy's variable-rate premium)
    #[arg(long)]
    pub variable: bool,

    /// Payment frequency
    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,

    /// Compounding periods per year: 2, 12, 26, 52 or 365 (others mean 2)
    #[arg(long, default_value = "2")]
    pub compounding: u32,

    /// Amortization in years (clamped to 5..=30)
    #[arg(long, default_value = "25")]
    pub amortization: u32,

    /// Rate term in years for the end-of-term balance
    #[arg(long, default_value = "5")]
    pub term: u32,

    /// Interest-only loan
    #[arg(long)]
    pub interest_only: bool,

    /// One-time prepayment at origination
    #[arg(long, default_value = "0")]
    pub one_time: Decimal,

    /// Prepayment at the end of every payment-year
    #[arg(long, default_value = "0")]
    pub annual: Decimal,

    /// Extra payment as a whole percent of the regular payment
    #[arg(long, default_value = "0")]
    pub extra_percent: Decimal,

    /// Accelerated payments per year (needs --extra-percent)
    #[arg(long)]
    pub accelerated: Option<u32>,

    /// Annual property tax
    #[arg(long, default_value = "0")]
    pub property_tax: Decimal,

    /// Monthly condo fees
    #[arg(long, default_value = "0")]
    pub condo_fees: Decimal,

    /// Monthly heating cost
    #[arg(long, default_value = "0")]
    pub heat: Decimal,

    /// Other monthly expenses
    #[arg(long, default_value = "0")]
    pub other_expenses: Decimal,

    /// Yearly rental income (preferred over --rental-monthly)
    #[arg(long)]
    pub rental_yearly: Option<Decimal>,

    /// Monthly rental income
    #[arg(long)]
    pub rental_monthly: Option<Decimal>,

    /// Property is a rental (subject to the policy's rental LTV cap)
    #[arg(long)]
    pub rental: bool,

    /// First payment date (YYYY-MM-DD) for a projected payoff date
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Scenario B: the primary inputs plus overrides
#[derive(Args)]
pub struct ScenarioBArgs {
    /// Path to a JSON/YAML ScenarioBInput file (or pipe JSON on stdin)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub policy: Option<String>,

    #[command(flatten)]
    pub form: FormArgs,

    /// Scenario B purchase price
    #[arg(long)]
    pub b_price: Option<Decimal>,

    /// Scenario B down payment
    #[arg(long)]
    pub b_down_payment: Option<Decimal>,

    /// Scenario B nominal rate
    #[arg(long)]
    pub b_rate: Option<Decimal>,

    /// Scenario B amortization years
    #[arg(long)]
    pub b_amortization: Option<u32>,

    /// Scenario B payment frequency
    #[arg(long, value_enum)]
    pub b_frequency: Option<FrequencyArg>,
}

impl FormArgs {
    fn to_input(&self, policy: CalculatorPolicy) -> Result<MortgageInput, Box<dyn std::error::Error>> {
        let purchase_price = self
            .price
            .ok_or("--price is required without --input or stdin")?;
        let nominal_rate = self
            .rate
            .ok_or("--rate is required without --input or stdin")?;

        let rental_income = match (self.rental_yearly, self.rental_monthly) {
            (None, None) => None,
            (yearly, monthly) => Some(RentalIncome {
                yearly: yearly.unwrap_or(Decimal::ZERO),
                monthly: monthly.unwrap_or(Decimal::ZERO),
            }),
        };

        Ok(MortgageInput {
            purchase_price,
            down_payment: self.down_payment,
            nominal_rate,
            rate_type: if self.variable {
                RateType::Variable
            } else {
                RateType::Fixed
            },
            payment_frequency: self.frequency.into(),
            compounding: CompoundingFrequency::from_code(self.compounding),
            amortization_years: self.amortization,
            rate_term_years: self.term,
            loan_type: if self.interest_only {
                LoanType::InterestOnly
            } else {
                LoanType::Standard
            },
            one_time_prepayment: self.one_time,
            annual_prepayment: self.annual,
            extra_payment_percent: self.extra_percent,
            accelerated_frequency: self.accelerated,
            expenses: HomeExpenses {
                property_tax_annual: self.property_tax,
                condo_fees: self.condo_fees,
                heat: self.heat,
                other: self.other_expenses,
            },
            rental_income,
            is_rental: self.rental,
            start_date: self.start_date,
            policy,
        })
    }
}

fn load_policy(path: Option<&str>) -> Result<Option<CalculatorPolicy>, Box<dyn std::error::Error>> {
    path.map(input::file::read_structured::<CalculatorPolicy>)
        .transpose()
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let policy = load_policy(args.policy.as_deref())?;
    let mut mortgage: MortgageInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => args.form.to_input(CalculatorPolicy::default())?,
    };
    if let Some(policy) = policy {
        mortgage.policy = policy;
    }

    let result = calculator::calculate_mortgage(&mortgage)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_scenario_b(args: ScenarioBArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let policy = load_policy(args.policy.as_deref())?;
    let mut scenario: ScenarioBInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => ScenarioBInput {
            primary: args.form.to_input(CalculatorPolicy::default())?,
            overrides: ScenarioOverrides {
                purchase_price: args.b_price,
                down_payment: args.b_down_payment,
                nominal_rate: args.b_rate,
                amortization_years: args.b_amortization,
                payment_frequency: args.b_frequency.map(Into::into),
            },
        },
    };
    if let Some(policy) = policy {
        scenario.primary.policy = policy;
    }

    let result = scenarios::compare_scenario_b(&scenario)?;
    Ok(serde_json::to_value(result)?)
}
