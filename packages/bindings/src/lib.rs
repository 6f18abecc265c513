use napi::Result as NapiResult;
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use mortgage_calc_core::amortization::{
    validate_inputs, AmortizationResult, AmortizationSimulator, LoanTerms, LoanType,
    PartialAmortization, PrepaymentPlan,
};
use mortgage_calc_core::policy::CalculatorPolicy;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_mortgage(input_json: String) -> NapiResult<String> {
    let input: mortgage_calc_core::calculator::MortgageInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_calc_core::calculator::calculate_mortgage(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_scenario_b(input_json: String) -> NapiResult<String> {
    let input: mortgage_calc_core::scenarios::ScenarioBInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_calc_core::scenarios::compare_scenario_b(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct InsuranceBindingInput {
    purchase_price: rust_decimal::Decimal,
    down_payment: rust_decimal::Decimal,
    #[serde(default)]
    is_rental: bool,
    #[serde(default)]
    policy: CalculatorPolicy,
}

#[napi]
pub fn insurance_quote(input_json: String) -> NapiResult<String> {
    let input: InsuranceBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    input.policy.validate().map_err(to_napi_error)?;
    let output = mortgage_calc_core::insurance::assess(
        input.purchase_price,
        input.down_payment,
        input.is_rental,
        &input.policy,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct AmortizeBindingInput {
    #[serde(flatten)]
    terms: LoanTerms,
    #[serde(default)]
    plan: PrepaymentPlan,
    #[serde(default)]
    loan_type: LoanType,
    #[serde(default)]
    partial_payments: Option<u32>,
}

#[derive(Serialize)]
struct AmortizeBindingOutput {
    full: AmortizationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial: Option<PartialAmortization>,
    payoff_count: u32,
}

#[napi]
pub fn amortize(input_json: String) -> NapiResult<String> {
    let input: AmortizeBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let terms = input.terms.resolve();
    validate_inputs(&terms, &input.plan).map_err(to_napi_error)?;
    let simulator = AmortizationSimulator::default();
    let output = AmortizeBindingOutput {
        full: simulator.full(&terms, &input.plan, input.loan_type),
        partial: input
            .partial_payments
            .map(|n| simulator.partial(&terms, &input.plan, input.loan_type, n)),
        payoff_count: simulator.payoff_count(&terms, &input.plan, input.loan_type),
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}
