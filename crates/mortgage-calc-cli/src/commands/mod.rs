pub mod calculate;
pub mod engine;

use clap::ValueEnum;
use mortgage_calc_core::calculator::PaymentFrequency;

/// Payment frequency as selected on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Monthly,
    Weekly,
    Daily,
    Semiannual,
}

impl From<FrequencyArg> for PaymentFrequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Monthly => PaymentFrequency::Monthly,
            FrequencyArg::Weekly => PaymentFrequency::Weekly,
            FrequencyArg::Daily => PaymentFrequency::Daily,
            FrequencyArg::Semiannual => PaymentFrequency::Semiannual,
        }
    }
}
