pub mod amortization;
pub mod error;
pub mod payment;
pub mod policy;
pub mod rates;
pub mod types;

#[cfg(feature = "insurance")]
pub mod insurance;

#[cfg(feature = "scenarios")]
pub mod calculator;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::MortgageCalcError;
pub use types::*;

/// Standard result type for all mortgage-calc operations
pub type MortgageCalcResult<T> = Result<T, MortgageCalcError>;
