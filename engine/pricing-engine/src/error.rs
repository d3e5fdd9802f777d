//! Error types for the pricing engine

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for pricing engine operations
pub type Result<T> = std::result::Result<T, PricingError>;

/// Errors that can occur while pricing a quote
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No matching catalog row: {0}")]
    NotFound(String),

    #[error("Denominator out of domain in {stage}: {denominator}")]
    DivisionDomain { stage: &'static str, denominator: Decimal },

    #[error("Arithmetic overflow in {stage}")]
    Overflow { stage: &'static str },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PricingError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        PricingError::Validation(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        PricingError::NotFound(message.into())
    }
}

/// Divide `numerator` by `denominator`, failing when the denominator is zero or negative.
///
/// Every gross-up and tax back-out division in the engine goes through here. A
/// quotient beyond the decimal range is an `Overflow`.
pub(crate) fn checked_div(
    stage: &'static str,
    numerator: Decimal,
    denominator: Decimal,
) -> Result<Decimal> {
    if denominator <= Decimal::ZERO {
        return Err(PricingError::DivisionDomain { stage, denominator });
    }
    numerator
        .checked_div(denominator)
        .ok_or(PricingError::Overflow { stage })
}
