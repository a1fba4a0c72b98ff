//! Input validation errors.
//!
//! Only loan-application figures can fail validation: a currency amount
//! used as a denominator is never silently defaulted. Credit-profile
//! fields always fall back to documented neutral values instead, so
//! scoring is total.

use thiserror::Error;

/// Malformed or missing loan-application figures.
///
/// Raised before any evaluator runs. Scoring under/overflow is never an
/// error; sub-scores and the composite score are clamped locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{field} must be a positive amount")]
    NonPositiveAmount { field: &'static str },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be within 0.0..=1.0")]
    RatioOutOfRange { field: &'static str },
}
