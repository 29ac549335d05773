//! Error types for deal projection

use chrono::NaiveDate;
use thiserror::Error;

/// A specialized Result type for projection operations.
pub type EngineResult<T> = Result<T, ProjectionError>;

/// Structured failures raised while projecting a deal.
///
/// Every variant names the offending field so the caller can map it to a
/// user-facing message. None of them are retryable: the engine is
/// deterministic and the same input reproduces the same failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Lease end date is on or before the lease start date.
    #[error("Invalid lease dates: lease_end {end} must be after lease_start {start}")]
    InvalidLeaseDates {
        /// Lease commencement.
        start: NaiveDate,
        /// Lease expiry.
        end: NaiveDate,
    },

    /// A numeric input lies outside its permitted range.
    #[error("Invalid range for {field}: {value} (expected {constraint})")]
    InvalidRange {
        /// Name of the input field.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Human readable constraint, e.g. "0 <= x <= 1".
        constraint: &'static str,
    },

    /// IRR root search could not bracket or converge on a root.
    #[error("IRR did not converge after {iterations} iterations (residual: {residual})")]
    NoConvergence {
        /// Iterations attempted.
        iterations: u32,
        /// NPV residual at the last evaluated rate.
        residual: f64,
    },

    /// Neither an annual rent nor a rent-per-area figure was supplied.
    #[error("Missing derived input: {field}")]
    MissingDerivedInput {
        /// The derived quantity that could not be resolved.
        field: &'static str,
    },
}

impl ProjectionError {
    /// Shorthand for an `InvalidRange` failure.
    pub fn out_of_range(field: &'static str, value: f64, constraint: &'static str) -> Self {
        ProjectionError::InvalidRange { field, value, constraint }
    }
}
