//! CRE Underwriting - Cash flow projection engine for single-tenant commercial real estate
//!
//! This library provides:
//! - Lease timeline resolution against an analysis start date
//! - Annual cash flow projections emitted as spreadsheet cells (literal or formula)
//! - Expected-value blending of renewal, vacancy and leasing costs on expiry
//! - Exit value, NPV and IRR
//! - Rent schedules from lease commencement
//! - Parallel batch projection of independent deals

pub mod assumptions;
pub mod deal;
pub mod error;
pub mod export;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use assumptions::{Assumptions, FinancialAssumptions, MarketAssumptions};
pub use deal::{Deal, LeaseInput, PropertyInput};
pub use error::{EngineResult, ProjectionError};
pub use projection::{ProjectionConfig, ProjectionEngine, ProjectionResult, YearRecord};
pub use scenario::ScenarioRunner;
