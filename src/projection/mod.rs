//! Projection engine: per-year cash flow cells, totals and valuation

mod cashflows;
mod cell;
mod engine;
mod irr;
mod layout;
mod leasing;
mod market_leasing;
mod rent_schedule;
mod timeline;
mod valuation;

pub use cashflows::{LineTotal, ProjectionResult, ProjectionSummary, YearRecord};
pub use cell::{constant, Cell, CellContent, CellRef, NumberFormat, Term};
pub use engine::{ProjectionConfig, ProjectionEngine, DEFAULT_ANALYSIS_START};
pub use irr::{npv_at_rate, solve_irr};
pub use layout::{LineItem, SheetLayout};
pub use leasing::{
    commission_terms, tenant_improvement_cost, vacancy_factor, vacancy_terms, CommissionYear,
};
pub use market_leasing::MarketLeasingSummary;
pub use rent_schedule::{ExpiryProfile, RentEvent, RentSchedule, RentScheduleEntry};
pub use timeline::{escalated_rent, Regime, Timeline};
pub use valuation::{InvestmentPeriod, ValuationSummary};
