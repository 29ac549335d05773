//! Turnover vacancy and leasing cost factors
//!
//! Renewal and non-renewal are blended as an expected value: every cost that
//! only arises when the tenant leaves is weighted by `1 - renewal_probability`.

use super::cell::Term;
use crate::assumptions::{FinancialAssumptions, MarketAssumptions};

/// Fraction of a year's rent lost to turnover vacancy
pub fn vacancy_factor(vacancy_months: u32, renewal_probability: f64) -> f64 {
    vacancy_terms(vacancy_months, renewal_probability)
        .iter()
        .map(|t| t.value)
        .product()
}

/// Formula factors for the vacancy loss: `(months/12)` and `(1-p)`
pub fn vacancy_terms(vacancy_months: u32, renewal_probability: f64) -> [Term; 2] {
    [
        Term::fraction(vacancy_months as f64, 12.0),
        Term::complement(renewal_probability),
    ]
}

/// Tenant improvement allowance expected on turnover
pub fn tenant_improvement_cost(area: f64, ti_per_area: f64, renewal_probability: f64) -> f64 {
    area * ti_per_area * (1.0 - renewal_probability)
}

/// Year of the new lease a commission is paid on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommissionYear {
    First,
    Second,
}

impl CommissionYear {
    pub fn rate(&self, financial: &FinancialAssumptions) -> f64 {
        match self {
            CommissionYear::First => financial.leasing_commission_year1_rate,
            CommissionYear::Second => financial.leasing_commission_year2plus_rate,
        }
    }
}

/// Formula factors for a leasing commission on NOI: `rate` and `(1-p)`
pub fn commission_terms(
    year: CommissionYear,
    financial: &FinancialAssumptions,
    market: &MarketAssumptions,
) -> [Term; 2] {
    [
        Term::constant(year.rate(financial)),
        Term::complement(market.renewal_probability),
    ]
}
