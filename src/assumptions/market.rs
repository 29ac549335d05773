//! Market leasing assumptions applied when the in-place lease expires

use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, ProjectionError};

fn default_market_term_years() -> u32 {
    5
}

/// Market leasing profile used upon expiry of the in-place lease
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAssumptions {
    /// Probability the tenant renews (0..=1), used as a blending weight
    pub renewal_probability: f64,

    /// Market rent per unit of area for the renewed or replacement lease
    pub market_rent_per_area: f64,

    /// Replaces `market_rent_per_area` when an analyst has adjusted it
    #[serde(default)]
    pub adjusted_market_rent_per_area: Option<f64>,

    /// Annual escalation on the market lease
    pub market_escalation_rate: f64,

    /// Term of the market lease in years
    #[serde(default = "default_market_term_years")]
    pub market_term_years: u32,

    /// Months vacant if the tenant does not renew (0..=12)
    pub vacancy_months: u32,

    /// Tenant improvement allowance per unit of area for a new tenant
    pub tenant_improvement_per_area: f64,

    /// Cap rate applied to the exit NOI
    pub exit_cap_rate: f64,
}

impl MarketAssumptions {
    /// Probability the tenant does not renew
    pub fn non_renewal_probability(&self) -> f64 {
        1.0 - self.renewal_probability
    }

    /// Market rent per area in effect, honouring any analyst adjustment
    pub fn effective_rent_per_area(&self) -> f64 {
        self.adjusted_market_rent_per_area
            .unwrap_or(self.market_rent_per_area)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(0.0..=1.0).contains(&self.renewal_probability) {
            return Err(ProjectionError::out_of_range(
                "renewal_probability",
                self.renewal_probability,
                "0 <= x <= 1",
            ));
        }
        if self.vacancy_months > 12 {
            return Err(ProjectionError::out_of_range(
                "vacancy_months",
                self.vacancy_months as f64,
                "0 <= x <= 12",
            ));
        }
        if !(self.exit_cap_rate > 0.0) {
            return Err(ProjectionError::out_of_range(
                "exit_cap_rate",
                self.exit_cap_rate,
                "x > 0",
            ));
        }
        if self.market_term_years == 0 {
            return Err(ProjectionError::out_of_range(
                "market_term_years",
                0.0,
                "x >= 1",
            ));
        }
        Ok(())
    }
}
