//! Underwriting assumptions: market leasing profile and financial defaults

mod financial;
mod market;

pub use financial::{
    ExitNoiBasis, FinancialAssumptions, IrrSettings, DEFAULT_COMMISSION_YEAR1_RATE,
    DEFAULT_COMMISSION_YEAR2PLUS_RATE, DEFAULT_DISCOUNT_RATE, MAX_HOLD_PERIOD_YEARS,
};
pub use market::MarketAssumptions;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Container for all projection assumptions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assumptions {
    pub market: MarketAssumptions,
    #[serde(default)]
    pub financial: FinancialAssumptions,
}

impl Assumptions {
    /// Market profile combined with the default financial assumptions
    pub fn with_market(market: MarketAssumptions) -> Self {
        Self {
            market,
            financial: FinancialAssumptions::default(),
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.market.validate()?;
        self.financial.validate()
    }
}
