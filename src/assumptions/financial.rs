//! Financial and valuation assumptions with house defaults

use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, ProjectionError};

/// Default unleveraged discount rate (8%)
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.08;

/// Default leasing commission on the first lease year (8% of NOI)
pub const DEFAULT_COMMISSION_YEAR1_RATE: f64 = 0.08;

/// Default leasing commission on later lease years (3.5% of NOI)
pub const DEFAULT_COMMISSION_YEAR2PLUS_RATE: f64 = 0.035;

/// Longest hold period a projection accepts
pub const MAX_HOLD_PERIOD_YEARS: u32 = 100;

/// Which year's NOI is capitalised into the exit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExitNoiBasis {
    /// NOI of the final hold-period year
    #[default]
    HoldPeriodYear,
    /// NOI of the year after the sale ("12 months after sale")
    ForwardYear,
}

/// Search bounds and budget for the IRR root search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrrSettings {
    /// Lowest rate searched (-50%)
    pub lower: f64,
    /// Highest rate searched (+100%)
    pub upper: f64,
    pub max_iterations: u32,
    /// Absolute NPV tolerance at the root
    pub tolerance: f64,
}

impl Default for IrrSettings {
    fn default() -> Self {
        Self {
            lower: -0.5,
            upper: 1.0,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// Discounting, hold and leasing-cost assumptions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialAssumptions {
    /// Unleveraged cash flow discount rate
    pub discount_rate: f64,

    /// Rate used to discount the net sale proceeds; `discount_rate` when unset
    pub resale_discount_rate: Option<f64>,

    pub hold_period_years: u32,

    /// Selling costs as a fraction of the gross sale price
    pub selling_cost_rate: f64,

    /// Leasing commission on NOI in the first year of the new lease
    pub leasing_commission_year1_rate: f64,

    /// Leasing commission on NOI in the second year of the new lease
    pub leasing_commission_year2plus_rate: f64,

    pub exit_noi_basis: ExitNoiBasis,

    pub irr: IrrSettings,
}

impl Default for FinancialAssumptions {
    fn default() -> Self {
        Self {
            discount_rate: DEFAULT_DISCOUNT_RATE,
            resale_discount_rate: None,
            hold_period_years: 10,
            selling_cost_rate: 0.0,
            leasing_commission_year1_rate: DEFAULT_COMMISSION_YEAR1_RATE,
            leasing_commission_year2plus_rate: DEFAULT_COMMISSION_YEAR2PLUS_RATE,
            exit_noi_basis: ExitNoiBasis::default(),
            irr: IrrSettings::default(),
        }
    }
}

impl FinancialAssumptions {
    /// Year whose NOI is capitalised at exit
    pub fn exit_noi_year(&self) -> u32 {
        match self.exit_noi_basis {
            ExitNoiBasis::HoldPeriodYear => self.hold_period_years,
            ExitNoiBasis::ForwardYear => self.hold_period_years + 1,
        }
    }

    pub fn resale_rate(&self) -> f64 {
        self.resale_discount_rate.unwrap_or(self.discount_rate)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(1..=MAX_HOLD_PERIOD_YEARS).contains(&self.hold_period_years) {
            return Err(ProjectionError::out_of_range(
                "hold_period_years",
                self.hold_period_years as f64,
                "1 <= x <= 100",
            ));
        }
        if !(0.0..1.0).contains(&self.selling_cost_rate) {
            return Err(ProjectionError::out_of_range(
                "selling_cost_rate",
                self.selling_cost_rate,
                "0 <= x < 1",
            ));
        }
        if self.discount_rate <= -1.0 {
            return Err(ProjectionError::out_of_range(
                "discount_rate",
                self.discount_rate,
                "x > -1",
            ));
        }
        if self.resale_rate() <= -1.0 {
            return Err(ProjectionError::out_of_range(
                "resale_discount_rate",
                self.resale_rate(),
                "x > -1",
            ));
        }
        if !(self.irr.lower > -1.0 && self.irr.lower < self.irr.upper) {
            return Err(ProjectionError::out_of_range(
                "irr.lower",
                self.irr.lower,
                "-1 < lower < upper",
            ));
        }
        Ok(())
    }
}
