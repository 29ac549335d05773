//! Deal data structures: the property being acquired and its in-place lease

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, ProjectionError};

/// Days per year used for every fractional-year measurement.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Fractional years between two dates on a 365.25-day year.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / DAYS_PER_YEAR
}

/// Asset class of the property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropertyType {
    #[default]
    Industrial,
    Office,
    Retail,
}

/// Property being underwritten
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyInput {
    /// Display name (defaults to the address in the simple request format)
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub address: String,

    /// Acquisition price, also the period-0 investment
    pub purchase_price: f64,

    #[serde(default)]
    pub property_type: PropertyType,
}

/// The single in-place lease
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseInput {
    pub tenant_name: String,

    /// Lease commencement
    pub lease_start: NaiveDate,

    /// Lease expiry
    pub lease_end: NaiveDate,

    /// Annual rent at lease commencement
    #[serde(default)]
    pub current_annual_rent: Option<f64>,

    /// Rent per unit of area at lease commencement
    #[serde(default)]
    pub rent_per_area: Option<f64>,

    /// Leased area (square feet)
    pub area: f64,

    /// Contractual annual escalation (0.03 = 3%)
    pub escalation_rate: f64,

    /// Analyst-supplied year 1 rent, used verbatim instead of the escalated base rent
    #[serde(default)]
    pub year1_rent: Option<f64>,
}

impl LeaseInput {
    /// Annual rent at commencement, from the annual figure or rent-per-area × area.
    pub fn base_annual_rent(&self) -> EngineResult<f64> {
        match (self.current_annual_rent, self.rent_per_area) {
            (Some(annual), Some(per_area)) => {
                let derived = per_area * self.area;
                if (derived - annual).abs() > 0.01 {
                    warn!(
                        "{}: annual rent {:.2} disagrees with rent per area × area {:.2}; using annual rent",
                        self.tenant_name, annual, derived
                    );
                }
                Ok(annual)
            }
            (Some(annual), None) => Ok(annual),
            (None, Some(per_area)) => Ok(per_area * self.area),
            (None, None) => Err(ProjectionError::MissingDerivedInput {
                field: "base_annual_rent",
            }),
        }
    }

    /// Lease term in fractional years
    pub fn lease_term_years(&self) -> f64 {
        years_between(self.lease_start, self.lease_end)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.lease_end <= self.lease_start {
            return Err(ProjectionError::InvalidLeaseDates {
                start: self.lease_start,
                end: self.lease_end,
            });
        }
        if !(self.area > 0.0) {
            return Err(ProjectionError::out_of_range("area", self.area, "x > 0"));
        }
        Ok(())
    }
}

/// A property and its lease, the unit of work for the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub property: PropertyInput,
    pub lease: LeaseInput,
}

impl Deal {
    pub fn new(property: PropertyInput, lease: LeaseInput) -> Self {
        Self { property, lease }
    }

    /// Label used in logs and export file names
    pub fn label(&self) -> &str {
        if !self.property.name.is_empty() {
            &self.property.name
        } else if !self.property.address.is_empty() {
            &self.property.address
        } else {
            &self.lease.tenant_name
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(self.property.purchase_price > 0.0) {
            return Err(ProjectionError::out_of_range(
                "purchase_price",
                self.property.purchase_price,
                "x > 0",
            ));
        }
        self.lease.validate()?;
        self.lease.base_annual_rent().map(|_| ())
    }
}
