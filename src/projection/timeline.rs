//! Analysis timeline and lease regime resolution
//!
//! Cash flow year 1 starts at the analysis date, not at lease commencement.
//! The resolver escalates the lease's base rent through every anniversary
//! already passed, and locates the hold-period year in which the lease
//! expires.

use chrono::{Days, Months, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::deal::{years_between, LeaseInput};

/// Lease regime in force during a projection year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    /// The in-place lease is running
    InPlace,
    /// Year after expiry: market rent, blended vacancy and leasing costs
    ExpiryTransition,
    /// Renewed or replacement lease at market terms
    Market,
}

/// Add whole years, clamping Feb 29 to Feb 28 in non-leap years
pub(crate) fn add_years(date: NaiveDate, years: u32) -> NaiveDate {
    add_months(date, years * 12)
}

pub(crate) fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

pub(crate) fn previous_day(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(date)
}

pub(crate) fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

/// Base rent escalated once per whole year elapsed
pub fn escalated_rent(base_rent: f64, escalation_rate: f64, years_elapsed: f64) -> f64 {
    let steps = years_elapsed.max(0.0).floor();
    base_rent * (1.0 + escalation_rate).powi(steps as i32)
}

/// Resolved timeline for one deal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// First day of cash flow year 1
    pub analysis_start: NaiveDate,

    pub hold_period_years: u32,

    /// Years from lease commencement to the analysis date (0 if the lease starts later)
    pub years_elapsed: f64,

    /// Rent for cash flow year 1
    pub current_rent: f64,

    /// Hold-period year in which the lease expires; zero or negative if already expired
    pub lease_end_year: i64,
}

impl Timeline {
    pub fn resolve(
        lease: &LeaseInput,
        base_rent: f64,
        analysis_start: NaiveDate,
        hold_period_years: u32,
    ) -> Self {
        let years_elapsed = years_between(lease.lease_start, analysis_start).max(0.0);
        let current_rent = lease
            .year1_rent
            .unwrap_or_else(|| escalated_rent(base_rent, lease.escalation_rate, years_elapsed));
        let lease_end_year = years_between(analysis_start, lease.lease_end).floor() as i64 + 1;

        debug!(
            "{}: {:.4} years elapsed at {}, year 1 rent {:.2}, lease expires in year {}",
            lease.tenant_name, years_elapsed, analysis_start, current_rent, lease_end_year
        );

        Self {
            analysis_start,
            hold_period_years,
            years_elapsed,
            current_rent,
            lease_end_year,
        }
    }

    /// Number of year records: the hold period plus one terminal year
    pub fn series_years(&self) -> u32 {
        self.hold_period_years + 1
    }

    /// Year carrying vacancy and leasing costs, if expiry falls inside the hold
    pub fn transition_year(&self) -> Option<u32> {
        if self.lease_end_year >= self.hold_period_years as i64 {
            None
        } else if self.lease_end_year <= 0 {
            Some(1)
        } else {
            Some(self.lease_end_year as u32 + 1)
        }
    }

    pub fn regime(&self, year: u32) -> Regime {
        match self.transition_year() {
            Some(t) if year == t => Regime::ExpiryTransition,
            Some(t) if year > t => Regime::Market,
            _ => Regime::InPlace,
        }
    }

    pub fn period_start(&self, year: u32) -> NaiveDate {
        add_years(self.analysis_start, year.saturating_sub(1))
    }

    pub fn period_end(&self, year: u32) -> NaiveDate {
        previous_day(add_years(self.analysis_start, year))
    }

    /// First day after the hold period
    pub fn horizon_end(&self) -> NaiveDate {
        add_years(self.analysis_start, self.hold_period_years)
    }
}
