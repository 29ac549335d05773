//! Rent schedule: the lease's own escalation history from commencement
//!
//! Unlike the cash flow view, the schedule starts from the base rent at
//! lease commencement and steps on each lease anniversary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::timeline::{add_months, add_years, next_day, previous_day};
use crate::assumptions::MarketAssumptions;
use crate::deal::LeaseInput;

/// Kind of rent event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RentEvent {
    /// Rent at lease commencement
    BaseRent,
    /// Contractual escalation on an anniversary before expiry
    ContractStep,
    /// Market escalation on an anniversary after expiry
    MarketStep,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentScheduleEntry {
    pub date: NaiveDate,
    /// Whole years since lease commencement
    pub years_from_start: u32,
    pub event: RentEvent,
    /// Escalation applied at this step (0 for the base rent)
    pub escalation_rate: f64,
    pub annual_rent: f64,
    pub rent_per_area: f64,
}

/// Key dates and rent of the market lease assumed upon expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryProfile {
    pub lease_expiry: NaiveDate,
    /// First vacant day if the tenant leaves
    pub vacancy_start: NaiveDate,
    /// Last vacant day before the market lease commences
    pub vacancy_end: NaiveDate,
    pub vacancy_months: u32,
    pub market_lease_start: NaiveDate,
    pub market_lease_end: NaiveDate,
    pub market_term_years: u32,
    pub market_rent_per_area: f64,
    pub market_annual_rent: f64,
    pub renewal_probability: f64,
}

impl ExpiryProfile {
    pub fn new(lease: &LeaseInput, market: &MarketAssumptions) -> Self {
        let vacancy_start = next_day(lease.lease_end);
        let market_lease_start = add_months(vacancy_start, market.vacancy_months);
        let market_lease_end = previous_day(add_years(market_lease_start, market.market_term_years));
        let market_rent_per_area = market.effective_rent_per_area();

        Self {
            lease_expiry: lease.lease_end,
            vacancy_start,
            vacancy_end: previous_day(market_lease_start),
            vacancy_months: market.vacancy_months,
            market_lease_start,
            market_lease_end,
            market_term_years: market.market_term_years,
            market_rent_per_area,
            market_annual_rent: market_rent_per_area * lease.area,
            renewal_probability: market.renewal_probability,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentSchedule {
    pub tenant_name: String,
    pub area: f64,
    pub entries: Vec<RentScheduleEntry>,
    pub expiry: ExpiryProfile,
}

impl RentSchedule {
    /// Build entries from commencement up to (not including) `horizon_end`
    pub fn build(
        lease: &LeaseInput,
        base_rent: f64,
        market: &MarketAssumptions,
        horizon_end: NaiveDate,
    ) -> Self {
        let mut entries = vec![RentScheduleEntry {
            date: lease.lease_start,
            years_from_start: 0,
            event: RentEvent::BaseRent,
            escalation_rate: 0.0,
            annual_rent: base_rent,
            rent_per_area: base_rent / lease.area,
        }];

        let mut annual_rent = base_rent;
        for n in 1.. {
            let date = add_years(lease.lease_start, n);
            if date >= horizon_end {
                break;
            }

            let (event, rate) = if date <= lease.lease_end {
                (RentEvent::ContractStep, lease.escalation_rate)
            } else {
                (RentEvent::MarketStep, market.market_escalation_rate)
            };
            annual_rent *= 1.0 + rate;

            entries.push(RentScheduleEntry {
                date,
                years_from_start: n,
                event,
                escalation_rate: rate,
                annual_rent,
                rent_per_area: annual_rent / lease.area,
            });
        }

        Self {
            tenant_name: lease.tenant_name.clone(),
            area: lease.area,
            entries,
            expiry: ExpiryProfile::new(lease, market),
        }
    }

    pub fn steps(&self, event: RentEvent) -> impl Iterator<Item = &RentScheduleEntry> {
        self.entries.iter().filter(move |e| e.event == event)
    }
}
