//! Market leasing summary: the leasing policy assumed upon expiry
//!
//! New and renewal leases are priced at the same market rent. Only a new
//! tenant receives tenant improvements or triggers commissions, so each
//! blended figure is the new-lease figure weighted by the non-renewal
//! probability.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assumptions::{FinancialAssumptions, MarketAssumptions};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketLeasingSummary {
    /// Date the profile applies from (analysis start)
    pub as_of: NaiveDate,
    pub market_term_years: u32,
    pub renewal_probability: f64,
    pub vacancy_months: u32,
    pub blended_vacancy_months: f64,
    /// Market rent per area for new, renewal and blended leases alike
    pub market_rent_per_area: f64,
    /// Fixed annual step on the market lease
    pub fixed_step_rate: f64,
    pub ti_new_per_area: f64,
    pub ti_renewal_per_area: f64,
    pub ti_blended_per_area: f64,
    pub commission_year1_rate: f64,
    pub commission_year2plus_rate: f64,
    pub renewal_commission_rate: f64,
}

impl MarketLeasingSummary {
    pub fn new(
        market: &MarketAssumptions,
        financial: &FinancialAssumptions,
        as_of: NaiveDate,
    ) -> Self {
        let miss = market.non_renewal_probability();
        let ti_renewal_per_area = 0.0;

        Self {
            as_of,
            market_term_years: market.market_term_years,
            renewal_probability: market.renewal_probability,
            vacancy_months: market.vacancy_months,
            blended_vacancy_months: market.vacancy_months as f64 * miss,
            market_rent_per_area: market.effective_rent_per_area(),
            fixed_step_rate: market.market_escalation_rate,
            ti_new_per_area: market.tenant_improvement_per_area,
            ti_renewal_per_area,
            ti_blended_per_area: market.tenant_improvement_per_area * miss
                + ti_renewal_per_area * market.renewal_probability,
            commission_year1_rate: financial.leasing_commission_year1_rate,
            commission_year2plus_rate: financial.leasing_commission_year2plus_rate,
            renewal_commission_rate: 0.0,
        }
    }

    /// New-lease commission policy, e.g. "8% Year 1, 3.5% thereafter"
    pub fn commission_policy(&self) -> String {
        format!(
            "{:.0}% Year 1, {:.1}% thereafter",
            self.commission_year1_rate * 100.0,
            self.commission_year2plus_rate * 100.0
        )
    }

    /// Labelled parameter rows in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let rent = format!("{:.2}", self.market_rent_per_area);
        vec![
            ("As Of", self.as_of.format("%b %Y").to_string()),
            ("Term Length (Years)", self.market_term_years.to_string()),
            ("Renewal Probability", percent(self.renewal_probability)),
            ("Months Vacant", self.vacancy_months.to_string()),
            ("Months Vacant (Blended)", format!("{:.2}", self.blended_vacancy_months)),
            ("Market Base Rent (New)", rent.clone()),
            ("Market Base Rent (Renewal)", rent.clone()),
            ("Market Base Rent (Blended)", rent.clone()),
            ("Fixed Steps", percent(self.fixed_step_rate)),
            ("Tenant Improvements (New)", format!("{:.2}", self.ti_new_per_area)),
            ("Tenant Improvements (Renew)", format!("{:.2}", self.ti_renewal_per_area)),
            ("Tenant Improvements (Blended)", format!("{:.2}", self.ti_blended_per_area)),
            ("Leasing Commissions (New)", self.commission_policy()),
            ("Leasing Commissions (Renew)", percent(self.renewal_commission_rate)),
            ("Upon Expiration", format!("${} base", rent)),
        ]
    }
}

fn percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}
