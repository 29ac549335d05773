//! Unleveraged valuation and return metrics
//!
//! No debt is modelled, so leveraged and unleveraged figures coincide and
//! only the unleveraged set is reported.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::cashflows::YearRecord;
use super::irr::{npv_at_rate, solve_irr};
use crate::assumptions::{FinancialAssumptions, MarketAssumptions};
use crate::error::{EngineResult, ProjectionError};

/// One row of the investment & cash flow summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentPeriod {
    /// 0 for the acquisition, then hold-period years
    pub period: u32,
    pub date: NaiveDate,
    /// Purchase price outflow (period 0 only)
    pub investment: f64,
    pub cash_flow: f64,
    pub present_value: f64,
    /// Cash flow over purchase price (None for period 0)
    pub cash_to_purchase_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub purchase_price: f64,
    pub discount_rate: f64,
    pub resale_discount_rate: f64,
    pub exit_cap_rate: f64,
    pub hold_period_years: u32,

    /// Cash flow before debt service, years 1..=hold
    pub annual_cash_flows: Vec<f64>,
    pub cash_flow_pvs: Vec<f64>,

    // Sale
    pub exit_noi_year: u32,
    pub exit_noi: f64,
    pub gross_sale_price: f64,
    pub selling_costs: f64,
    pub net_sale_price: f64,
    /// Net sale price less the purchase price
    pub ending_proceeds: f64,

    // Present values
    pub pv_cash_flow: f64,
    pub pv_net_sale: f64,
    pub total_pv: f64,
    pub npv: f64,
    /// Share of total PV from operations
    pub pv_income_share: f64,
    /// Share of total PV from the sale
    pub pv_sale_share: f64,

    // Returns
    pub total_return: f64,
    pub return_to_investment: f64,
    pub irr: f64,

    pub periods: Vec<InvestmentPeriod>,
}

impl ValuationSummary {
    pub fn from_records(
        records: &[YearRecord],
        purchase_price: f64,
        analysis_start: NaiveDate,
        financial: &FinancialAssumptions,
        market: &MarketAssumptions,
    ) -> EngineResult<Self> {
        let hold = financial.hold_period_years as usize;
        let exit_noi_year = financial.exit_noi_year();

        let exit_noi = records
            .get(exit_noi_year as usize - 1)
            .map(|r| r.noi())
            .ok_or_else(|| {
                ProjectionError::out_of_range(
                    "hold_period_years",
                    financial.hold_period_years as f64,
                    "projection covers the exit NOI year",
                )
            })?;

        let hold_records = &records[..hold.min(records.len())];
        let annual_cash_flows: Vec<f64> = hold_records.iter().map(|r| r.cash_flow()).collect();

        let cash_flow_pvs: Vec<f64> = annual_cash_flows
            .iter()
            .enumerate()
            .map(|(i, cf)| cf / (1.0 + financial.discount_rate).powi(i as i32 + 1))
            .collect();

        let gross_sale_price = exit_noi / market.exit_cap_rate;
        let selling_costs = gross_sale_price * financial.selling_cost_rate;
        let net_sale_price = gross_sale_price - selling_costs;

        let pv_cash_flow: f64 = cash_flow_pvs.iter().sum();
        let pv_net_sale =
            net_sale_price / (1.0 + financial.resale_rate()).powi(financial.hold_period_years as i32);
        let total_pv = pv_cash_flow + pv_net_sale;
        let npv = total_pv - purchase_price;

        let total_return = annual_cash_flows.iter().sum::<f64>() + net_sale_price - purchase_price;

        let flows = investment_cashflows(purchase_price, &annual_cash_flows, net_sale_price);
        let irr = solve_irr(&flows, &financial.irr)?;

        let mut periods = Vec::with_capacity(hold + 1);
        periods.push(InvestmentPeriod {
            period: 0,
            date: analysis_start,
            investment: -purchase_price,
            cash_flow: 0.0,
            present_value: 0.0,
            cash_to_purchase_price: None,
        });
        for ((record, cf), pv) in hold_records.iter().zip(&annual_cash_flows).zip(&cash_flow_pvs) {
            periods.push(InvestmentPeriod {
                period: record.year,
                date: record.period_end,
                investment: 0.0,
                cash_flow: *cf,
                present_value: *pv,
                cash_to_purchase_price: Some(cf / purchase_price),
            });
        }

        Ok(Self {
            purchase_price,
            discount_rate: financial.discount_rate,
            resale_discount_rate: financial.resale_rate(),
            exit_cap_rate: market.exit_cap_rate,
            hold_period_years: financial.hold_period_years,
            annual_cash_flows,
            cash_flow_pvs,
            exit_noi_year,
            exit_noi,
            gross_sale_price,
            selling_costs,
            net_sale_price,
            ending_proceeds: net_sale_price - purchase_price,
            pv_cash_flow,
            pv_net_sale,
            total_pv,
            npv,
            pv_income_share: pv_cash_flow / total_pv,
            pv_sale_share: pv_net_sale / total_pv,
            total_return,
            return_to_investment: total_return / purchase_price,
            irr,
            periods,
        })
    }

    /// Period-indexed flows the IRR is solved on
    pub fn investment_cashflows(&self) -> Vec<f64> {
        investment_cashflows(self.purchase_price, &self.annual_cash_flows, self.net_sale_price)
    }

    /// NPV of the investment at a single rate applied to both operations and sale
    pub fn npv_at(&self, rate: f64) -> f64 {
        npv_at_rate(&self.investment_cashflows(), rate)
    }
}

/// `[-price, cf1, ..., cf_hold + sale]`
fn investment_cashflows(purchase_price: f64, annual_cash_flows: &[f64], net_sale_price: f64) -> Vec<f64> {
    let mut flows = Vec::with_capacity(annual_cash_flows.len() + 1);
    flows.push(-purchase_price);
    flows.extend_from_slice(annual_cash_flows);
    if let Some(last) = flows.last_mut() {
        *last += net_sale_price;
    }
    flows
}
