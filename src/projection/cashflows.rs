//! Cash flow output structures for projections

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::layout::{LineItem, SheetLayout};
use super::market_leasing::MarketLeasingSummary;
use super::rent_schedule::RentSchedule;
use super::timeline::{Regime, Timeline};
use super::valuation::ValuationSummary;

/// One projection year of the cash flow sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRecord {
    // Timing
    pub year: u32,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub regime: Regime,

    // Revenue
    pub rent: Cell,
    pub vacancy: Cell,
    pub effective_gross_revenue: Cell,
    pub operating_expenses: Cell,
    pub net_operating_income: Cell,
    pub yield_on_purchase_price: Cell,

    // Leasing & capital
    pub tenant_improvements: Cell,
    pub leasing_commissions: Cell,
    pub total_leasing_capital: Cell,

    // Cash flow
    pub cash_flow_before_debt_service: Cell,
    pub cash_flow_available: Cell,
}

impl YearRecord {
    pub fn cell(&self, item: LineItem) -> &Cell {
        match item {
            LineItem::PotentialBaseRent => &self.rent,
            LineItem::AbsorptionTurnoverVacancy => &self.vacancy,
            LineItem::EffectiveGrossRevenue => &self.effective_gross_revenue,
            LineItem::OperatingExpenses => &self.operating_expenses,
            LineItem::NetOperatingIncome => &self.net_operating_income,
            LineItem::YieldOnPurchasePrice => &self.yield_on_purchase_price,
            LineItem::TenantImprovements => &self.tenant_improvements,
            LineItem::LeasingCommissions => &self.leasing_commissions,
            LineItem::TotalLeasingCapitalCosts => &self.total_leasing_capital,
            LineItem::CashFlowBeforeDebtService => &self.cash_flow_before_debt_service,
            LineItem::CashFlowAvailableForDistribution => &self.cash_flow_available,
        }
    }

    /// Cells in sheet order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        LineItem::ALL.iter().map(move |item| self.cell(*item))
    }

    pub fn is_vacancy_year(&self) -> bool {
        self.regime == Regime::ExpiryTransition
    }

    pub fn noi(&self) -> f64 {
        self.net_operating_income.value()
    }

    pub fn cash_flow(&self) -> f64 {
        self.cash_flow_before_debt_service.value()
    }
}

/// SUM over the hold-period years for one line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineTotal {
    pub item: LineItem,
    pub cell: Cell,
}

/// Complete projection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Deal label (property name, address or tenant)
    pub deal: String,

    pub layout: SheetLayout,

    pub timeline: Timeline,

    /// Hold-period years plus the terminal year
    pub years: Vec<YearRecord>,

    pub totals: Vec<LineTotal>,

    pub rent_schedule: RentSchedule,

    /// Leasing policy assumed upon expiry
    pub market_leasing: MarketLeasingSummary,

    pub valuation: ValuationSummary,
}

impl ProjectionResult {
    /// Years inside the hold period, excluding the terminal year
    pub fn hold_period_years(&self) -> &[YearRecord] {
        let hold = (self.timeline.hold_period_years as usize).min(self.years.len());
        &self.years[..hold]
    }

    /// The year carrying vacancy and leasing costs, if any
    pub fn vacancy_year(&self) -> Option<&YearRecord> {
        self.years.iter().find(|r| r.is_vacancy_year())
    }

    pub fn year(&self, year: u32) -> Option<&YearRecord> {
        self.years.get((year as usize).checked_sub(1)?)
    }

    pub fn total(&self, item: LineItem) -> Option<&Cell> {
        self.totals.iter().find(|t| t.item == item).map(|t| &t.cell)
    }

    /// Every placed cell: year columns then the total column
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.years
            .iter()
            .flat_map(|r| r.cells())
            .chain(self.totals.iter().map(|t| &t.cell))
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let hold = self.hold_period_years();
        let total_rent: f64 = hold.iter().map(|r| r.rent.value()).sum();
        let total_vacancy: f64 = hold.iter().map(|r| r.vacancy.value()).sum();
        let total_noi: f64 = hold.iter().map(|r| r.noi()).sum();
        let total_leasing_capital: f64 = hold.iter().map(|r| r.total_leasing_capital.value()).sum();
        let total_cash_flow: f64 = hold.iter().map(|r| r.cash_flow()).sum();

        ProjectionSummary {
            hold_period_years: self.timeline.hold_period_years,
            year1_rent: self.timeline.current_rent,
            lease_end_year: self.timeline.lease_end_year,
            vacancy_year: self.vacancy_year().map(|r| r.year),
            total_rent,
            total_vacancy,
            total_noi,
            total_leasing_capital,
            total_cash_flow,
            exit_value: self.valuation.net_sale_price,
            npv: self.valuation.npv,
            irr: self.valuation.irr,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub hold_period_years: u32,
    pub year1_rent: f64,
    pub lease_end_year: i64,
    pub vacancy_year: Option<u32>,
    pub total_rent: f64,
    pub total_vacancy: f64,
    pub total_noi: f64,
    pub total_leasing_capital: f64,
    pub total_cash_flow: f64,
    pub exit_value: f64,
    pub npv: f64,
    pub irr: f64,
}
