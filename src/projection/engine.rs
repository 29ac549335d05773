//! Core projection engine for annual single-tenant cash flow projections

use chrono::NaiveDate;
use log::info;

use super::cashflows::{LineTotal, ProjectionResult, YearRecord};
use super::cell::{Cell, CellRef, NumberFormat};
use super::layout::{LineItem, SheetLayout};
use super::leasing::{
    commission_terms, tenant_improvement_cost, vacancy_factor, vacancy_terms, CommissionYear,
};
use super::market_leasing::MarketLeasingSummary;
use super::rent_schedule::RentSchedule;
use super::timeline::{Regime, Timeline};
use super::valuation::ValuationSummary;
use crate::assumptions::Assumptions;
use crate::deal::Deal;
use crate::error::EngineResult;

/// Analysis start used when none is configured
pub const DEFAULT_ANALYSIS_START: NaiveDate = match NaiveDate::from_ymd_opt(2026, 1, 1) {
    Some(date) => date,
    None => panic!("invalid default analysis start"),
};

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// First day of cash flow year 1
    pub analysis_start: NaiveDate,

    /// Placement of the cash flow block on its sheet
    pub layout: SheetLayout,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            analysis_start: DEFAULT_ANALYSIS_START,
            layout: SheetLayout::default(),
        }
    }
}

/// Main projection engine
pub struct ProjectionEngine {
    assumptions: Assumptions,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and config
    pub fn new(assumptions: Assumptions, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run projection for a single deal
    pub fn project_deal(&self, deal: &Deal) -> EngineResult<ProjectionResult> {
        deal.validate()?;
        self.assumptions.validate()?;

        let financial = &self.assumptions.financial;
        let market = &self.assumptions.market;
        let layout = &self.config.layout;

        let base_rent = deal.lease.base_annual_rent()?;
        let timeline = Timeline::resolve(
            &deal.lease,
            base_rent,
            self.config.analysis_start,
            financial.hold_period_years,
        );

        let mut years: Vec<YearRecord> = Vec::with_capacity(timeline.series_years() as usize);
        for year in 1..=timeline.series_years() {
            let record = self.derive_year(deal, &timeline, year, years.last());
            years.push(record);
        }

        let totals = self.line_totals(&timeline, &years);

        let valuation = ValuationSummary::from_records(
            &years,
            deal.property.purchase_price,
            timeline.analysis_start,
            financial,
            market,
        )?;

        let rent_schedule =
            RentSchedule::build(&deal.lease, base_rent, market, timeline.horizon_end());
        let market_leasing = MarketLeasingSummary::new(market, financial, timeline.analysis_start);

        info!(
            "Projected {}: {} years, vacancy year {:?}, exit value {:.0}, NPV {:.0}, IRR {:.4}",
            deal.label(),
            years.len(),
            timeline.transition_year(),
            valuation.net_sale_price,
            valuation.npv,
            valuation.irr
        );

        Ok(ProjectionResult {
            deal: deal.label().to_string(),
            layout: layout.clone(),
            timeline,
            years,
            totals,
            rent_schedule,
            market_leasing,
            valuation,
        })
    }

    /// Derive every line item for one year from the prior year's cells
    fn derive_year(
        &self,
        deal: &Deal,
        timeline: &Timeline,
        year: u32,
        prev: Option<&YearRecord>,
    ) -> YearRecord {
        let market = &self.assumptions.market;
        let financial = &self.assumptions.financial;
        let layout = &self.config.layout;
        let at = |item: LineItem| layout.cell(item, year);
        let currency = NumberFormat::Currency;

        let regime = timeline.regime(year);

        // Rent
        let rent_at = at(LineItem::PotentialBaseRent);
        let rent = match (regime, prev) {
            (Regime::ExpiryTransition, _) => Cell::literal(
                rent_at,
                market.effective_rent_per_area() * deal.lease.area,
                currency,
            ),
            (Regime::Market, Some(p)) => {
                Cell::escalated(rent_at, &p.rent, market.market_escalation_rate, currency)
            }
            (Regime::InPlace, Some(p)) => {
                Cell::escalated(rent_at, &p.rent, deal.lease.escalation_rate, currency)
            }
            (_, None) => Cell::literal(rent_at, timeline.current_rent, currency),
        };

        // Vacancy and revenue
        let vacancy_at = at(LineItem::AbsorptionTurnoverVacancy);
        let egr_at = at(LineItem::EffectiveGrossRevenue);
        let vacancy_loss = regime == Regime::ExpiryTransition
            && vacancy_factor(market.vacancy_months, market.renewal_probability) != 0.0;
        let (vacancy, effective_gross_revenue) = if vacancy_loss {
            let terms = vacancy_terms(market.vacancy_months, market.renewal_probability);
            let vacancy = Cell::scaled(vacancy_at, &rent, &terms, true, currency);
            let egr = Cell::sum(egr_at, &[&rent, &vacancy], currency);
            (vacancy, egr)
        } else {
            (
                Cell::zero(vacancy_at, currency),
                Cell::reference(egr_at, &rent, currency),
            )
        };

        // NNN: no recoverable expenses are modelled
        let operating_expenses = Cell::zero(at(LineItem::OperatingExpenses), currency);
        let net_operating_income = Cell::reference(
            at(LineItem::NetOperatingIncome),
            &effective_gross_revenue,
            currency,
        );
        let yield_on_purchase_price = Cell::ratio(
            at(LineItem::YieldOnPurchasePrice),
            &net_operating_income,
            deal.property.purchase_price,
            LineItem::YieldOnPurchasePrice.format(),
        );

        // Leasing & capital
        let ti_at = at(LineItem::TenantImprovements);
        let tenant_improvements = if regime == Regime::ExpiryTransition {
            let cost = tenant_improvement_cost(
                deal.lease.area,
                market.tenant_improvement_per_area,
                market.renewal_probability,
            );
            Cell::literal(ti_at, cost, currency)
        } else {
            Cell::zero(ti_at, currency)
        };

        let lc_at = at(LineItem::LeasingCommissions);
        let commission_year = match timeline.transition_year() {
            Some(t) if year == t => Some(CommissionYear::First),
            Some(t) if year == t + 1 => Some(CommissionYear::Second),
            _ => None,
        };
        let leasing_commissions = match commission_year {
            Some(cy) => {
                let terms = commission_terms(cy, financial, market);
                Cell::scaled(lc_at, &net_operating_income, &terms, false, currency)
            }
            None => Cell::zero(lc_at, currency),
        };

        let total_leasing_capital = Cell::sum(
            at(LineItem::TotalLeasingCapitalCosts),
            &[&tenant_improvements, &leasing_commissions],
            currency,
        );

        // Cash flow
        let cash_flow_before_debt_service = Cell::difference(
            at(LineItem::CashFlowBeforeDebtService),
            &net_operating_income,
            &total_leasing_capital,
            currency,
        );
        let cash_flow_available = Cell::reference(
            at(LineItem::CashFlowAvailableForDistribution),
            &cash_flow_before_debt_service,
            currency,
        );

        YearRecord {
            year,
            period_start: timeline.period_start(year),
            period_end: timeline.period_end(year),
            regime,
            rent,
            vacancy,
            effective_gross_revenue,
            operating_expenses,
            net_operating_income,
            yield_on_purchase_price,
            tenant_improvements,
            leasing_commissions,
            total_leasing_capital,
            cash_flow_before_debt_service,
            cash_flow_available,
        }
    }

    /// SUM over the hold-period years for each additive line item
    fn line_totals(&self, timeline: &Timeline, years: &[YearRecord]) -> Vec<LineTotal> {
        let layout = &self.config.layout;
        let column = layout.total_column(timeline.series_years());
        let hold = (timeline.hold_period_years as usize).min(years.len());

        LineItem::ALL
            .iter()
            .filter(|item| item.is_additive())
            .map(|&item| {
                let cells: Vec<&Cell> = years[..hold].iter().map(|r| r.cell(item)).collect();
                let at = CellRef::new(layout.row(item), column);
                LineTotal {
                    item,
                    cell: Cell::sum_range(at, &cells, item.format()),
                }
            })
            .collect()
    }
}
