//! End-to-end projections of complete deals

use std::collections::HashMap;

use approx::assert_relative_eq;
use chrono::NaiveDate;

use cre_underwriting::assumptions::{ExitNoiBasis, FinancialAssumptions, MarketAssumptions};
use cre_underwriting::deal::{load_deal, load_deal_from_reader, LeaseInput, PropertyInput, PropertyType};
use cre_underwriting::export::write_grid_csv;
use cre_underwriting::projection::{
    npv_at_rate, vacancy_factor, CellRef, LineItem, ProjectionConfig, ProjectionEngine,
    ProjectionResult, Regime, RentEvent,
};
use cre_underwriting::{Assumptions, Deal, ProjectionError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sentrex_deal() -> Deal {
    Deal::new(
        PropertyInput {
            name: "120 Valleywood Drive".to_string(),
            address: "120 Valleywood Drive".to_string(),
            purchase_price: 17_800_000.0,
            property_type: PropertyType::Industrial,
        },
        LeaseInput {
            tenant_name: "Sentrex Health Solutions Inc.".to_string(),
            lease_start: date(2022, 3, 1),
            lease_end: date(2032, 2, 29),
            current_annual_rent: None,
            rent_per_area: Some(14.21),
            area: 60_071.0,
            escalation_rate: 0.03,
            year1_rent: None,
        },
    )
}

fn sentrex_market() -> MarketAssumptions {
    MarketAssumptions {
        renewal_probability: 0.85,
        market_rent_per_area: 17.50,
        adjusted_market_rent_per_area: None,
        market_escalation_rate: 0.035,
        market_term_years: 5,
        vacancy_months: 8,
        tenant_improvement_per_area: 5.0,
        exit_cap_rate: 0.065,
    }
}

fn project(deal: &Deal, assumptions: Assumptions) -> ProjectionResult {
    ProjectionEngine::new(assumptions, ProjectionConfig::default())
        .project_deal(deal)
        .unwrap()
}

fn sentrex() -> ProjectionResult {
    project(&sentrex_deal(), Assumptions::with_market(sentrex_market()))
}

/// Evaluates the formula subset the engine emits against already-placed cells
struct FormulaEval<'a> {
    cells: &'a HashMap<CellRef, f64>,
    src: &'a [u8],
    pos: usize,
}

impl<'a> FormulaEval<'a> {
    fn eval(expr: &'a str, cells: &'a HashMap<CellRef, f64>) -> f64 {
        let body = expr.strip_prefix('=').expect("formula starts with '='");
        let mut p = FormulaEval { cells, src: body.as_bytes(), pos: 0 };
        let value = p.expr();
        assert_eq!(p.pos, p.src.len(), "trailing input in {}", expr);
        value
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn expr(&mut self) -> f64 {
        let mut value = self.term();
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term();
            value = if op == b'+' { value + rhs } else { value - rhs };
        }
        value
    }

    fn term(&mut self) -> f64 {
        let mut value = self.unary();
        while let Some(op @ (b'*' | b'/')) = self.peek() {
            self.pos += 1;
            let rhs = self.unary();
            value = if op == b'*' { value * rhs } else { value / rhs };
        }
        value
    }

    fn unary(&mut self) -> f64 {
        if self.peek() == Some(b'-') {
            self.pos += 1;
            return -self.unary();
        }
        self.atom()
    }

    fn atom(&mut self) -> f64 {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let value = self.expr();
                assert_eq!(self.peek(), Some(b')'));
                self.pos += 1;
                value
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            Some(c) if c.is_ascii_uppercase() => {
                if self.src[self.pos..].starts_with(b"SUM(") {
                    self.pos += 4;
                    let first = self.reference();
                    assert_eq!(self.peek(), Some(b':'));
                    self.pos += 1;
                    let last = self.reference();
                    assert_eq!(self.peek(), Some(b')'));
                    self.pos += 1;
                    assert_eq!(first.row, last.row);
                    (first.col..=last.col)
                        .map(|col| self.lookup(CellRef::new(first.row, col)))
                        .sum()
                } else {
                    let at = self.reference();
                    self.lookup(at)
                }
            }
            other => panic!("unexpected {:?}", other.map(char::from)),
        }
    }

    fn number(&mut self) -> f64 {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == b'.') {
            self.pos += 1;
        }
        std::str::from_utf8(&self.src[start..self.pos])
            .unwrap()
            .parse()
            .unwrap()
    }

    fn reference(&mut self) -> CellRef {
        let mut col = 0u32;
        while let Some(c) = self.peek().filter(u8::is_ascii_uppercase) {
            col = col * 26 + (c - b'A' + 1) as u32;
            self.pos += 1;
        }
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let row = std::str::from_utf8(&self.src[start..self.pos])
            .unwrap()
            .parse()
            .unwrap();
        CellRef::new(row, col)
    }

    fn lookup(&self, at: CellRef) -> f64 {
        *self
            .cells
            .get(&at)
            .unwrap_or_else(|| panic!("reference to unplaced cell {}", at))
    }
}

#[test]
fn test_sentrex_scenario() {
    let result = sentrex();
    let t = &result.timeline;

    // 3/1/2022 to 1/1/2026 is 3.84 years: three escalations
    assert_relative_eq!(t.years_elapsed, 1402.0 / 365.25, epsilon = 1e-12);
    assert_relative_eq!(t.current_rent, 60_071.0 * 14.21 * 1.03_f64.powi(3), epsilon = 1e-6);

    assert_eq!(t.lease_end_year, 7);
    assert!(t.lease_end_year < t.hold_period_years as i64);
    assert_eq!(t.transition_year(), Some(8));
    assert_relative_eq!(vacancy_factor(8, 0.85), (8.0 / 12.0) * 0.15, epsilon = 1e-12);

    let y8 = result.year(8).unwrap();
    assert_relative_eq!(y8.rent.value(), 1_051_242.5, epsilon = 1e-6);
    assert_relative_eq!(y8.vacancy.value(), -105_124.25, epsilon = 1e-6);
    assert_relative_eq!(y8.noi(), 946_118.25, epsilon = 1e-6);
    assert_relative_eq!(y8.tenant_improvements.value(), 45_053.25, epsilon = 1e-6);
    assert_relative_eq!(y8.cash_flow(), 889_711.581, epsilon = 1e-3);

    let v = &result.valuation;
    assert_eq!(v.exit_noi_year, 10);
    assert_relative_eq!(v.exit_noi, result.year(10).unwrap().noi(), epsilon = 1e-9);
    assert_relative_eq!(v.gross_sale_price, v.exit_noi / 0.065, epsilon = 1e-6);
    assert_relative_eq!(v.net_sale_price, v.gross_sale_price);
    assert_relative_eq!(v.npv, -2_963_631.49, epsilon = 1.0);
    assert_relative_eq!(v.irr, 0.0551190743, epsilon = 1e-6);
}

#[test]
fn test_exactly_one_vacancy_year() {
    let result = sentrex();
    let vacancy_years: Vec<u32> = result
        .years
        .iter()
        .filter(|r| r.vacancy.value() != 0.0)
        .map(|r| r.year)
        .collect();
    assert_eq!(vacancy_years, vec![8]);

    let ti_years: Vec<u32> = result
        .years
        .iter()
        .filter(|r| r.tenant_improvements.value() != 0.0)
        .map(|r| r.year)
        .collect();
    assert_eq!(ti_years, vec![8]);

    let lc_years: Vec<u32> = result
        .years
        .iter()
        .filter(|r| r.leasing_commissions.value() != 0.0)
        .map(|r| r.year)
        .collect();
    assert_eq!(lc_years, vec![8, 9]);
}

#[test]
fn test_formulas_reference_placed_cells_and_reproduce_values() {
    let result = sentrex();

    let mut placed: HashMap<CellRef, f64> = HashMap::new();
    for record in &result.years {
        for cell in record.cells() {
            for r in cell.refs() {
                // Only same-column or prior-year cells
                assert!(r.col <= cell.at.col, "{} reads forward from {}", cell.at, r);
                assert!(placed.contains_key(r), "{} reads unplaced {}", cell.at, r);
            }
            if let Some(expr) = cell.expr() {
                let recomputed = FormulaEval::eval(expr, &placed);
                assert_relative_eq!(recomputed, cell.value(), epsilon = 1e-6, max_relative = 1e-12);
            }
            placed.insert(cell.at, cell.value());
        }
    }

    for total in &result.totals {
        let expr = total.cell.expr().unwrap();
        assert_relative_eq!(FormulaEval::eval(expr, &placed), total.cell.value(), epsilon = 1e-6);
    }
}

#[test]
fn test_rent_formula_chain() {
    let result = sentrex();
    for record in &result.years {
        let expected_literal = matches!(record.year, 1 | 8);
        assert_eq!(!record.rent.is_formula(), expected_literal, "year {}", record.year);
    }
    assert_eq!(result.year(7).unwrap().rent.expr(), Some("=G9*(1+0.03)"));
    assert_eq!(result.year(11).unwrap().rent.expr(), Some("=K9*(1+0.035)"));
}

fn assert_rent_chain(result: &ProjectionResult) {
    let transition = result.timeline.transition_year();
    for w in result.years.windows(2) {
        let (prev, record) = (&w[0], &w[1]);
        if Some(record.year) == transition {
            assert!(!record.rent.is_formula(), "year {}", record.year);
            continue;
        }
        assert!(record.rent.is_formula(), "year {}", record.year);
        assert_eq!(record.rent.refs(), &[prev.rent.at], "year {}", record.year);
    }
    assert!(!result.years[0].rent.is_formula());
}

#[test]
fn test_rent_cells_reference_only_the_prior_year() {
    assert_rent_chain(&sentrex());

    let mut outlasting = sentrex_deal();
    outlasting.lease.lease_end = date(2038, 2, 28);
    let result = project(&outlasting, Assumptions::with_market(sentrex_market()));
    assert_eq!(result.timeline.transition_year(), None);
    assert_rent_chain(&result);

    let mut expired = sentrex_deal();
    expired.lease.lease_start = date(2015, 1, 1);
    expired.lease.lease_end = date(2025, 6, 30);
    let result = project(&expired, Assumptions::with_market(sentrex_market()));
    assert_eq!(result.timeline.transition_year(), Some(1));
    assert_rent_chain(&result);
}

#[test]
fn test_npv_at_irr_is_zero() {
    let result = sentrex();
    let v = &result.valuation;
    assert!(npv_at_rate(&v.investment_cashflows(), v.irr).abs() < 1e-4);
    assert!(v.npv_at(v.irr).abs() < 1e-4);
    // NPV uses the same discount rate for operations and sale by default
    assert_relative_eq!(v.npv_at(0.08), v.npv, epsilon = 1e-6);
}

#[test]
fn test_valuation_supplements_are_consistent() {
    let result = sentrex();
    let v = &result.valuation;

    assert_eq!(v.periods.len(), 11);
    assert_eq!(v.periods[0].investment, -17_800_000.0);
    assert_eq!(v.periods[0].date, date(2026, 1, 1));
    assert_eq!(v.periods[10].date, date(2035, 12, 31));
    assert_relative_eq!(v.total_pv - v.purchase_price, v.npv, epsilon = 1e-6);
    assert_relative_eq!(v.pv_income_share + v.pv_sale_share, 1.0, epsilon = 1e-12);
    assert_relative_eq!(
        v.total_return,
        v.annual_cash_flows.iter().sum::<f64>() + v.net_sale_price - v.purchase_price,
        epsilon = 1e-6
    );
    assert_relative_eq!(v.ending_proceeds, v.net_sale_price - v.purchase_price, epsilon = 1e-6);

    let summary = result.summary();
    assert_eq!(summary.vacancy_year, Some(8));
    assert_relative_eq!(summary.exit_value, v.net_sale_price);
    assert_relative_eq!(
        summary.total_rent,
        result.total(LineItem::PotentialBaseRent).unwrap().value(),
        epsilon = 1e-6
    );
}

#[test]
fn test_forward_year_exit_basis_capitalises_terminal_year() {
    let mut assumptions = Assumptions::with_market(sentrex_market());
    assumptions.financial = FinancialAssumptions {
        exit_noi_basis: ExitNoiBasis::ForwardYear,
        ..Default::default()
    };
    let result = project(&sentrex_deal(), assumptions);
    let v = &result.valuation;
    assert_eq!(v.exit_noi_year, 11);
    assert_relative_eq!(v.exit_noi, result.year(11).unwrap().noi(), epsilon = 1e-9);
    // Cash flows still stop at the hold period
    assert_eq!(v.annual_cash_flows.len(), 10);
}

#[test]
fn test_selling_costs_reduce_net_sale() {
    let mut assumptions = Assumptions::with_market(sentrex_market());
    assumptions.financial.selling_cost_rate = 0.02;
    let with_costs = project(&sentrex_deal(), assumptions);
    let without = sentrex();

    let v = &with_costs.valuation;
    assert_relative_eq!(v.selling_costs, v.gross_sale_price * 0.02, epsilon = 1e-6);
    assert!(v.net_sale_price < without.valuation.net_sale_price);
    assert!(v.irr < without.valuation.irr);
}

#[test]
fn test_lease_outlasting_hold_has_no_leasing_costs() {
    let mut deal = sentrex_deal();
    deal.lease.lease_end = date(2038, 2, 28);
    let result = project(&deal, Assumptions::with_market(sentrex_market()));

    assert_eq!(result.timeline.transition_year(), None);
    assert!(result.vacancy_year().is_none());
    for record in &result.years {
        assert_eq!(record.regime, Regime::InPlace);
        assert_eq!(record.vacancy.value(), 0.0);
        assert_eq!(record.tenant_improvements.value(), 0.0);
        assert_eq!(record.leasing_commissions.value(), 0.0);
        if record.year > 1 {
            assert_relative_eq!(
                record.rent.value(),
                result.years[record.year as usize - 2].rent.value() * 1.03,
                epsilon = 1e-6
            );
        }
    }
}

#[test]
fn test_year1_rent_escalated_through_passed_anniversaries() {
    let deal = Deal::new(
        PropertyInput {
            name: "Escalation Check".to_string(),
            address: String::new(),
            purchase_price: 15_000_000.0,
            property_type: PropertyType::Office,
        },
        LeaseInput {
            tenant_name: "Tenant".to_string(),
            lease_start: date(2023, 1, 1),
            lease_end: date(2040, 12, 31),
            current_annual_rent: Some(1_000_000.0),
            rent_per_area: None,
            area: 50_000.0,
            escalation_rate: 0.025,
            year1_rent: None,
        },
    );
    let result = project(&deal, Assumptions::with_market(sentrex_market()));
    let year1 = result.year(1).unwrap().rent.value();
    assert_relative_eq!(year1, 1_076_890.625, epsilon = 1e-6);
    assert!(year1 > 1_000_000.0);
}

#[test]
fn test_expired_lease_transitions_in_year_one() {
    let mut deal = sentrex_deal();
    deal.lease.lease_start = date(2015, 1, 1);
    deal.lease.lease_end = date(2025, 6, 30);
    let result = project(&deal, Assumptions::with_market(sentrex_market()));

    assert!(result.timeline.lease_end_year <= 0);
    let y1 = result.year(1).unwrap();
    assert_eq!(y1.regime, Regime::ExpiryTransition);
    assert!(!y1.rent.is_formula());
    assert_relative_eq!(y1.rent.value(), 17.5 * 60_071.0, epsilon = 1e-6);
    assert_eq!(y1.vacancy.expr(), Some("=-B9*(8/12)*(1-0.85)"));
    assert_eq!(result.year(2).unwrap().rent.expr(), Some("=B9*(1+0.035)"));
}

#[test]
fn test_invalid_inputs_produce_no_result() {
    let engine = ProjectionEngine::new(
        Assumptions::with_market(sentrex_market()),
        ProjectionConfig::default(),
    );

    let mut deal = sentrex_deal();
    deal.lease.lease_end = date(2020, 1, 1);
    assert_eq!(
        engine.project_deal(&deal).unwrap_err(),
        ProjectionError::InvalidLeaseDates {
            start: date(2022, 3, 1),
            end: date(2020, 1, 1),
        }
    );

    let mut deal = sentrex_deal();
    deal.lease.rent_per_area = None;
    assert_eq!(
        engine.project_deal(&deal).unwrap_err(),
        ProjectionError::MissingDerivedInput { field: "base_annual_rent" }
    );

    let mut market = sentrex_market();
    market.renewal_probability = 1.5;
    let engine = ProjectionEngine::new(Assumptions::with_market(market), ProjectionConfig::default());
    assert!(matches!(
        engine.project_deal(&sentrex_deal()),
        Err(ProjectionError::InvalidRange { field: "renewal_probability", .. })
    ));
}

#[test]
fn test_unbracketed_irr_fails_to_converge() {
    let mut deal = sentrex_deal();
    // Exit alone returns many multiples of the price
    deal.property.purchase_price = 1_000.0;
    let engine = ProjectionEngine::new(
        Assumptions::with_market(sentrex_market()),
        ProjectionConfig::default(),
    );
    assert!(matches!(
        engine.project_deal(&deal),
        Err(ProjectionError::NoConvergence { iterations: 0, .. })
    ));
}

#[test]
fn test_rent_schedule_runs_from_lease_start() {
    let result = sentrex();
    let schedule = &result.rent_schedule;

    let first = &schedule.entries[0];
    assert_eq!(first.date, date(2022, 3, 1));
    assert_eq!(first.event, RentEvent::BaseRent);
    assert_relative_eq!(first.annual_rent, 853_608.91, epsilon = 1e-6);

    // Steps before 1/1/2036, switching to market escalation after 2/29/2032
    assert!(schedule.entries.iter().all(|e| e.date < date(2036, 1, 1)));
    let first_market = schedule
        .entries
        .iter()
        .position(|e| e.event == RentEvent::MarketStep)
        .unwrap();
    assert_eq!(schedule.entries[first_market].date, date(2032, 3, 1));
    assert!(schedule.entries[..first_market]
        .iter()
        .all(|e| e.date <= date(2032, 2, 29)));
    assert_eq!(schedule.expiry.market_lease_start, date(2032, 11, 1));
    // The market lease is priced like the cash flow's transition-year rent
    assert_relative_eq!(
        schedule.expiry.market_annual_rent,
        result.year(8).unwrap().rent.value(),
        epsilon = 1e-6
    );
}

#[test]
fn test_market_leasing_summary_matches_assumptions() {
    let result = sentrex();
    let summary = &result.market_leasing;

    assert_eq!(summary.as_of, date(2026, 1, 1));
    assert_eq!(summary.market_term_years, 5);
    assert_relative_eq!(summary.market_rent_per_area, result.rent_schedule.expiry.market_rent_per_area);
    assert_relative_eq!(summary.blended_vacancy_months, 8.0 * 0.15, epsilon = 1e-12);
    // Blended TI per area reproduces the transition-year TI cost
    assert_relative_eq!(
        summary.ti_blended_per_area * 60_071.0,
        result.year(8).unwrap().tenant_improvements.value(),
        epsilon = 1e-6
    );
    assert_eq!(summary.commission_policy(), "8% Year 1, 3.5% thereafter");
}

#[test]
fn test_simple_request_projects_and_exports() {
    let json = r#"{
        "property_address": "120 Valleywood Drive",
        "tenant": "Sentrex Health Solutions Inc.",
        "area_sf": 60071,
        "current_rent_psf": 14.21,
        "lease_start": "03/01/2022",
        "lease_end": "02/29/2032",
        "annual_escalation": 3,
        "purchase_price": 17800000,
        "renewal_probability": 85,
        "market_rent_psf": 17.5,
        "market_escalation": 3.5,
        "vacancy_months": 8,
        "ti_psf": 5,
        "exit_cap_rate": 6.5
    }"#;
    let loaded = load_deal_from_reader(json.as_bytes()).unwrap();
    let result = project(&loaded.deal, loaded.assumptions);
    assert_relative_eq!(result.valuation.irr, sentrex().valuation.irr, epsilon = 1e-9);

    let mut out = Vec::new();
    write_grid_csv(&result, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 19);
    assert!(lines[5].starts_with("Cash Flow,Year 1,Year 2,"));
    assert!(lines[5].ends_with(",Year 11,Total"));
    assert!(lines[6].contains("12/31/2026"));
    assert!(lines[8].starts_with("Potential Base Rent,"));
    assert!(lines[8].contains(",=B9*(1+0.03),"));
    assert!(lines[8].ends_with(",=SUM(B9:K9)"));
    assert!(lines[9].contains(",=-I9*(8/12)*(1-0.85),"));
}

#[test]
fn test_bundled_deal_files_agree() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("deals");
    let full = load_deal(dir.join("valleywood.json")).unwrap();
    let request = load_deal(dir.join("valleywood_request.json")).unwrap();

    let a = project(&full.deal, full.assumptions);
    let b = project(&request.deal, request.assumptions);
    assert_eq!(a.deal, "120 Valleywood Drive");
    assert_relative_eq!(a.valuation.npv, b.valuation.npv, epsilon = 1e-6);
    assert_relative_eq!(a.valuation.irr, b.valuation.irr, epsilon = 1e-9);
}
