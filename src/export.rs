//! CSV export of projection results
//!
//! The cash flow grid is written cell-for-cell at its A1 position, so formula
//! text stays valid when the file is opened in a spreadsheet application.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::projection::{
    LineItem, MarketLeasingSummary, ProjectionResult, RentEvent, RentSchedule, ValuationSummary,
};

/// Dense text grid, rows and columns 1-based
struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows: vec![vec![String::new(); cols as usize]; rows as usize],
        }
    }

    fn set(&mut self, row: u32, col: u32, text: String) {
        let (Some(r), Some(c)) = (row.checked_sub(1), col.checked_sub(1)) else {
            return;
        };
        if let Some(cell) = self
            .rows
            .get_mut(r as usize)
            .and_then(|cells| cells.get_mut(c as usize))
        {
            *cell = text;
        }
    }
}

/// Write the cash flow block with labels, headers, period dates and totals
pub fn write_grid_csv<W: Write>(result: &ProjectionResult, writer: W) -> Result<()> {
    let layout = &result.layout;
    let series_years = result.years.len() as u32;
    let total_col = layout.total_column(series_years);
    let last_row = LineItem::ALL
        .iter()
        .map(|item| layout.row(*item))
        .max()
        .unwrap_or(layout.first_row);

    let mut grid = Grid::new(last_row, total_col);

    grid.set(layout.header_row, layout.label_column, layout.sheet_name.clone());
    for record in &result.years {
        let col = layout.year_column(record.year);
        grid.set(layout.header_row, col, format!("Year {}", record.year));
        grid.set(
            layout.date_row,
            col,
            record.period_end.format("%m/%d/%Y").to_string(),
        );
    }
    grid.set(layout.header_row, total_col, "Total".to_string());

    for item in LineItem::ALL {
        let at = layout.label_cell(item);
        grid.set(at.row, at.col, item.label().to_string());
    }
    for cell in result.cells() {
        grid.set(cell.at.row, cell.at.col, cell.to_sheet_text());
    }

    let mut wtr = csv::WriterBuilder::new().flexible(false).from_writer(writer);
    for row in &grid.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct RentScheduleRow<'a> {
    date: String,
    year: u32,
    event: &'a str,
    escalation_rate: f64,
    annual_rent: f64,
    rent_per_area: f64,
}

/// Write one row per rent schedule entry
pub fn write_rent_schedule_csv<W: Write>(schedule: &RentSchedule, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in &schedule.entries {
        let event = match entry.event {
            RentEvent::BaseRent => "Base Rent",
            RentEvent::ContractStep => "Step Rent",
            RentEvent::MarketStep => "Market Step",
        };
        wtr.serialize(RentScheduleRow {
            date: entry.date.format("%m/%d/%Y").to_string(),
            year: entry.years_from_start,
            event,
            escalation_rate: entry.escalation_rate,
            annual_rent: entry.annual_rent,
            rent_per_area: entry.rent_per_area,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct InvestmentRow {
    period: u32,
    date: String,
    investment: f64,
    cash_flow: f64,
    present_value: f64,
    cash_to_purchase_price: Option<f64>,
}

/// Write the investment & cash flow summary
pub fn write_valuation_csv<W: Write>(valuation: &ValuationSummary, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for period in &valuation.periods {
        wtr.serialize(InvestmentRow {
            period: period.period,
            date: period.date.format("%m/%d/%Y").to_string(),
            investment: period.investment,
            cash_flow: period.cash_flow,
            present_value: period.present_value,
            cash_to_purchase_price: period.cash_to_purchase_price,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the market leasing summary as parameter/value rows
pub fn write_market_leasing_csv<W: Write>(summary: &MarketLeasingSummary, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["parameter", "value"])?;
    for (label, value) in summary.rows() {
        wtr.write_record([label, value.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// File stem for a deal label: alphanumerics kept, everything else collapsed to `_`
pub fn file_stem(label: &str) -> String {
    let mut stem = String::with_capacity(label.len());
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            stem.push(ch.to_ascii_lowercase());
        } else if !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "deal".to_string()
    } else {
        stem.to_string()
    }
}

/// Write the cash flow, rent schedule, valuation and market leasing CSVs into `dir`
pub fn export_all(result: &ProjectionResult, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let stem = file_stem(&result.deal);
    let cash_flow = dir.join(format!("{}_cash_flow.csv", stem));
    let rent_schedule = dir.join(format!("{}_rent_schedule.csv", stem));
    let valuation = dir.join(format!("{}_valuation.csv", stem));
    let market_leasing = dir.join(format!("{}_market_leasing.csv", stem));

    let create = |path: &Path| {
        File::create(path).with_context(|| format!("creating {}", path.display()))
    };
    write_grid_csv(result, create(&cash_flow)?)?;
    write_rent_schedule_csv(&result.rent_schedule, create(&rent_schedule)?)?;
    write_valuation_csv(&result.valuation, create(&valuation)?)?;
    write_market_leasing_csv(&result.market_leasing, create(&market_leasing)?)?;

    Ok(vec![cash_flow, rent_schedule, valuation, market_leasing])
}
