//! CRE Underwriting CLI
//!
//! Projects one or more deal files and prints the cash flow and valuation.
//!
//! ```bash
//! cre_underwriting deals/sentrex.json
//! cre_underwriting --analysis-start 2026-07-01 --csv-dir out deals/*.json
//! cre_underwriting --json deals/sentrex.json > sentrex.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use log::{error, info};

use cre_underwriting::deal::{load_deal, LoadedDeal};
use cre_underwriting::export::export_all;
use cre_underwriting::projection::{LineItem, ProjectionConfig, ProjectionResult};
use cre_underwriting::ScenarioRunner;

/// Single-tenant commercial real estate cash flow projections
#[derive(Parser)]
#[command(name = "cre_underwriting")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// First day of cash flow year 1 (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    analysis_start: Option<NaiveDate>,

    /// Write cash flow, rent schedule, valuation and market leasing CSVs into this directory
    #[arg(long, value_name = "DIR")]
    csv_dir: Option<PathBuf>,

    /// Print full results as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Deal JSON files
    #[arg(required = true, value_name = "DEAL")]
    deals: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = ProjectionConfig::default();
    if let Some(date) = cli.analysis_start {
        config.analysis_start = date;
    }

    let deals = cli
        .deals
        .iter()
        .map(load_deal)
        .collect::<Result<Vec<LoadedDeal>>>()?;
    info!("Loaded {} deals", deals.len());

    let runner = ScenarioRunner::with_config(config);
    let results = runner.run_batch(&deals);

    let mut projected = Vec::with_capacity(results.len());
    let mut failures = 0;
    for (path, result) in cli.deals.iter().zip(results) {
        match result {
            Ok(result) => projected.push(result),
            Err(e) => {
                error!("{}: {}", path.display(), e);
                failures += 1;
            }
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&projected).context("serialising results")?;
        println!("{}", json);
    } else {
        for result in &projected {
            print_result(result);
        }
    }

    if let Some(dir) = &cli.csv_dir {
        for result in &projected {
            for path in export_all(result, dir)? {
                info!("Wrote {}", path.display());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} deals failed to project", failures, cli.deals.len());
    }
    Ok(())
}

fn print_result(result: &ProjectionResult) {
    let t = &result.timeline;
    println!("{}", result.deal);
    println!("{}", "=".repeat(result.deal.len().max(20)));
    println!("  Analysis start: {}", t.analysis_start);
    println!("  Years elapsed: {:.4}", t.years_elapsed);
    println!("  Year 1 rent: ${:.2}", t.current_rent);
    println!("  Lease end year: {}", t.lease_end_year);
    match t.transition_year() {
        Some(year) => println!("  Vacancy year: {}", year),
        None => println!("  Vacancy year: none within hold"),
    }
    println!();

    let items = [
        (LineItem::PotentialBaseRent, "Rent"),
        (LineItem::AbsorptionTurnoverVacancy, "Vacancy"),
        (LineItem::NetOperatingIncome, "NOI"),
        (LineItem::TotalLeasingCapitalCosts, "Leasing"),
        (LineItem::CashFlowBeforeDebtService, "CFBDS"),
    ];

    print!("{:>4} {:>10}", "Year", "Period End");
    for (_, header) in &items {
        print!(" {:>14}", header);
    }
    println!(" {:>8}", "Yield");
    println!("{}", "-".repeat(16 + 15 * items.len() + 9));

    for record in &result.years {
        print!("{:>4} {:>10}", record.year, record.period_end.format("%m/%d/%Y"));
        for (item, _) in &items {
            print!(" {:>14.2}", record.cell(*item).value());
        }
        println!(" {:>7.2}%", record.yield_on_purchase_price.value() * 100.0);
    }

    let summary = result.summary();
    let v = &result.valuation;
    println!("\nSummary:");
    println!("  Total Rent: ${:.2}", summary.total_rent);
    println!("  Total NOI: ${:.2}", summary.total_noi);
    println!("  Total Leasing & Capital: ${:.2}", summary.total_leasing_capital);
    println!("  Total Cash Flow: ${:.2}", summary.total_cash_flow);

    println!("\nValuation:");
    println!("  Purchase Price: ${:.2}", v.purchase_price);
    println!("  Exit NOI (year {}): ${:.2}", v.exit_noi_year, v.exit_noi);
    println!("  Exit Cap Rate: {:.2}%", v.exit_cap_rate * 100.0);
    println!("  Gross Sale Price: ${:.2}", v.gross_sale_price);
    println!("  Net Sale Price: ${:.2}", v.net_sale_price);
    println!("  PV of Cash Flow: ${:.2}", v.pv_cash_flow);
    println!("  PV of Net Sale: ${:.2}", v.pv_net_sale);
    println!("  NPV @ {:.2}%: ${:.2}", v.discount_rate * 100.0, v.npv);
    println!("  IRR: {:.4}%", v.irr * 100.0);
    println!("  Total Return: ${:.2}", v.total_return);

    println!("\nMarket Leasing:");
    for (label, value) in result.market_leasing.rows() {
        println!("  {}: {}", label, value);
    }
    println!();
}
