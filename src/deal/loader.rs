//! Load deals from JSON documents
//!
//! Two shapes are accepted:
//! - the full document `{ "property", "lease", "market", "financial"? }` with ISO dates
//! - the simple request format posted by the underwriting form, with `MM/DD/YYYY`
//!   dates and percentages given as whole numbers

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::{Deal, LeaseInput, PropertyInput, PropertyType};
use crate::assumptions::{Assumptions, FinancialAssumptions, MarketAssumptions};

/// Date format used by the underwriting form
const FORM_DATE_FORMAT: &str = "%m/%d/%Y";

/// A deal together with the assumptions it should be projected under
#[derive(Debug, Clone)]
pub struct LoadedDeal {
    pub deal: Deal,
    pub assumptions: Assumptions,
}

/// Full deal document
#[derive(Debug, Deserialize)]
struct DealFile {
    property: PropertyInput,
    lease: LeaseInput,
    market: MarketAssumptions,
    #[serde(default)]
    financial: FinancialAssumptions,
}

/// Simple request format
#[derive(Debug, Deserialize)]
struct DealRequest {
    #[serde(default)]
    property_address: String,
    #[serde(default)]
    property_type: PropertyType,
    tenant: String,
    area_sf: f64,
    current_rent_psf: f64,
    #[serde(deserialize_with = "form_date")]
    lease_start: NaiveDate,
    #[serde(deserialize_with = "form_date")]
    lease_end: NaiveDate,
    /// Percent, e.g. 3.0
    annual_escalation: f64,
    purchase_price: f64,
    /// Percent, e.g. 85
    renewal_probability: f64,
    market_rent_psf: f64,
    /// Percent, e.g. 3.5
    market_escalation: f64,
    vacancy_months: u32,
    ti_psf: f64,
    /// Percent (6.5) or fraction (0.065)
    #[serde(default)]
    exit_cap_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DealDocument {
    Full(DealFile),
    Request(DealRequest),
}

fn form_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(&raw, FORM_DATE_FORMAT).map_err(serde::de::Error::custom)
}

/// Interpret values above 1 as whole percentages
fn percent_or_fraction(value: f64) -> f64 {
    if value > 1.0 {
        value / 100.0
    } else {
        value
    }
}

impl DealRequest {
    fn into_loaded(self) -> LoadedDeal {
        let property = PropertyInput {
            name: self.property_address.clone(),
            address: self.property_address,
            purchase_price: self.purchase_price,
            property_type: self.property_type,
        };

        let lease = LeaseInput {
            tenant_name: self.tenant,
            lease_start: self.lease_start,
            lease_end: self.lease_end,
            current_annual_rent: None,
            rent_per_area: Some(self.current_rent_psf),
            area: self.area_sf,
            escalation_rate: self.annual_escalation / 100.0,
            year1_rent: None,
        };

        let market = MarketAssumptions {
            renewal_probability: self.renewal_probability / 100.0,
            market_rent_per_area: self.market_rent_psf,
            adjusted_market_rent_per_area: None,
            market_escalation_rate: self.market_escalation / 100.0,
            market_term_years: 5,
            vacancy_months: self.vacancy_months,
            tenant_improvement_per_area: self.ti_psf,
            exit_cap_rate: percent_or_fraction(self.exit_cap_rate.unwrap_or(6.5)),
        };

        LoadedDeal {
            deal: Deal::new(property, lease),
            assumptions: Assumptions::with_market(market),
        }
    }
}

impl From<DealDocument> for LoadedDeal {
    fn from(doc: DealDocument) -> Self {
        match doc {
            DealDocument::Full(file) => LoadedDeal {
                deal: Deal::new(file.property, file.lease),
                assumptions: Assumptions {
                    market: file.market,
                    financial: file.financial,
                },
            },
            DealDocument::Request(request) => request.into_loaded(),
        }
    }
}

/// Load a deal from any reader
pub fn load_deal_from_reader<R: Read>(reader: R) -> Result<LoadedDeal> {
    let doc: DealDocument =
        serde_json::from_reader(reader).context("deal document is neither the full nor the simple format")?;
    Ok(doc.into())
}

/// Load a deal from a JSON file
pub fn load_deal<P: AsRef<Path>>(path: P) -> Result<LoadedDeal> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    load_deal_from_reader(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))
}
