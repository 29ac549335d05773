//! Placement of the cash flow line items on the sheet

use serde::{Deserialize, Serialize};

use super::cell::{CellRef, NumberFormat};

/// Cash flow line items in sheet order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum LineItem {
    PotentialBaseRent,
    AbsorptionTurnoverVacancy,
    EffectiveGrossRevenue,
    OperatingExpenses,
    NetOperatingIncome,
    YieldOnPurchasePrice,
    TenantImprovements,
    LeasingCommissions,
    TotalLeasingCapitalCosts,
    CashFlowBeforeDebtService,
    CashFlowAvailableForDistribution,
}

impl LineItem {
    pub const ALL: [LineItem; 11] = [
        LineItem::PotentialBaseRent,
        LineItem::AbsorptionTurnoverVacancy,
        LineItem::EffectiveGrossRevenue,
        LineItem::OperatingExpenses,
        LineItem::NetOperatingIncome,
        LineItem::YieldOnPurchasePrice,
        LineItem::TenantImprovements,
        LineItem::LeasingCommissions,
        LineItem::TotalLeasingCapitalCosts,
        LineItem::CashFlowBeforeDebtService,
        LineItem::CashFlowAvailableForDistribution,
    ];

    /// Zero-based position within the block
    pub fn index(&self) -> u32 {
        *self as u32
    }

    pub fn label(&self) -> &'static str {
        match self {
            LineItem::PotentialBaseRent => "Potential Base Rent",
            LineItem::AbsorptionTurnoverVacancy => "Absorption & Turnover Vacancy",
            LineItem::EffectiveGrossRevenue => "Effective Gross Revenue",
            LineItem::OperatingExpenses => "Operating Expenses",
            LineItem::NetOperatingIncome => "Net Operating Income",
            LineItem::YieldOnPurchasePrice => "Yield on Purchase Price",
            LineItem::TenantImprovements => "Tenant Improvements",
            LineItem::LeasingCommissions => "Leasing Commissions",
            LineItem::TotalLeasingCapitalCosts => "Total Leasing & Capital Costs",
            LineItem::CashFlowBeforeDebtService => "Cash Flow Before Debt Service",
            LineItem::CashFlowAvailableForDistribution => "Cash Flow Available for Distribution",
        }
    }

    pub fn format(&self) -> NumberFormat {
        match self {
            LineItem::YieldOnPurchasePrice => NumberFormat::Percent,
            _ => NumberFormat::Currency,
        }
    }

    /// Whether the item gets a SUM in the total column (ratios do not)
    pub fn is_additive(&self) -> bool {
        !matches!(self, LineItem::YieldOnPurchasePrice)
    }
}

/// Where the cash flow block sits on its sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub sheet_name: String,

    /// Row holding the "Year N" headers
    pub header_row: u32,

    /// Row holding the period end dates
    pub date_row: u32,

    /// Row of the first line item
    pub first_row: u32,

    /// Column holding the line item labels
    pub label_column: u32,

    /// Column of year 1
    pub first_year_column: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Cash Flow".to_string(),
            header_row: 6,
            date_row: 7,
            first_row: 9,
            label_column: 1,
            first_year_column: 2,
        }
    }
}

impl SheetLayout {
    pub fn row(&self, item: LineItem) -> u32 {
        self.first_row + item.index()
    }

    pub fn year_column(&self, year: u32) -> u32 {
        self.first_year_column + year - 1
    }

    /// Cell holding `item` for projection year `year` (1-based)
    pub fn cell(&self, item: LineItem, year: u32) -> CellRef {
        CellRef::new(self.row(item), self.year_column(year))
    }

    /// Label cell for `item`
    pub fn label_cell(&self, item: LineItem) -> CellRef {
        CellRef::new(self.row(item), self.label_column)
    }

    /// Total column, placed after the last projected year
    pub fn total_column(&self, series_years: u32) -> u32 {
        self.first_year_column + series_years
    }
}
