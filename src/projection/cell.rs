//! Spreadsheet cells: A1 addressing, literal-or-formula content, number formats
//!
//! Formulas follow the xlsx grammar: a leading `=`, A1 references on the
//! same sheet, `+ - * /` with standard precedence, and `SUM(range)`. Every
//! formula also carries its evaluated value so downstream metrics never
//! re-parse the text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 1-based cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Column letters for a 1-based column index (1 -> A, 27 -> AA)
    pub fn column_letters(col: u32) -> String {
        let mut col = col;
        let mut letters = Vec::new();
        while col > 0 {
            let rem = ((col - 1) % 26) as u8;
            letters.push((b'A' + rem) as char);
            col = (col - 1) / 26;
        }
        letters.iter().rev().collect()
    }

    /// A1 notation, e.g. `B9`
    pub fn to_a1(&self) -> String {
        format!("{}{}", Self::column_letters(self.col), self.row)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Display format applied by the sheet writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberFormat {
    /// Whole currency units with thousands separators
    Currency,
    Percent,
}

/// Render a constant for embedding in a formula.
///
/// Uses the shortest representation that round-trips, which never falls back
/// to exponent notation. Negative values are parenthesised so they compose
/// safely after binary operators.
pub fn constant(value: f64) -> String {
    if value < 0.0 {
        format!("({})", value)
    } else {
        format!("{}", value)
    }
}

/// A formula factor with its textual form and its value
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub expr: String,
    pub value: f64,
}

impl Term {
    pub fn constant(value: f64) -> Self {
        Self {
            expr: constant(value),
            value,
        }
    }

    /// `(numerator/denominator)`, kept unreduced so the sheet shows its inputs
    pub fn fraction(numerator: f64, denominator: f64) -> Self {
        Self {
            expr: format!("({}/{})", constant(numerator), constant(denominator)),
            value: numerator / denominator,
        }
    }

    /// `(1-p)`
    pub fn complement(p: f64) -> Self {
        Self {
            expr: format!("(1-{})", constant(p)),
            value: 1.0 - p,
        }
    }

    /// `(1+rate)`
    pub fn growth(rate: f64) -> Self {
        Self {
            expr: format!("(1+{})", constant(rate)),
            value: 1.0 + rate,
        }
    }
}

/// Content of a cell: an input/constant or a formula over other cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellContent {
    Literal {
        value: f64,
    },
    Formula {
        expr: String,
        refs: Vec<CellRef>,
        /// Evaluated result of `expr`
        value: f64,
    },
}

/// A placed cell ready for a sheet writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub at: CellRef,
    pub content: CellContent,
    pub format: NumberFormat,
}

impl Cell {
    pub fn literal(at: CellRef, value: f64, format: NumberFormat) -> Self {
        Self {
            at,
            content: CellContent::Literal { value },
            format,
        }
    }

    /// Literal zero, used for line items that do not fire in a year
    pub fn zero(at: CellRef, format: NumberFormat) -> Self {
        Self::literal(at, 0.0, format)
    }

    fn formula(at: CellRef, expr: String, refs: Vec<CellRef>, value: f64, format: NumberFormat) -> Self {
        Self {
            at,
            content: CellContent::Formula { expr, refs, value },
            format,
        }
    }

    /// `=SRC`
    pub fn reference(at: CellRef, src: &Cell, format: NumberFormat) -> Self {
        Self::formula(at, format!("={}", src.at), vec![src.at], src.value(), format)
    }

    /// `=A+B+...`
    pub fn sum(at: CellRef, parts: &[&Cell], format: NumberFormat) -> Self {
        let expr = parts
            .iter()
            .map(|c| c.at.to_a1())
            .collect::<Vec<_>>()
            .join("+");
        let value = parts.iter().map(|c| c.value()).sum();
        Self::formula(
            at,
            format!("={}", expr),
            parts.iter().map(|c| c.at).collect(),
            value,
            format,
        )
    }

    /// `=SUM(FIRST:LAST)` over cells laid out contiguously in one row
    pub fn sum_range(at: CellRef, cells: &[&Cell], format: NumberFormat) -> Self {
        let value = cells.iter().map(|c| c.value()).sum();
        let refs: Vec<CellRef> = cells.iter().map(|c| c.at).collect();
        let expr = match (refs.first(), refs.last()) {
            (Some(first), Some(last)) => format!("=SUM({}:{})", first, last),
            _ => "=0".to_string(),
        };
        Self::formula(at, expr, refs, value, format)
    }

    /// `=A-B`
    pub fn difference(at: CellRef, minuend: &Cell, subtrahend: &Cell, format: NumberFormat) -> Self {
        Self::formula(
            at,
            format!("={}-{}", minuend.at, subtrahend.at),
            vec![minuend.at, subtrahend.at],
            minuend.value() - subtrahend.value(),
            format,
        )
    }

    /// `=SRC/divisor`
    pub fn ratio(at: CellRef, src: &Cell, divisor: f64, format: NumberFormat) -> Self {
        Self::formula(
            at,
            format!("={}/{}", src.at, constant(divisor)),
            vec![src.at],
            src.value() / divisor,
            format,
        )
    }

    /// `=SRC*(1+rate)`
    pub fn escalated(at: CellRef, prev: &Cell, rate: f64, format: NumberFormat) -> Self {
        Self::scaled(at, prev, &[Term::growth(rate)], false, format)
    }

    /// `=SRC*t1*t2...`, or `=-SRC*t1*t2...` when `negate`
    pub fn scaled(at: CellRef, src: &Cell, terms: &[Term], negate: bool, format: NumberFormat) -> Self {
        let sign = if negate { "-" } else { "" };
        let mut expr = format!("={}{}", sign, src.at);
        let mut value = if negate { -src.value() } else { src.value() };
        for term in terms {
            expr.push('*');
            expr.push_str(&term.expr);
            value *= term.value;
        }
        Self::formula(at, expr, vec![src.at], value, format)
    }

    pub fn value(&self) -> f64 {
        match &self.content {
            CellContent::Literal { value } | CellContent::Formula { value, .. } => *value,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self.content, CellContent::Formula { .. })
    }

    /// Formula text, if any
    pub fn expr(&self) -> Option<&str> {
        match &self.content {
            CellContent::Formula { expr, .. } => Some(expr),
            CellContent::Literal { .. } => None,
        }
    }

    /// Cells this one reads from
    pub fn refs(&self) -> &[CellRef] {
        match &self.content {
            CellContent::Formula { refs, .. } => refs,
            CellContent::Literal { .. } => &[],
        }
    }

    /// Text a writer would put in the cell: the formula, or the literal value
    pub fn to_sheet_text(&self) -> String {
        match &self.content {
            CellContent::Formula { expr, .. } => expr.clone(),
            CellContent::Literal { value } => format!("{}", value),
        }
    }
}
