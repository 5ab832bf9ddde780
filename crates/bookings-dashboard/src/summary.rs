//! Summary construction: total rows, chart series and empty states

use serde::Serialize;

use crate::constants;
use crate::queries::{ClientRevenue, PeriodRevenue, QuarterRevenue, YearRevenue};

/// A result row that carries a revenue figure
pub trait RevenueRow {
    /// Category label used on chart axes
    fn label(&self) -> String;
    fn revenue(&self) -> f64;
}

impl RevenueRow for YearRevenue {
    fn label(&self) -> String {
        self.year.to_string()
    }
    fn revenue(&self) -> f64 {
        self.revenue
    }
}

impl RevenueRow for QuarterRevenue {
    fn label(&self) -> String {
        self.year_and_quarter.clone()
    }
    fn revenue(&self) -> f64 {
        self.revenue
    }
}

impl RevenueRow for PeriodRevenue {
    fn label(&self) -> String {
        self.year_and_quarter.clone()
    }
    fn revenue(&self) -> f64 {
        self.revenue
    }
}

impl RevenueRow for ClientRevenue {
    fn label(&self) -> String {
        self.client_name.clone()
    }
    fn revenue(&self) -> f64 {
        self.revenue
    }
}

/// Sum of revenue across rows
pub fn total_revenue<R: RevenueRow>(rows: &[R]) -> f64 {
    rows.iter().map(RevenueRow::revenue).sum()
}

/// One bar of a bar chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Bar chart series, one point per row in row order
pub fn chart_series<R: RevenueRow>(rows: &[R]) -> Vec<ChartPoint> {
    rows.iter()
        .map(|r| ChartPoint {
            label: r.label(),
            value: r.revenue(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Period,
    Total,
}

/// Display row of the per-period summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SummaryRow {
    pub year_and_quarter: String,
    pub year: String,
    pub revenue: f64,
    #[serde(skip)]
    pub kind: RowKind,
}

/// An agent's per-period revenue and its total
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    rows: Vec<PeriodRevenue>,
    total: f64,
}

impl PeriodSummary {
    pub fn new(rows: Vec<PeriodRevenue>) -> Self {
        let total = total_revenue(&rows);
        Self { rows, total }
    }

    pub fn rows(&self) -> &[PeriodRevenue] {
        &self.rows
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Period rows followed by exactly one Total row
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.rows
            .iter()
            .map(|r| SummaryRow {
                year_and_quarter: r.year_and_quarter.clone(),
                year: r.year.to_string(),
                revenue: r.revenue,
                kind: RowKind::Period,
            })
            .chain(std::iter::once(SummaryRow {
                year_and_quarter: constants::TOTAL_LABEL.to_string(),
                year: constants::PLACEHOLDER.to_string(),
                revenue: self.total,
                kind: RowKind::Total,
            }))
            .collect()
    }

    /// Per-period bars; the total is never charted
    pub fn chart_series(&self) -> Vec<ChartPoint> {
        chart_series(&self.rows)
    }
}

/// Why a section has nothing to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoYearsSelected,
    NoMatchingRows,
}

impl EmptyReason {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::NoYearsSelected => constants::NO_YEARS_MESSAGE,
            EmptyReason::NoMatchingRows => constants::NO_DATA_MESSAGE,
        }
    }
}

/// A dashboard section: rows to show, or an explicit empty state
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Rows(T),
    Empty(EmptyReason),
}

impl<R> Section<Vec<R>> {
    pub fn from_rows(rows: Vec<R>) -> Self {
        if rows.is_empty() {
            Section::Empty(EmptyReason::NoMatchingRows)
        } else {
            Section::Rows(rows)
        }
    }
}

impl Section<PeriodSummary> {
    pub fn from_summary(summary: PeriodSummary) -> Self {
        if summary.is_empty() {
            Section::Empty(EmptyReason::NoMatchingRows)
        } else {
            Section::Rows(summary)
        }
    }
}
