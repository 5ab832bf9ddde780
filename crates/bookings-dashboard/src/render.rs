//! Output rendering (text tables with bar charts, CSV, or JSON lines)

use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::constants;
use crate::queries::{ClientRevenue, QuarterRevenue, YearRevenue};
use crate::summary::{chart_series, ChartPoint, EmptyReason, RevenueRow, Section, SummaryRow};

/// Output format for everything written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Text tables and bar charts
    #[default]
    Table,
    /// One CSV block per section
    Csv,
    /// One JSON object per line per section
    Json,
}

/// A row that can be shown as a table row
pub trait DisplayRow: Serialize {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl DisplayRow for YearRevenue {
    fn headers() -> &'static [&'static str] {
        &["Year", "Revenue"]
    }
    fn cells(&self) -> Vec<String> {
        vec![self.year.to_string(), format_revenue(self.revenue)]
    }
}

impl DisplayRow for QuarterRevenue {
    fn headers() -> &'static [&'static str] {
        &["YearAndQuarter", "Revenue"]
    }
    fn cells(&self) -> Vec<String> {
        vec![self.year_and_quarter.clone(), format_revenue(self.revenue)]
    }
}

impl DisplayRow for SummaryRow {
    fn headers() -> &'static [&'static str] {
        &["YearAndQuarter", "Year", "Revenue"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.year_and_quarter.clone(),
            self.year.clone(),
            format_revenue(self.revenue),
        ]
    }
}

impl DisplayRow for ClientRevenue {
    fn headers() -> &'static [&'static str] {
        &["ClientName", "Revenue"]
    }
    fn cells(&self) -> Vec<String> {
        vec![self.client_name.clone(), format_revenue(self.revenue)]
    }
}

/// Writes dashboard sections to an output stream
pub struct Renderer<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Page-level heading
    pub fn heading(&mut self, title: &str) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                writeln!(self.out, "\n{}", title)?;
                writeln!(self.out, "{}", "=".repeat(title.chars().count()))?;
            }
            OutputFormat::Csv => writeln!(self.out, "# {}", title)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &serde_json::json!({ "heading": title }))?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// A section with rows, optionally followed by a bar chart (table format only)
    pub fn rows<R: DisplayRow>(
        &mut self,
        title: &str,
        rows: &[R],
        chart: Option<&[ChartPoint]>,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                writeln!(self.out, "\n{}", title)?;
                writeln!(self.out, "{}", text_table(rows))?;
                if let Some(points) = chart {
                    write!(self.out, "{}", bar_chart(points, constants::CHART_WIDTH))?;
                }
            }
            OutputFormat::Csv => {
                writeln!(self.out, "# {}", title)?;
                {
                    let mut wtr = csv::Writer::from_writer(&mut self.out);
                    for row in rows {
                        wtr.serialize(row)?;
                    }
                    wtr.flush()?;
                }
                writeln!(self.out)?;
            }
            OutputFormat::Json => {
                let value = serde_json::json!({ "section": title, "rows": rows });
                serde_json::to_writer(&mut self.out, &value)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// A section with nothing to show
    pub fn empty(&mut self, title: &str, reason: EmptyReason) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                writeln!(self.out, "\n{}", title)?;
                writeln!(self.out, "  {}", reason.message())?;
            }
            OutputFormat::Csv => {
                writeln!(self.out, "# {}", title)?;
                writeln!(self.out, "# {}", reason.message())?;
                writeln!(self.out)?;
            }
            OutputFormat::Json => {
                let value = serde_json::json!({ "section": title, "empty": reason.message() });
                serde_json::to_writer(&mut self.out, &value)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Render a row section, charting it when asked
    pub fn section<R: DisplayRow + RevenueRow>(
        &mut self,
        title: &str,
        section: &Section<Vec<R>>,
        charted: bool,
    ) -> Result<()> {
        match section {
            Section::Rows(rows) => {
                let series = charted.then(|| chart_series(rows));
                self.rows(title, rows, series.as_deref())
            }
            Section::Empty(reason) => self.empty(title, *reason),
        }
    }

    /// A plain list of values (agents, years, drill-down options)
    pub fn list(&mut self, title: &str, items: &[String]) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                writeln!(self.out, "{}:", title)?;
                for item in items {
                    writeln!(self.out, "  {}", item)?;
                }
            }
            OutputFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(&mut self.out);
                wtr.write_record([title])?;
                for item in items {
                    wtr.write_record([item])?;
                }
                wtr.flush()?;
            }
            OutputFormat::Json => {
                let value = serde_json::json!({ "section": title, "values": items });
                serde_json::to_writer(&mut self.out, &value)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

fn text_table<R: DisplayRow>(rows: &[R]) -> String {
    let mut builder = Builder::default();
    builder.push_record(R::headers().iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row.cells());
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Horizontal bars scaled to the largest value; non-positive values get no bar
pub fn bar_chart(points: &[ChartPoint], width: usize) -> String {
    let label_width = points
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);
    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);

    let mut chart = String::new();
    for point in points {
        let len = if max > 0.0 && point.value > 0.0 {
            ((point.value / max) * width as f64).round() as usize
        } else {
            0
        };
        chart.push_str(&format!(
            "{:<label_width$} │{} {}\n",
            point.label,
            "█".repeat(len),
            format_revenue(point.value),
        ));
    }
    chart
}

/// Two decimals with thousands separators; -0.00 shows as 0.00
pub fn format_revenue(value: f64) -> String {
    let digits = format!("{:.2}", value.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && digits != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
