//! The render pass: one connection, sections computed and written top to bottom
//!
//! A failed query aborts the rest of the pass. Sections already written stay
//! on the output, and the connection is closed either way. A bookings table
//! without rows is not a failure: the agent sections render as empty.

use anyhow::Result;
use std::io::Write;

use crate::config::Config;
use crate::constants;
use crate::filter::{self, FilterState, Period, YearSet, YearsRequest};
use crate::queries;
use crate::render::Renderer;
use crate::source::BookingSource;
use crate::summary::{EmptyReason, Section};

/// Raw user selections, as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub agent: Option<String>,
    pub years: YearsRequest,
    pub period: Option<String>,
}

/// What to render in one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Firmwide overview plus the selected agent's sections
    Dashboard(Selection),
    /// Distinct agent names
    Agents,
    /// Distinct years, most recent first
    Years,
    /// Drill-down options for a selection
    Periods(Selection),
}

/// Agent and years after validation against the data
struct Resolved {
    agent: String,
    years: Option<YearSet>,
}

/// Open the source, render the request, and always close the source
pub async fn run_render_pass<W: Write>(
    config: &Config,
    request: &Request,
    renderer: &mut Renderer<W>,
) -> Result<()> {
    let mut source = BookingSource::open(&config.database).await?;

    let result = match request {
        Request::Dashboard(selection) => {
            render_dashboard(&mut source, config, selection, renderer).await
        }
        Request::Agents => render_agents(&mut source, renderer).await,
        Request::Years => render_years(&mut source, renderer).await,
        Request::Periods(selection) => {
            render_periods(&mut source, config, selection, renderer).await
        }
    };

    source.close().await;
    result
}

/// Full dashboard: firmwide sections, then the agent summary and client drill-down
pub async fn render_dashboard<W: Write>(
    source: &mut BookingSource,
    config: &Config,
    selection: &Selection,
    renderer: &mut Renderer<W>,
) -> Result<()> {
    renderer.heading("Firmwide Bookings Overview")?;

    let yearly = queries::yearly_revenue(source).await?;
    renderer.section("Revenue by Year", &Section::from_rows(yearly), true)?;

    let quarterly = queries::quarterly_revenue(source).await?;
    renderer.section("Revenue by Quarter", &Section::from_rows(quarterly), true)?;

    let Some(Resolved { agent, years }) = resolve_selection(source, config, selection).await?
    else {
        return render_no_bookings(selection, renderer);
    };

    renderer.heading(&format!("Revenue Summary for {}", agent))?;

    let summary_title = format!(
        "Quarterly + Annual Commission: {}",
        years_label(years.as_ref())
    );
    let summary = match &years {
        Some(years) => {
            let summary = queries::agent_revenue_by_period(source, &agent, years).await?;
            Section::from_summary(summary)
        }
        None => Section::Empty(EmptyReason::NoYearsSelected),
    };
    match &summary {
        Section::Rows(summary) => {
            tracing::debug!(
                periods = summary.rows().len(),
                total = summary.total(),
                "agent summary"
            );
            let series = summary.chart_series();
            renderer.rows(&summary_title, &summary.summary_rows(), Some(series.as_slice()))?
        }
        Section::Empty(reason) => renderer.empty(&summary_title, *reason)?,
    }

    let options = match &summary {
        Section::Rows(summary) => {
            filter::period_options(summary.rows().iter().map(|r| r.year_and_quarter.as_str()))
        }
        Section::Empty(_) => filter::period_options([]),
    };
    let period = filter::resolve_period(selection.period.as_deref(), &options)?;
    let state = FilterState::new(agent, years, period);

    let clients_title = format!("Client Breakdown – {}", state.period());
    let clients = match state.client_scope() {
        Some(scope) => {
            let clients = queries::client_breakdown(source, state.agent(), &scope).await?;
            Section::from_rows(clients)
        }
        None => Section::Empty(EmptyReason::NoYearsSelected),
    };
    renderer.section(&clients_title, &clients, false)?;

    Ok(())
}

/// Agent sections for a bookings table with no agents or no years
fn render_no_bookings<W: Write>(selection: &Selection, renderer: &mut Renderer<W>) -> Result<()> {
    renderer.heading(&format!("Revenue Summary for {}", constants::NONE_LABEL))?;
    renderer.empty(
        &format!("Quarterly + Annual Commission: {}", constants::NONE_LABEL),
        EmptyReason::NoMatchingRows,
    )?;

    let period = filter::resolve_period(selection.period.as_deref(), &filter::period_options([]))?;
    renderer.empty(
        &format!("Client Breakdown – {}", period),
        EmptyReason::NoMatchingRows,
    )
}

async fn render_agents<W: Write>(
    source: &mut BookingSource,
    renderer: &mut Renderer<W>,
) -> Result<()> {
    let agents = queries::distinct_agents(source).await?;
    renderer.list("Agents", &agents)
}

async fn render_years<W: Write>(
    source: &mut BookingSource,
    renderer: &mut Renderer<W>,
) -> Result<()> {
    let years = queries::distinct_years(source).await?;
    let labels: Vec<String> = years.iter().rev().map(i64::to_string).collect();
    renderer.list("Years", &labels)
}

async fn render_periods<W: Write>(
    source: &mut BookingSource,
    config: &Config,
    selection: &Selection,
    renderer: &mut Renderer<W>,
) -> Result<()> {
    let Some(Resolved { agent, years }) = resolve_selection(source, config, selection).await?
    else {
        let labels = vec![Period::AllSelectedYears.to_string()];
        let title = format!("Drill-down periods for {}", constants::NONE_LABEL);
        return renderer.list(&title, &labels);
    };

    let options = match &years {
        Some(years) => {
            let summary = queries::agent_revenue_by_period(source, &agent, years).await?;
            filter::period_options(summary.rows().iter().map(|r| r.year_and_quarter.as_str()))
        }
        None => filter::period_options([]),
    };

    let labels: Vec<String> = options.iter().map(Period::to_string).collect();
    renderer.list(&format!("Drill-down periods for {}", agent), &labels)
}

/// Validate the agent and years, or None when the table has no agents or no years
async fn resolve_selection(
    source: &mut BookingSource,
    config: &Config,
    selection: &Selection,
) -> Result<Option<Resolved>> {
    let agents = queries::distinct_agents(source).await?;
    let available = queries::distinct_years(source).await?;
    if agents.is_empty() || available.is_empty() {
        tracing::info!(
            agents = agents.len(),
            years = available.len(),
            "no bookings to select from"
        );
        return Ok(None);
    }

    let agent = filter::resolve_agent(
        selection.agent.as_deref(),
        &agents,
        config.default_agent.as_deref(),
    )?;
    let years = filter::resolve_years(&selection.years, &available, config.default_year)?;
    tracing::debug!(%agent, years = %years_label(years.as_ref()), "resolved selection");

    Ok(Some(Resolved { agent, years }))
}

fn years_label(years: Option<&YearSet>) -> String {
    years
        .map(YearSet::to_string)
        .unwrap_or_else(|| constants::NONE_LABEL.to_string())
}
