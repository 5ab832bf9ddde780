//! Selection validation: agent, years and drill-down period
//!
//! Raw selections are checked against the distinct values present in the
//! bookings table before any agent-level query is built. An empty year
//! selection is a valid state (nothing to show), not an error.

use std::fmt;

use crate::constants;
use crate::error::FilterError;

/// Ascending, de-duplicated, non-empty set of years
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSet(Vec<i64>);

impl YearSet {
    /// Returns None for an empty selection
    pub fn new(years: impl IntoIterator<Item = i64>) -> Option<Self> {
        let mut years: Vec<i64> = years.into_iter().collect();
        years.sort_unstable();
        years.dedup();
        if years.is_empty() {
            None
        } else {
            Some(Self(years))
        }
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for YearSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let years: Vec<String> = self.0.iter().map(i64::to_string).collect();
        write!(f, "{}", years.join(", "))
    }
}

/// How the user asked for years
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum YearsRequest {
    /// Nothing chosen yet; apply the default-year policy
    #[default]
    Default,
    /// Exactly these years (possibly none)
    Explicit(Vec<i64>),
}

/// Drill-down scope for the client breakdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Period {
    AllSelectedYears,
    Quarter(String),
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::AllSelectedYears => write!(f, "{}", constants::ALL_SELECTED_YEARS_LABEL),
            Period::Quarter(label) => write!(f, "{}", label),
        }
    }
}

/// Filter for the client breakdown query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientScope {
    Years(YearSet),
    Quarter(String),
}

/// Validated selections for one render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    agent: String,
    years: Option<YearSet>,
    period: Period,
}

impl FilterState {
    pub fn new(agent: String, years: Option<YearSet>, period: Period) -> Self {
        Self {
            agent,
            years,
            period,
        }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    /// Scope for the client breakdown, None when there is nothing to query
    pub fn client_scope(&self) -> Option<ClientScope> {
        match &self.period {
            Period::AllSelectedYears => self.years.clone().map(ClientScope::Years),
            Period::Quarter(label) => Some(ClientScope::Quarter(label.clone())),
        }
    }
}

/// Pick the agent: the requested one, else the configured default, else the first
pub fn resolve_agent(
    requested: Option<&str>,
    agents: &[String],
    default_agent: Option<&str>,
) -> Result<String, FilterError> {
    let Some(first) = agents.first() else {
        return Err(FilterError::NoAgents);
    };

    if let Some(requested) = requested {
        let requested = requested.trim();
        return agents
            .iter()
            .find(|a| a.as_str() == requested)
            .cloned()
            .ok_or_else(|| FilterError::UnknownAgent {
                requested: requested.to_string(),
                known: agents.to_vec(),
            });
    }

    let agent = default_agent
        .and_then(|d| agents.iter().find(|a| a.as_str() == d.trim()))
        .unwrap_or(first);
    Ok(agent.clone())
}

/// Resolve the year selection against the years present in the data
///
/// Default policy: the configured default year when present, otherwise the
/// most recent year.
pub fn resolve_years(
    request: &YearsRequest,
    available: &[i64],
    default_year: i64,
) -> Result<Option<YearSet>, FilterError> {
    match request {
        YearsRequest::Default => {
            let year = if available.contains(&default_year) {
                Some(default_year)
            } else {
                available.iter().copied().max()
            };
            Ok(year.and_then(|y| YearSet::new([y])))
        }
        YearsRequest::Explicit(years) => {
            if let Some(unknown) = years.iter().copied().find(|y| !available.contains(y)) {
                return Err(FilterError::UnknownYear(unknown));
            }
            let selection = YearSet::new(years.iter().copied());
            if selection.is_none() {
                tracing::info!("empty year selection, agent sections will be empty");
            }
            Ok(selection)
        }
    }
}

/// Drill-down options: the sentinel, then each period label in result order
pub fn period_options<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<Period> {
    let mut options = vec![Period::AllSelectedYears];
    for label in labels {
        let period = Period::Quarter(label.to_string());
        if !options.contains(&period) {
            options.push(period);
        }
    }
    options
}

/// Match a requested period label against the available options
pub fn resolve_period(requested: Option<&str>, options: &[Period]) -> Result<Period, FilterError> {
    let Some(requested) = requested.map(str::trim) else {
        return Ok(Period::AllSelectedYears);
    };

    if requested == constants::ALL_SELECTED_YEARS_LABEL {
        return Ok(Period::AllSelectedYears);
    }

    options
        .iter()
        .find(|p| matches!(p, Period::Quarter(label) if label == requested))
        .cloned()
        .ok_or_else(|| FilterError::UnknownPeriod {
            requested: requested.to_string(),
            options: options.iter().map(Period::to_string).collect(),
        })
}
