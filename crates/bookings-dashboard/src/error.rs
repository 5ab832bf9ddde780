//! Typed errors for the data source and filter validation

use std::path::PathBuf;
use thiserror::Error;

/// Fatal data-source failures; these abort the render pass
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("bookings database unavailable at {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("table '{table}' not found in {path}")]
    TableMissing { table: String, path: PathBuf },
}

/// Selections that do not match the data; detected before any dependent query runs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("no agents found in the bookings table")]
    NoAgents,

    #[error("unknown agent '{requested}' (known agents: {})", .known.join(", "))]
    UnknownAgent { requested: String, known: Vec<String> },

    #[error("year {0} has no bookings")]
    UnknownYear(i64),

    #[error("unknown period '{requested}' (options: {})", .options.join(", "))]
    UnknownPeriod {
        requested: String,
        options: Vec<String>,
    },
}
