//! Read-only access to the bookings table
//!
//! One connection is opened per render pass and closed when the pass ends.
//! Every aggregate goes through `run_aggregate_query`, which binds the
//! query's parameters in order and decodes rows into a `FromRow` type.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Connection, FromRow};

use crate::config::DatabaseConfig;
use crate::error::DashboardError;
use crate::filter::YearSet;

/// A positional query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    Integer(i64),
}

/// SQL template plus the parameters for its `?` placeholders, in order
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateQuery {
    /// Short name used in logs and error context
    pub name: &'static str,
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl AggregateQuery {
    pub fn new(name: &'static str, sql: String) -> Self {
        Self {
            name,
            sql,
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, param: QueryParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn bind_all(mut self, params: impl IntoIterator<Item = QueryParam>) -> Self {
        self.params.extend(params);
        self
    }
}

/// `column IN (?, ...)` with one placeholder per member
///
/// Only constructible from a `YearSet`, which is never empty, so the clause
/// always has at least one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipClause {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl MembershipClause {
    pub fn years(column: &str, years: &YearSet) -> Self {
        let placeholders = vec!["?"; years.as_slice().len()].join(", ");
        Self {
            sql: format!("{column} IN ({placeholders})"),
            params: years.iter().map(QueryParam::Integer).collect(),
        }
    }
}

/// Connection to the bookings database for one render pass
pub struct BookingSource {
    conn: SqliteConnection,
    table: String,
}

impl BookingSource {
    /// Open the database read-only and check that the bookings table exists
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DashboardError> {
        let unavailable = |source| DashboardError::SourceUnavailable {
            path: config.path.clone(),
            source,
        };

        let mut conn = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(false)
            .read_only(true)
            .connect()
            .await
            .map_err(unavailable)?;

        let found: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?",
        )
        .bind(config.table.as_str())
        .fetch_one(&mut conn)
        .await
        .map_err(unavailable)?;

        if found == 0 {
            if let Err(e) = conn.close().await {
                tracing::warn!("Failed to close bookings database cleanly: {}", e);
            }
            return Err(DashboardError::TableMissing {
                table: config.table.clone(),
                path: config.path.clone(),
            });
        }

        tracing::info!(
            path = %config.path.display(),
            table = %config.table,
            "opened bookings database"
        );

        Ok(Self {
            conn,
            table: config.table.clone(),
        })
    }

    /// Bookings table name, already validated as a plain identifier
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Run a parameterized aggregate query; zero rows is an empty Vec
    pub async fn run_aggregate_query<T>(&mut self, query: &AggregateQuery) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut prepared = sqlx::query_as::<_, T>(&query.sql);
        for param in &query.params {
            prepared = match param {
                QueryParam::Text(value) => prepared.bind(value.as_str()),
                QueryParam::Integer(value) => prepared.bind(*value),
            };
        }

        let rows = prepared
            .fetch_all(&mut self.conn)
            .await
            .with_context(|| format!("Query '{}' failed", query.name))?;

        tracing::debug!(
            query = query.name,
            params = query.params.len(),
            rows = rows.len(),
            "ran aggregate query"
        );

        Ok(rows)
    }

    /// Release the connection
    pub async fn close(self) {
        match self.conn.close().await {
            Ok(()) => tracing::info!("closed bookings database"),
            Err(e) => tracing::warn!("Failed to close bookings database cleanly: {}", e),
        }
    }
}
