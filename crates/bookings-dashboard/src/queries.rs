//! Aggregate queries over the bookings table
//!
//! Each query has a pure builder (SQL text + ordered parameters) and an async
//! runner that executes it through `BookingSource`. Agent names are compared
//! after `TRIM`, since the stored names carry inconsistent padding.
//! `TOTAL()` is used instead of `SUM()` because it always yields a REAL.

use anyhow::Result;
use serde::Serialize;
use sqlx::FromRow;

use crate::filter::{ClientScope, YearSet};
use crate::source::{AggregateQuery, BookingSource, MembershipClause, QueryParam};
use crate::summary::PeriodSummary;

/// Firmwide revenue for one year
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct YearRevenue {
    pub year: i64,
    pub revenue: f64,
}

/// Firmwide revenue for one year+quarter label
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QuarterRevenue {
    pub year_and_quarter: String,
    pub revenue: f64,
}

/// One agent's revenue for one year+quarter
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PeriodRevenue {
    pub year_and_quarter: String,
    pub year: i64,
    pub revenue: f64,
}

/// One agent's revenue from one client
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientRevenue {
    pub client_name: String,
    pub revenue: f64,
}

// =============================================================================
// Query builders
// =============================================================================

pub fn distinct_agents_query(table: &str) -> AggregateQuery {
    AggregateQuery::new(
        "distinct_agents",
        format!(
            "SELECT DISTINCT TRIM(AgentName) AS agent_name
             FROM {table}
             WHERE AgentName IS NOT NULL AND TRIM(AgentName) <> ''
             ORDER BY agent_name"
        ),
    )
}

pub fn distinct_years_query(table: &str) -> AggregateQuery {
    AggregateQuery::new(
        "distinct_years",
        format!(
            "SELECT DISTINCT Year AS year
             FROM {table}
             WHERE Year IS NOT NULL
             ORDER BY year"
        ),
    )
}

pub fn yearly_revenue_query(table: &str) -> AggregateQuery {
    AggregateQuery::new(
        "yearly_revenue",
        format!(
            "SELECT Year AS year, TOTAL(GrossCommission) AS revenue
             FROM {table}
             GROUP BY Year
             ORDER BY Year"
        ),
    )
}

pub fn quarterly_revenue_query(table: &str) -> AggregateQuery {
    AggregateQuery::new(
        "quarterly_revenue",
        format!(
            "SELECT YearAndQuarter AS year_and_quarter, TOTAL(GrossCommission) AS revenue
             FROM {table}
             GROUP BY YearAndQuarter
             ORDER BY YearAndQuarter"
        ),
    )
}

pub fn agent_revenue_by_period_query(table: &str, agent: &str, years: &YearSet) -> AggregateQuery {
    let membership = MembershipClause::years("Year", years);
    AggregateQuery::new(
        "agent_revenue_by_period",
        format!(
            "SELECT YearAndQuarter AS year_and_quarter, Year AS year,
                    TOTAL(GrossCommission) AS revenue
             FROM {table}
             WHERE TRIM(AgentName) = ? AND {}
             GROUP BY YearAndQuarter, Year
             ORDER BY Year, YearAndQuarter",
            membership.sql
        ),
    )
    .bind(QueryParam::Text(agent.trim().to_string()))
    .bind_all(membership.params)
}

pub fn client_breakdown_query(table: &str, agent: &str, scope: &ClientScope) -> AggregateQuery {
    let (condition, params) = match scope {
        ClientScope::Years(years) => {
            let membership = MembershipClause::years("Year", years);
            (membership.sql, membership.params)
        }
        ClientScope::Quarter(label) => (
            "YearAndQuarter = ?".to_string(),
            vec![QueryParam::Text(label.clone())],
        ),
    };

    AggregateQuery::new(
        "client_breakdown",
        format!(
            "SELECT ClientName AS client_name, TOTAL(GrossCommission) AS revenue
             FROM {table}
             WHERE TRIM(AgentName) = ? AND {condition}
             GROUP BY ClientName
             ORDER BY revenue DESC, client_name ASC"
        ),
    )
    .bind(QueryParam::Text(agent.trim().to_string()))
    .bind_all(params)
}

// =============================================================================
// Runners
// =============================================================================

/// Distinct trimmed agent names, ascending
pub async fn distinct_agents(source: &mut BookingSource) -> Result<Vec<String>> {
    let query = distinct_agents_query(source.table());
    let rows: Vec<(String,)> = source.run_aggregate_query(&query).await?;
    Ok(rows.into_iter().map(|(agent,)| agent).collect())
}

/// Distinct years, ascending
pub async fn distinct_years(source: &mut BookingSource) -> Result<Vec<i64>> {
    let query = distinct_years_query(source.table());
    let rows: Vec<(i64,)> = source.run_aggregate_query(&query).await?;
    Ok(rows.into_iter().map(|(year,)| year).collect())
}

/// Firmwide revenue by year, ascending
pub async fn yearly_revenue(source: &mut BookingSource) -> Result<Vec<YearRevenue>> {
    let query = yearly_revenue_query(source.table());
    source.run_aggregate_query(&query).await
}

/// Firmwide revenue by year+quarter label, ascending
pub async fn quarterly_revenue(source: &mut BookingSource) -> Result<Vec<QuarterRevenue>> {
    let query = quarterly_revenue_query(source.table());
    source.run_aggregate_query(&query).await
}

/// One agent's revenue per period for the selected years, with its total
pub async fn agent_revenue_by_period(
    source: &mut BookingSource,
    agent: &str,
    years: &YearSet,
) -> Result<PeriodSummary> {
    let query = agent_revenue_by_period_query(source.table(), agent, years);
    let rows = source.run_aggregate_query(&query).await?;
    Ok(PeriodSummary::new(rows))
}

/// One agent's revenue per client, highest first
pub async fn client_breakdown(
    source: &mut BookingSource,
    agent: &str,
    scope: &ClientScope,
) -> Result<Vec<ClientRevenue>> {
    let query = client_breakdown_query(source.table(), agent, scope);
    source.run_aggregate_query(&query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{total_revenue, RowKind};
    use crate::test_support::{jane_records, seeded_database};

    fn years(years: &[i64]) -> YearSet {
        YearSet::new(years.iter().copied()).unwrap()
    }

    fn mixed_records() -> Vec<(&'static str, &'static str, i64, &'static str, f64)> {
        vec![
            (" Jane Doe ", "Acme", 2023, "2023-Q4", 40.0),
            ("Jane Doe", "Acme", 2024, "2024-Q1", 100.0),
            ("Jane Doe  ", "Beta", 2024, "2024-Q1", 25.5),
            ("Jane Doe", "Cobalt", 2024, "2024-Q3", 60.0),
            ("Jane Doe", "Beta", 2024, "2024-Q3", 74.5),
            ("Alex Kim", "Acme", 2024, "2024-Q2", 300.0),
            ("Alex Kim", "Delta", 2025, "2025-Q1", 12.25),
        ]
    }

    #[test]
    fn test_agent_query_binds_agent_then_years() {
        let query =
            agent_revenue_by_period_query("bookings_final", " Jane ", &years(&[2024, 2023]));

        assert!(query.sql.contains("TRIM(AgentName) = ? AND Year IN (?, ?)"));
        assert!(query.sql.contains("ORDER BY Year, YearAndQuarter"));
        assert_eq!(
            query.params,
            vec![
                QueryParam::Text("Jane".to_string()),
                QueryParam::Integer(2023),
                QueryParam::Integer(2024),
            ]
        );
    }

    #[test]
    fn test_client_query_for_quarter() {
        let scope = ClientScope::Quarter("2024-Q1".to_string());
        let query = client_breakdown_query("bookings_final", "Jane", &scope);

        assert!(query.sql.contains("YearAndQuarter = ?"));
        assert!(query.sql.contains("ORDER BY revenue DESC, client_name ASC"));
        assert_eq!(
            query.params,
            vec![
                QueryParam::Text("Jane".to_string()),
                QueryParam::Text("2024-Q1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_jane_scenario() {
        let (_dir, config) = seeded_database(&jane_records()).await;
        let mut source = BookingSource::open(&config).await.unwrap();

        let summary = agent_revenue_by_period(&mut source, "Jane", &years(&[2024]))
            .await
            .unwrap();
        let rows: Vec<(String, String, f64)> = summary
            .summary_rows()
            .into_iter()
            .map(|r| (r.year_and_quarter, r.year, r.revenue))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("2024-Q1".to_string(), "2024".to_string(), 125.0),
                ("2024-Q2".to_string(), "2024".to_string(), 50.0),
                ("Total".to_string(), "—".to_string(), 175.0),
            ]
        );

        let clients = client_breakdown(
            &mut source,
            "Jane",
            &ClientScope::Quarter("2024-Q1".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(
            clients,
            vec![
                ClientRevenue {
                    client_name: "Acme".to_string(),
                    revenue: 100.0
                },
                ClientRevenue {
                    client_name: "Beta".to_string(),
                    revenue: 25.0
                },
            ]
        );

        source.close().await;
    }

    #[tokio::test]
    async fn test_firmwide_totals_match_record_sum() {
        let records = mixed_records();
        let (_dir, config) = seeded_database(&records).await;
        let mut source = BookingSource::open(&config).await.unwrap();

        let expected: f64 = records.iter().map(|r| r.4).sum();
        let yearly = yearly_revenue(&mut source).await.unwrap();
        let quarterly = quarterly_revenue(&mut source).await.unwrap();

        assert!((total_revenue(&yearly) - expected).abs() < 1e-9);
        assert!((total_revenue(&quarterly) - expected).abs() < 1e-9);
        assert_eq!(
            yearly.iter().map(|r| r.year).collect::<Vec<_>>(),
            vec![2023, 2024, 2025]
        );
        assert_eq!(
            quarterly
                .iter()
                .map(|r| r.year_and_quarter.as_str())
                .collect::<Vec<_>>(),
            vec!["2023-Q4", "2024-Q1", "2024-Q2", "2024-Q3", "2025-Q1"]
        );

        source.close().await;
    }

    #[tokio::test]
    async fn test_distinct_lookups_trim_and_sort() {
        let (_dir, config) = seeded_database(&mixed_records()).await;
        let mut source = BookingSource::open(&config).await.unwrap();

        assert_eq!(
            distinct_agents(&mut source).await.unwrap(),
            vec!["Alex Kim".to_string(), "Jane Doe".to_string()]
        );
        assert_eq!(
            distinct_years(&mut source).await.unwrap(),
            vec![2023, 2024, 2025]
        );

        source.close().await;
    }

    #[tokio::test]
    async fn test_padded_agent_names_are_included() {
        let (_dir, config) = seeded_database(&mixed_records()).await;
        let mut source = BookingSource::open(&config).await.unwrap();

        let summary = agent_revenue_by_period(&mut source, "Jane Doe", &years(&[2023, 2024]))
            .await
            .unwrap();
        let periods: Vec<&str> = summary
            .rows()
            .iter()
            .map(|r| r.year_and_quarter.as_str())
            .collect();
        assert_eq!(periods, vec!["2023-Q4", "2024-Q1", "2024-Q3"]);
        assert!((summary.total() - 300.0).abs() < 1e-9);

        let rows = summary.summary_rows();
        assert_eq!(rows.last().map(|r| r.kind), Some(RowKind::Total));
        assert_eq!(rows.iter().filter(|r| r.kind == RowKind::Total).count(), 1);

        source.close().await;
    }

    #[tokio::test]
    async fn test_client_breakdown_orders_by_revenue_then_name() {
        let records = vec![
            ("Jane", "Zeta", 2024, "2024-Q1", 50.0),
            ("Jane", "Acme", 2024, "2024-Q2", 50.0),
            ("Jane", "Beta", 2024, "2024-Q1", 80.0),
            ("Jane", "Acme", 2023, "2023-Q4", 500.0),
        ];
        let (_dir, config) = seeded_database(&records).await;
        let mut source = BookingSource::open(&config).await.unwrap();

        let scope = ClientScope::Years(years(&[2024]));
        let first = client_breakdown(&mut source, "Jane", &scope).await.unwrap();
        let names: Vec<&str> = first.iter().map(|r| r.client_name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Acme", "Zeta"]);
        assert!((total_revenue(&first) - 180.0).abs() < 1e-9);

        // Same input, same output
        let second = client_breakdown(&mut source, "Jane", &scope).await.unwrap();
        assert_eq!(first, second);

        source.close().await;
    }

    #[tokio::test]
    async fn test_client_breakdown_matches_filtered_subset() {
        let records = mixed_records();
        let (_dir, config) = seeded_database(&records).await;
        let mut source = BookingSource::open(&config).await.unwrap();

        let expected: f64 = records
            .iter()
            .filter(|r| r.0.trim() == "Jane Doe" && r.3 == "2024-Q3")
            .map(|r| r.4)
            .sum();
        let clients = client_breakdown(
            &mut source,
            "Jane Doe",
            &ClientScope::Quarter("2024-Q3".to_string()),
        )
        .await
        .unwrap();
        assert!((total_revenue(&clients) - expected).abs() < 1e-9);

        source.close().await;
    }

    #[tokio::test]
    async fn test_no_matching_rows() {
        let (_dir, config) = seeded_database(&mixed_records()).await;
        let mut source = BookingSource::open(&config).await.unwrap();

        let summary = agent_revenue_by_period(&mut source, "Alex Kim", &years(&[2023]))
            .await
            .unwrap();
        assert!(summary.is_empty());

        let clients = client_breakdown(
            &mut source,
            "Alex Kim",
            &ClientScope::Quarter("2023-Q4".to_string()),
        )
        .await
        .unwrap();
        assert!(clients.is_empty());

        source.close().await;
    }
}
