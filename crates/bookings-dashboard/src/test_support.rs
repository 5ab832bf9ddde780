//! Temporary bookings databases for tests

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection};
use tempfile::TempDir;

use crate::config::DatabaseConfig;

/// (AgentName, ClientName, Year, YearAndQuarter, GrossCommission)
pub type Booking = (&'static str, &'static str, i64, &'static str, f64);

/// Three bookings for Jane in 2024, one with a padded agent name
pub fn jane_records() -> Vec<Booking> {
    vec![
        ("Jane", "Acme", 2024, "2024-Q1", 100.0),
        (" Jane ", "Acme", 2024, "2024-Q2", 50.0),
        ("Jane", "Beta", 2024, "2024-Q1", 25.0),
    ]
}

/// Create a bookings_final table in a fresh database file
///
/// The TempDir must be kept alive for as long as the database is used.
pub async fn seeded_database(records: &[Booking]) -> (TempDir, DatabaseConfig) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookings_final.db");

    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .connect()
        .await
        .unwrap();

    sqlx::query(
        "CREATE TABLE bookings_final (
            AgentName TEXT,
            ClientName TEXT,
            Year INTEGER,
            YearAndQuarter TEXT,
            GrossCommission REAL
        )",
    )
    .execute(&mut conn)
    .await
    .unwrap();

    for (agent, client, year, period, amount) in records {
        sqlx::query("INSERT INTO bookings_final VALUES (?, ?, ?, ?, ?)")
            .bind(*agent)
            .bind(*client)
            .bind(*year)
            .bind(*period)
            .bind(*amount)
            .execute(&mut conn)
            .await
            .unwrap();
    }

    conn.close().await.unwrap();

    let config = DatabaseConfig {
        path,
        table: "bookings_final".to_string(),
    };
    (dir, config)
}
