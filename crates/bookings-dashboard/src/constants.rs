//! Centralized constants for the bookings dashboard
//!
//! Installation-specific values (database path, default selections) are loaded
//! from dashboard.toml; these are the fallbacks and fixed labels.

// =============================================================================
// File Names
// =============================================================================

/// Default config file path
pub const CONFIG_FILENAME: &str = "dashboard.toml";

/// Default bookings database file
pub const DATABASE_FILENAME: &str = "bookings_final.db";

// =============================================================================
// Bookings Table
// =============================================================================

/// Default table holding one row per booking
pub const BOOKINGS_TABLE: &str = "bookings_final";

/// Year preselected in the year filter when present in the data
pub const DEFAULT_YEAR: i64 = 2024;

// =============================================================================
// Display Labels
// =============================================================================

/// Drill-down option covering every selected year
pub const ALL_SELECTED_YEARS_LABEL: &str = "All Selected Year(s)";

/// Period label of the synthetic total row
pub const TOTAL_LABEL: &str = "Total";

/// Stands in for an agent or year selection when there is nothing to select
pub const NONE_LABEL: &str = "none";

/// Placeholder for fields that have no value on synthetic rows
pub const PLACEHOLDER: &str = "—";

/// Empty-state message when the year selection is empty
pub const NO_YEARS_MESSAGE: &str = "No years selected.";

/// Empty-state message when a query matched nothing
pub const NO_DATA_MESSAGE: &str = "No data for the current selection.";

/// Widest bar drawn by the text bar chart
pub const CHART_WIDTH: usize = 40;
