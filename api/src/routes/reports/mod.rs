//! Reporting routes.
//!
//! Date-range recaps, raw record listings, and the export surfaces the
//! spreadsheet/PDF renderers consume. All routes here sit behind the
//! teacher guard.

use axum::{Router, routing::get};
use common::state::AppState;

pub mod get;

use get::{export_csv, export_table, get_records, get_summary};

/// Builds the `/reports` routes.
///
/// Routes:
/// - `GET /summary`    → per-student recap over a date range
/// - `GET /records`    → raw attendance events over a date range
/// - `GET /export`     → renderer-ready `{title, headers, rows}` table
/// - `GET /export.csv` → the same table as a CSV attachment
pub fn reports_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/records", get(get_records))
        .route("/export", get(export_table))
        .route("/export.csv", get(export_csv))
}
