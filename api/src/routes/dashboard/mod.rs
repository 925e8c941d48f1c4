//! Dashboard routes.

use axum::{Router, routing::get};
use common::state::AppState;

pub mod get;

use get::get_stats;

/// Builds the `/dashboard` routes.
///
/// Routes:
/// - `GET /stats` → headline counters for the landing page
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}
