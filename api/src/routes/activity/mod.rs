//! Activity feed routes.

use axum::{Router, routing::get};
use common::state::AppState;

pub mod get;

use get::get_activity;

/// Builds the `/activity` routes.
///
/// Routes:
/// - `GET /` → the most recent audit entries, newest first
pub fn activity_routes() -> Router<AppState> {
    Router::new().route("/", get(get_activity))
}
