//! Attendance routes.
//!
//! Exposes the per-session sheet used to take a register and the save
//! endpoint that persists a filled-in sheet. All routes here sit behind the
//! teacher guard.

use axum::{
    Router,
    routing::{get, post},
};
use common::state::AppState;

pub mod get;
pub mod post;

use get::get_sheet;
use post::save_attendance;

/// Builds the `/attendance` routes.
///
/// Routes:
/// - `GET /sheet` → fetch a roster sheet for one (class, date, period)
/// - `POST /`     → upsert a filled-in sheet
pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/sheet", get(get_sheet))
        .route("/", post(save_attendance))
}
