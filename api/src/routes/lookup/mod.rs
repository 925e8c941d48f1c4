//! Public attendance lookup for parents.
//!
//! The only unauthenticated data surface: given a NISN, or a full name with
//! an optional birth date, it returns one student's attendance bundle or
//! refuses without leaking which part of the query failed.

use axum::{Router, routing::get};
use common::state::AppState;

pub mod get;

use get::lookup_student;

/// Builds the `/lookup` routes.
///
/// Routes:
/// - `GET /` → resolve a student and return `{student, summary, records}`
pub fn lookup_routes() -> Router<AppState> {
    Router::new().route("/", get(lookup_student))
}
