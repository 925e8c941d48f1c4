//! # students Routes Module
//!
//! Roster management for the `/students` endpoint group. Every route here is
//! teacher-only; the guard is applied where the group is nested.
//!
//! ## Structure
//! - `get.rs`: paginated roster list, distinct class labels
//! - `post.rs`: single create, bulk spreadsheet import
//! - `put.rs`: update
//! - `delete.rs`: hard delete (attendance records follow via FK cascade)

pub mod delete;
pub mod get;
pub mod post;
pub mod put;

use axum::{
    Router,
    routing::{get, post, put},
};
use common::state::AppState;

use delete::delete_student;
use get::{get_classes, list_students};
use post::{create_student, import_students};
use put::update_student;

/// Builds the `/students` route group.
///
/// - `GET /students` → `list_students`
/// - `POST /students` → `create_student`
/// - `GET /students/classes` → `get_classes`
/// - `POST /students/import` → `import_students`
/// - `PUT /students/{id}` → `update_student`
/// - `DELETE /students/{id}` → `delete_student`
pub fn students_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/classes", get(get_classes))
        .route("/import", post(import_students))
        .route("/{id}", put(update_student).delete(delete_student))
}
