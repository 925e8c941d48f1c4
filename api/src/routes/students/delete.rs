use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::state::AppState;
use db::models::activity_log;
use db::models::student::{self, Model as Student};
use sea_orm::EntityTrait;

use crate::auth::claims::AuthUser;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;

/// DELETE /api/students/{id}
///
/// Remove a student. Attendance records referencing the student are removed
/// by the foreign key cascade.
///
/// ### Responses
///
/// - `200 OK`: `"Student deleted successfully"`
/// - `404 Not Found`: `"student not found"`
/// - `500 Internal Server Error`
pub async fn delete_student(
    State(app_state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let student = match student::Entity::find_by_id(id).one(app_state.db()).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("student not found")),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Database error: {e}"))),
            );
        }
    };

    match Student::delete(app_state.db(), id).await {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Empty>::error("student not found")),
        ),
        Ok(_) => {
            activity_log::Model::record(
                app_state.db(),
                claims.sub,
                &format!("Deleted student {}", student.full_name),
            )
            .await;

            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    Empty::default(),
                    "Student deleted successfully",
                )),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Empty>::error(format!("Database error: {e}"))),
        ),
    }
}
