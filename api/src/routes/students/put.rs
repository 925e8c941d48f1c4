use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::format_validation_errors;
use common::state::AppState;
use db::models::activity_log;
use db::models::student::{self, Model as Student};
use sea_orm::EntityTrait;
use validator::Validate;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::StudentResponse;

use super::post::{StudentPayload, nisn_taken};

/// PUT /api/students/{id}
///
/// Replace every editable field of a student. The section letter is
/// re-derived from the submitted gender, so moving a student between
/// sections is done by changing the gender, never the section directly.
///
/// ### Request Body
/// ```json
/// {
///   "full_name": "Budi Santoso",
///   "grade": 11,
///   "gender": "L",
///   "nisn": "0051234567",
///   "birth_date": "2008-05-01"
/// }
/// ```
///
/// ### Responses
///
/// - `200 OK`: the updated student
/// - `404 Not Found`: `"student not found"`
/// - `409 Conflict`: the NISN belongs to another student
/// - `422 Unprocessable Entity`: validation failure
pub async fn update_student(
    State(app_state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<StudentPayload>,
) -> impl IntoResponse {
    if let Err(validation_errors) = payload.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<StudentResponse>::error(
                format_validation_errors(&validation_errors),
            )),
        );
    }

    match student::Entity::find_by_id(id).one(app_state.db()).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<StudentResponse>::error("student not found")),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<StudentResponse>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    }

    match nisn_taken(&app_state, payload.nisn.as_deref(), Some(id)).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<StudentResponse>::error(
                    "A student with this NISN already exists",
                )),
            );
        }
        Ok(false) => {}
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<StudentResponse>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    }

    match Student::update(app_state.db(), id, payload.to_new_student()).await {
        Ok(student) => {
            activity_log::Model::record(
                app_state.db(),
                claims.sub,
                &format!("Updated student {}", student.full_name),
            )
            .await;

            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    StudentResponse::from(student),
                    "Student updated successfully",
                )),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<StudentResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}
