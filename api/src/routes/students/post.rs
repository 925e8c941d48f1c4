use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use common::format_validation_errors;
use common::state::AppState;
use db::models::activity_log;
use db::models::student::{Gender, Model as Student, NewStudent};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::StudentResponse;
use crate::services::ServiceError;
use crate::services::import::{self, RawStudentRow};

static NISN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4,20}$").unwrap());

/// Body shared by the create and update forms. The section letter is never
/// part of the payload; it is derived from the gender on every write.
#[derive(Debug, Deserialize, Validate)]
pub struct StudentPayload {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(range(min = 10, max = 12, message = "Grade must be 10, 11, or 12"))]
    pub grade: i32,

    pub gender: Gender,

    #[validate(regex(path = *NISN_REGEX, message = "NISN must be a 4-20 digit number"))]
    pub nisn: Option<String>,

    pub birth_date: Option<NaiveDate>,
}

impl StudentPayload {
    pub fn to_new_student(&self) -> NewStudent {
        NewStudent {
            full_name: self.full_name.trim().to_owned(),
            grade: self.grade,
            gender: self.gender,
            nisn: self.nisn.clone(),
            birth_date: self.birth_date,
        }
    }
}

/// Shared duplicate-NISN check; `exclude_id` skips the record being updated.
pub(super) async fn nisn_taken(
    app_state: &AppState,
    nisn: Option<&str>,
    exclude_id: Option<i64>,
) -> Result<bool, sea_orm::DbErr> {
    let Some(nisn) = nisn else {
        return Ok(false);
    };
    let existing = Student::find_by_nisn(app_state.db(), nisn).await?;
    Ok(existing.iter().any(|s| Some(s.id) != exclude_id))
}

/// POST /api/students
///
/// Create a single student.
///
/// ### Request Body
/// ```json
/// {
///   "full_name": "Budi Santoso",
///   "grade": 10,
///   "gender": "L",
///   "nisn": "0051234567",
///   "birth_date": "2008-05-01"
/// }
/// ```
///
/// ### Responses
///
/// - `201 Created`: the stored student, section derived from gender
/// - `422 Unprocessable Entity`: validation failure
/// - `409 Conflict`: `"A student with this NISN already exists"`
/// - `500 Internal Server Error`
pub async fn create_student(
    State(app_state): State<AppState>,
    AuthUser(claims): AuthUser,
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

    match nisn_taken(&app_state, payload.nisn.as_deref(), None).await {
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

    match Student::create(app_state.db(), payload.to_new_student()).await {
        Ok(student) => {
            activity_log::Model::record(
                app_state.db(),
                claims.sub,
                &format!("Added student {}", student.full_name),
            )
            .await;

            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    StudentResponse::from(student),
                    "Student created successfully",
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

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub rows: Vec<RawStudentRow>,
}

/// POST /api/students/import
///
/// Bulk import of decoded spreadsheet rows. Every row is validated
/// independently; valid rows are persisted all-or-nothing.
///
/// ### Request Body
/// ```json
/// {
///   "rows": [
///     { "NAMA_LENGKAP": "Budi", "KELAS": 10, "JENIS_KELAMIN": "L", "TANGGAL_LAHIR": 45658 },
///     { "NAMA_LENGKAP": "Siti", "KELAS": 13, "JENIS_KELAMIN": "P", "TANGGAL_LAHIR": "2008-03-02" }
///   ]
/// }
/// ```
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "success_count": 1,
///     "error_count": 1,
///     "errors": ["row 2: grade must be 10, 11, or 12"]
///   },
///   "message": "Import finished: 1 created, 1 rejected"
/// }
/// ```
///
/// - `500 Internal Server Error`: the bulk insert failed; nothing was stored
pub async fn import_students(
    State(app_state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<ImportRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = import::import_students(app_state.db(), claims.sub, req.rows).await?;

    let message = format!(
        "Import finished: {} created, {} rejected",
        summary.success_count, summary.error_count
    );

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(summary, message)),
    ))
}
