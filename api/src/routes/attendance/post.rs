use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::TransactionTrait;
use serde::Deserialize;
use validator::Validate;

use common::state::AppState;
use db::models::activity_log;
use db::models::attendance_record::{Model as AttendanceRecord, SheetEntry};

use crate::auth::claims::AuthUser;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::routes::common::parse_iso_date;
use crate::services::ServiceError;

#[derive(Debug, Deserialize, Validate)]
pub struct SaveAttendanceRequest {
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,

    #[validate(range(min = 1, message = "period must be at least 1"))]
    pub period: i32,

    #[validate(length(min = 1, message = "entries must not be empty"))]
    pub entries: Vec<SheetEntry>,
}

/// POST /api/attendance
///
/// Persist a filled-in attendance sheet. Every entry is upserted on the
/// `(student_id, date, period)` key inside one transaction, so re-saving a
/// session overwrites earlier statuses instead of duplicating rows.
///
/// ### Request Body
/// ```json
/// {
///   "date": "2025-03-01",
///   "period": 2,
///   "entries": [
///     { "student_id": 7, "status": "Hadir" },
///     { "student_id": 8, "status": "Sakit" }
///   ]
/// }
/// ```
///
/// ### Responses
///
/// - `200 OK`: `"Attendance saved successfully"`
/// - `422 Unprocessable Entity`: malformed date, period below 1, or an
///   unknown status spelling
/// - `500 Internal Server Error`: nothing was stored
pub async fn save_attendance(
    State(app_state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<SaveAttendanceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()
        .map_err(|e| ServiceError::Validation(common::format_validation_errors(&e)))?;

    let date = parse_iso_date(&req.date, "date")?;

    let txn = app_state.db().begin().await?;
    AttendanceRecord::save_sheet(&txn, date, req.period, claims.sub, &req.entries).await?;
    txn.commit().await?;

    activity_log::Model::record(
        app_state.db(),
        claims.sub,
        &format!(
            "Recorded attendance for {} students on {} period {}",
            req.entries.len(),
            date,
            req.period
        ),
    )
    .await;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            Empty::default(),
            "Attendance saved successfully",
        )),
    ))
}
