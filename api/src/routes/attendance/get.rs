use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use common::state::AppState;

use crate::response::ApiResponse;
use crate::routes::common::parse_iso_date;
use crate::services::ServiceError;
use crate::services::reports::{self, SessionSheet};

#[derive(Debug, Deserialize)]
pub struct SheetQuery {
    pub class_label: Option<String>,
    pub date: Option<String>,
    pub period: Option<i32>,
}

/// GET /api/attendance/sheet
///
/// Roster sheet for one class session. Every roster member appears exactly
/// once; students without a stored event for the session default to `Hadir`
/// so the client renders a pre-filled register.
///
/// ### Query Parameters
/// - `class_label` (required): composite label such as `10-A`
/// - `date` (required): `YYYY-MM-DD`
/// - `period` (required): lesson period, 1-based
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "class_label": "10-A",
///     "date": "2025-03-01",
///     "period": 2,
///     "entries": [
///       { "student_id": 7, "full_name": "Budi Santoso", "nisn": "0051234567", "status": "Hadir" }
///     ]
///   },
///   "message": "Attendance sheet retrieved successfully"
/// }
/// ```
///
/// - `422 Unprocessable Entity`: missing parameters, a malformed date, or
///   an unrecognized class label
/// - `500 Internal Server Error`
pub async fn get_sheet(
    State(app_state): State<AppState>,
    Query(query): Query<SheetQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let class_label = query
        .class_label
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation("class_label is required".to_owned()))?;

    let raw_date = query
        .date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation("date is required".to_owned()))?;
    let date = parse_iso_date(raw_date, "date")?;

    let period = query
        .period
        .ok_or_else(|| ServiceError::Validation("period is required".to_owned()))?;
    if period < 1 {
        return Err(ServiceError::Validation(
            "period must be at least 1".to_owned(),
        ));
    }

    let sheet = reports::session_sheet(app_state.db(), class_label, date, period).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::<SessionSheet>::success(
            sheet,
            "Attendance sheet retrieved successfully",
        )),
    ))
}
