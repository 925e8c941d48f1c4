use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use common::state::AppState;

use crate::response::ApiResponse;
use crate::services::ServiceError;
use crate::services::reports::{self, DashboardStats};

/// GET /api/dashboard/stats
///
/// Headline counters for the landing page: roster size plus today's
/// attendance activity.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "total_students": 120,
///     "records_today": 96,
///     "present_today": 90,
///     "attendance_rate_today": 93.8
///   },
///   "message": "Dashboard stats retrieved successfully"
/// }
/// ```
pub async fn get_stats(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let stats = reports::dashboard_stats(app_state.db()).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::<DashboardStats>::success(
            stats,
            "Dashboard stats retrieved successfully",
        )),
    ))
}
