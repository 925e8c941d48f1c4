use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use common::state::AppState;
use db::models::activity_log;

use crate::response::ApiResponse;
use crate::services::ServiceError;

const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 50;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub user_name: String,
    pub action: String,
    pub created_at: String,
}

/// GET /api/activity
///
/// Recent audit entries for the dashboard feed, newest first.
///
/// ### Query Parameters
/// - `limit` (optional): number of entries, default 10, capped at 50
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": [
///     {
///       "id": 42,
///       "user_name": "Ibu Ani",
///       "action": "Imported 32 students",
///       "created_at": "2025-03-01T07:12:00Z"
///     }
///   ],
///   "message": "Activity retrieved successfully"
/// }
/// ```
pub async fn get_activity(
    State(app_state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let feed = activity_log::Model::latest(app_state.db(), limit).await?;
    let entries: Vec<ActivityEntry> = feed
        .into_iter()
        .map(|(entry, actor)| ActivityEntry {
            id: entry.id,
            user_name: actor
                .map(|u| u.full_name)
                .unwrap_or_else(|| "Unknown user".to_owned()),
            action: entry.action,
            created_at: entry.created_at.to_rfc3339(),
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            entries,
            "Activity retrieved successfully",
        )),
    ))
}
