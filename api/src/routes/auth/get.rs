use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use common::state::AppState;
use sea_orm::EntityTrait;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::UserResponse;

/// GET /auth/me
///
/// Return the account behind the presented bearer token.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 1,
///     "full_name": "Ibu Ratna",
///     "email": "ratna@example.com",
///     "role": "teacher",
///     "email_verified": true,
///     "created_at": "2025-05-23T11:00:00+00:00"
///   },
///   "message": "User retrieved successfully"
/// }
/// ```
///
/// - `401 Unauthorized`: missing or invalid token
/// - `404 Not Found`: the account was deleted after the token was issued
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> impl IntoResponse {
    let db = app_state.db();

    match db::models::user::Entity::find_by_id(claims.sub).one(db).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                UserResponse::from(user),
                "User retrieved successfully",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<UserResponse>::error("Account no longer exists")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<UserResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}
