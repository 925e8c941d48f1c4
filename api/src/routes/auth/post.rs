use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{Duration, Utc};
use common::format_validation_errors;
use common::state::AppState;
use db::models::auth_token::{Model as AuthToken, TokenKind};
use db::models::user::{Model as User, Role};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::generate_jwt;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::routes::common::UserResponse;
use crate::services::email::EmailService;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, message = "Full name must be at least 3 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// POST /auth/register
///
/// Register a new teacher account. The role is never caller-supplied; parent
/// profiles are provisioned separately and cannot sign in here.
///
/// ### Request Body
/// ```json
/// {
///   "full_name": "Ibu Ratna",
///   "email": "ratna@example.com",
///   "password": "strongpassword"
/// }
/// ```
///
/// ### Responses
///
/// - `201 Created`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 1,
///     "full_name": "Ibu Ratna",
///     "email": "ratna@example.com",
///     "role": "teacher",
///     "email_verified": false,
///     "created_at": "2025-05-23T11:00:00+00:00"
///   },
///   "message": "Registration successful. Check your inbox for the verification link."
/// }
/// ```
///
/// - `422 Unprocessable Entity` (validation failure)
/// - `409 Conflict` (duplicate email)
/// ```json
/// {
///   "success": false,
///   "message": "A user with this email already exists"
/// }
/// ```
/// - `500 Internal Server Error`
pub async fn register(
    State(app_state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<UserResponse>::error(
                format_validation_errors(&validation_errors),
            )),
        );
    }

    let db = app_state.db();

    match User::find_by_email(db, &req.email).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<UserResponse>::error(
                    "A user with this email already exists",
                )),
            );
        }
        Ok(None) => {}
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<UserResponse>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    }

    let user = match User::create(db, &req.full_name, &req.email, &req.password, Role::Teacher)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<UserResponse>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    };

    // Token issuance and delivery never fail the registration itself; the
    // user can always request a fresh link.
    match AuthToken::create(
        db,
        user.id,
        TokenKind::VerifyEmail,
        common::config::verification_token_expiry_minutes() as i64,
    )
    .await
    {
        Ok(token) => {
            if let Err(e) =
                EmailService::send_verification_email(&user.email, &user.full_name, &token.token)
                    .await
            {
                tracing::error!(error = %e, email = %user.email, "failed to send verification email");
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to issue verification token"),
    }

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(
            UserResponse::from(user),
            "Registration successful. Check your inbox for the verification link.",
        )),
    )
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Default)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

/// POST /auth/login
///
/// Authenticate a teacher and issue a JWT.
///
/// ### Request Body
/// ```json
/// {
///   "email": "ratna@example.com",
///   "password": "strongpassword"
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
///     "token": "jwt_token_here",
///     "expires_at": "2025-05-23T12:00:00+00:00",
///     "user": { "id": 1, "full_name": "Ibu Ratna", "role": "teacher" }
///   },
///   "message": "Login successful"
/// }
/// ```
///
/// - `401 Unauthorized`: `"Invalid email or password"` for both a missing
///   account and a wrong password
/// - `403 Forbidden`: unverified email, or a non-teacher role
/// - `500 Internal Server Error`
pub async fn login(
    State(app_state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<LoginResponse>::error(
                format_validation_errors(&validation_errors),
            )),
        );
    }

    let db = app_state.db();

    let user = match User::find_by_email(db, &req.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<LoginResponse>::error(
                    "Invalid email or password",
                )),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<LoginResponse>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    };

    // Password first, so a wrong guess learns nothing about account state.
    if !user.verify_password(&req.password) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<LoginResponse>::error(
                "Invalid email or password",
            )),
        );
    }

    if !user.email_verified {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<LoginResponse>::error(
                "Email not verified. Check your inbox for the verification link.",
            )),
        );
    }

    if user.role != Role::Teacher {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<LoginResponse>::error(
                "This account is not permitted to sign in here.",
            )),
        );
    }

    let (token, expires_at) = generate_jwt(user.id, user.role);
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            LoginResponse {
                token,
                expires_at,
                user: user.into(),
            },
            "Login successful",
        )),
    )
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// POST /auth/verify-email
///
/// Consume a verification token and mark the account's email as verified.
/// Unknown, expired, and already-used tokens all produce the same error.
pub async fn verify_email(
    State(app_state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<Empty>::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    let db = app_state.db();

    let token = match AuthToken::find_valid_token(db, &req.token, TokenKind::VerifyEmail).await {
        Ok(Some(token)) => token,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<Empty>::error(
                    "Invalid or expired verification token",
                )),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Database error: {e}"))),
            );
        }
    };

    if let Err(e) = User::mark_email_verified(db, token.user_id).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Empty>::error(format!("Database error: {e}"))),
        );
    }
    if let Err(e) = token.mark_as_used(db).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Empty>::error(format!("Database error: {e}"))),
        );
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            Empty,
            "Email verified successfully. You can now sign in.",
        )),
    )
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResendVerificationRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// POST /auth/resend-verification
///
/// Issue a fresh verification token for an unverified account. The response
/// is the same whether or not the email matched anything, so the endpoint
/// cannot be used to probe for accounts.
pub async fn resend_verification(
    State(app_state): State<AppState>,
    Json(req): Json<ResendVerificationRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<Empty>::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    let db = app_state.db();

    match User::find_by_email(db, &req.email).await {
        Ok(Some(user)) if !user.email_verified => {
            match AuthToken::create(
                db,
                user.id,
                TokenKind::VerifyEmail,
                common::config::verification_token_expiry_minutes() as i64,
            )
            .await
            {
                Ok(token) => {
                    if let Err(e) = EmailService::send_verification_email(
                        &user.email,
                        &user.full_name,
                        &token.token,
                    )
                    .await
                    {
                        tracing::error!(error = %e, email = %user.email, "failed to resend verification email");
                    }
                }
                Err(e) => tracing::error!(error = %e, "failed to issue verification token"),
            }
        }
        Ok(_) => {}
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Database error: {e}"))),
            );
        }
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            Empty,
            "If that email belongs to an unverified account, a new verification link has been sent.",
        )),
    )
}

#[derive(Debug, Deserialize, Validate)]
pub struct RequestPasswordResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// POST /auth/request-password-reset
///
/// Issue a password-reset token and email the link. Acknowledges neutrally
/// for unknown emails; issuance per account is capped per hour.
///
/// ### Responses
/// - `200 OK`: neutral acknowledgement
/// - `429 Too Many Requests`: issuance cap reached for this account
pub async fn request_password_reset(
    State(app_state): State<AppState>,
    Json(req): Json<RequestPasswordResetRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<Empty>::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    let db = app_state.db();

    match User::find_by_email(db, &req.email).await {
        Ok(Some(user)) => {
            let window_start = Utc::now() - Duration::hours(1);
            let issued =
                match AuthToken::issued_since(db, user.id, TokenKind::PasswordReset, window_start)
                    .await
                {
                    Ok(count) => count,
                    Err(e) => {
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(ApiResponse::<Empty>::error(format!("Database error: {e}"))),
                        );
                    }
                };

            if issued >= common::config::max_password_reset_requests_per_hour() as u64 {
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ApiResponse::<Empty>::error(
                        "Too many password reset requests. Try again later.",
                    )),
                );
            }

            match AuthToken::create(
                db,
                user.id,
                TokenKind::PasswordReset,
                common::config::reset_token_expiry_minutes() as i64,
            )
            .await
            {
                Ok(token) => {
                    if let Err(e) =
                        EmailService::send_password_reset_email(&user.email, &token.token).await
                    {
                        tracing::error!(error = %e, email = %user.email, "failed to send password reset email");
                    }
                }
                Err(e) => tracing::error!(error = %e, "failed to issue password reset token"),
            }
        }
        Ok(None) => {}
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Database error: {e}"))),
            );
        }
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            Empty,
            "If that email is registered, a password reset link has been sent.",
        )),
    )
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// POST /auth/reset-password
///
/// Consume a reset token and set the new password. Tokens are single use.
pub async fn reset_password(
    State(app_state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<Empty>::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    let db = app_state.db();

    let token = match AuthToken::find_valid_token(db, &req.token, TokenKind::PasswordReset).await {
        Ok(Some(token)) => token,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<Empty>::error("Invalid or expired reset token")),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Database error: {e}"))),
            );
        }
    };

    if let Err(e) = User::update_password(db, token.user_id, &req.new_password).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Empty>::error(format!("Database error: {e}"))),
        );
    }
    if let Err(e) = token.mark_as_used(db).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Empty>::error(format!("Database error: {e}"))),
        );
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            Empty,
            "Password reset successfully. You can now sign in.",
        )),
    )
}
