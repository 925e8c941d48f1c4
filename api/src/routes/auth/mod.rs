//! # auth Routes Module
//!
//! This module defines and wires up routes for the `/auth` endpoint group.
//!
//! ## Structure
//! - `post.rs`: POST handlers (register, login, token flows)
//! - `get.rs`: GET handlers (current account info)
//!
//! ## Usage
//! The `auth_routes()` function returns a `Router` which is nested under `/auth` in the main application.

pub mod post;
pub mod get;

use axum::{
    Router,
    routing::{get, post},
};
use common::state::AppState;

use get::get_me;
use post::{
    login, register, request_password_reset, resend_verification, reset_password, verify_email,
};

/// Builds the `/auth` route group, mapping HTTP methods to handlers.
///
/// - `POST /auth/register` → `register`
/// - `POST /auth/login` → `login`
/// - `POST /auth/verify-email` → `verify_email`
/// - `POST /auth/resend-verification` → `resend_verification`
/// - `POST /auth/request-password-reset` → `request_password_reset`
/// - `POST /auth/reset-password` → `reset_password`
/// - `GET /auth/me` → `get_me`
///
/// All routes are public except `/me`, which requires a bearer token via the
/// `AuthUser` extractor.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-email", post(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/request-password-reset", post(request_password_reset))
        .route("/reset-password", post(reset_password))
        .route("/me", get(get_me))
}
