//! HTTP route entry point for `/api/...`.
//!
//! This module defines all HTTP entry points under the `/api` namespace.
//! Routes are organized by domain (e.g., authentication, students, reports),
//! each protected via appropriate access control middleware.
//!
//! Route groups include:
//! - `/health` → Health check endpoint (public)
//! - `/auth` → Registration, login, and token handling (public)
//! - `/lookup` → Parent attendance lookup (public)
//! - `/students` → Roster management and bulk import (teacher-only)
//! - `/attendance` → Session sheets and saves (teacher-only)
//! - `/reports` → Recaps, record listings, and exports (teacher-only)
//! - `/activity` → Audit feed (teacher-only)
//! - `/dashboard` → Headline counters (teacher-only)

use crate::auth::guards::allow_teacher;
use crate::routes::{
    activity::activity_routes, attendance::attendance_routes, auth::auth_routes,
    dashboard::dashboard_routes, health::health_routes, lookup::lookup_routes,
    reports::reports_routes, students::students_routes,
};
use axum::{Router, middleware::from_fn};
use common::state::AppState;

pub mod activity;
pub mod attendance;
pub mod auth;
pub mod common;
pub mod dashboard;
pub mod health;
pub mod lookup;
pub mod reports;
pub mod students;

/// Builds the complete application router for all HTTP endpoints.
///
/// Public groups come first; everything touching the roster or its
/// attendance data sits behind the teacher guard. Parent accounts hold
/// valid tokens but are rejected by the guard, so the split between the
/// two is made here, not inside individual handlers.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest("/lookup", lookup_routes())
        .nest(
            "/students",
            students_routes().route_layer(from_fn(allow_teacher)),
        )
        .nest(
            "/attendance",
            attendance_routes().route_layer(from_fn(allow_teacher)),
        )
        .nest(
            "/reports",
            reports_routes().route_layer(from_fn(allow_teacher)),
        )
        .nest(
            "/activity",
            activity_routes().route_layer(from_fn(allow_teacher)),
        )
        .nest(
            "/dashboard",
            dashboard_routes().route_layer(from_fn(allow_teacher)),
        )
        .with_state(app_state)
}
