mod helpers;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use db::models::attendance_record::{AttendanceStatus, Model as AttendanceRecord, SheetEntry};
use db::models::student::Gender;
use db::test_utils::setup_test_db;
use helpers::{create_parent, create_teacher, get_json_body, get_request, make_app, seed_student};
use serial_test::serial;
use tower::ServiceExt;

/// Test Case: The dashboard reflects today's roster and events
#[tokio::test]
#[serial]
async fn test_dashboard_stats_for_today() {
    let db = setup_test_db().await;
    let (teacher, token) = create_teacher(&db).await;
    let budi = seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    let eko = seed_student(&db, "Eko Saputra", 10, Gender::L).await;
    seed_student(&db, "Siti Rahayu", 10, Gender::P).await;

    let today = Utc::now().date_naive();
    let entries = [
        SheetEntry {
            student_id: budi.id,
            status: AttendanceStatus::Hadir,
        },
        SheetEntry {
            student_id: eko.id,
            status: AttendanceStatus::Sakit,
        },
    ];
    AttendanceRecord::save_sheet(&db, today, 1, teacher.id, &entries)
        .await
        .unwrap();
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/dashboard/stats", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Dashboard stats retrieved successfully");
    assert_eq!(json["data"]["total_students"], 3);
    assert_eq!(json["data"]["records_today"], 2);
    assert_eq!(json["data"]["present_today"], 1);
    assert_eq!(json["data"]["attendance_rate_today"], 50.0);
}

/// Test Case: An empty database yields all-zero stats
#[tokio::test]
#[serial]
async fn test_dashboard_stats_empty() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/dashboard/stats", Some(&token)))
        .await
        .unwrap();
    let json = get_json_body(response).await;
    assert_eq!(json["data"]["total_students"], 0);
    assert_eq!(json["data"]["records_today"], 0);
    assert_eq!(json["data"]["present_today"], 0);
    assert_eq!(json["data"]["attendance_rate_today"], 0.0);
}

/// Test Case: Events on other days stay out of today's numbers
#[tokio::test]
#[serial]
async fn test_dashboard_ignores_other_days() {
    let db = setup_test_db().await;
    let (teacher, token) = create_teacher(&db).await;
    let budi = seed_student(&db, "Budi Santoso", 10, Gender::L).await;

    let yesterday = Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap();
    let entries = [SheetEntry {
        student_id: budi.id,
        status: AttendanceStatus::Hadir,
    }];
    AttendanceRecord::save_sheet(&db, yesterday, 1, teacher.id, &entries)
        .await
        .unwrap();
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/dashboard/stats", Some(&token)))
        .await
        .unwrap();
    let json = get_json_body(response).await;
    assert_eq!(json["data"]["total_students"], 1);
    assert_eq!(json["data"]["records_today"], 0);
    assert_eq!(json["data"]["attendance_rate_today"], 0.0);
}

/// Test Case: The dashboard is teacher-only
#[tokio::test]
#[serial]
async fn test_dashboard_requires_teacher() {
    let db = setup_test_db().await;
    let (_, parent_token) = create_parent(&db).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/dashboard/stats", Some(&parent_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Teacher access required");
}
