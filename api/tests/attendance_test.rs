mod helpers;

use axum::http::StatusCode;
use db::models::student::Gender;
use db::test_utils::setup_test_db;
use helpers::{create_parent, create_teacher, get_json_body, get_request, json_request, make_app, seed_student};
use serde_json::json;
use serial_test::serial;
use tower::ServiceExt;

/// Test Case: The sheet lists the whole class with Hadir pre-filled
#[tokio::test]
#[serial]
async fn test_sheet_defaults_all_hadir() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    seed_student(&db, "Eko Saputra", 10, Gender::L).await;
    // Different class, must not leak into the sheet.
    seed_student(&db, "Siti Rahayu", 10, Gender::P).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request(
            "/api/attendance/sheet?class_label=10-A&date=2025-03-01&period=1",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Attendance sheet retrieved successfully");
    assert_eq!(json["data"]["class_label"], "10-A");
    assert_eq!(json["data"]["date"], "2025-03-01");
    assert_eq!(json["data"]["period"], 1);

    let entries = json["data"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry["status"], "Hadir");
    }
}

/// Test Case: A saved sheet shows up on the next fetch
#[tokio::test]
#[serial]
async fn test_save_then_sheet_reflects_status() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let budi = seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    let eko = seed_student(&db, "Eko Saputra", 10, Gender::L).await;
    let app = make_app(db);

    let payload = json!({
        "date": "2025-03-01",
        "period": 2,
        "entries": [
            { "student_id": budi.id, "status": "Sakit" },
            { "student_id": eko.id, "status": "Hadir" }
        ]
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/attendance", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Attendance saved successfully");

    let response = app
        .oneshot(get_request(
            "/api/attendance/sheet?class_label=10-A&date=2025-03-01&period=2",
            Some(&token),
        ))
        .await
        .unwrap();
    let json = get_json_body(response).await;
    let entries = json["data"]["entries"].as_array().unwrap();
    let budi_entry = entries
        .iter()
        .find(|e| e["student_id"] == budi.id)
        .unwrap();
    assert_eq!(budi_entry["status"], "Sakit");
    let eko_entry = entries.iter().find(|e| e["student_id"] == eko.id).unwrap();
    assert_eq!(eko_entry["status"], "Hadir");
}

/// Test Case: Re-saving a session overwrites instead of duplicating
#[tokio::test]
#[serial]
async fn test_resave_overwrites_existing_events() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let budi = seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    let app = make_app(db);

    for status in ["Sakit", "Izin"] {
        let payload = json!({
            "date": "2025-03-01",
            "period": 1,
            "entries": [{ "student_id": budi.id, "status": status }]
        });
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/attendance", Some(&token), &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(get_request(
            "/api/reports/records?start_date=2025-03-01&end_date=2025-03-01",
            Some(&token),
        ))
        .await
        .unwrap();
    let json = get_json_body(response).await;
    let records = json["data"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "Izin");
}

/// Test Case: Each sheet parameter is individually required
#[tokio::test]
#[serial]
async fn test_sheet_missing_parameters() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let app = make_app(db);

    let cases = [
        ("/api/attendance/sheet?date=2025-03-01&period=1", "class_label is required"),
        ("/api/attendance/sheet?class_label=10-A&period=1", "date is required"),
        ("/api/attendance/sheet?class_label=10-A&date=2025-03-01", "period is required"),
    ];
    for (uri, message) in cases {
        let response = app
            .clone()
            .oneshot(get_request(uri, Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = get_json_body(response).await;
        assert_eq!(json["message"], message);
    }
}

/// Test Case: Malformed dates and unknown classes fail validation
#[tokio::test]
#[serial]
async fn test_sheet_rejects_bad_inputs() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let app = make_app(db);

    let response = app
        .clone()
        .oneshot(get_request(
            "/api/attendance/sheet?class_label=10-A&date=01-03-2025&period=1",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "date must be a YYYY-MM-DD date");

    let response = app
        .clone()
        .oneshot(get_request(
            "/api/attendance/sheet?class_label=13F&date=2025-03-01&period=1",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "unrecognized class label: 13F");

    let response = app
        .oneshot(get_request(
            "/api/attendance/sheet?class_label=10-A&date=2025-03-01&period=0",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "period must be at least 1");
}

/// Test Case: An unknown status spelling never reaches the store
#[tokio::test]
#[serial]
async fn test_save_rejects_unknown_status() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let budi = seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    let app = make_app(db);

    let payload = json!({
        "date": "2025-03-01",
        "period": 1,
        "entries": [{ "student_id": budi.id, "status": "Present" }]
    });
    let response = app
        .oneshot(json_request("POST", "/api/attendance", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

/// Test Case: Attendance routes are teacher-only
#[tokio::test]
#[serial]
async fn test_attendance_parent_forbidden() {
    let db = setup_test_db().await;
    let (_, parent_token) = create_parent(&db).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request(
            "/api/attendance/sheet?class_label=10-A&date=2025-03-01&period=1",
            Some(&parent_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Teacher access required");
}
