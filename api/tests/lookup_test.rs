mod helpers;

use axum::http::StatusCode;
use chrono::NaiveDate;
use db::models::attendance_record::{AttendanceStatus, Model as AttendanceRecord, SheetEntry};
use db::models::student::{Gender, Model as StudentModel, NewStudent};
use db::test_utils::setup_test_db;
use helpers::{create_teacher, get_json_body, get_request, make_app};
use sea_orm::DatabaseConnection;
use serial_test::serial;
use tower::ServiceExt;

async fn seed_full(
    db: &DatabaseConnection,
    name: &str,
    grade: i32,
    gender: Gender,
    nisn: Option<&str>,
    birth_date: Option<&str>,
) -> StudentModel {
    StudentModel::create(
        db,
        NewStudent {
            full_name: name.to_owned(),
            grade,
            gender,
            nisn: nisn.map(str::to_owned),
            birth_date: birth_date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
        },
    )
    .await
    .unwrap()
}

async fn record(
    db: &DatabaseConnection,
    teacher_id: i64,
    student_id: i64,
    date: &str,
    period: i32,
    status: AttendanceStatus,
) {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let entries = [SheetEntry { student_id, status }];
    AttendanceRecord::save_sheet(db, date, period, teacher_id, &entries)
        .await
        .unwrap();
}

/// Test Case: A NISN lookup returns the full attendance bundle without a token
#[tokio::test]
#[serial]
async fn test_lookup_by_nisn_returns_bundle() {
    let db = setup_test_db().await;
    let (teacher, _) = create_teacher(&db).await;
    let budi = seed_full(&db, "Budi Santoso", 10, Gender::L, Some("0051234567"), Some("2008-05-01")).await;
    record(&db, teacher.id, budi.id, "2025-03-01", 1, AttendanceStatus::Hadir).await;
    record(&db, teacher.id, budi.id, "2025-03-03", 2, AttendanceStatus::Sakit).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/lookup?nisn=0051234567", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Student record retrieved successfully");
    assert_eq!(json["data"]["student"]["id"], budi.id);
    assert_eq!(json["data"]["student"]["class_label"], "10-A");
    assert_eq!(json["data"]["summary"]["counts"]["hadir"], 1);
    assert_eq!(json["data"]["summary"]["counts"]["sakit"], 1);
    assert_eq!(json["data"]["summary"]["counts"]["total"], 2);
    assert_eq!(json["data"]["summary"]["percentage"], 50.0);

    let records = json["data"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["date"], "2025-03-03");
    assert_eq!(records[0]["period"], 2);
    assert_eq!(records[0]["status"], "Sakit");
    assert_eq!(records[1]["date"], "2025-03-01");
}

/// Test Case: No recorded events means a null percentage, not zero
#[tokio::test]
#[serial]
async fn test_lookup_without_events_has_null_percentage() {
    let db = setup_test_db().await;
    seed_full(&db, "Budi Santoso", 10, Gender::L, Some("0051234567"), None).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/lookup?nisn=0051234567", None))
        .await
        .unwrap();
    let json = get_json_body(response).await;
    assert_eq!(json["data"]["summary"]["counts"]["total"], 0);
    assert!(json["data"]["summary"]["percentage"].is_null());
    assert_eq!(json["data"]["records"], serde_json::json!([]));
}

/// Test Case: An unknown NISN is a not-found
#[tokio::test]
#[serial]
async fn test_lookup_unknown_nisn_not_found() {
    let db = setup_test_db().await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/lookup?nisn=9999999999", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "student not found");
}

/// Test Case: An ambiguous name is refused rather than guessed
#[tokio::test]
#[serial]
async fn test_lookup_ambiguous_name_conflict() {
    let db = setup_test_db().await;
    seed_full(&db, "Ahmad Fauzi", 11, Gender::L, Some("0041234567"), Some("2007-08-17")).await;
    seed_full(&db, "Ahmad Fauzi", 11, Gender::L, None, Some("2007-11-09")).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/lookup?full_name=Ahmad%20Fauzi", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = get_json_body(response).await;
    assert_eq!(
        json["message"],
        "multiple students matched; please use the ID number for a precise result"
    );
}

/// Test Case: A birth date narrows an ambiguous name to one student
#[tokio::test]
#[serial]
async fn test_lookup_birth_date_narrows() {
    let db = setup_test_db().await;
    let first = seed_full(&db, "Ahmad Fauzi", 11, Gender::L, Some("0041234567"), Some("2007-08-17")).await;
    seed_full(&db, "Ahmad Fauzi", 11, Gender::L, None, Some("2007-11-09")).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request(
            "/api/lookup?full_name=Ahmad%20Fauzi&birth_date=2007-08-17",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_json_body(response).await;
    assert_eq!(json["data"]["student"]["id"], first.id);
    assert_eq!(json["data"]["student"]["birth_date"], "2007-08-17");
}

/// Test Case: Name matching ignores case
#[tokio::test]
#[serial]
async fn test_lookup_name_case_insensitive() {
    let db = setup_test_db().await;
    seed_full(&db, "Budi Santoso", 10, Gender::L, None, None).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/lookup?full_name=budi%20santoso", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_json_body(response).await;
    assert_eq!(json["data"]["student"]["full_name"], "Budi Santoso");
}

/// Test Case: At least one identifier is required
#[tokio::test]
#[serial]
async fn test_lookup_requires_identifier() {
    let db = setup_test_db().await;
    let app = make_app(db);

    let response = app.oneshot(get_request("/api/lookup", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "nisn or full_name is required");
}

/// Test Case: NISN wins when both identifiers are sent
#[tokio::test]
#[serial]
async fn test_lookup_nisn_takes_precedence() {
    let db = setup_test_db().await;
    let budi = seed_full(&db, "Budi Santoso", 10, Gender::L, Some("0051234567"), None).await;
    seed_full(&db, "Siti Rahayu", 10, Gender::P, None, None).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request(
            "/api/lookup?nisn=0051234567&full_name=Siti%20Rahayu",
            None,
        ))
        .await
        .unwrap();
    let json = get_json_body(response).await;
    assert_eq!(json["data"]["student"]["id"], budi.id);
}

/// Test Case: A malformed birth date fails validation
#[tokio::test]
#[serial]
async fn test_lookup_bad_birth_date() {
    let db = setup_test_db().await;
    seed_full(&db, "Budi Santoso", 10, Gender::L, None, None).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request(
            "/api/lookup?full_name=Budi%20Santoso&birth_date=17-08-2007",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "birth_date must be a YYYY-MM-DD date");
}
