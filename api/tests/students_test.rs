mod helpers;

use axum::http::StatusCode;
use db::models::student::{Gender, Model as StudentModel, NewStudent};
use db::test_utils::setup_test_db;
use helpers::{create_parent, create_teacher, get_json_body, get_request, json_request, make_app, seed_student};
use serde_json::json;
use serial_test::serial;
use tower::ServiceExt;

/// Test Case: Creating a student derives the section from the gender
#[tokio::test]
#[serial]
async fn test_create_student_derives_section() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let app = make_app(db);

    let payload = json!({
        "full_name": "Budi Santoso",
        "grade": 10,
        "gender": "L",
        "nisn": "0051234567",
        "birth_date": "2008-05-01"
    });
    let response = app
        .oneshot(json_request("POST", "/api/students", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Student created successfully");
    assert_eq!(json["data"]["full_name"], "Budi Santoso");
    assert_eq!(json["data"]["section"], "A");
    assert_eq!(json["data"]["class_label"], "10-A");
    assert_eq!(json["data"]["nisn"], "0051234567");
}

/// Test Case: Girls land in section B
#[tokio::test]
#[serial]
async fn test_create_student_section_b() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let app = make_app(db);

    let payload = json!({"full_name": "Siti Rahayu", "grade": 11, "gender": "P"});
    let response = app
        .oneshot(json_request("POST", "/api/students", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_json_body(response).await;
    assert_eq!(json["data"]["class_label"], "11-B");
    assert!(json["data"]["nisn"].is_null());
}

/// Test Case: Creation validates the grade range
#[tokio::test]
#[serial]
async fn test_create_student_invalid_grade() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let app = make_app(db);

    let payload = json!({"full_name": "Budi", "grade": 13, "gender": "L"});
    let response = app
        .oneshot(json_request("POST", "/api/students", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = get_json_body(response).await;
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .contains("Grade must be 10, 11, or 12")
    );
}

/// Test Case: Duplicate NISN is refused on create
#[tokio::test]
#[serial]
async fn test_create_student_duplicate_nisn() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    StudentModel::create(
        &db,
        NewStudent {
            full_name: "Budi Santoso".to_owned(),
            grade: 10,
            gender: Gender::L,
            nisn: Some("0051234567".to_owned()),
            birth_date: None,
        },
    )
    .await
    .unwrap();
    let app = make_app(db);

    let payload = json!({
        "full_name": "Eko Saputra",
        "grade": 10,
        "gender": "L",
        "nisn": "0051234567"
    });
    let response = app
        .oneshot(json_request("POST", "/api/students", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = get_json_body(response).await;
    assert_eq!(json["message"], "A student with this NISN already exists");
}

/// Test Case: Listing paginates and reports the unfiltered total
#[tokio::test]
#[serial]
async fn test_list_students_pagination() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    seed_student(&db, "Citra Ayu", 11, Gender::P).await;
    seed_student(&db, "Siti Rahayu", 10, Gender::P).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/students?page=1&per_page=2", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    let students = json["data"]["students"].as_array().unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["page"], 1);
    assert_eq!(json["data"]["per_page"], 2);
    // Default ordering is by name.
    assert_eq!(students[0]["full_name"], "Budi Santoso");
    assert_eq!(students[1]["full_name"], "Citra Ayu");
}

/// Test Case: The q filter matches name substrings
#[tokio::test]
#[serial]
async fn test_list_students_query_filter() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    seed_student(&db, "Siti Rahayu", 10, Gender::P).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/students?q=santoso", Some(&token)))
        .await
        .unwrap();
    let json = get_json_body(response).await;
    let students = json["data"]["students"].as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["full_name"], "Budi Santoso");
}

/// Test Case: The class filter narrows to one class label
#[tokio::test]
#[serial]
async fn test_list_students_class_filter() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    seed_student(&db, "Eko Saputra", 10, Gender::L).await;
    seed_student(&db, "Siti Rahayu", 10, Gender::P).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/students?class_label=10-A", Some(&token)))
        .await
        .unwrap();
    let json = get_json_body(response).await;
    let students = json["data"]["students"].as_array().unwrap();
    assert_eq!(students.len(), 2);
    for student in students {
        assert_eq!(student["class_label"], "10-A");
    }
}

/// Test Case: An unknown class label fails validation
#[tokio::test]
#[serial]
async fn test_list_students_bad_class_label() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/students?class_label=13F", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = get_json_body(response).await;
    assert_eq!(json["message"], "unrecognized class label: 13F");
}

/// Test Case: Sorting accepts a descending name key
#[tokio::test]
#[serial]
async fn test_list_students_sort_desc() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    seed_student(&db, "Siti Rahayu", 10, Gender::P).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/students?sort=-full_name", Some(&token)))
        .await
        .unwrap();
    let json = get_json_body(response).await;
    let students = json["data"]["students"].as_array().unwrap();
    assert_eq!(students[0]["full_name"], "Siti Rahayu");
    assert_eq!(students[1]["full_name"], "Budi Santoso");
}

/// Test Case: Updating re-derives the section when the gender changes
#[tokio::test]
#[serial]
async fn test_update_student_rederives_section() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let student = seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    let app = make_app(db);

    let payload = json!({
        "full_name": "Budi Santoso",
        "grade": 11,
        "gender": "P",
        "nisn": null,
        "birth_date": null
    });
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/students/{}", student.id),
            Some(&token),
            &payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Student updated successfully");
    assert_eq!(json["data"]["class_label"], "11-B");
}

/// Test Case: Updating a missing student is a not-found
#[tokio::test]
#[serial]
async fn test_update_student_not_found() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let app = make_app(db);

    let payload = json!({"full_name": "Ghost", "grade": 10, "gender": "L"});
    let response = app
        .oneshot(json_request("PUT", "/api/students/999", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = get_json_body(response).await;
    assert_eq!(json["message"], "student not found");
}

/// Test Case: NISN conflicts on update exclude the student itself
#[tokio::test]
#[serial]
async fn test_update_student_keeps_own_nisn() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let student = StudentModel::create(
        &db,
        NewStudent {
            full_name: "Budi Santoso".to_owned(),
            grade: 10,
            gender: Gender::L,
            nisn: Some("0051234567".to_owned()),
            birth_date: None,
        },
    )
    .await
    .unwrap();
    let app = make_app(db);

    // Re-submitting the same NISN for the same student is not a conflict.
    let payload = json!({
        "full_name": "Budi Santoso",
        "grade": 10,
        "gender": "L",
        "nisn": "0051234567"
    });
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/students/{}", student.id),
            Some(&token),
            &payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Test Case: Deleting removes the student and reports missing ones
#[tokio::test]
#[serial]
async fn test_delete_student() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    let student = seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    let app = make_app(db);

    let uri = format!("/api/students/{}", student.id);
    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri(&uri)
        .header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}"),
        )
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Student deleted successfully");

    // A second delete finds nothing.
    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri(&uri)
        .header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}"),
        )
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Test Case: The class list is distinct and sorted
#[tokio::test]
#[serial]
async fn test_get_classes() {
    let db = setup_test_db().await;
    let (_, token) = create_teacher(&db).await;
    seed_student(&db, "Budi Santoso", 10, Gender::L).await;
    seed_student(&db, "Eko Saputra", 10, Gender::L).await;
    seed_student(&db, "Siti Rahayu", 12, Gender::P).await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/students/classes", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    assert_eq!(json["data"], json!(["10-A", "12-B"]));
}

/// Test Case: Roster routes reject parents and anonymous callers
#[tokio::test]
#[serial]
async fn test_students_teacher_guard() {
    let db = setup_test_db().await;
    let (_, parent_token) = create_parent(&db).await;
    let app = make_app(db);

    let response = app
        .clone()
        .oneshot(get_request("/api/students", Some(&parent_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Teacher access required");

    let response = app
        .oneshot(get_request("/api/students", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_json_body(response).await;
    assert_eq!(json["message"], "Authentication required");
}
