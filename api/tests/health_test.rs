mod helpers;

use axum::http::StatusCode;
use db::test_utils::setup_test_db;
use helpers::{get_json_body, get_request, make_app};
use serial_test::serial;
use tower::ServiceExt;

/// Test Case: Health endpoint is public and reports success
#[tokio::test]
#[serial]
async fn test_health_check() {
    let db = setup_test_db().await;
    let app = make_app(db);

    let response = app
        .oneshot(get_request("/api/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], "OK");
    assert_eq!(json["message"], "Service healthy");
}
