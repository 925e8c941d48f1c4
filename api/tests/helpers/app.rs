use api::auth::generate_jwt;
use api::routes::routes;
use axum::{
    Router,
    body::Body,
    http::{
        Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::Response,
};
use common::state::AppState;
use db::models::student::{Gender, Model as StudentModel, NewStudent};
use db::models::user::{Model as UserModel, Role};
use sea_orm::DatabaseConnection;
use serde_json::Value;

/// Builds the full application router over the given test database, mounted
/// under `/api` exactly as in `main`.
pub fn make_app(db: DatabaseConnection) -> Router {
    Router::new().nest("/api", routes(AppState::new(db)))
}

pub async fn get_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// A verified teacher account plus a signed bearer token for it.
pub async fn create_teacher(db: &DatabaseConnection) -> (UserModel, String) {
    let user = UserModel::create(db, "Ibu Ani", "ani@school.test", "password123", Role::Teacher)
        .await
        .unwrap();
    UserModel::mark_email_verified(db, user.id).await.unwrap();
    let (token, _) = generate_jwt(user.id, user.role);
    (user, token)
}

/// A verified parent account; its token passes authentication but fails the
/// teacher guard.
pub async fn create_parent(db: &DatabaseConnection) -> (UserModel, String) {
    let user = UserModel::create(db, "Bapak Joko", "joko@family.test", "password123", Role::Parent)
        .await
        .unwrap();
    UserModel::mark_email_verified(db, user.id).await.unwrap();
    let (token, _) = generate_jwt(user.id, user.role);
    (user, token)
}

pub async fn seed_student(
    db: &DatabaseConnection,
    full_name: &str,
    grade: i32,
    gender: Gender,
) -> StudentModel {
    StudentModel::create(
        db,
        NewStudent {
            full_name: full_name.to_owned(),
            grade,
            gender,
            nisn: None,
            birth_date: None,
        },
    )
    .await
    .unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    payload: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}
