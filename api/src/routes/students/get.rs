use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::state::AppState;
use db::models::student::{self, Column as StudentColumn, Entity as StudentEntity, Model as Student};
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::response::ApiResponse;
use crate::routes::common::StudentResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct ListStudentsQuery {
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub per_page: Option<u64>,
    pub q: Option<String>,
    pub class_label: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize, Default)]
pub struct StudentsListResponse {
    pub students: Vec<StudentResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// GET /api/students
///
/// Retrieve a paginated slice of the roster with optional filtering and
/// sorting.
///
/// ### Query Parameters
/// - `page` (optional): Page number (default: 1, min: 1)
/// - `per_page` (optional): Items per page (default: 15, min: 1, max: 100)
/// - `q` (optional): Case-insensitive partial match on name OR NISN
/// - `class_label` (optional): One class, e.g. `10-A`
/// - `sort` (optional): Comma-separated fields from
///   `full_name | grade | created_at`; `-` prefix for descending
///
/// ### Examples
/// ```http
/// GET /api/students?page=2&per_page=10
/// GET /api/students?q=budi
/// GET /api/students?class_label=10-A&sort=-created_at
/// ```
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "students": [
///       {
///         "id": 7,
///         "full_name": "Budi Santoso",
///         "grade": 10,
///         "section": "A",
///         "class_label": "10-A",
///         "gender": "L",
///         "nisn": "0051234567",
///         "birth_date": "2008-05-01",
///         "created_at": "2025-05-23T18:00:00+00:00"
///       }
///     ],
///     "page": 1,
///     "per_page": 15,
///     "total": 120
///   },
///   "message": "Students retrieved successfully"
/// }
/// ```
///
/// - `422 Unprocessable Entity`: invalid query parameters
/// - `401 Unauthorized` / `403 Forbidden`: missing token / not a teacher
/// - `500 Internal Server Error`
pub async fn list_students(
    State(app_state): State<AppState>,
    Query(query): Query<ListStudentsQuery>,
) -> impl IntoResponse {
    let db = app_state.db();

    if let Err(e) = query.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<StudentsListResponse>::error(
                common::format_validation_errors(&e),
            )),
        );
    }

    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(15);

    let mut condition = Condition::all();

    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(StudentColumn::FullName.contains(q))
                .add(StudentColumn::Nisn.contains(q)),
        );
    }

    if let Some(label) = query.class_label.as_deref() {
        let Some((grade, section)) = student::parse_class_label(label) else {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<StudentsListResponse>::error(format!(
                    "unrecognized class label: {label}"
                ))),
            );
        };
        condition = condition
            .add(StudentColumn::Grade.eq(grade))
            .add(StudentColumn::Section.eq(section));
    }

    let mut query_builder = StudentEntity::find().filter(condition);

    if let Some(sort_param) = &query.sort {
        for sort_field in sort_param.split(',') {
            let (field, desc) = if let Some(stripped) = sort_field.strip_prefix('-') {
                (stripped, true)
            } else {
                (sort_field, false)
            };

            match field {
                "full_name" => {
                    query_builder = if desc {
                        query_builder.order_by_desc(StudentColumn::FullName)
                    } else {
                        query_builder.order_by_asc(StudentColumn::FullName)
                    };
                }
                "grade" => {
                    query_builder = if desc {
                        query_builder.order_by_desc(StudentColumn::Grade)
                    } else {
                        query_builder.order_by_asc(StudentColumn::Grade)
                    };
                }
                "created_at" => {
                    query_builder = if desc {
                        query_builder.order_by_desc(StudentColumn::CreatedAt)
                    } else {
                        query_builder.order_by_asc(StudentColumn::CreatedAt)
                    };
                }
                _ => {}
            }
        }
    } else {
        query_builder = query_builder.order_by_asc(StudentColumn::FullName);
    }

    let paginator = query_builder.paginate(db, per_page);
    let total = paginator.num_items().await.unwrap_or(0);
    let students = paginator.fetch_page(page - 1).await.unwrap_or_default();
    let students = students.into_iter().map(StudentResponse::from).collect();

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            StudentsListResponse {
                students,
                page,
                per_page,
                total,
            },
            "Students retrieved successfully",
        )),
    )
}

/// GET /api/students/classes
///
/// Distinct class labels across the roster, sorted by grade then section,
/// for the class pickers.
///
/// ### Response
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": ["10-A", "10-B", "11-A"],
///   "message": "Classes retrieved successfully"
/// }
/// ```
pub async fn get_classes(State(app_state): State<AppState>) -> impl IntoResponse {
    match Student::distinct_class_labels(app_state.db()).await {
        Ok(labels) => (
            StatusCode::OK,
            Json(ApiResponse::success(labels, "Classes retrieved successfully")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Vec<String>>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}
