use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use common::state::AppState;
use db::models::attendance_record::{AttendanceStatus, Model as AttendanceRecord};
use db::models::student::Model as Student;

use crate::response::ApiResponse;
use crate::routes::common::{StudentResponse, parse_iso_date};
use crate::services::ServiceError;
use crate::services::reports::StatusCounts;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub nisn: Option<String>,
    pub full_name: Option<String>,
    pub birth_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LookupSummary {
    pub counts: StatusCounts,
    /// `null` when the student has no recorded events.
    pub percentage: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LookupRecord {
    pub date: NaiveDate,
    pub period: i32,
    pub status: AttendanceStatus,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub student: StudentResponse,
    pub summary: LookupSummary,
    pub records: Vec<LookupRecord>,
}

/// GET /api/lookup
///
/// Public attendance lookup. Resolves exactly one student from either a
/// NISN or a full name (optionally narrowed by birth date) and returns the
/// full attendance bundle. Ambiguous name matches are refused rather than
/// guessed, and the error never says whether the name or the date missed.
///
/// ### Query Parameters
/// - `nisn`: exact national student number; takes precedence when present
/// - `full_name`: whole-string, case-insensitive name match
/// - `birth_date`: `YYYY-MM-DD`, only meaningful alongside `full_name`
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "student": { "id": 7, "full_name": "Budi Santoso", "class_label": "10-A" },
///     "summary": {
///       "counts": { "hadir": 2, "sakit": 1, "izin": 0, "alfa": 0, "tidur": 0, "total": 3 },
///       "percentage": 66.7
///     },
///     "records": [
///       { "date": "2025-03-03", "period": 2, "status": "Sakit" },
///       { "date": "2025-03-01", "period": 1, "status": "Hadir" }
///     ]
///   },
///   "message": "Student record retrieved successfully"
/// }
/// ```
///
/// - `422 Unprocessable Entity`: neither `nisn` nor `full_name` supplied,
///   or a malformed `birth_date`
/// - `404 Not Found`: `"student not found"`
/// - `409 Conflict`: `"multiple students matched; please use the ID number
///   for a precise result"`
/// - `500 Internal Server Error`: includes the duplicate-NISN integrity
///   case
pub async fn lookup_student(
    State(app_state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let nisn = query
        .nisn
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let full_name = query
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let student = match (nisn, full_name) {
        (None, None) => {
            return Err(ServiceError::Validation(
                "nisn or full_name is required".to_owned(),
            ));
        }
        (Some(nisn), _) => by_nisn(&app_state, nisn).await?,
        (None, Some(full_name)) => {
            let birth_date = match query.birth_date.as_deref().map(str::trim) {
                Some(raw) if !raw.is_empty() => Some(parse_iso_date(raw, "birth_date")?),
                _ => None,
            };
            by_name(&app_state, full_name, birth_date).await?
        }
    };

    let history = AttendanceRecord::for_student_newest_first(app_state.db(), student.id).await?;

    let mut counts = StatusCounts::default();
    for record in &history {
        counts.add(record.status);
    }
    let percentage = counts.percentage();

    let records = history
        .into_iter()
        .map(|record| LookupRecord {
            date: record.date,
            period: record.period,
            status: record.status,
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            LookupResponse {
                student: StudentResponse::from(student),
                summary: LookupSummary { counts, percentage },
                records,
            },
            "Student record retrieved successfully",
        )),
    ))
}

async fn by_nisn(app_state: &AppState, nisn: &str) -> Result<Student, ServiceError> {
    let mut matches = Student::find_by_nisn(app_state.db(), nisn).await?;
    match matches.len() {
        0 => Err(ServiceError::NotFound("student not found".to_owned())),
        1 => Ok(matches.remove(0)),
        n => Err(ServiceError::Integrity(format!(
            "{n} students share NISN {nisn}"
        ))),
    }
}

async fn by_name(
    app_state: &AppState,
    full_name: &str,
    birth_date: Option<NaiveDate>,
) -> Result<Student, ServiceError> {
    let mut matches = Student::find_by_name_ci(app_state.db(), full_name, birth_date).await?;
    match matches.len() {
        0 => Err(ServiceError::NotFound("student not found".to_owned())),
        1 => Ok(matches.remove(0)),
        _ => Err(ServiceError::Ambiguous(
            "multiple students matched; please use the ID number for a precise result".to_owned(),
        )),
    }
}
