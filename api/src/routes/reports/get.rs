use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use common::state::AppState;

use crate::response::ApiResponse;
use crate::routes::common::parse_iso_date;
use crate::services::ServiceError;
use crate::services::reports::{self, ExportTable, RecordRow, StudentRecap};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub class_label: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Only read by the export endpoints: `summary` or `records`.
    pub mode: Option<String>,
}

/// The filters shared by every report endpoint, after presence checks.
struct ReportRange {
    class_label: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

fn parse_range(query: &ReportQuery) -> Result<ReportRange, ServiceError> {
    let start_raw = query
        .start_date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation("start_date is required".to_owned()))?;
    let end_raw = query
        .end_date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation("end_date is required".to_owned()))?;

    Ok(ReportRange {
        class_label: query
            .class_label
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        start_date: parse_iso_date(start_raw, "start_date")?,
        end_date: parse_iso_date(end_raw, "end_date")?,
    })
}

enum ExportMode {
    Summary,
    Records,
}

fn parse_mode(query: &ReportQuery) -> Result<ExportMode, ServiceError> {
    match query.mode.as_deref().map(str::trim) {
        Some("summary") => Ok(ExportMode::Summary),
        Some("records") => Ok(ExportMode::Records),
        Some(_) | None => Err(ServiceError::Validation(
            "mode must be summary or records".to_owned(),
        )),
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub class_label: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub students: Vec<StudentRecap>,
}

/// GET /api/reports/summary
///
/// Per-student recap over an inclusive date range, optionally narrowed to
/// one class. Every roster member appears, zero events or not.
///
/// ### Query Parameters
/// - `start_date` (required): `YYYY-MM-DD`
/// - `end_date` (required): `YYYY-MM-DD`, must not precede `start_date`
/// - `class_label` (optional): e.g. `10-A`; omitted means the whole roster
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "class_label": "10-A",
///     "start_date": "2025-03-01",
///     "end_date": "2025-03-31",
///     "students": [
///       {
///         "student_id": 7,
///         "full_name": "Budi Santoso",
///         "class_label": "10-A",
///         "counts": { "hadir": 2, "sakit": 1, "izin": 0, "alfa": 0, "tidur": 0, "total": 3 },
///         "percentage": 66.7
///       }
///     ]
///   },
///   "message": "Attendance summary retrieved successfully"
/// }
/// ```
///
/// - `422 Unprocessable Entity`: missing dates, malformed dates, an
///   inverted range, or an unrecognized class label
/// - `500 Internal Server Error`
pub async fn get_summary(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let range = parse_range(&query)?;
    let students = reports::summary(
        app_state.db(),
        range.class_label.as_deref(),
        range.start_date,
        range.end_date,
    )
    .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            SummaryResponse {
                class_label: range.class_label,
                start_date: range.start_date,
                end_date: range.end_date,
                students,
            },
            "Attendance summary retrieved successfully",
        )),
    ))
}

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub class_label: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub records: Vec<RecordRow>,
}

/// GET /api/reports/records
///
/// Raw attendance events over an inclusive date range, newest first,
/// optionally narrowed to one class.
///
/// ### Responses
///
/// - `200 OK`: `data.records` is a list of
///   `{student_id, full_name, date, period, status}` entries
/// - `422 Unprocessable Entity`: same failure modes as `/summary`
/// - `500 Internal Server Error`
pub async fn get_records(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let range = parse_range(&query)?;
    let records = reports::records(
        app_state.db(),
        range.class_label.as_deref(),
        range.start_date,
        range.end_date,
    )
    .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            RecordsResponse {
                class_label: range.class_label,
                start_date: range.start_date,
                end_date: range.end_date,
                records,
            },
            "Attendance records retrieved successfully",
        )),
    ))
}

async fn build_table(
    app_state: &AppState,
    query: &ReportQuery,
) -> Result<(ExportMode, ReportRange, ExportTable), ServiceError> {
    let mode = parse_mode(query)?;
    let range = parse_range(query)?;

    let table = match mode {
        ExportMode::Summary => {
            let recaps = reports::summary(
                app_state.db(),
                range.class_label.as_deref(),
                range.start_date,
                range.end_date,
            )
            .await?;
            reports::summary_table(&recaps, range.start_date, range.end_date)
        }
        ExportMode::Records => {
            let rows = reports::records(
                app_state.db(),
                range.class_label.as_deref(),
                range.start_date,
                range.end_date,
            )
            .await?;
            reports::records_table(&rows, range.start_date, range.end_date)
        }
    };

    Ok((mode, range, table))
}

/// GET /api/reports/export
///
/// Renderer-ready table for the client-side spreadsheet and PDF writers.
/// The column order and labels are fixed per mode so both renderers stay
/// consistent.
///
/// ### Query Parameters
/// - `mode` (required): `summary` or `records`
/// - plus the `/summary` filters
///
/// ### Responses
///
/// - `200 OK`: `data` is `{title, headers, rows}` with every cell already
///   stringified
/// - `422 Unprocessable Entity`: bad mode or bad filters
pub async fn export_table(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (_, _, table) = build_table(&app_state, &query).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            table,
            "Export table built successfully",
        )),
    ))
}

/// GET /api/reports/export.csv
///
/// The `/export` table rendered as a CSV attachment. Fields containing a
/// comma, quote, or newline are quoted per RFC 4180.
///
/// ### Responses
///
/// - `200 OK`: `text/csv` body with a `Content-Disposition` filename of
///   the form `rekap_absensi_2025-03-01_2025-03-31.csv`
/// - `422 Unprocessable Entity`: bad mode or bad filters (JSON envelope)
pub async fn export_csv(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (mode, range, table) = build_table(&app_state, &query).await?;
    let csv = reports::to_csv(&table);

    let prefix = match mode {
        ExportMode::Summary => "rekap_absensi",
        ExportMode::Records => "data_absensi",
    };
    let filename = format!("{prefix}_{}_{}.csv", range.start_date, range.end_date);

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        axum::http::header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .unwrap_or(HeaderValue::from_static("attachment")),
    );

    Ok((StatusCode::OK, (headers, csv)))
}
