//! Roster import pipeline.
//!
//! Rows arrive as loosely typed cell values decoded from a spreadsheet
//! (strings, numbers, serial-date numbers). Validation runs over every row
//! independently and collects rejections; survivors are persisted in one
//! transactional bulk insert, so a store failure commits nothing.

use chrono::NaiveDate;
use db::models::activity_log;
use db::models::student::{Gender, Model as Student, NewStudent};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::ServiceError;

/// Largest serial accepted, 9999-12-31 in the spreadsheet epoch.
const MAX_SERIAL: f64 = 2_958_465.0;

/// One raw spreadsheet row keyed by the import template's header names.
///
/// Every cell is kept as a [`Value`] because spreadsheet decoders hand back
/// mixed types: `KELAS` may be `10` or `"10"`, `TANGGAL_LAHIR` may be a
/// serial day count or a date string.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStudentRow {
    #[serde(rename = "NAMA_LENGKAP", default)]
    pub full_name: Option<Value>,
    #[serde(rename = "KELAS", default)]
    pub grade: Option<Value>,
    #[serde(rename = "JENIS_KELAMIN", default)]
    pub gender: Option<Value>,
    #[serde(rename = "NISN", default)]
    pub nisn: Option<Value>,
    #[serde(rename = "TANGGAL_LAHIR", default)]
    pub birth_date: Option<Value>,
}

/// Outcome of a bulk import: counts plus every row-level rejection message.
#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}

/// Converts a spreadsheet serial day count (day 0 = 1899-12-30) to a date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(chrono::Days::new(serial.trunc() as u64))
}

/// Parses the two calendar-date spellings the import template accepts.
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}

/// Normalizes a birth-date cell to a calendar date.
///
/// Numbers are serial day counts; strings are tried as calendar dates first
/// and fall back to a serial spelled out in text (some decoders stringify
/// numeric cells).
pub fn normalize_birth_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(n) => n.as_f64().and_then(serial_to_date),
        Value::String(s) => {
            parse_date_string(s).or_else(|| s.trim().parse::<f64>().ok().and_then(serial_to_date))
        }
        _ => None,
    }
}

/// Trimmed non-empty string cells only; numbers are not names.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_owned())
        }
        _ => None,
    }
}

/// Identifier cells: strings keep their formatting, numeric cells are
/// rendered without a fractional part.
fn cell_ident(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => cell_text(value),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().map(|f| (f.trunc() as i64).to_string())
            }
        }
        _ => None,
    }
}

fn cell_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// An empty or null cell counts as absent, not as a malformed value.
fn cell_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Validates one raw row into a normalized insert record.
///
/// Rules apply in order and the first failure wins; `row_number` is the
/// 1-based position of the row in the submitted sequence and appears in every
/// rejection message. Pure function, no store access.
pub fn validate_row(
    row: &RawStudentRow,
    row_number: usize,
    require_birth_date: bool,
) -> Result<NewStudent, String> {
    let full_name = match row.full_name.as_ref().and_then(cell_text) {
        Some(name) => name,
        None => return Err(format!("row {row_number}: name missing or invalid")),
    };

    let grade = match row.grade.as_ref().and_then(cell_integer) {
        Some(g @ (10 | 11 | 12)) => g as i32,
        _ => return Err(format!("row {row_number}: grade must be 10, 11, or 12")),
    };

    let gender = match row.gender.as_ref().and_then(cell_text).as_deref() {
        Some("L") => Gender::L,
        Some("P") => Gender::P,
        _ => return Err(format!("row {row_number}: gender must be L or P")),
    };

    let birth_date = match row.birth_date.as_ref().filter(|v| cell_present(v)) {
        None => {
            if require_birth_date {
                return Err(format!("row {row_number}: birth date is required"));
            }
            None
        }
        Some(value) => match normalize_birth_date(value) {
            Some(date) => Some(date),
            None => return Err(format!("row {row_number}: invalid birth date format")),
        },
    };

    let nisn = row.nisn.as_ref().filter(|v| cell_present(v)).and_then(cell_ident);

    Ok(NewStudent {
        full_name,
        grade,
        gender,
        nisn,
        birth_date,
    })
}

/// Runs validation over every row, persists the survivors in one transaction,
/// and appends a single audit entry on success.
///
/// Row-level rejections never abort sibling rows; a failed bulk insert aborts
/// the whole import with no partial commit.
pub async fn import_students(
    db: &DatabaseConnection,
    teacher_id: i64,
    rows: Vec<RawStudentRow>,
) -> Result<ImportSummary, ServiceError> {
    let require_birth_date = common::config::import_require_birth_date();

    let mut valid = Vec::new();
    let mut errors = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        match validate_row(row, index + 1, require_birth_date) {
            Ok(new) => valid.push(new),
            Err(reason) => errors.push(reason),
        }
    }

    let success_count = valid.len();
    if !valid.is_empty() {
        let txn = db.begin().await?;
        Student::bulk_create(&txn, valid).await?;
        txn.commit().await?;

        activity_log::Model::record(
            db,
            teacher_id,
            &format!("Imported {success_count} students"),
        )
        .await;
    }

    Ok(ImportSummary {
        success_count,
        error_count: errors.len(),
        errors,
    })
}
