use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::services::ServiceError;

/// Account shape returned by the auth endpoints.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct UserResponse {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub email_verified: bool,
    pub created_at: String,
}

impl From<db::models::user::Model> for UserResponse {
    fn from(user: db::models::user::Model) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            role: user.role.to_string(),
            email_verified: user.email_verified,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Student shape shared by the roster endpoints and the public lookup.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct StudentResponse {
    pub id: i64,
    pub full_name: String,
    pub grade: i32,
    pub section: String,
    pub class_label: String,
    pub gender: String,
    pub nisn: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: String,
}

impl From<db::models::student::Model> for StudentResponse {
    fn from(s: db::models::student::Model) -> Self {
        let class_label = s.class_label();
        Self {
            id: s.id,
            full_name: s.full_name,
            grade: s.grade,
            section: s.section,
            class_label,
            gender: s.gender.to_string(),
            nisn: s.nisn,
            birth_date: s.birth_date,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

/// Parses a `YYYY-MM-DD` query parameter, naming the offending field.
pub fn parse_iso_date(raw: &str, field: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ServiceError::Validation(format!("{field} must be a YYYY-MM-DD date")))
}
