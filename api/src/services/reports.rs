//! Attendance aggregation and export shaping.
//!
//! The aggregations always fetch roster and events separately and fold them
//! in memory, so a student with zero events in the window still appears with
//! all-zero counts instead of being dropped by an inner join.

use std::collections::HashMap;

use chrono::NaiveDate;
use db::models::attendance_record::{AttendanceStatus, Model as AttendanceRecord};
use db::models::student::{self, Model as Student};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder};
use serde::Serialize;

use crate::services::ServiceError;

/// Per-status event counts for one student.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusCounts {
    pub hadir: u32,
    pub sakit: u32,
    pub izin: u32,
    pub alfa: u32,
    pub tidur: u32,
    pub total: u32,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Hadir => self.hadir += 1,
            AttendanceStatus::Sakit => self.sakit += 1,
            AttendanceStatus::Izin => self.izin += 1,
            AttendanceStatus::Alfa => self.alfa += 1,
            AttendanceStatus::Tidur => self.tidur += 1,
        }
        self.total += 1;
    }

    /// Hadir share of all recorded events, one decimal; `None` with no events.
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(round1(self.hadir as f64 * 100.0 / self.total as f64))
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One roster member's folded counts over a report window.
#[derive(Debug, Clone, Serialize)]
pub struct StudentRecap {
    pub student_id: i64,
    pub full_name: String,
    pub class_label: String,
    pub counts: StatusCounts,
    /// `0.0` when the student has no events in the window.
    pub percentage: f64,
}

/// One row of the per-session sheet handed to the marking screen.
#[derive(Debug, Serialize)]
pub struct SheetRow {
    pub student_id: i64,
    pub full_name: String,
    pub nisn: Option<String>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Serialize)]
pub struct SessionSheet {
    pub class_label: String,
    pub date: NaiveDate,
    pub period: i32,
    pub entries: Vec<SheetRow>,
}

/// One attendance event joined with its student's name.
#[derive(Debug, Serialize)]
pub struct RecordRow {
    pub student_id: i64,
    pub full_name: String,
    pub date: NaiveDate,
    pub period: i32,
    pub status: AttendanceStatus,
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Default, Serialize)]
pub struct DashboardStats {
    pub total_students: u64,
    pub records_today: u64,
    pub present_today: u64,
    /// Hadir share of today's events, one decimal, `0.0` with none.
    pub attendance_rate_today: f64,
}

/// A shaped table for the client-side spreadsheet and PDF renderers.
///
/// Column order is the contract: both renderers consume `headers` and `rows`
/// positionally, so the two output formats stay consistent with each other.
#[derive(Debug, Serialize)]
pub struct ExportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

async fn roster_for(
    db: &DatabaseConnection,
    class_label: Option<&str>,
) -> Result<Vec<Student>, ServiceError> {
    match class_label {
        Some(label) => {
            let (grade, section) = student::parse_class_label(label).ok_or_else(|| {
                ServiceError::Validation(format!("unrecognized class label: {label}"))
            })?;
            Ok(Student::find_by_class(db, grade, &section).await?)
        }
        None => Ok(student::Entity::find()
            .order_by_asc(student::Column::FullName)
            .all(db)
            .await?),
    }
}

/// Builds the marking sheet for one (class, date, period) session.
///
/// Every roster member appears; students without a recorded event default to
/// `Hadir` so the teacher only has to mark the exceptions.
pub async fn session_sheet(
    db: &DatabaseConnection,
    class_label: &str,
    date: NaiveDate,
    period: i32,
) -> Result<SessionSheet, ServiceError> {
    let (grade, section) = student::parse_class_label(class_label).ok_or_else(|| {
        ServiceError::Validation(format!("unrecognized class label: {class_label}"))
    })?;

    let roster = Student::find_by_class(db, grade, &section).await?;
    let ids: Vec<i64> = roster.iter().map(|s| s.id).collect();
    let recorded = AttendanceRecord::for_session(db, date, period, &ids).await?;

    let by_student: HashMap<i64, AttendanceStatus> =
        recorded.into_iter().map(|r| (r.student_id, r.status)).collect();

    let entries = roster
        .into_iter()
        .map(|s| SheetRow {
            student_id: s.id,
            status: by_student
                .get(&s.id)
                .copied()
                .unwrap_or(AttendanceStatus::Hadir),
            full_name: s.full_name,
            nisn: s.nisn,
        })
        .collect();

    Ok(SessionSheet {
        class_label: format!("{grade}-{section}"),
        date,
        period,
        entries,
    })
}

/// Date-range aggregation: one recap per roster member, left-join semantics.
pub async fn summary(
    db: &DatabaseConnection,
    class_label: Option<&str>,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<StudentRecap>, ServiceError> {
    if end_date < start_date {
        return Err(ServiceError::Validation(
            "end_date must not precede start_date".into(),
        ));
    }

    let roster = roster_for(db, class_label).await?;
    let ids: Vec<i64> = roster.iter().map(|s| s.id).collect();
    let scope = class_label.is_some().then_some(ids.as_slice());
    let events = AttendanceRecord::in_range(db, scope, start_date, end_date).await?;

    let mut by_student: HashMap<i64, StatusCounts> = HashMap::new();
    for event in events {
        by_student.entry(event.student_id).or_default().add(event.status);
    }

    Ok(roster
        .into_iter()
        .map(|s| {
            let counts = by_student.get(&s.id).copied().unwrap_or_default();
            StudentRecap {
                student_id: s.id,
                class_label: s.class_label(),
                full_name: s.full_name,
                counts,
                percentage: counts.percentage().unwrap_or(0.0),
            }
        })
        .collect())
}

/// Raw events in range joined with student names, newest first.
pub async fn records(
    db: &DatabaseConnection,
    class_label: Option<&str>,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<RecordRow>, ServiceError> {
    if end_date < start_date {
        return Err(ServiceError::Validation(
            "end_date must not precede start_date".into(),
        ));
    }

    let roster = roster_for(db, class_label).await?;
    let names: HashMap<i64, String> =
        roster.iter().map(|s| (s.id, s.full_name.clone())).collect();
    let ids: Vec<i64> = roster.iter().map(|s| s.id).collect();
    let scope = class_label.is_some().then_some(ids.as_slice());

    let mut events = AttendanceRecord::in_range(db, scope, start_date, end_date).await?;
    events.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.period.cmp(&a.period)));

    Ok(events
        .into_iter()
        .filter_map(|e| {
            names.get(&e.student_id).map(|name| RecordRow {
                student_id: e.student_id,
                full_name: name.clone(),
                date: e.date,
                period: e.period,
                status: e.status,
            })
        })
        .collect())
}

/// Today's headline numbers for the dashboard cards.
pub async fn dashboard_stats(db: &DatabaseConnection) -> Result<DashboardStats, ServiceError> {
    let today = chrono::Utc::now().date_naive();
    let total_students = student::Entity::find().count(db).await?;
    let (records_today, present_today) = AttendanceRecord::stats_for_date(db, today).await?;

    let attendance_rate_today = if records_today == 0 {
        0.0
    } else {
        round1(present_today as f64 * 100.0 / records_today as f64)
    };

    Ok(DashboardStats {
        total_students,
        records_today,
        present_today,
        attendance_rate_today,
    })
}

/// Summary recaps in the fixed export column order.
pub fn summary_table(
    recaps: &[StudentRecap],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> ExportTable {
    ExportTable {
        title: format!("Rekap Absensi {start_date} s.d. {end_date}"),
        headers: [
            "Nama Siswa",
            "Kelas",
            "Hadir",
            "Sakit",
            "Izin",
            "Alfa",
            "Total Pertemuan",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect(),
        rows: recaps
            .iter()
            .map(|r| {
                vec![
                    r.full_name.clone(),
                    r.class_label.clone(),
                    r.counts.hadir.to_string(),
                    r.counts.sakit.to_string(),
                    r.counts.izin.to_string(),
                    r.counts.alfa.to_string(),
                    r.counts.total.to_string(),
                ]
            })
            .collect(),
    }
}

/// Raw records in the fixed export column order.
pub fn records_table(
    rows: &[RecordRow],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> ExportTable {
    ExportTable {
        title: format!("Data Absensi {start_date} s.d. {end_date}"),
        headers: ["Nama Siswa", "Tanggal", "Jam Ke-", "Status"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.full_name.clone(),
                    r.date.to_string(),
                    r.period.to_string(),
                    r.status.to_string(),
                ]
            })
            .collect(),
    }
}

/// Serializes a shaped table as RFC 4180 CSV.
pub fn to_csv(table: &ExportTable) -> String {
    let mut out = String::new();
    out.push_str(
        &table
            .headers
            .iter()
            .map(|h| esc(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    out.push('\n');
    for row in &table.rows {
        out.push_str(&row.iter().map(|c| esc(c)).collect::<Vec<_>>().join(","));
        out.push('\n');
    }
    out
}

fn esc(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(hadir: u32, sakit: u32, izin: u32, alfa: u32, tidur: u32) -> StatusCounts {
        let mut c = StatusCounts::default();
        for _ in 0..hadir {
            c.add(AttendanceStatus::Hadir);
        }
        for _ in 0..sakit {
            c.add(AttendanceStatus::Sakit);
        }
        for _ in 0..izin {
            c.add(AttendanceStatus::Izin);
        }
        for _ in 0..alfa {
            c.add(AttendanceStatus::Alfa);
        }
        for _ in 0..tidur {
            c.add(AttendanceStatus::Tidur);
        }
        c
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        let c = counts(2, 1, 0, 0, 0);
        assert_eq!(c.percentage(), Some(66.7));

        let c = counts(1, 0, 0, 0, 2);
        assert_eq!(c.percentage(), Some(33.3));
    }

    #[test]
    fn percentage_is_none_with_no_events() {
        assert_eq!(StatusCounts::default().percentage(), None);
    }

    #[test]
    fn summary_table_keeps_the_fixed_column_order() {
        let recap = StudentRecap {
            student_id: 1,
            full_name: "Budi".into(),
            class_label: "10-A".into(),
            counts: counts(3, 1, 0, 0, 1),
            percentage: 60.0,
        };
        let table = summary_table(
            &[recap],
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );

        assert_eq!(
            table.headers,
            vec!["Nama Siswa", "Kelas", "Hadir", "Sakit", "Izin", "Alfa", "Total Pertemuan"]
        );
        assert_eq!(table.rows[0], vec!["Budi", "10-A", "3", "1", "0", "0", "5"]);
    }

    #[test]
    fn records_table_keeps_the_fixed_column_order() {
        let row = RecordRow {
            student_id: 1,
            full_name: "Siti".into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            period: 3,
            status: AttendanceStatus::Izin,
        };
        let table = records_table(
            &[row],
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );

        assert_eq!(table.headers, vec!["Nama Siswa", "Tanggal", "Jam Ke-", "Status"]);
        assert_eq!(table.rows[0], vec!["Siti", "2025-03-02", "3", "Izin"]);
    }

    #[test]
    fn csv_quotes_fields_that_need_it() {
        let table = ExportTable {
            title: "t".into(),
            headers: vec!["a".into(), "b".into()],
            rows: vec![vec!["plain".into(), "needs, \"quoting\"".into()]],
        };
        assert_eq!(
            to_csv(&table),
            "a,b\nplain,\"needs, \"\"quoting\"\"\"\n"
        );
    }
}
