use crate::seed::Seeder;
use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use db::models::activity_log;
use db::models::attendance_record::{AttendanceStatus, Model, SheetEntry};
use db::models::student;
use db::models::user::Model as UserModel;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait};

pub struct AttendanceSeeder;

/// Weighted draw matching a plausible register: mostly present, a thin
/// tail of everything else.
fn draw_status() -> AttendanceStatus {
    match fastrand::u8(..100) {
        0..85 => AttendanceStatus::Hadir,
        85..90 => AttendanceStatus::Sakit,
        90..94 => AttendanceStatus::Izin,
        94..97 => AttendanceStatus::Alfa,
        _ => AttendanceStatus::Tidur,
    }
}

/// The most recent `count` weekdays, oldest first, ending today (or the
/// nearest earlier weekday).
fn recent_weekdays(count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut day = Utc::now().date_naive();
    while days.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        day = match day.checked_sub_days(Days::new(1)) {
            Some(prev) => prev,
            None => break,
        };
    }
    days.reverse();
    days
}

#[async_trait::async_trait]
impl Seeder for AttendanceSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        if db::models::AttendanceRecord::find().count(db).await? > 0 {
            return Ok(());
        }

        let Some(teacher) = UserModel::find_by_email(db, "ani@school.test").await? else {
            return Ok(());
        };

        let roster = student::Entity::find().all(db).await?;
        if roster.is_empty() {
            return Ok(());
        }

        for date in recent_weekdays(5) {
            for period in 1..=2 {
                let entries: Vec<SheetEntry> = roster
                    .iter()
                    .map(|s| SheetEntry {
                        student_id: s.id,
                        status: draw_status(),
                    })
                    .collect();

                Model::save_sheet(db, date, period, teacher.id, &entries).await?;
                activity_log::Model::record(
                    db,
                    teacher.id,
                    &format!(
                        "Recorded attendance for {} students on {} period {}",
                        entries.len(),
                        date,
                        period
                    ),
                )
                .await;
            }
        }

        Ok(())
    }
}
