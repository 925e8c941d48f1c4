use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{PaginatorTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One attendance event in the `attendance_records` table.
///
/// At most one record exists per `(student_id, date, period)`; saving the
/// same key again overwrites the status instead of duplicating the row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    /// Lesson period within the day, 1-based.
    pub period: i32,
    pub status: AttendanceStatus,
    /// The account that recorded (or last overwrote) this entry.
    pub teacher_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attendance statuses, stored with their roster-sheet spellings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[strum(ascii_case_insensitive)]
pub enum AttendanceStatus {
    /// Present.
    #[sea_orm(string_value = "Hadir")]
    Hadir,

    /// Sick.
    #[sea_orm(string_value = "Sakit")]
    Sakit,

    /// Excused absence.
    #[sea_orm(string_value = "Izin")]
    Izin,

    /// Unexcused absence.
    #[sea_orm(string_value = "Alfa")]
    Alfa,

    /// Asleep in class.
    #[sea_orm(string_value = "Tidur")]
    Tidur,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Student,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TeacherId",
        to = "super::user::Column::Id"
    )]
    Teacher,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// One row of a filled-in attendance sheet.
#[derive(Clone, Debug, Deserialize)]
pub struct SheetEntry {
    pub student_id: i64,
    pub status: AttendanceStatus,
}

impl Model {
    /// Upserts every sheet entry on the `(student_id, date, period)` key.
    ///
    /// Runs as one multi-row insert so it can participate in the caller's
    /// transaction; conflicting rows keep their `created_at`.
    pub async fn save_sheet<C: ConnectionTrait>(
        conn: &C,
        date: NaiveDate,
        period: i32,
        teacher_id: i64,
        entries: &[SheetEntry],
    ) -> Result<(), DbErr> {
        if entries.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let rows = entries.iter().map(|entry| ActiveModel {
            student_id: Set(entry.student_id),
            date: Set(date),
            period: Set(period),
            status: Set(entry.status),
            teacher_id: Set(teacher_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        });

        Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([Column::StudentId, Column::Date, Column::Period])
                    .update_columns([Column::Status, Column::TeacherId, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Events already recorded for one exact (date, period) across a roster.
    pub async fn for_session(
        db: &DatabaseConnection,
        date: NaiveDate,
        period: i32,
        student_ids: &[i64],
    ) -> Result<Vec<Model>, DbErr> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        Entity::find()
            .filter(Column::Date.eq(date))
            .filter(Column::Period.eq(period))
            .filter(Column::StudentId.is_in(student_ids.iter().copied()))
            .all(db)
            .await
    }

    /// Events inside `[start, end]`, optionally restricted to a roster.
    pub async fn in_range(
        db: &DatabaseConnection,
        student_ids: Option<&[i64]>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = Entity::find()
            .filter(Column::Date.gte(start))
            .filter(Column::Date.lte(end));

        if let Some(ids) = student_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.filter(Column::StudentId.is_in(ids.iter().copied()));
        }

        query
            .order_by_asc(Column::Date)
            .order_by_asc(Column::Period)
            .all(db)
            .await
    }

    /// Full history for one student, newest first.
    pub async fn for_student_newest_first(
        db: &DatabaseConnection,
        student_id: i64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::Date)
            .order_by_desc(Column::Period)
            .all(db)
            .await
    }

    /// `(total events, Hadir events)` recorded on one date.
    pub async fn stats_for_date(
        db: &DatabaseConnection,
        date: NaiveDate,
    ) -> Result<(u64, u64), DbErr> {
        let total = Entity::find()
            .filter(Column::Date.eq(date))
            .count(db)
            .await?;
        let present = Entity::find()
            .filter(Column::Date.eq(date))
            .filter(Column::Status.eq(AttendanceStatus::Hadir))
            .count(db)
            .await?;
        Ok((total, present))
    }
}
