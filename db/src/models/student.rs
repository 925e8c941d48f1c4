use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents a pupil in the `students` table.
///
/// The section letter is derived from gender at write time (`L` fills the
/// `A` section, `P` the `B` section); callers never supply it directly.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    pub full_name: String,
    /// Grade level, one of 10, 11 or 12.
    pub grade: i32,
    /// Derived section letter, `A` or `B`.
    pub section: String,
    pub gender: Gender,
    /// National student number; unique when present.
    pub nisn: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Binary gender marker used on the national roster format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[strum(ascii_case_insensitive)]
pub enum Gender {
    #[sea_orm(string_value = "L")]
    L,

    #[sea_orm(string_value = "P")]
    P,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecord,
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A normalized insert record, as produced by row validation or the single
/// create/update forms.
#[derive(Clone, Debug, PartialEq)]
pub struct NewStudent {
    pub full_name: String,
    pub grade: i32,
    pub gender: Gender,
    pub nisn: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl NewStudent {
    fn into_active(self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            full_name: Set(self.full_name),
            grade: Set(self.grade),
            section: Set(section_for(self.gender).to_owned()),
            gender: Set(self.gender),
            nisn: Set(self.nisn),
            birth_date: Set(self.birth_date),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}

/// Section letter assignment: boys fill `A`, girls fill `B`.
pub fn section_for(gender: Gender) -> &'static str {
    match gender {
        Gender::L => "A",
        Gender::P => "B",
    }
}

/// Splits a composite class label such as `"10-A"` into its parts.
pub fn parse_class_label(label: &str) -> Option<(i32, String)> {
    let (grade, section) = label.split_once('-')?;
    let grade: i32 = grade.trim().parse().ok()?;
    let section = section.trim();
    if section.is_empty() {
        return None;
    }
    Some((grade, section.to_uppercase()))
}

impl Model {
    /// Composite class label, e.g. `"10-A"`.
    pub fn class_label(&self) -> String {
        format!("{}-{}", self.grade, self.section)
    }

    pub async fn create(db: &DatabaseConnection, new: NewStudent) -> Result<Model, DbErr> {
        new.into_active().insert(db).await
    }

    /// Inserts every row in one statement; used by the bulk import inside a
    /// transaction so a failure commits nothing.
    pub async fn bulk_create<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<NewStudent>,
    ) -> Result<(), DbErr> {
        if rows.is_empty() {
            return Ok(());
        }
        Entity::insert_many(rows.into_iter().map(NewStudent::into_active))
            .exec(conn)
            .await?;
        Ok(())
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i64,
        new: NewStudent,
    ) -> Result<Model, DbErr> {
        let student = ActiveModel {
            id: Set(id),
            full_name: Set(new.full_name),
            grade: Set(new.grade),
            section: Set(section_for(new.gender).to_owned()),
            gender: Set(new.gender),
            nisn: Set(new.nisn),
            birth_date: Set(new.birth_date),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        student.update(db).await
    }

    pub async fn delete(db: &DatabaseConnection, id: i64) -> Result<u64, DbErr> {
        let res = Entity::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected)
    }

    /// Roster for one class, ordered by name.
    pub async fn find_by_class(
        db: &DatabaseConnection,
        grade: i32,
        section: &str,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::Grade.eq(grade))
            .filter(Column::Section.eq(section))
            .order_by_asc(Column::FullName)
            .all(db)
            .await
    }

    pub async fn find_by_nisn(
        db: &DatabaseConnection,
        nisn: &str,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find().filter(Column::Nisn.eq(nisn)).all(db).await
    }

    /// Whole-string, case-insensitive name match, optionally narrowed by an
    /// exact birth date.
    pub async fn find_by_name_ci(
        db: &DatabaseConnection,
        full_name: &str,
        birth_date: Option<NaiveDate>,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = Entity::find().filter(
            Expr::expr(Func::lower(Expr::col(Column::FullName)))
                .eq(full_name.trim().to_lowercase()),
        );
        if let Some(birth_date) = birth_date {
            query = query.filter(Column::BirthDate.eq(birth_date));
        }
        query.all(db).await
    }

    /// Distinct class labels across the roster, sorted by grade then section.
    pub async fn distinct_class_labels(db: &DatabaseConnection) -> Result<Vec<String>, DbErr> {
        let pairs: Vec<(i32, String)> = Entity::find()
            .select_only()
            .column(Column::Grade)
            .column(Column::Section)
            .distinct()
            .order_by_asc(Column::Grade)
            .order_by_asc(Column::Section)
            .into_tuple()
            .all(db)
            .await?;

        Ok(pairs
            .into_iter()
            .map(|(grade, section)| format!("{grade}-{section}"))
            .collect())
    }
}
