use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, QuerySelect};
use serde::Serialize;

/// Append-only audit trail of teacher actions.
///
/// Rows are never updated or deleted; the feed reads them newest first.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The acting account.
    pub user_id: i64,
    /// Human-readable description of what happened.
    pub action: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Appends one audit entry.
    ///
    /// A failed history write never fails the operation it records, so this
    /// swallows errors after logging them.
    pub async fn record(db: &DatabaseConnection, user_id: i64, action: &str) {
        let entry = ActiveModel {
            user_id: Set(user_id),
            action: Set(action.to_owned()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        if let Err(err) = entry.insert(db).await {
            tracing::warn!("failed to append activity log entry: {err}");
        }
    }

    /// The most recent entries with their actors, newest first.
    pub async fn latest(
        db: &DatabaseConnection,
        limit: u64,
    ) -> Result<Vec<(Model, Option<super::user::Model>)>, DbErr> {
        Entity::find()
            .find_also_related(super::user::Entity)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(db)
            .await
    }
}
