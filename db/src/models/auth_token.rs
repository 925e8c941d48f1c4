use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::IntoActiveModel;
use sea_orm::PaginatorTrait;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Single-use, expiring tokens backing the email verification and password
/// reset flows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auth_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

/// What an issued token is good for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TokenKind {
    #[sea_orm(string_value = "verify_email")]
    VerifyEmail,

    #[sea_orm(string_value = "password_reset")]
    PasswordReset,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
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
    pub fn new(user_id: i64, kind: TokenKind, expiry_minutes: i64) -> Self {
        let token = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect::<String>();

        Self {
            id: 0,
            user_id,
            token,
            kind,
            expires_at: Utc::now() + Duration::minutes(expiry_minutes),
            used: false,
            created_at: Utc::now(),
        }
    }

    pub async fn create(
        db: &DatabaseConnection,
        user_id: i64,
        kind: TokenKind,
        expiry_minutes: i64,
    ) -> Result<Self, DbErr> {
        let model = Self::new(user_id, kind, expiry_minutes);
        let mut active_model = model.into_active_model();
        active_model.id = NotSet;
        active_model.insert(db).await
    }

    /// Finds an unexpired, unused token of the given kind.
    pub async fn find_valid_token(
        db: &DatabaseConnection,
        token: &str,
        kind: TokenKind,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::Token.eq(token))
            .filter(Column::Kind.eq(kind))
            .filter(Column::Used.eq(false))
            .filter(Column::ExpiresAt.gt(Utc::now()))
            .one(db)
            .await
    }

    pub async fn mark_as_used(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let mut active_model: ActiveModel = self.clone().into();
        active_model.used = Set(true);
        active_model.update(db).await?;
        Ok(())
    }

    /// How many tokens of this kind were issued to the user after `since`;
    /// drives the reset-request rate limit.
    pub async fn issued_since(
        db: &DatabaseConnection,
        user_id: i64,
        kind: TokenKind,
        since: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Kind.eq(kind))
            .filter(Column::CreatedAt.gte(since))
            .count(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Model as UserModel, Role};
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn tokens_are_single_use() {
        let db = setup_test_db().await;
        let user = UserModel::create(&db, "Guru", "guru@school.test", "pw123456", Role::Teacher)
            .await
            .unwrap();

        let token = Model::create(&db, user.id, TokenKind::VerifyEmail, 60)
            .await
            .unwrap();
        assert_eq!(token.token.len(), 32);

        let found = Model::find_valid_token(&db, &token.token, TokenKind::VerifyEmail)
            .await
            .unwrap();
        assert!(found.is_some());

        found.unwrap().mark_as_used(&db).await.unwrap();
        let again = Model::find_valid_token(&db, &token.token, TokenKind::VerifyEmail)
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn kinds_do_not_cross_over() {
        let db = setup_test_db().await;
        let user = UserModel::create(&db, "Guru", "guru@school.test", "pw123456", Role::Teacher)
            .await
            .unwrap();

        let token = Model::create(&db, user.id, TokenKind::PasswordReset, 15)
            .await
            .unwrap();
        let as_verify = Model::find_valid_token(&db, &token.token, TokenKind::VerifyEmail)
            .await
            .unwrap();
        assert!(as_verify.is_none());
    }

    #[tokio::test]
    async fn issued_since_counts_only_recent_tokens_of_kind() {
        let db = setup_test_db().await;
        let user = UserModel::create(&db, "Guru", "guru@school.test", "pw123456", Role::Teacher)
            .await
            .unwrap();

        for _ in 0..3 {
            Model::create(&db, user.id, TokenKind::PasswordReset, 15)
                .await
                .unwrap();
        }
        Model::create(&db, user.id, TokenKind::VerifyEmail, 60)
            .await
            .unwrap();

        let hour_ago = Utc::now() - Duration::hours(1);
        let count = Model::issued_since(&db, user.id, TokenKind::PasswordReset, hour_ago)
            .await
            .unwrap();
        assert_eq!(count, 3);
    }
}
