use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents an account in the `users` table.
///
/// Teachers sign in to the management surface; parent accounts exist as data
/// but are rejected at login (the parent portal is unauthenticated).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name shown in the activity feed.
    pub full_name: String,
    /// Unique email address, also the login identifier.
    pub email: String,
    /// Argon2id password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role deciding access to the management surface.
    pub role: Role,
    /// Whether the verification link for this email was followed.
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account roles, stored as lowercase strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "teacher")]
    Teacher,

    #[sea_orm(string_value = "parent")]
    Parent,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("No RelationDef implemented")
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn hash_password(password: &str) -> Result<String, DbErr> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DbErr::Custom(format!("password hashing failed: {e}")))?
            .to_string())
    }

    pub fn verify_password(&self, password: &str) -> bool {
        let parsed = match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub async fn create(
        db: &DatabaseConnection,
        full_name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let user = ActiveModel {
            full_name: Set(full_name.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(Self::hash_password(password)?),
            role: Set(role),
            email_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        user.insert(db).await
    }

    pub async fn find_by_email(
        db: &DatabaseConnection,
        email: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Email.eq(email))
            .one(db)
            .await
    }

    pub async fn mark_email_verified(db: &DatabaseConnection, user_id: i64) -> Result<(), DbErr> {
        let user = ActiveModel {
            id: Set(user_id),
            email_verified: Set(true),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        user.update(db).await?;
        Ok(())
    }

    pub async fn update_password(
        db: &DatabaseConnection,
        user_id: i64,
        new_password: &str,
    ) -> Result<(), DbErr> {
        let user = ActiveModel {
            id: Set(user_id),
            password_hash: Set(Self::hash_password(new_password)?),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        user.update(db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn password_round_trip_verifies_and_rejects() {
        let db = setup_test_db().await;
        let user = Model::create(&db, "Ibu Ani", "ani@school.test", "rahasia123", Role::Teacher)
            .await
            .unwrap();

        assert!(user.verify_password("rahasia123"));
        assert!(!user.verify_password("rahasia124"));
        assert_ne!(user.password_hash, "rahasia123");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_by_the_unique_index() {
        let db = setup_test_db().await;
        Model::create(&db, "A", "dup@school.test", "pw123456", Role::Teacher)
            .await
            .unwrap();
        let second = Model::create(&db, "B", "dup@school.test", "pw123456", Role::Teacher).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn mark_email_verified_flips_the_flag() {
        let db = setup_test_db().await;
        let user = Model::create(&db, "Pak Budi", "budi@school.test", "pw123456", Role::Teacher)
            .await
            .unwrap();
        assert!(!user.email_verified);

        Model::mark_email_verified(&db, user.id).await.unwrap();
        let reloaded = Entity::find_by_id(user.id).one(&db).await.unwrap().unwrap();
        assert!(reloaded.email_verified);
    }
}
