use crate::seed::Seeder;
use db::models::user::{Model, Role};
use fake::{Fake, faker::internet::en::SafeEmail, faker::name::en::Name};
use sea_orm::{DatabaseConnection, DbErr};

pub struct UserSeeder;

/// Recreating a fixed account on a re-run is a no-op.
async fn ensure_account(
    db: &DatabaseConnection,
    full_name: &str,
    email: &str,
    role: Role,
) -> Result<Model, DbErr> {
    if let Some(existing) = Model::find_by_email(db, email).await? {
        return Ok(existing);
    }

    let created = Model::create(db, full_name, email, "password123", role).await?;
    Model::mark_email_verified(db, created.id).await?;
    Ok(created)
}

#[async_trait::async_trait]
impl Seeder for UserSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        // Fixed teacher account
        ensure_account(db, "Ibu Ani Wijaya", "ani@school.test", Role::Teacher).await?;

        // Fixed parent account; holds a valid token but is turned away by
        // the teacher guard.
        ensure_account(db, "Bapak Joko Susilo", "joko@family.test", Role::Parent).await?;

        // Random staff, left unverified so the verification flow has
        // something to act on.
        for _ in 0..3 {
            let full_name: String = Name().fake();
            let email: String = SafeEmail().fake();
            let _ = Model::create(db, &full_name, &email, "password123", Role::Teacher).await;
        }

        Ok(())
    }
}
