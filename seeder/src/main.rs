use migration::Migrator;
use sea_orm_migration::MigratorTrait;

use crate::seed::{Seeder, run_seeder};
use crate::seeds::{attendance::AttendanceSeeder, student::StudentSeeder, user::UserSeeder};

mod seed;
mod seeds;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let db = db::connect().await;

    // Seeding needs the full schema, so pending migrations run first.
    Migrator::up(&db, None).await.expect("Migrations failed");

    for (seeder, name) in [
        (Box::new(UserSeeder) as Box<dyn Seeder + Send + Sync>, "User"),
        (Box::new(StudentSeeder), "Student"),
        (Box::new(AttendanceSeeder), "Attendance"),
    ] {
        run_seeder(&*seeder, name, &db).await;
    }
}
