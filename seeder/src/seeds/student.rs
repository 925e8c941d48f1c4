use crate::seed::Seeder;
use chrono::NaiveDate;
use db::models::activity_log;
use db::models::student::{Gender, Model, NewStudent};
use db::models::user::Model as UserModel;
use sea_orm::{DatabaseConnection, DbErr};

pub struct StudentSeeder;

const FIRST_NAMES_L: &[&str] = &[
    "Agus", "Bambang", "Dedi", "Eko", "Fajar", "Gilang", "Hendra", "Irfan", "Rizky", "Yusuf",
];
const FIRST_NAMES_P: &[&str] = &[
    "Ayu", "Dewi", "Fitri", "Indah", "Lestari", "Nabila", "Putri", "Ratna", "Sari", "Wulan",
];
const LAST_NAMES: &[&str] = &[
    "Santoso", "Wijaya", "Saputra", "Hidayat", "Pratama", "Utami", "Susanto", "Kurniawan",
    "Rahayu", "Maulana",
];

fn pick(pool: &[&'static str]) -> &'static str {
    pool[fastrand::usize(..pool.len())]
}

fn birth_date_for(grade: i32) -> Option<NaiveDate> {
    let year = match grade {
        10 => 2008,
        11 => 2007,
        _ => 2006,
    };
    NaiveDate::from_ymd_opt(year, fastrand::u32(1..=12), fastrand::u32(1..=28))
}

#[async_trait::async_trait]
impl Seeder for StudentSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        // Already seeded once; the roster is left alone.
        if !Model::distinct_class_labels(db).await?.is_empty() {
            return Ok(());
        }

        let mut rows = vec![
            NewStudent {
                full_name: "Budi Santoso".to_owned(),
                grade: 10,
                gender: Gender::L,
                nisn: Some("0051234567".to_owned()),
                birth_date: NaiveDate::from_ymd_opt(2008, 5, 1),
            },
            NewStudent {
                full_name: "Siti Rahayu".to_owned(),
                grade: 10,
                gender: Gender::P,
                nisn: Some("0052345678".to_owned()),
                birth_date: NaiveDate::from_ymd_opt(2008, 3, 2),
            },
            // Two students sharing a name, so the public lookup has an
            // ambiguous case to demonstrate.
            NewStudent {
                full_name: "Ahmad Fauzi".to_owned(),
                grade: 11,
                gender: Gender::L,
                nisn: Some("0041234567".to_owned()),
                birth_date: NaiveDate::from_ymd_opt(2007, 8, 17),
            },
            NewStudent {
                full_name: "Ahmad Fauzi".to_owned(),
                grade: 11,
                gender: Gender::L,
                nisn: None,
                birth_date: NaiveDate::from_ymd_opt(2007, 11, 9),
            },
        ];

        let mut serial = 0;
        for grade in [10, 11, 12] {
            for gender in [Gender::L, Gender::P] {
                for _ in 0..6 {
                    let first = match gender {
                        Gender::L => pick(FIRST_NAMES_L),
                        Gender::P => pick(FIRST_NAMES_P),
                    };
                    let nisn = (serial % 5 != 0).then(|| format!("006{serial:07}"));
                    serial += 1;

                    rows.push(NewStudent {
                        full_name: format!("{first} {}", pick(LAST_NAMES)),
                        grade,
                        gender,
                        nisn,
                        birth_date: birth_date_for(grade),
                    });
                }
            }
        }

        let count = rows.len();
        Model::bulk_create(db, rows).await?;

        if let Some(teacher) = UserModel::find_by_email(db, "ani@school.test").await? {
            activity_log::Model::record(db, teacher.id, &format!("Imported {count} students"))
                .await;
        }

        Ok(())
    }
}
