pub mod activity_log;
pub mod attendance_record;
pub mod auth_token;
pub mod student;
pub mod user;

pub use activity_log::Entity as ActivityLog;
pub use attendance_record::Entity as AttendanceRecord;
pub use auth_token::Entity as AuthToken;
pub use student::Entity as Student;
pub use user::Entity as User;
