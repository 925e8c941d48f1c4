pub mod m202601050001_create_users;
pub mod m202601050002_create_students;
pub mod m202601050003_create_attendance_records;
pub mod m202601050004_create_activity_logs;
pub mod m202601050005_create_auth_tokens;
