pub mod admin;
pub mod assignments;
pub mod auth;
pub mod classes;
pub mod dashboards;
pub mod grades;
pub mod subjects;
pub mod users;

/// Process start time, used for startup diagnostics
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
