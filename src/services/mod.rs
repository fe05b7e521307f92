pub mod admin;
pub mod auth;
pub mod students;
pub mod teachers;

pub use admin::AdminService;
pub use auth::AuthService;
pub use students::StudentService;
pub use teachers::TeacherService;

use actix_web::{HttpRequest, Result as ActixResult, error::ErrorInternalServerError, web};
use std::sync::Arc;

use crate::storage::Storage;

/// Storage registered as app data
pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            tracing::error!("Storage not found in app data");
            ErrorInternalServerError("Storage unavailable")
        })
}

/// Parses an id submitted by a select box
pub(crate) fn parse_id(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}
