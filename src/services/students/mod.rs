pub mod dashboard;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    /// Dashboard of the logged in student, optionally with a subject picked
    pub async fn dashboard(
        &self,
        selected_subject: Option<String>,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        dashboard::handle_dashboard(self, selected_subject, request).await
    }
}
