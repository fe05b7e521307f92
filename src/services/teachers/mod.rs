pub mod dashboard;
pub mod grades;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::grades::requests::EnterGradesForm;
use crate::storage::Storage;

pub struct TeacherService {
    storage: Option<Arc<dyn Storage>>,
}

impl TeacherService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn dashboard(
        &self,
        selected_class: Option<String>,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        dashboard::handle_dashboard(self, selected_class, request).await
    }

    pub async fn enter_grades_page(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        grades::handle_enter_grades_page(self, request).await
    }

    pub async fn enter_grades(
        &self,
        form: EnterGradesForm,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grades::handle_enter_grades(self, form, request).await
    }
}
