pub mod assignments;
pub mod panel;
pub mod subjects;
pub mod users;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assignments::requests::AssignTeacherForm;
use crate::models::subjects::requests::AddSubjectForm;
use crate::models::users::requests::AddUserForm;
use crate::storage::Storage;

pub struct AdminService {
    storage: Option<Arc<dyn Storage>>,
}

impl AdminService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn panel(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        panel::handle_panel(self, request).await
    }

    pub async fn add_user_page(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        users::handle_add_user_page(self, request).await
    }

    pub async fn add_user(
        &self,
        form: AddUserForm,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::handle_add_user(self, form, request).await
    }

    pub async fn add_subject_page(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        subjects::handle_add_subject_page(self, request).await
    }

    pub async fn add_subject(
        &self,
        form: AddSubjectForm,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        subjects::handle_add_subject(self, form, request).await
    }

    pub async fn assign_page(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        assignments::handle_assign_page(self, request).await
    }

    pub async fn assign(
        &self,
        form: AssignTeacherForm,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::handle_assign(self, form, request).await
    }
}
