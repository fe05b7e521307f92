pub mod login;
pub mod logout;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::auth::LoginForm;
use crate::models::users::entities::UserRole;
use crate::storage::Storage;

pub use login::{AuthFailure, authenticate};

pub struct AuthService {
    storage: Option<Arc<dyn Storage>>,
}

impl AuthService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn login_page(&self, role: UserRole, request: &HttpRequest) -> ActixResult<HttpResponse> {
        login::handle_login_page(role, request).await
    }

    pub async fn login(
        &self,
        role: UserRole,
        form: LoginForm,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        login::handle_login(self, role, form, request).await
    }

    pub async fn logout(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        logout::handle_logout(request).await
    }
}
