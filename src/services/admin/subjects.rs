use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use minijinja::context;
use tracing::{error, info};

use super::AdminService;
use crate::errors::{GradebookError, Result};
use crate::models::subjects::entities::{SUBJECT_EXISTS, Subject};
use crate::models::subjects::requests::AddSubjectForm;
use crate::storage::Storage;
use crate::utils::validate::check_word;
use crate::views::{self, Flash};

pub const SUBJECT_ADDED: &str = "Subject added successfully.";
pub const INVALID_SUBJECT_NAME: &str =
    "Invalid subject name. First letter must be upper case and other letters lower case.";

const ADD_SUBJECT_PATH: &str = "/add_subject";

pub async fn create_subject(storage: &dyn Storage, name: &str) -> Result<Subject> {
    let name = name.trim();
    if !check_word(name) {
        return Err(GradebookError::validation(INVALID_SUBJECT_NAME));
    }
    if storage.get_subject_by_name(name).await?.is_some() {
        return Err(GradebookError::conflict(SUBJECT_EXISTS));
    }
    storage.create_subject(name).await
}

pub async fn handle_add_subject_page(
    service: &AdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.admin_overview().await {
        Ok(overview) => views::render(
            request,
            "add_subject.html",
            context! { subjects => overview.subjects },
        ),
        Err(e) => {
            error!("Failed to read subject view: {}", e);
            Ok(views::redirect_with_error(request, "/admin_panel", &e))
        }
    }
}

pub async fn handle_add_subject(
    service: &AdminService,
    form: AddSubjectForm,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match create_subject(storage.as_ref(), &form.newsubject).await {
        Ok(subject) => {
            info!("Subject {} created", subject.name);
            Ok(views::redirect_with_flash(
                request,
                ADD_SUBJECT_PATH,
                Flash::success(SUBJECT_ADDED),
            ))
        }
        Err(e) => Ok(views::redirect_with_error(request, ADD_SUBJECT_PATH, &e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_utils::memory_storage;

    #[tokio::test]
    async fn test_create_subject() {
        let storage = memory_storage().await;
        let subject = create_subject(&storage, "Chemistry").await.unwrap();
        assert_eq!(subject.name, "Chemistry");

        let err = create_subject(&storage, "Chemistry").await.unwrap_err();
        assert_eq!(err.message(), SUBJECT_EXISTS);

        let err = create_subject(&storage, "chemistry").await.unwrap_err();
        assert_eq!(err.message(), INVALID_SUBJECT_NAME);

        assert_eq!(storage.list_subjects().await.unwrap().len(), 1);
    }
}
