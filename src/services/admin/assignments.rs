use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use minijinja::context;
use tracing::{error, info};

use super::AdminService;
use crate::errors::{GradebookError, Result};
use crate::models::assignments::entities::{ASSIGNMENT_EXISTS, Assignment, TEACHER_NOT_QUALIFIED};
use crate::models::assignments::requests::{AssignAction, AssignTeacherForm};
use crate::models::classes::entities::Class;
use crate::models::subjects::entities::Subject;
use crate::models::users::entities::TeacherSummary;
use crate::services::parse_id;
use crate::storage::Storage;
use crate::views::{self, Flash};

pub const ASSIGNMENT_CREATED: &str = "Assignment successfully created.";
pub const INVALID_ACTION: &str = "Invalid action!";

const ASSIGN_PATH: &str = "/assign_teacher_to_class";

/// Second step of the assignment form
#[derive(Debug)]
pub struct AssignmentCandidates {
    pub class: Class,
    pub subject: Subject,
    pub teachers: Vec<TeacherSummary>,
}

/// Teachers who could take over an unassigned (class, subject) pair.
pub async fn assignment_candidates(
    storage: &dyn Storage,
    class_id: Option<i64>,
    subject_id: Option<i64>,
) -> Result<AssignmentCandidates> {
    let class = match class_id {
        Some(id) => storage.get_class_by_id(id).await?,
        None => None,
    }
    .ok_or_else(|| GradebookError::not_found("Selected class does not exist."))?;
    let subject = match subject_id {
        Some(id) => storage.get_subject_by_id(id).await?,
        None => None,
    }
    .ok_or_else(|| GradebookError::not_found("Selected subject does not exist."))?;

    if storage.find_assignment(class.id, subject.id).await?.is_some() {
        return Err(GradebookError::conflict(ASSIGNMENT_EXISTS));
    }

    let teachers = storage.list_qualified_teachers(subject.id).await?;
    Ok(AssignmentCandidates {
        class,
        subject,
        teachers,
    })
}

pub async fn save_assignment(
    storage: &dyn Storage,
    form: &AssignTeacherForm,
) -> Result<Assignment> {
    let class_id = parse_id(form.classes.as_deref())
        .ok_or_else(|| GradebookError::not_found("Selected class does not exist."))?;
    let subject_id = parse_id(form.subjects.as_deref())
        .ok_or_else(|| GradebookError::not_found("Selected subject does not exist."))?;
    let teacher_id = parse_id(form.teachers.as_deref())
        .ok_or_else(|| GradebookError::validation(TEACHER_NOT_QUALIFIED))?;

    storage
        .create_assignment(teacher_id, class_id, subject_id)
        .await
}

async fn form_lists(storage: &dyn Storage) -> Result<(Vec<Class>, Vec<Subject>)> {
    Ok((storage.list_classes().await?, storage.list_subjects().await?))
}

pub async fn handle_assign_page(
    service: &AdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match form_lists(storage.as_ref()).await {
        Ok((classes, subjects)) => views::render(
            request,
            "assign_teacher_to_class.html",
            context! { classes => classes, subjects => subjects },
        ),
        Err(e) => {
            error!("Failed to load assignment form: {}", e);
            Ok(views::redirect_with_error(request, "/admin_panel", &e))
        }
    }
}

pub async fn handle_assign(
    service: &AdminService,
    form: AssignTeacherForm,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let Ok(action) = form.action.parse::<AssignAction>() else {
        return Ok(views::redirect_with_flash(
            request,
            ASSIGN_PATH,
            Flash::error(INVALID_ACTION),
        ));
    };

    match action {
        AssignAction::Update => {
            let candidates = assignment_candidates(
                storage.as_ref(),
                parse_id(form.classes.as_deref()),
                parse_id(form.subjects.as_deref()),
            )
            .await;
            match candidates {
                Ok(candidates) => views::render(
                    request,
                    "assign_teacher_to_class_step2.html",
                    context! {
                        selected_class => candidates.class,
                        selected_subject => candidates.subject,
                        teachers => candidates.teachers,
                    },
                ),
                Err(e) => Ok(views::redirect_with_error(request, ASSIGN_PATH, &e)),
            }
        }
        AssignAction::Save => match save_assignment(storage.as_ref(), &form).await {
            Ok(assignment) => {
                info!(
                    "Teacher {} assigned to class {} for subject {}",
                    assignment.teacher_id, assignment.class_id, assignment.subject_id
                );
                Ok(views::redirect_with_flash(
                    request,
                    ASSIGN_PATH,
                    Flash::success(ASSIGNMENT_CREATED),
                ))
            }
            Err(e) => Ok(views::redirect_with_error(request, ASSIGN_PATH, &e)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_utils::{memory_storage, new_user, school};

    #[tokio::test]
    async fn test_candidates_for_free_pair() {
        let storage = memory_storage().await;
        let s = school(&storage).await;

        let candidates = assignment_candidates(&storage, Some(s.class_b), Some(s.physics))
            .await
            .unwrap();
        assert_eq!(candidates.class.name, "1B");
        let ids: Vec<_> = candidates.teachers.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![s.physics_teacher]);
    }

    #[tokio::test]
    async fn test_taken_pair_is_reported() {
        let storage = memory_storage().await;
        let s = school(&storage).await;

        let err = assignment_candidates(&storage, Some(s.class_a), Some(s.math))
            .await
            .unwrap_err();
        assert_eq!(err.message(), ASSIGNMENT_EXISTS);
    }

    #[tokio::test]
    async fn test_save_checks_qualification() {
        let storage = memory_storage().await;
        let s = school(&storage).await;
        let chemistry = storage.create_subject("Chemistry").await.unwrap();
        storage
            .create_teacher(new_user("olga@uw.edu.pl", "Olga", "Sowa"), chemistry.id)
            .await
            .unwrap();

        let form = AssignTeacherForm {
            action: "save".into(),
            classes: Some(s.class_b.to_string()),
            subjects: Some(chemistry.id.to_string()),
            teachers: Some(s.math_teacher.to_string()),
        };
        let err = save_assignment(&storage, &form).await.unwrap_err();
        assert_eq!(err.message(), TEACHER_NOT_QUALIFIED);
        assert!(
            storage
                .find_assignment(s.class_b, chemistry.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
