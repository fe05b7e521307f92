use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use minijinja::context;
use tracing::{error, info};

use super::AdminService;
use crate::config::{AppConfig, Argon2Config, SchoolConfig};
use crate::errors::{GradebookError, Result};
use crate::models::users::entities::{NewUser, User, UserRole};
use crate::models::users::requests::AddUserForm;
use crate::services::parse_id;
use crate::storage::Storage;
use crate::utils::password::hash_password_with;
use crate::utils::validate::{check_word, validate_role_email};
use crate::views::{self, Flash};

pub const USER_ADDED: &str = "User added successfully.";
pub const INVALID_ROLE: &str = "Invalid role";
pub const INVALID_FIRST_NAME: &str =
    "Invalid First Name. First letter must be upper case and other letters lower case.";
pub const INVALID_SECOND_NAME: &str =
    "Invalid Second Name. First letter must be upper case and other letters lower case.";
pub const EMPTY_PASSWORD: &str = "Password must not be empty.";

const ADD_USER_PATH: &str = "/add_user";

/// Creates a student or a teacher from the admin form.
///
/// Only students and teachers can be added here; admins are seeded at
/// startup.
pub async fn create_user(
    storage: &dyn Storage,
    form: &AddUserForm,
    school: &SchoolConfig,
    argon2: &Argon2Config,
) -> Result<User> {
    let role = match form.role.parse::<UserRole>() {
        Ok(role @ (UserRole::Student | UserRole::Teacher)) => role,
        _ => return Err(GradebookError::validation(INVALID_ROLE)),
    };

    let email = form.email.trim();
    validate_role_email(role, email, school).map_err(GradebookError::validation)?;
    if !check_word(&form.first_name) {
        return Err(GradebookError::validation(INVALID_FIRST_NAME));
    }
    if !check_word(&form.second_name) {
        return Err(GradebookError::validation(INVALID_SECOND_NAME));
    }
    if form.password.is_empty() {
        return Err(GradebookError::validation(EMPTY_PASSWORD));
    }

    let user = NewUser {
        email: email.to_string(),
        first_name: form.first_name.clone(),
        second_name: form.second_name.clone(),
        password_hash: hash_password_with(&form.password, argon2)?,
    };

    match role {
        UserRole::Student => {
            let class_id = parse_id(form.classes.as_deref())
                .ok_or_else(|| GradebookError::validation("Selected class does not exist."))?;
            storage.create_student(user, class_id).await
        }
        _ => {
            let subject_id = parse_id(form.subjects.as_deref())
                .ok_or_else(|| GradebookError::validation("Selected subject does not exist."))?;
            storage.create_teacher(user, subject_id).await
        }
    }
}

pub async fn handle_add_user_page(
    service: &AdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let lists = async {
        let classes = storage.list_classes().await?;
        let subjects = storage.list_subjects().await?;
        Ok::<_, GradebookError>((classes, subjects))
    };
    match lists.await {
        Ok((classes, subjects)) => views::render(
            request,
            "add_user.html",
            context! { classes => classes, subjects => subjects },
        ),
        Err(e) => {
            error!("Failed to load add user form: {}", e);
            Ok(views::redirect_with_error(request, "/admin_panel", &e))
        }
    }
}

pub async fn handle_add_user(
    service: &AdminService,
    form: AddUserForm,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let config = AppConfig::get();

    match create_user(storage.as_ref(), &form, &config.school, &config.argon2).await {
        Ok(user) => {
            info!("Admin added {} {} ({})", user.role, user.email, user.id);
            Ok(views::redirect_with_flash(
                request,
                ADD_USER_PATH,
                Flash::success(USER_ADDED),
            ))
        }
        Err(e) => Ok(views::redirect_with_error(request, ADD_USER_PATH, &e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::EMAIL_EXISTS;
    use crate::storage::sea_orm_storage::test_utils::memory_storage;

    fn fast_argon2() -> Argon2Config {
        Argon2Config {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn form(role: &str, email: &str, first: &str, second: &str) -> AddUserForm {
        AddUserForm {
            role: role.into(),
            email: email.into(),
            first_name: first.into(),
            second_name: second.into(),
            password: "jn".into(),
            classes: None,
            subjects: None,
        }
    }

    #[tokio::test]
    async fn test_create_student_and_teacher() {
        let storage = memory_storage().await;
        let class = storage.create_class("1A", "Mathematics").await.unwrap();
        let subject = storage.create_subject("Math").await.unwrap();
        let school = SchoolConfig::default();

        let mut student = form("student", "jan@student.uw.edu.pl", "Jan", "Nowak");
        student.classes = Some(class.id.to_string());
        let user = create_user(&storage, &student, &school, &fast_argon2()).await.unwrap();
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(
            storage.get_student_class(user.id).await.unwrap().unwrap().id,
            class.id
        );

        let mut teacher = form("teacher", "ewa@uw.edu.pl", "Ewa", "Bąk");
        teacher.subjects = Some(subject.id.to_string());
        let user = create_user(&storage, &teacher, &school, &fast_argon2()).await.unwrap();
        assert_eq!(
            storage.get_teacher_subject(user.id).await.unwrap().unwrap().name,
            "Math"
        );
    }

    #[tokio::test]
    async fn test_validation_messages() {
        let storage = memory_storage().await;
        let school = SchoolConfig::default();
        let argon2 = fast_argon2();

        let cases = [
            (form("admin", "x@uw.edu.pl", "Jan", "Nowak"), INVALID_ROLE.to_string()),
            (form("janitor", "x@uw.edu.pl", "Jan", "Nowak"), INVALID_ROLE.to_string()),
            (
                form("student", "jan@uw.edu.pl", "Jan", "Nowak"),
                "Invalid email. Must be @student.uw.edu.pl.".to_string(),
            ),
            (
                form("teacher", "jan@student.uw.edu.pl.com", "Jan", "Nowak"),
                "Invalid email. Must be @uw.edu.pl.".to_string(),
            ),
            (form("student", "jan@student.uw.edu.pl", "jan", "Nowak"), INVALID_FIRST_NAME.to_string()),
            (form("student", "jan@student.uw.edu.pl", "Jan", "NOWAK"), INVALID_SECOND_NAME.to_string()),
        ];
        for (form, expected) in cases {
            let err = create_user(&storage, &form, &school, &argon2).await.unwrap_err();
            assert_eq!(err.message(), expected);
        }
        assert_eq!(storage.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let storage = memory_storage().await;
        let class = storage.create_class("1A", "Mathematics").await.unwrap();
        let school = SchoolConfig::default();

        let mut student = form("student", "jan@student.uw.edu.pl", "Jan", "Nowak");
        student.classes = Some(class.id.to_string());
        create_user(&storage, &student, &school, &fast_argon2()).await.unwrap();

        let err = create_user(&storage, &student, &school, &fast_argon2())
            .await
            .unwrap_err();
        assert_eq!(err.message(), EMAIL_EXISTS);
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_class_creates_nothing() {
        let storage = memory_storage().await;
        let mut student = form("student", "jan@student.uw.edu.pl", "Jan", "Nowak");
        student.classes = Some("42".into());

        let err = create_user(&storage, &student, &SchoolConfig::default(), &fast_argon2())
            .await
            .unwrap_err();
        assert!(matches!(err, GradebookError::NotFound(_)));
        assert!(
            storage
                .get_user_by_email("jan@student.uw.edu.pl")
                .await
                .unwrap()
                .is_none()
        );
    }
}
