use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, error::ErrorInternalServerError, web};
use minijinja::context;
use std::fmt;
use tracing::{error, info};

use super::AuthService;
use crate::errors::GradebookError;
use crate::models::auth::LoginForm;
use crate::models::users::entities::{User, UserRole};
use crate::session::{SessionStore, session_cookie};
use crate::storage::Storage;
use crate::utils::password::verify_password;
use crate::views::{self, Flash};

pub const EMAIL_NOT_FOUND: &str = "Email does not exist.";
pub const LOGGED_IN: &str = "Logged in successfully!";

#[derive(Debug)]
pub enum AuthFailure {
    EmailNotFound,
    /// Wrong password, or the account has another role
    InvalidCredentials(UserRole),
    Storage(GradebookError),
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::EmailNotFound => f.write_str(EMAIL_NOT_FOUND),
            AuthFailure::InvalidCredentials(role) => write!(
                f,
                "Incorrect password or you are not {}, try again.",
                role.with_article()
            ),
            AuthFailure::Storage(e) => write!(f, "{e}"),
        }
    }
}

/// Checks credentials for a login form of `expected_role`.
pub async fn authenticate(
    storage: &dyn Storage,
    email: &str,
    password: &str,
    expected_role: UserRole,
) -> Result<User, AuthFailure> {
    let user = storage
        .get_user_by_email(email.trim())
        .await
        .map_err(AuthFailure::Storage)?
        .ok_or(AuthFailure::EmailNotFound)?;

    if user.role == expected_role && verify_password(password, &user.password_hash) {
        Ok(user)
    } else {
        Err(AuthFailure::InvalidCredentials(expected_role))
    }
}

fn login_template(role: UserRole) -> String {
    format!("login_{role}.html")
}

pub async fn handle_login_page(role: UserRole, request: &HttpRequest) -> ActixResult<HttpResponse> {
    views::render(request, &login_template(role), context! {})
}

pub async fn handle_login(
    service: &AuthService,
    role: UserRole,
    form: LoginForm,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let user = match authenticate(storage.as_ref(), &form.email, &form.password, role).await {
        Ok(user) => user,
        Err(AuthFailure::Storage(e)) => {
            error!("Login lookup failed: {}", e);
            return Ok(views::redirect_with_error(request, role.login_path(), &e));
        }
        Err(failure) => {
            info!("Failed {} login for {}", role, form.email);
            return Ok(views::redirect_with_flash(
                request,
                role.login_path(),
                Flash::error(failure.to_string()),
            ));
        }
    };

    let store = request
        .app_data::<web::Data<SessionStore>>()
        .ok_or_else(|| ErrorInternalServerError("Session store unavailable"))?;
    let session = store.create(user.id, user.role, chrono::Utc::now()).await;
    info!("User {} logged in as {}", user.email, user.role);

    let mut response =
        views::redirect_with_flash(request, user.role.dashboard_path(), Flash::success(LOGGED_IN));
    response
        .add_cookie(&session_cookie(&session.id))
        .map_err(ErrorInternalServerError)?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_utils::memory_storage;
    use crate::utils::password::hash_password;
    use crate::models::users::entities::NewUser;

    async fn storage_with_teacher() -> crate::storage::sea_orm_storage::SeaOrmStorage {
        let storage = memory_storage().await;
        let math = storage.create_subject("Math").await.unwrap();
        storage
            .create_teacher(
                NewUser {
                    email: "anna.kowalska@uw.edu.pl".into(),
                    first_name: "Anna".into(),
                    second_name: "Kowalska".into(),
                    password_hash: hash_password("ak").unwrap(),
                },
                math.id,
            )
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn test_authenticate_teacher() {
        let storage = storage_with_teacher().await;
        let user = authenticate(&storage, "anna.kowalska@uw.edu.pl", "ak", UserRole::Teacher)
            .await
            .unwrap();
        assert_eq!(user.first_name, "Anna");
    }

    #[tokio::test]
    async fn test_wrong_role_reads_like_wrong_password() {
        let storage = storage_with_teacher().await;

        let wrong_role = authenticate(&storage, "anna.kowalska@uw.edu.pl", "ak", UserRole::Student)
            .await
            .unwrap_err();
        assert_eq!(
            wrong_role.to_string(),
            "Incorrect password or you are not a student, try again."
        );

        let wrong_password =
            authenticate(&storage, "anna.kowalska@uw.edu.pl", "nope", UserRole::Admin)
                .await
                .unwrap_err();
        assert_eq!(
            wrong_password.to_string(),
            "Incorrect password or you are not an admin, try again."
        );
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let storage = storage_with_teacher().await;
        let failure = authenticate(&storage, "ghost@uw.edu.pl", "x", UserRole::Teacher)
            .await
            .unwrap_err();
        assert!(matches!(failure, AuthFailure::EmailNotFound));
        assert_eq!(failure.to_string(), "Email does not exist.");
    }
}
