use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RateLimit, RequireSession};
use crate::models::auth::LoginForm;
use crate::models::users::entities::UserRole;
use crate::services::AuthService;

static AUTH_SERVICE: Lazy<AuthService> = Lazy::new(AuthService::new_lazy);

pub async fn login_student_page(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login_page(UserRole::Student, &req).await
}

pub async fn login_student(req: HttpRequest, form: web::Form<LoginForm>) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .login(UserRole::Student, form.into_inner(), &req)
        .await
}

pub async fn login_teacher_page(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login_page(UserRole::Teacher, &req).await
}

pub async fn login_teacher(req: HttpRequest, form: web::Form<LoginForm>) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .login(UserRole::Teacher, form.into_inner(), &req)
        .await
}

pub async fn login_admin_page(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login_page(UserRole::Admin, &req).await
}

pub async fn login_admin(req: HttpRequest, form: web::Form<LoginForm>) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .login(UserRole::Admin, form.into_inner(), &req)
        .await
}

pub async fn logout(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.logout(&req).await
}

pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/login_student")
            .wrap(RateLimit::login())
            .route(web::get().to(login_student_page))
            .route(web::post().to(login_student)),
    )
    .service(
        web::resource("/login_teacher")
            .wrap(RateLimit::login())
            .route(web::get().to(login_teacher_page))
            .route(web::post().to(login_teacher)),
    )
    .service(
        web::resource("/login_admin")
            .wrap(RateLimit::login())
            .route(web::get().to(login_admin_page))
            .route(web::post().to(login_admin)),
    )
    .service(
        web::resource("/logout")
            .wrap(RequireSession)
            .route(web::get().to(logout))
            .route(web::post().to(logout)),
    );
}
