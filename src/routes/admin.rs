use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireRole, RequireSession};
use crate::models::assignments::requests::AssignTeacherForm;
use crate::models::subjects::requests::AddSubjectForm;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::AddUserForm;
use crate::services::AdminService;

static ADMIN_SERVICE: Lazy<AdminService> = Lazy::new(AdminService::new_lazy);

pub async fn admin_panel(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.panel(&req).await
}

pub async fn add_user_page(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.add_user_page(&req).await
}

pub async fn add_user(req: HttpRequest, form: web::Form<AddUserForm>) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.add_user(form.into_inner(), &req).await
}

pub async fn add_subject_page(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.add_subject_page(&req).await
}

pub async fn add_subject(
    req: HttpRequest,
    form: web::Form<AddSubjectForm>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.add_subject(form.into_inner(), &req).await
}

pub async fn assign_page(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.assign_page(&req).await
}

pub async fn assign(
    req: HttpRequest,
    form: web::Form<AssignTeacherForm>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.assign(form.into_inner(), &req).await
}

pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/admin_panel")
            .wrap(RequireRole::new(UserRole::Admin))
            .wrap(RequireSession)
            .route(web::get().to(admin_panel)),
    )
    .service(
        web::resource("/add_user")
            .wrap(RequireRole::new(UserRole::Admin))
            .wrap(RequireSession)
            .route(web::get().to(add_user_page))
            .route(web::post().to(add_user)),
    )
    .service(
        web::resource("/add_subject")
            .wrap(RequireRole::new(UserRole::Admin))
            .wrap(RequireSession)
            .route(web::get().to(add_subject_page))
            .route(web::post().to(add_subject)),
    )
    .service(
        web::resource("/assign_teacher_to_class")
            .wrap(RequireRole::new(UserRole::Admin))
            .wrap(RequireSession)
            .route(web::get().to(assign_page))
            .route(web::post().to(assign)),
    );
}
