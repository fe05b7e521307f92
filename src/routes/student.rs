use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireRole, RequireSession};
use crate::models::dashboards::requests::SelectSubjectForm;
use crate::models::users::entities::UserRole;
use crate::services::StudentService;

static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);

pub async fn dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.dashboard(None, &req).await
}

pub async fn select_subject(
    req: HttpRequest,
    form: web::Form<SelectSubjectForm>,
) -> ActixResult<HttpResponse> {
    // an empty selection still reports an unknown subject
    let selected = form.into_inner().selected_subject.unwrap_or_default();
    STUDENT_SERVICE.dashboard(Some(selected), &req).await
}

pub fn configure_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/student_dashboard")
            .wrap(RequireRole::new(UserRole::Student))
            .wrap(RequireSession)
            .route(web::get().to(dashboard))
            .route(web::post().to(select_subject)),
    );
}
