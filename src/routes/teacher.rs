use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireRole, RequireSession};
use crate::models::dashboards::requests::SelectClassForm;
use crate::models::grades::requests::EnterGradesForm;
use crate::models::users::entities::UserRole;
use crate::services::TeacherService;

static TEACHER_SERVICE: Lazy<TeacherService> = Lazy::new(TeacherService::new_lazy);

pub async fn dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.dashboard(None, &req).await
}

pub async fn select_class(
    req: HttpRequest,
    form: web::Form<SelectClassForm>,
) -> ActixResult<HttpResponse> {
    let selected = form.into_inner().selected_class.unwrap_or_default();
    TEACHER_SERVICE.dashboard(Some(selected), &req).await
}

pub async fn enter_grades_page(req: HttpRequest) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.enter_grades_page(&req).await
}

/// Student ids and grades arrive as repeated fields
pub async fn enter_grades(
    req: HttpRequest,
    form: web::Form<Vec<(String, String)>>,
) -> ActixResult<HttpResponse> {
    let form = EnterGradesForm::from_pairs(form.into_inner());
    TEACHER_SERVICE.enter_grades(form, &req).await
}

pub fn configure_teacher_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/teacher_dashboard")
            .wrap(RequireRole::new(UserRole::Teacher))
            .wrap(RequireSession)
            .route(web::get().to(dashboard))
            .route(web::post().to(select_class)),
    )
    .service(
        web::resource("/enter_grades")
            .wrap(RequireRole::new(UserRole::Teacher))
            .wrap(RequireSession)
            .route(web::get().to(enter_grades_page))
            .route(web::post().to(enter_grades)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::session::{SessionStore, session_cookie};
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::test_utils::{memory_storage, school};
    use actix_web::{App, http::StatusCode, http::header, test};
    use std::sync::Arc;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MokaCacheWrapper::with_limits(100, 600)))
    }

    #[actix_web::test]
    async fn test_grade_sheet_post_is_stored() {
        let storage = memory_storage().await;
        let school = school(&storage).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let sessions = store();
        let session = sessions
            .create(school.math_teacher, UserRole::Teacher, chrono::Utc::now())
            .await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(sessions.clone()))
                .configure(configure_teacher_routes),
        )
        .await;

        let class_id = school.class_a.to_string();
        let (anna, jan, zofia) = (
            school.anna.to_string(),
            school.jan.to_string(),
            school.zofia.to_string(),
        );
        let req = test::TestRequest::post()
            .uri("/enter_grades")
            .cookie(session_cookie(&session.id))
            .set_form(vec![
                ("gradeaction", "update2"),
                ("selectedClass", class_id.as_str()),
                ("weight", "0.5"),
                ("students[]", anna.as_str()),
                ("grades[]", "4"),
                ("students[]", jan.as_str()),
                ("grades[]", ""),
                ("students[]", zofia.as_str()),
                ("grades[]", "6"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/enter_grades");

        let stored: Vec<(i64, i32)> = storage
            .list_class_grades(school.class_a, Some(school.math))
            .await
            .unwrap()
            .into_iter()
            .map(|row| (row.student_id, row.value))
            .collect();
        assert_eq!(stored, vec![(school.anna, 4), (school.zofia, 6)]);

        let req = test::TestRequest::post()
            .uri("/teacher_dashboard")
            .cookie(session_cookie(&session.id))
            .set_form([("selected_class", class_id.as_str())])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("Class 1A"));
        assert!(html.contains("Zofia Wrona"));
    }

    #[actix_web::test]
    async fn test_student_is_sent_to_own_dashboard() {
        let storage: Arc<dyn Storage> = Arc::new(memory_storage().await);
        let sessions = store();
        let session = sessions.create(7, UserRole::Student, chrono::Utc::now()).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .app_data(web::Data::new(sessions))
                .configure(configure_teacher_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/teacher_dashboard")
            .cookie(session_cookie(&session.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/student_dashboard"
        );
    }
}
