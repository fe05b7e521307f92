/*!
 * Session middleware
 *
 * Loads the session named by the session cookie and attaches a
 * [`Principal`] to the request. Must wrap every page that needs a login.
 *
 * - no session: redirect to the welcome page
 * - idle for longer than the configured timeout: the session is destroyed
 *   and the user is sent to their login page
 * - otherwise the last activity is refreshed and stored
 *
 * ```rust,ignore
 * web::scope("")
 *     .wrap(RequireRole::new(UserRole::Teacher))
 *     .wrap(RequireSession)
 *     .route("/teacher_dashboard", web::get().to(dashboard))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::session::{SessionStatus, SessionStore, removal_cookie};
use crate::views::flash::{self, Flash};

pub const LOGGED_OUT: &str = "You're logged out.";

#[derive(Clone, Default)]
pub struct RequireSession;

impl<S, B> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireSessionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSessionMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireSessionMiddleware<S> {
    service: Rc<S>,
}

fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

impl<S, B> Service<ServiceRequest> for RequireSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            let config = AppConfig::get();

            let Some(store) = req.app_data::<web::Data<SessionStore>>().cloned() else {
                error!("SessionStore missing from app data");
                return Ok(req.into_response(
                    HttpResponse::InternalServerError()
                        .finish()
                        .map_into_right_body(),
                ));
            };

            let session_id = req
                .cookie(&config.session.cookie_name)
                .map(|c| c.value().to_string());

            let session = match session_id {
                Some(id) => store.load(&id).await,
                None => None,
            };

            let Some(mut session) = session else {
                debug!("No session for {}, redirecting to welcome page", req.path());
                return Ok(req.into_response(redirect_to("/").map_into_right_body()));
            };

            let now = chrono::Utc::now();
            if session.status_at(now, config.session_idle_timeout()) == SessionStatus::Expired {
                info!("Session of user {} expired", session.user_id);
                store.destroy(&session.id).await;
                let response = HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, session.role.login_path()))
                    .cookie(removal_cookie())
                    .cookie(flash::flash_cookie(&[Flash::notice(LOGGED_OUT)]))
                    .finish();
                return Ok(req.into_response(response.map_into_right_body()));
            }

            session.touch(now);
            store.save(&session).await;
            req.extensions_mut().insert(session.principal());

            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}

/// Session id of the current request, if a cookie is present
pub fn session_id(req: &actix_web::HttpRequest) -> Option<String> {
    req.cookie(&AppConfig::get().session.cookie_name)
        .map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::models::users::entities::UserRole;
    use crate::session::{Principal, session_cookie};
    use actix_web::{App, HttpRequest, http::StatusCode, test};
    use std::sync::Arc;

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match Principal::extract(&req) {
            Some(p) => HttpResponse::Ok().body(format!("{}:{}", p.role(), p.user_id())),
            None => HttpResponse::Ok().body("nobody"),
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MokaCacheWrapper::with_limits(100, 600)))
    }

    #[actix_web::test]
    async fn test_without_session_redirects_to_welcome() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store()))
                .service(web::scope("").wrap(RequireSession).route("/me", web::get().to(whoami))),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[actix_web::test]
    async fn test_active_session_attaches_principal() {
        let store = store();
        let session = store.create(12, UserRole::Teacher, chrono::Utc::now()).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .service(web::scope("").wrap(RequireSession).route("/me", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .cookie(session_cookie(&session.id))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "teacher:12");

        let refreshed = store.load(&session.id).await.unwrap();
        assert!(refreshed.last_activity >= session.last_activity);
    }

    #[actix_web::test]
    async fn test_idle_session_forces_logout() {
        let store = store();
        let idle = AppConfig::get().session_idle_timeout() + chrono::Duration::seconds(1);
        let session = store
            .create(3, UserRole::Student, chrono::Utc::now() - idle)
            .await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .service(web::scope("").wrap(RequireSession).route("/me", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .cookie(session_cookie(&session.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/login_student"
        );
        assert!(store.load(&session.id).await.is_none());
    }
}
