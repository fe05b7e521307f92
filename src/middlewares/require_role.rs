/*!
 * Role gate
 *
 * Must be used inside [`RequireSession`](super::RequireSession), which
 * attaches the [`Principal`]. A principal of another role is sent to their
 * own dashboard instead of getting an error page.
 *
 * ```rust,ignore
 * web::scope("")
 *     .wrap(RequireRole::new(UserRole::Admin))
 *     .wrap(RequireSession)
 *     .route("/admin_panel", web::get().to(admin_panel))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::users::entities::UserRole;
use crate::session::Principal;

#[derive(Clone)]
pub struct RequireRole {
    required_role: UserRole,
}

impl RequireRole {
    pub fn new(role: UserRole) -> Self {
        Self {
            required_role: role,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_role: self.required_role,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_role: UserRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let required_role = self.required_role;

        Box::pin(async move {
            let location = match Principal::extract(req.request()) {
                Some(principal) if principal.role() == required_role => {
                    let res = srv.call(req).await?.map_into_left_body();
                    return Ok(res);
                }
                Some(principal) => {
                    info!(
                        "User {} ({}) is not allowed on {}, sending to own dashboard",
                        principal.user_id(),
                        principal.role(),
                        req.path()
                    );
                    principal.role().dashboard_path()
                }
                None => {
                    info!("Role check without a principal; is RequireSession applied?");
                    "/"
                }
            };

            let response = HttpResponse::SeeOther()
                .insert_header((header::LOCATION, location))
                .finish();
            Ok(req.into_response(response.map_into_right_body()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpMessage, http::StatusCode, test, web};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().body("admin page")
    }

    /// Attaches a principal named by the `x-role` header, standing in for the
    /// session middleware.
    macro_rules! app_with_gate {
        ($role:expr, $path:literal) => {
            test::init_service(
                App::new().service(
                    web::scope("")
                        .wrap(RequireRole::new($role))
                        .wrap_fn(|req, srv| {
                            let role = req
                                .headers()
                                .get("x-role")
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.parse::<UserRole>().ok());
                            if let Some(role) = role {
                                req.extensions_mut().insert(Principal::new(role, 5));
                            }
                            srv.call(req)
                        })
                        .route($path, web::get().to(ok)),
                ),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_other_role_goes_to_own_dashboard() {
        let app = app_with_gate!(UserRole::Admin, "/admin_panel");

        let req = test::TestRequest::get()
            .uri("/admin_panel")
            .insert_header(("x-role", "student"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/student_dashboard"
        );

        let req = test::TestRequest::get()
            .uri("/admin_panel")
            .insert_header(("x-role", "admin"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_missing_principal_goes_home() {
        let app = app_with_gate!(UserRole::Teacher, "/teacher_dashboard");
        let req = test::TestRequest::get().uri("/teacher_dashboard").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }
}
