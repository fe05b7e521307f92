/*!
 * Rate limiting
 *
 * Counts requests per client IP in a fixed window and answers
 * `429 Too Many Requests` once the limit is reached. Used on the login forms
 * to slow down password guessing.
 *
 * ```rust,ignore
 * web::resource("/login_student")
 *     .wrap(RateLimit::login())
 *     .route(web::get().to(page))
 *     .route(web::post().to(submit))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, StatusCode, header::CONTENT_TYPE},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::AppConfig;

static LOGIN_LIMIT: Lazy<RateLimit> = Lazy::new(|| {
    let config = &AppConfig::get().rate_limit;
    RateLimit::new(config.login_max_requests, config.login_window_secs)
        .with_prefix("login")
        .only(&[Method::POST])
});

#[derive(Clone)]
pub struct RateLimit {
    /// Requests allowed per window
    max_requests: u32,
    window_secs: u64,
    /// Separates the counters of different endpoints
    key_prefix: String,
    /// When set, only these methods are counted
    methods: Option<Vec<Method>>,
    counters: Cache<String, Window>,
}

/// Requests counted since `started`
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

impl Window {
    /// Counts a request at `now`.
    ///
    /// A window that has run for `length` is restarted. Returns the updated
    /// window, or the seconds until it ends when the limit is already reached.
    fn hit(
        current: Option<Window>,
        now: Instant,
        length: Duration,
        max_requests: u32,
    ) -> Result<Window, u64> {
        let window = match current {
            Some(window) if now.duration_since(window.started) < length => window,
            _ => Window { started: now, count: 0 },
        };
        if window.count >= max_requests {
            let left = length.saturating_sub(now.duration_since(window.started));
            return Err(left.as_secs().max(1));
        }
        Ok(Window {
            count: window.count + 1,
            ..window
        })
    }
}

impl RateLimit {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            key_prefix: String::new(),
            methods: None,
            // stale windows still in the cache are restarted by `Window::hit`
            counters: Cache::builder()
                .time_to_idle(Duration::from_secs(window_secs.max(1)))
                .max_capacity(100_000)
                .build(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// Count only requests with one of `methods`
    pub fn only(mut self, methods: &[Method]) -> Self {
        self.methods = Some(methods.to_vec());
        self
    }

    /// Login form submissions, limits from `[rate_limit]`.
    ///
    /// All login forms and all workers share one set of counters.
    pub fn login() -> Self {
        LOGIN_LIMIT.clone()
    }
}

/// Client IP of the request.
///
/// Behind a reverse proxy the proxy must set X-Forwarded-For or X-Real-IP.
fn extract_client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    if let Some(forwarded) = req.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    if let Some(real_ip) = req.headers().get("X-Real-IP")
        && let Ok(ip) = real_ip.to_str()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

fn is_valid_ip(ip: &str) -> bool {
    use std::net::IpAddr;
    ip.parse::<IpAddr>().is_ok()
}

fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .body("Too many attempts, please try again later.")
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let limit = self.limit.clone();

        Box::pin(async move {
            let counted = limit
                .methods
                .as_ref()
                .is_none_or(|methods| methods.contains(req.method()));
            if !counted {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            let identifier = format!("ip:{}", extract_client_ip(&req));
            let cache_key = if limit.key_prefix.is_empty() {
                identifier
            } else {
                format!("{}:{}", limit.key_prefix, identifier)
            };

            let current = limit.counters.get(&cache_key).await;
            let length = Duration::from_secs(limit.window_secs.max(1));

            match Window::hit(current, Instant::now(), length, limit.max_requests) {
                Ok(window) => limit.counters.insert(cache_key, window).await,
                Err(retry_after) => {
                    warn!(
                        "Rate limit exceeded for key: {} (limit: {})",
                        cache_key, limit.max_requests
                    );
                    return Ok(req.into_response(
                        create_rate_limit_response(retry_after).map_into_right_body(),
                    ));
                }
            }

            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_limit_applies_to_post_only() {
        let app = test::init_service(
            App::new().service(
                web::resource("/login_admin")
                    .wrap(RateLimit::new(2, 60).with_prefix("login").only(&[Method::POST]))
                    .route(web::get().to(ok))
                    .route(web::post().to(ok)),
            ),
        )
        .await;

        for _ in 0..2 {
            let req = test::TestRequest::post().uri("/login_admin").to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
        let req = test::TestRequest::post().uri("/login_admin").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );

        let req = test::TestRequest::get().uri("/login_admin").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_window_is_fixed() {
        let length = Duration::from_secs(60);
        let start = Instant::now();

        let first = Window::hit(None, start, length, 2).unwrap();
        let second = Window::hit(Some(first), start + Duration::from_secs(50), length, 2).unwrap();
        assert_eq!(second.started, start);
        assert_eq!(second.count, 2);

        // attempts inside the window do not push its end back
        let blocked = Window::hit(Some(second), start + Duration::from_secs(55), length, 2);
        assert_eq!(blocked.unwrap_err(), 5);

        let restarted =
            Window::hit(Some(second), start + Duration::from_secs(60), length, 2).unwrap();
        assert_eq!(restarted.count, 1);
        assert_eq!(restarted.started, start + Duration::from_secs(60));
    }

    #[actix_web::test]
    async fn test_valid_ip() {
        assert!(is_valid_ip("10.0.0.1"));
        assert!(is_valid_ip("::1"));
        assert!(!is_valid_ip("not-an-ip"));
    }
}
