//! Welcome page and embedded static assets

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use minijinja::context;
use rust_embed::Embed;
use std::path::Path;

use crate::views;

/// Compiled in from `static/`
#[derive(Embed)]
#[folder = "static/"]
struct StaticAssets;

fn get_mime_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    match ext {
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

pub async fn welcome(req: HttpRequest) -> ActixResult<HttpResponse> {
    views::render(&req, "welcome.html", context! {})
}

pub async fn serve_static(req: HttpRequest) -> ActixResult<HttpResponse> {
    let path = req.match_info().query("file").trim_start_matches('/');

    match StaticAssets::get(path) {
        Some(file) => Ok(HttpResponse::Ok()
            .content_type(get_mime_type(path))
            .insert_header(("Cache-Control", "public, max-age=3600"))
            .body(file.data.into_owned())),
        None => Ok(HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body("Not found")),
    }
}

pub fn configure_frontend_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(welcome))
        .route("/static/{file:.*}", web::get().to(serve_static));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};

    #[actix_web::test]
    async fn test_get_mime_type() {
        assert_eq!(get_mime_type("style.css"), "text/css; charset=utf-8");
        assert_eq!(get_mime_type("logo.png"), "image/png");
        assert_eq!(get_mime_type("unknown.xyz"), "application/octet-stream");
    }

    #[actix_web::test]
    async fn test_static_and_welcome() {
        let app = test::init_service(App::new().configure(configure_frontend_routes)).await;

        let req = test::TestRequest::get().uri("/static/style.css").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/static/missing.css").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("/login_student"));
    }
}
