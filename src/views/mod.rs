//! Server-rendered pages.
//!
//! Templates are embedded at build time and rendered with minijinja. Every
//! page receives the pending flash messages and the system name.

pub mod flash;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use minijinja::{Environment, Value, context};
use once_cell::sync::Lazy;
use rust_embed::Embed;
use tracing::error;

use crate::config::AppConfig;
use crate::errors::GradebookError;
pub use flash::{Flash, FlashCategory};

#[derive(Embed)]
#[folder = "templates/"]
struct Templates;

static ENVIRONMENT: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_loader(|name| {
        Ok(Templates::get(name).map(|file| String::from_utf8_lossy(&file.data).into_owned()))
    });
    env
});

/// Renders `template` with `ctx` into an HTML string.
pub fn render_to_string(template: &str, ctx: Value, flashes: &[Flash]) -> Result<String, GradebookError> {
    let config = AppConfig::get();
    let template = ENVIRONMENT.get_template(template)?;
    let html = template.render(context! {
        system_name => config.app.system_name.clone(),
        flashes => flashes,
        ..ctx
    })?;
    Ok(html)
}

/// Renders a page, consuming the flash messages carried by the request.
pub fn render(req: &HttpRequest, template: &str, ctx: Value) -> ActixResult<HttpResponse> {
    render_with(req, template, ctx, Vec::new())
}

/// Like [`render`], with extra messages raised while handling this request.
pub fn render_with(
    req: &HttpRequest,
    template: &str,
    ctx: Value,
    extra: Vec<Flash>,
) -> ActixResult<HttpResponse> {
    let pending = flash::pending(req);
    let had_pending = !pending.is_empty();
    let mut flashes = pending;
    flashes.extend(extra);

    match render_to_string(template, ctx, &flashes) {
        Ok(html) => {
            let mut response = HttpResponse::Ok();
            response.content_type("text/html; charset=utf-8");
            if had_pending {
                response.cookie(flash::removal_cookie());
            }
            Ok(response.body(html))
        }
        Err(e) => {
            error!("Failed to render {}: {}", template, e);
            Ok(HttpResponse::InternalServerError()
                .content_type("text/plain; charset=utf-8")
                .body("Internal server error"))
        }
    }
}

/// 303 redirect without a message
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// 303 redirect that shows `message` on the next page.
pub fn redirect_with_flash(req: &HttpRequest, location: &str, message: Flash) -> HttpResponse {
    let mut flashes = flash::pending(req);
    flashes.push(message);
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(flash::flash_cookie(&flashes))
        .finish()
}

/// Redirects with an error flash describing `err`.
///
/// Errors that are not meant for the user are logged and replaced by a
/// generic message.
pub fn redirect_with_error(req: &HttpRequest, location: &str, err: &GradebookError) -> HttpResponse {
    if !err.is_user_facing() {
        error!("{}", err.format_simple());
    }
    redirect_with_flash(req, location, Flash::error(err.flash_text()))
}
