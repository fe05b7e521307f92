use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header, web};
use tracing::info;

use crate::middlewares::require_session::{LOGGED_OUT, session_id};
use crate::session::{Principal, SessionStore, removal_cookie};
use crate::views::flash::{self, Flash};

pub async fn handle_logout(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let location = match Principal::extract(request) {
        Some(principal) => {
            info!("User {} logged out", principal.user_id());
            principal.role().login_path()
        }
        None => "/",
    };

    if let (Some(id), Some(store)) = (
        session_id(request),
        request.app_data::<web::Data<SessionStore>>(),
    ) {
        store.destroy(&id).await;
    }

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(removal_cookie())
        .cookie(flash::flash_cookie(&[Flash::notice(LOGGED_OUT)]))
        .finish())
}
