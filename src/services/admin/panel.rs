use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use minijinja::context;
use tracing::error;

use super::AdminService;
use crate::models::admin::entities::AdminOverview;
use crate::views::{self, Flash};

pub async fn handle_panel(service: &AdminService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // views are read fresh on every visit
    let (overview, messages) = match storage.admin_overview().await {
        Ok(overview) => (overview, Vec::new()),
        Err(e) => {
            error!("Failed to read admin views: {}", e);
            (AdminOverview::default(), vec![Flash::error(e.flash_text())])
        }
    };

    views::render_with(
        request,
        "admin_panel.html",
        context! { overview => overview },
        messages,
    )
}
