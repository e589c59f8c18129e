use axum::{Router, routing::get};

pub mod admin;
pub mod navigation;
pub mod permissions;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/permissions/:page_key", get(permissions::check))
        .route("/pages", get(permissions::accessible_pages))
        .route("/navigate", get(navigation::navigate))
        .nest("/admin", admin::router())
}
