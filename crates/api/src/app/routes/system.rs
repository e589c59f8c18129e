use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(ctx): Extension<PrincipalContext>) -> impl IntoResponse {
    let principal = ctx.principal();
    Json(serde_json::json!({
        "user_id": principal.id.to_string(),
        "role": principal.role.as_str(),
        "is_active": principal.is_active,
        "client_id": principal.client_id.map(|id| id.to_string()),
    }))
}
