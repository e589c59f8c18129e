//! Administrative diagnostics.
//!
//! Every endpoint requires a grant on the `admin` page.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use agencyops_auth::{PageKey, pages};
use agencyops_core::UserId;
use agencyops_infra::PrincipalDirectory;

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/permissions/explain/:page_key", get(explain))
}

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    /// Explain for another user instead of the caller.
    pub user_id: Option<String>,
}

async fn explain(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(page_key): Path<String>,
    Query(query): Query<ExplainQuery>,
) -> Response {
    match services
        .permissions
        .check_permission(ctx.principal(), &pages::ADMIN)
        .await
    {
        Ok(v) if v.granted => {}
        Ok(_) => {
            return errors::json_error(
                StatusCode::FORBIDDEN,
                "forbidden",
                "administrative console access required",
            );
        }
        Err(e) => return errors::permission_error_to_response(e),
    }

    let subject = match query.user_id.as_deref() {
        None => ctx.principal().clone(),
        Some(raw) => {
            let user_id: UserId = match raw.parse() {
                Ok(id) => id,
                Err(e) => {
                    return errors::json_error(
                        StatusCode::BAD_REQUEST,
                        "invalid_user_id",
                        format!("{e}"),
                    );
                }
            };
            match services.directory.principal(user_id).await {
                Ok(Some(p)) => p,
                Ok(None) => {
                    return errors::json_error(
                        StatusCode::NOT_FOUND,
                        "not_found",
                        format!("user {user_id} not found"),
                    );
                }
                Err(e) => return errors::store_error_to_response(e),
            }
        }
    };

    let page_key = PageKey::new(page_key);
    match services.permissions.explain(&subject, &page_key).await {
        Ok(decision) => Json(serde_json::json!({
            "user_id": subject.id.to_string(),
            "role": subject.role.as_str(),
            "decision": decision,
        }))
        .into_response(),
        Err(e) => errors::permission_error_to_response(e),
    }
}
