use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use agencyops_auth::{PageKey, Verdict};

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

/// `checkPermission(pageKey)` for the caller.
pub async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(page_key): Path<String>,
) -> Response {
    let page_key = PageKey::new(page_key);
    match services
        .permissions
        .check_permission(ctx.principal(), &page_key)
        .await
    {
        Ok(verdict) => Json(verdict).into_response(),
        Err(e) => errors::permission_error_to_response(e),
    }
}

#[derive(Debug, Serialize)]
struct MenuEntry {
    page_key: PageKey,
    display_name: String,
    path: String,
    #[serde(flatten)]
    verdict: Verdict,
}

/// Menu entries the caller may open, in catalog order.
pub async fn accessible_pages(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Response {
    match services.permissions.accessible_pages(ctx.principal()).await {
        Ok(pages) => {
            let entries: Vec<MenuEntry> = pages
                .into_iter()
                .map(|p| MenuEntry {
                    page_key: p.page.key,
                    display_name: p.page.display_name,
                    path: p.page.path,
                    verdict: p.verdict,
                })
                .collect();
            Json(entries).into_response()
        }
        Err(e) => errors::permission_error_to_response(e),
    }
}
