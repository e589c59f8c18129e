use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;

use agencyops_guard::Navigation;

use crate::app::services::AppServices;
use crate::context::PrincipalContext;

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    pub path: String,
}

/// Run the route guard for `path` as the caller and report the outcome.
///
/// Always 200: denial, login and not-found are navigation results, not
/// transport errors.
pub async fn navigate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Query(query): Query<NavigateQuery>,
) -> Json<Navigation> {
    let navigator = services.navigator(ctx.token(), ctx.principal().clone());
    Json(navigator.navigate(&query.path).await)
}
