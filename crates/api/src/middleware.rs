use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use agencyops_infra::PrincipalDirectory;

use crate::context::PrincipalContext;
use crate::jwt::JwtValidator;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub directory: Arc<dyn PrincipalDirectory>,
}

/// Verify the bearer token and attach the subject's current principal.
///
/// Inactive principals are attached as they are; the permission layer
/// rejects them with `inactive_principal`.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?.to_string();

    let claims = state.jwt.validate(&token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        StatusCode::UNAUTHORIZED
    })?;

    let principal = state
        .directory
        .principal(claims.sub)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "principal directory unavailable");
            StatusCode::SERVICE_UNAVAILABLE
        })?
        .ok_or_else(|| {
            tracing::debug!(user_id = %claims.sub, "token subject not in directory");
            StatusCode::UNAUTHORIZED
        })?;

    req.extensions_mut()
        .insert(PrincipalContext::new(principal, token));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
