use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use agencyops_auth::PermissionError;
use agencyops_infra::StoreError;

/// Permission errors are denials: the body always carries `granted: false`.
pub fn permission_error_to_response(err: PermissionError) -> axum::response::Response {
    let status = match &err {
        PermissionError::UnknownPage(_) => StatusCode::NOT_FOUND,
        PermissionError::InactivePrincipal(_) => StatusCode::FORBIDDEN,
        PermissionError::LookupFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        PermissionError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
    };

    (
        status,
        axum::Json(json!({
            "error": err.code(),
            "message": err.to_string(),
            "granted": false,
            "canView": false,
            "canEdit": false,
            "canDelete": false,
        })),
    )
        .into_response()
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
        StoreError::Backend(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
