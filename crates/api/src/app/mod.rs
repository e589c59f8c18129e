//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: permission service, principal directory and route table
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::jwt::Hs256JwtValidator;
use crate::middleware;

pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, InMemoryBackend, build_services};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: AppServices, jwt_secret: String) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState {
        jwt,
        directory: services.directory.clone(),
    };

    // Protected routes: require a valid token whose subject is a known principal.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(Extension(Arc::new(services)))
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            )),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
