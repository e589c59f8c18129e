//! HTTP API: page permissions, menus and route navigation over axum.

pub mod app;
pub mod context;
pub mod jwt;
pub mod middleware;
