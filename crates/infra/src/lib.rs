//! Infrastructure layer: permission tables, principal directory, the
//! `checkPermission` service and configuration.

pub mod config;
pub mod seed;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use service::{AccessiblePage, DEFAULT_LOOKUP_TIMEOUT, PermissionService};
pub use store::{PermissionStore, PrincipalDirectory, StoreError};
