//! `agencyops-auth`: pure page-permission model and resolver.
//!
//! This crate is intentionally decoupled from HTTP and storage: callers fetch
//! the relevant rows and hand them to [`resolve`] / [`explain`].

pub mod claims;
pub mod error;
pub mod menu;
pub mod page;
pub mod permissions;
pub mod principal;
pub mod resolve;
pub mod roles;
pub mod verdict;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use error::PermissionError;
pub use menu::{MenuKey, UserMenuPermission};
pub use page::{Page, PageKey, pages};
pub use permissions::{Capabilities, RolePermission};
pub use principal::Principal;
pub use resolve::{PermissionFacts, explain, is_super_admin_bypass, resolve};
pub use roles::Role;
pub use verdict::{Decision, DecisionBasis, Verdict};
