//! `agencyops-guard`: route-level access control for the back office.
//!
//! A [`RouteGuard`] walks one navigation through
//! `Unauthenticated → CheckingAuth → CheckingPermission → {Granted, Denied, Redirecting}`
//! and publishes each state on a watch channel. The [`Navigator`] resolves
//! paths through the [`RouteTable`] and runs a fresh guard per navigation.

pub mod checker;
pub mod guard;
pub mod navigator;
pub mod principal_store;
pub mod routes;

pub use checker::PermissionChecker;
pub use guard::{
    DASHBOARD_FALLBACKS, DeniedAction, DenialReason, GuardOutcome, GuardState, RouteGuard,
};
pub use navigator::{Navigation, Navigator};
pub use principal_store::{PrincipalStore, Session};
pub use routes::{RouteEntry, RouteMatch, RouteTable};
