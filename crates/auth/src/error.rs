use std::time::Duration;

use thiserror::Error;

use agencyops_core::UserId;

use crate::PageKey;

/// Why a permission question could not be answered with a verdict.
///
/// Every variant is non-fatal: callers at the route boundary map all of them
/// to a denial, but they stay distinguishable for audit logging.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// The page key is not registered (misconfigured route).
    #[error("unknown page '{0}'")]
    UnknownPage(PageKey),

    /// The principal's account is disabled.
    #[error("principal {0} is inactive")]
    InactivePrincipal(UserId),

    /// The backing permission store could not be read.
    #[error("permission lookup failed: {0}")]
    LookupFailure(String),

    /// The permission lookup did not finish in time.
    #[error("permission lookup timed out after {0:?}")]
    Timeout(Duration),
}

impl PermissionError {
    /// Stable machine-readable code (logs, HTTP bodies).
    pub fn code(&self) -> &'static str {
        match self {
            PermissionError::UnknownPage(_) => "unknown_page",
            PermissionError::InactivePrincipal(_) => "inactive_principal",
            PermissionError::LookupFailure(_) => "lookup_failure",
            PermissionError::Timeout(_) => "timeout",
        }
    }

    /// Whether the state of the permission tables is unknown, as opposed to
    /// known-and-denying.
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            PermissionError::LookupFailure(_) | PermissionError::Timeout(_)
        )
    }
}
