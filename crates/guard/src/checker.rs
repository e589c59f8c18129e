use std::sync::Arc;

use agencyops_auth::{PageKey, PermissionError, Principal, Verdict};
use agencyops_infra::{PermissionService, PermissionStore};

/// The `checkPermission` seam the guard depends on.
///
/// Implemented by [`PermissionService`]; tests substitute scripted checkers.
#[async_trait::async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn check_permission(
        &self,
        principal: &Principal,
        page_key: &PageKey,
    ) -> Result<Verdict, PermissionError>;
}

#[async_trait::async_trait]
impl<S> PermissionChecker for PermissionService<S>
where
    S: PermissionStore,
{
    async fn check_permission(
        &self,
        principal: &Principal,
        page_key: &PageKey,
    ) -> Result<Verdict, PermissionError> {
        PermissionService::check_permission(self, principal, page_key).await
    }
}

#[async_trait::async_trait]
impl<C> PermissionChecker for Arc<C>
where
    C: PermissionChecker + ?Sized,
{
    async fn check_permission(
        &self,
        principal: &Principal,
        page_key: &PageKey,
    ) -> Result<Verdict, PermissionError> {
        (**self).check_permission(principal, page_key).await
    }
}
