//! Read-only access to the permission tables and the principal directory.
//!
//! The tables are owned by the administrative interface; the core only reads
//! them. Writers on the in-memory implementations exist for seeding and tests.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use thiserror::Error;

use agencyops_auth::{Page, PageKey, Principal, Role, RolePermission, UserMenuPermission};
use agencyops_core::{PageId, UserId};

pub use in_memory::{InMemoryPermissionStore, InMemoryPrincipalDirectory};
pub use postgres::{PostgresPermissionStore, PostgresPrincipalDirectory};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store cannot be reached (connection refused, lock poisoned, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with an error or with malformed data.
    #[error("backend error: {0}")]
    Backend(String),

    /// A uniqueness rule would be broken by a write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(value.to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Page, role-permission and user-override tables.
#[async_trait::async_trait]
pub trait PermissionStore: Send + Sync {
    async fn page_by_key(&self, key: &PageKey) -> Result<Option<Page>, StoreError>;

    /// All pages in catalog order (active and inactive).
    async fn list_pages(&self) -> Result<Vec<Page>, StoreError>;

    async fn role_permission(
        &self,
        role: Role,
        page_id: PageId,
    ) -> Result<Option<RolePermission>, StoreError>;

    /// Every row of one role (batch variant for menu listings).
    async fn role_permissions(&self, role: Role) -> Result<Vec<RolePermission>, StoreError>;

    async fn user_menu_permission(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserMenuPermission>, StoreError>;
}

#[async_trait::async_trait]
impl<S> PermissionStore for Arc<S>
where
    S: PermissionStore + ?Sized,
{
    async fn page_by_key(&self, key: &PageKey) -> Result<Option<Page>, StoreError> {
        (**self).page_by_key(key).await
    }

    async fn list_pages(&self) -> Result<Vec<Page>, StoreError> {
        (**self).list_pages().await
    }

    async fn role_permission(
        &self,
        role: Role,
        page_id: PageId,
    ) -> Result<Option<RolePermission>, StoreError> {
        (**self).role_permission(role, page_id).await
    }

    async fn role_permissions(&self, role: Role) -> Result<Vec<RolePermission>, StoreError> {
        (**self).role_permissions(role).await
    }

    async fn user_menu_permission(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserMenuPermission>, StoreError> {
        (**self).user_menu_permission(user_id).await
    }
}

/// Source of truth for principals (role, active flag, client binding).
#[async_trait::async_trait]
pub trait PrincipalDirectory: Send + Sync {
    async fn principal(&self, user_id: UserId) -> Result<Option<Principal>, StoreError>;
}

#[async_trait::async_trait]
impl<S> PrincipalDirectory for Arc<S>
where
    S: PrincipalDirectory + ?Sized,
{
    async fn principal(&self, user_id: UserId) -> Result<Option<Principal>, StoreError> {
        (**self).principal(user_id).await
    }
}
