use std::collections::HashMap;
use std::sync::RwLock;

use agencyops_auth::{Page, PageKey, Principal, Role, RolePermission, UserMenuPermission};
use agencyops_core::{PageId, UserId};

use super::{PermissionStore, PrincipalDirectory, StoreError};

fn poisoned() -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}

/// In-memory permission tables for tests/dev.
///
/// Enforces the same uniqueness rules as the relational schema: one page per
/// key, one row per `(role, page)`, one override row per user.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    pages: RwLock<Vec<Page>>,
    role_permissions: RwLock<HashMap<(Role, PageId), RolePermission>>,
    menu_permissions: RwLock<HashMap<UserId, UserMenuPermission>>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a page, or replace the page with the same id.
    ///
    /// A different page already using the key is a conflict.
    pub fn upsert_page(&self, page: Page) -> Result<(), StoreError> {
        let mut pages = self.pages.write().map_err(|_| poisoned())?;

        if pages.iter().any(|p| p.key == page.key && p.id != page.id) {
            return Err(StoreError::Conflict(format!(
                "page key '{}' already registered",
                page.key
            )));
        }

        match pages.iter_mut().find(|p| p.id == page.id) {
            Some(existing) => *existing = page,
            None => pages.push(page),
        }
        Ok(())
    }

    pub fn set_page_active(&self, key: &PageKey, is_active: bool) -> Result<(), StoreError> {
        let mut pages = self.pages.write().map_err(|_| poisoned())?;
        let page = pages
            .iter_mut()
            .find(|p| p.key == *key)
            .ok_or_else(|| StoreError::NotFound(format!("page '{key}'")))?;
        page.is_active = is_active;
        Ok(())
    }

    /// Insert a new `(role, page)` row; an existing row is a conflict.
    pub fn insert_role_permission(&self, row: RolePermission) -> Result<(), StoreError> {
        let mut rows = self.role_permissions.write().map_err(|_| poisoned())?;
        let key = (row.role, row.page_id);
        if rows.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "permission row for role '{}' and page {} already exists",
                row.role, row.page_id
            )));
        }
        rows.insert(key, row);
        Ok(())
    }

    /// Insert or replace the `(role, page)` row.
    pub fn upsert_role_permission(&self, row: RolePermission) -> Result<(), StoreError> {
        let mut rows = self.role_permissions.write().map_err(|_| poisoned())?;
        rows.insert((row.role, row.page_id), row);
        Ok(())
    }

    pub fn remove_role_permission(&self, role: Role, page_id: PageId) -> Result<(), StoreError> {
        let mut rows = self.role_permissions.write().map_err(|_| poisoned())?;
        rows.remove(&(role, page_id));
        Ok(())
    }

    /// Insert or replace the single override row of a user.
    pub fn upsert_user_menu_permission(&self, row: UserMenuPermission) -> Result<(), StoreError> {
        let mut rows = self.menu_permissions.write().map_err(|_| poisoned())?;
        rows.insert(row.user_id, row);
        Ok(())
    }

    /// Page id for a key (seeding helper).
    pub fn page_id(&self, key: &PageKey) -> Result<PageId, StoreError> {
        let pages = self.pages.read().map_err(|_| poisoned())?;
        pages
            .iter()
            .find(|p| p.key == *key)
            .map(|p| p.id)
            .ok_or_else(|| StoreError::NotFound(format!("page '{key}'")))
    }
}

#[async_trait::async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn page_by_key(&self, key: &PageKey) -> Result<Option<Page>, StoreError> {
        let pages = self.pages.read().map_err(|_| poisoned())?;
        Ok(pages.iter().find(|p| p.key == *key).cloned())
    }

    async fn list_pages(&self) -> Result<Vec<Page>, StoreError> {
        let pages = self.pages.read().map_err(|_| poisoned())?;
        Ok(pages.clone())
    }

    async fn role_permission(
        &self,
        role: Role,
        page_id: PageId,
    ) -> Result<Option<RolePermission>, StoreError> {
        let rows = self.role_permissions.read().map_err(|_| poisoned())?;
        Ok(rows.get(&(role, page_id)).cloned())
    }

    async fn role_permissions(&self, role: Role) -> Result<Vec<RolePermission>, StoreError> {
        let rows = self.role_permissions.read().map_err(|_| poisoned())?;
        Ok(rows
            .values()
            .filter(|row| row.role == role)
            .cloned()
            .collect())
    }

    async fn user_menu_permission(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserMenuPermission>, StoreError> {
        let rows = self.menu_permissions.read().map_err(|_| poisoned())?;
        Ok(rows.get(&user_id).cloned())
    }
}

/// In-memory principal directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPrincipalDirectory {
    inner: RwLock<HashMap<UserId, Principal>>,
}

impl InMemoryPrincipalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, principal: Principal) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(principal.id, principal);
        Ok(())
    }

    /// Flip the active flag of a known principal.
    pub fn set_active(&self, user_id: UserId, is_active: bool) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let principal = map
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))?;
        principal.is_active = is_active;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PrincipalDirectory for InMemoryPrincipalDirectory {
    async fn principal(&self, user_id: UserId) -> Result<Option<Principal>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&user_id).cloned())
    }
}
