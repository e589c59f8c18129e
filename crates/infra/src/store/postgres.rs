//! Postgres-backed permission tables and principal directory.
//!
//! ## Schema
//!
//! `SCHEMA` creates the four tables the core reads. They are owned by the
//! administrative interface; this module never writes to them outside of
//! `ensure_schema`.
//!
//! - `pages`: one row per page key (`page_key` is unique), `sort_order` gives
//!   the catalog order used for menus.
//! - `role_permissions`: primary key `(role, page_id)`, so at most one row per
//!   role per page.
//! - `user_menu_permissions`: primary key `user_id`, one boolean per menu key.
//! - `users`: role, active flag and optional client binding per user.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use agencyops_auth::{
    Capabilities, Page, PageKey, Principal, Role, RolePermission, UserMenuPermission,
};
use agencyops_core::{ClientId, PageId, UserId};

use super::{PermissionStore, PrincipalDirectory, StoreError};

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS pages (
    id UUID PRIMARY KEY,
    page_key TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    path TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    sort_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS role_permissions (
    role TEXT NOT NULL,
    page_id UUID NOT NULL REFERENCES pages (id) ON DELETE CASCADE,
    can_view BOOLEAN NOT NULL DEFAULT FALSE,
    can_edit BOOLEAN NOT NULL DEFAULT FALSE,
    can_delete BOOLEAN NOT NULL DEFAULT FALSE,
    PRIMARY KEY (role, page_id)
);

CREATE TABLE IF NOT EXISTS user_menu_permissions (
    user_id UUID PRIMARY KEY,
    own_farming BOOLEAN NOT NULL DEFAULT FALSE,
    farming_accounts BOOLEAN NOT NULL DEFAULT FALSE,
    mail BOOLEAN NOT NULL DEFAULT FALSE,
    notifications BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    role TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    client_id UUID NULL
);
"#;

fn parse_role(raw: &str) -> Result<Role, StoreError> {
    raw.parse::<Role>()
        .map_err(|e| StoreError::Backend(e.to_string()))
}

fn page_from_row(row: &PgRow) -> Result<Page, StoreError> {
    Ok(Page {
        id: PageId::from_uuid(row.try_get::<uuid::Uuid, _>("id")?),
        key: PageKey::new(row.try_get::<String, _>("page_key")?),
        display_name: row.try_get("display_name")?,
        path: row.try_get("path")?,
        is_active: row.try_get("is_active")?,
    })
}

fn role_permission_from_row(row: &PgRow) -> Result<RolePermission, StoreError> {
    Ok(RolePermission {
        role: parse_role(&row.try_get::<String, _>("role")?)?,
        page_id: PageId::from_uuid(row.try_get::<uuid::Uuid, _>("page_id")?),
        capabilities: Capabilities {
            can_view: row.try_get("can_view")?,
            can_edit: row.try_get("can_edit")?,
            can_delete: row.try_get("can_delete")?,
        },
    })
}

/// Postgres-backed permission tables.
///
/// Uses the SQLx connection pool (thread-safe, cheap to clone).
#[derive(Debug, Clone)]
pub struct PostgresPermissionStore {
    pool: PgPool,
}

impl PostgresPermissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the permission and user tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PermissionStore for PostgresPermissionStore {
    async fn page_by_key(&self, key: &PageKey) -> Result<Option<Page>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, page_key, display_name, path, is_active
            FROM pages
            WHERE page_key = $1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(page_from_row).transpose()
    }

    async fn list_pages(&self) -> Result<Vec<Page>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, page_key, display_name, path, is_active
            FROM pages
            ORDER BY sort_order ASC, page_key ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(page_from_row).collect()
    }

    async fn role_permission(
        &self,
        role: Role,
        page_id: PageId,
    ) -> Result<Option<RolePermission>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT role, page_id, can_view, can_edit, can_delete
            FROM role_permissions
            WHERE role = $1 AND page_id = $2
            "#,
        )
        .bind(role.as_str())
        .bind(page_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(role_permission_from_row).transpose()
    }

    async fn role_permissions(&self, role: Role) -> Result<Vec<RolePermission>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT role, page_id, can_view, can_edit, can_delete
            FROM role_permissions
            WHERE role = $1
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(role_permission_from_row).collect()
    }

    async fn user_menu_permission(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserMenuPermission>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, own_farming, farming_accounts, mail, notifications
            FROM user_menu_permissions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(UserMenuPermission {
            user_id: UserId::from_uuid(row.try_get::<uuid::Uuid, _>("user_id")?),
            own_farming: row.try_get("own_farming")?,
            farming_accounts: row.try_get("farming_accounts")?,
            mail: row.try_get("mail")?,
            notifications: row.try_get("notifications")?,
        }))
    }
}

/// Postgres-backed principal directory (`users` table).
#[derive(Debug, Clone)]
pub struct PostgresPrincipalDirectory {
    pool: PgPool,
}

impl PostgresPrincipalDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PrincipalDirectory for PostgresPrincipalDirectory {
    async fn principal(&self, user_id: UserId) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, role, is_active, client_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Principal {
            id: UserId::from_uuid(row.try_get::<uuid::Uuid, _>("id")?),
            role: parse_role(&row.try_get::<String, _>("role")?)?,
            is_active: row.try_get("is_active")?,
            client_id: row
                .try_get::<Option<uuid::Uuid>, _>("client_id")?
                .map(ClientId::from_uuid),
        }))
    }
}
