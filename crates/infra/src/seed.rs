//! Default page catalog and role × page matrix.
//!
//! This provides a sensible default for development and tests; production
//! deployments manage the tables through the administrative interface.

use agencyops_auth::{Capabilities, Page, PageKey, Principal, Role, RolePermission, pages};
use agencyops_core::{ClientId, UserId};

use crate::store::{InMemoryPermissionStore, InMemoryPrincipalDirectory, StoreError};

/// Pages of the back office, in menu order.
pub fn default_page_catalog() -> Vec<Page> {
    vec![
        Page::new(pages::DASHBOARD, "Dashboard", "/dashboard"),
        Page::new(pages::CAMPAIGNS, "Campaigns", "/campaigns"),
        Page::new(pages::CLIENTS, "Clients", "/clients"),
        Page::new(pages::AD_ACCOUNTS, "Ad accounts", "/ad-accounts"),
        Page::new(pages::WORK_REPORTS, "Work reports", "/work-reports"),
        Page::new(pages::FINANCE, "Finance", "/finance"),
        Page::new(pages::SALARIES, "Salaries", "/salaries"),
        Page::new(pages::OWN_FARMING, "Own farming", "/own-farming"),
        Page::new(pages::FARMING_ACCOUNTS, "Farming accounts", "/farming-accounts"),
        Page::new(pages::MAIL, "Mail", "/mail"),
        Page::new(pages::NOTIFICATIONS, "Notifications", "/notifications"),
        Page::new(pages::ADMIN, "Administration", "/admin"),
    ]
}

/// Default capabilities of a role on a page (`None` = no row).
pub fn default_role_capabilities(role: Role, page: &PageKey) -> Option<Capabilities> {
    match role {
        // super_admin reaches `admin` through the bypass; everything else is
        // granted explicitly so the matrix stays the single source.
        Role::SuperAdmin | Role::Admin => Some(Capabilities::full()),
        Role::Manager => {
            if *page == pages::DASHBOARD || *page == pages::CLIENTS || *page == pages::FINANCE {
                Some(Capabilities::view_only())
            } else if *page == pages::CAMPAIGNS
                || *page == pages::AD_ACCOUNTS
                || *page == pages::WORK_REPORTS
                || *page == pages::FARMING_ACCOUNTS
            {
                Some(Capabilities::view_edit())
            } else {
                None
            }
        }
        // Employees land on their work reports; everything else is granted per
        // user through menu overrides.
        Role::User => {
            if *page == pages::WORK_REPORTS {
                Some(Capabilities::view_edit())
            } else {
                None
            }
        }
        Role::Client => {
            if *page == pages::DASHBOARD || *page == pages::CAMPAIGNS {
                Some(Capabilities::view_only())
            } else {
                None
            }
        }
    }
}

/// Fill an in-memory store with the default catalog and matrix.
pub fn seed_defaults(store: &InMemoryPermissionStore) -> Result<(), StoreError> {
    for page in default_page_catalog() {
        let page_id = page.id;
        let key = page.key.clone();
        store.upsert_page(page)?;

        for role in Role::ALL {
            if role == Role::SuperAdmin && key == pages::ADMIN {
                continue;
            }
            if let Some(caps) = default_role_capabilities(role, &key) {
                store.insert_role_permission(RolePermission::new(role, page_id, caps))?;
            }
        }
    }
    Ok(())
}

/// Register one active principal per role (development login).
///
/// The `client` principal is bound to a fresh client id.
pub fn seed_demo_principals(
    directory: &InMemoryPrincipalDirectory,
) -> Result<Vec<Principal>, StoreError> {
    let mut seeded = Vec::with_capacity(Role::ALL.len());
    for role in Role::ALL {
        let mut principal = Principal::new(UserId::new(), role);
        if role == Role::Client {
            principal = principal.with_client(ClientId::new());
        }
        directory.upsert(principal.clone())?;
        seeded.push(principal);
    }
    Ok(seeded)
}
