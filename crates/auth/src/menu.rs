//! Per-user menu overrides.
//!
//! Overrides are an allow-list: a `true` flag widens access to one menu
//! surface for one user, a `false` flag never takes anything away.

use serde::{Deserialize, Serialize};

use agencyops_core::UserId;

use crate::page::{PageKey, pages};

/// Menu surfaces that can be hand-granted per user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKey {
    OwnFarming,
    FarmingAccounts,
    Mail,
    Notifications,
}

impl MenuKey {
    pub const ALL: [MenuKey; 4] = [
        MenuKey::OwnFarming,
        MenuKey::FarmingAccounts,
        MenuKey::Mail,
        MenuKey::Notifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MenuKey::OwnFarming => "own_farming",
            MenuKey::FarmingAccounts => "farming_accounts",
            MenuKey::Mail => "mail",
            MenuKey::Notifications => "notifications",
        }
    }

    /// The page this menu entry opens.
    pub fn page_key(&self) -> PageKey {
        match self {
            MenuKey::OwnFarming => pages::OWN_FARMING,
            MenuKey::FarmingAccounts => pages::FARMING_ACCOUNTS,
            MenuKey::Mail => pages::MAIL,
            MenuKey::Notifications => pages::NOTIFICATIONS,
        }
    }

    /// Menu key for a page, if the page is a menu surface.
    pub fn for_page(key: &PageKey) -> Option<MenuKey> {
        MenuKey::ALL.into_iter().find(|m| m.page_key() == *key)
    }
}

impl core::fmt::Display for MenuKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single override row of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMenuPermission {
    pub user_id: UserId,
    #[serde(default)]
    pub own_farming: bool,
    #[serde(default)]
    pub farming_accounts: bool,
    #[serde(default)]
    pub mail: bool,
    #[serde(default)]
    pub notifications: bool,
}

impl UserMenuPermission {
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            own_farming: false,
            farming_accounts: false,
            mail: false,
            notifications: false,
        }
    }

    pub fn allows(&self, key: MenuKey) -> bool {
        match key {
            MenuKey::OwnFarming => self.own_farming,
            MenuKey::FarmingAccounts => self.farming_accounts,
            MenuKey::Mail => self.mail,
            MenuKey::Notifications => self.notifications,
        }
    }

    pub fn set(&mut self, key: MenuKey, allowed: bool) {
        let flag = match key {
            MenuKey::OwnFarming => &mut self.own_farming,
            MenuKey::FarmingAccounts => &mut self.farming_accounts,
            MenuKey::Mail => &mut self.mail,
            MenuKey::Notifications => &mut self.notifications,
        };
        *flag = allowed;
    }

    pub fn with(mut self, key: MenuKey) -> Self {
        self.set(key, true);
        self
    }

    /// Menu keys this row grants.
    pub fn granted(&self) -> Vec<MenuKey> {
        MenuKey::ALL.into_iter().filter(|k| self.allows(*k)).collect()
    }
}
