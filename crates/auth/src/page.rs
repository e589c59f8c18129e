use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use agencyops_core::PageId;

/// Stable identifier of a protected screen, decoupled from its URL path.
///
/// Page keys are opaque strings; the resolver only ever matches on them, never
/// on display names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageKey(Cow<'static, str>);

impl PageKey {
    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self(key.into())
    }

    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PageKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageKey {
    fn from(value: &str) -> Self {
        Self(Cow::Owned(value.to_string()))
    }
}

/// Well-known page keys of the back office.
pub mod pages {
    use super::PageKey;

    /// Administrative console (user/role/page management).
    pub const ADMIN: PageKey = PageKey::from_static("admin");
    /// Default landing page.
    pub const DASHBOARD: PageKey = PageKey::from_static("dashboard");
    pub const CAMPAIGNS: PageKey = PageKey::from_static("campaigns");
    pub const CLIENTS: PageKey = PageKey::from_static("clients");
    pub const AD_ACCOUNTS: PageKey = PageKey::from_static("ad_accounts");
    pub const WORK_REPORTS: PageKey = PageKey::from_static("work_reports");
    pub const FINANCE: PageKey = PageKey::from_static("finance");
    pub const SALARIES: PageKey = PageKey::from_static("salaries");

    // Menu surfaces that can be hand-granted per user.
    pub const OWN_FARMING: PageKey = PageKey::from_static("own_farming");
    pub const FARMING_ACCOUNTS: PageKey = PageKey::from_static("farming_accounts");
    pub const MAIL: PageKey = PageKey::from_static("mail");
    pub const NOTIFICATIONS: PageKey = PageKey::from_static("notifications");
}

/// A protected page as registered by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub key: PageKey,
    pub display_name: String,
    pub path: String,
    pub is_active: bool,
}

impl Page {
    pub fn new(key: PageKey, display_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: PageId::new(),
            key,
            display_name: display_name.into(),
            path: path.into(),
            is_active: true,
        }
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}
