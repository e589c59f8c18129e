//! Ordered route table mapping URL paths to page keys.

use std::collections::BTreeMap;

use serde::Serialize;

use agencyops_auth::{PageKey, pages};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// Path pattern; `:name` segments match any single non-empty segment.
    pub path: String,
    pub page_key: PageKey,
    pub component: String,
}

impl RouteEntry {
    pub fn new(path: impl Into<String>, page_key: PageKey, component: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            page_key,
            component: component.into(),
        }
    }

    pub fn has_params(&self) -> bool {
        segments(&self.path).any(|s| s.starts_with(':'))
    }

    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let mut pattern = segments(&self.path);
        let mut actual = segments(path);
        let mut params = BTreeMap::new();

        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return Some(params),
                (Some(p), Some(a)) => {
                    if let Some(name) = p.strip_prefix(':') {
                        params.insert(name.to_string(), a.to_string());
                    } else if p != a {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A resolved route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(
        mut self,
        path: impl Into<String>,
        page_key: PageKey,
        component: impl Into<String>,
    ) -> Self {
        self.entries.push(RouteEntry::new(path, page_key, component));
        self
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// First entry matching `path`. Query strings and trailing slashes are ignored.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        self.entries.iter().find_map(|entry| {
            entry
                .matches(path)
                .map(|params| RouteMatch { entry, params })
        })
    }

    /// Redirect target for a page: the first parameterless entry rendering it.
    pub fn path_for(&self, page_key: &PageKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.page_key == *page_key && !e.has_params())
            .map(|e| e.path.as_str())
    }

    /// Screens of the agency back office.
    pub fn default_back_office() -> Self {
        Self::new()
            .route("/dashboard", pages::DASHBOARD, "Dashboard")
            .route("/campaigns", pages::CAMPAIGNS, "CampaignList")
            .route("/campaigns/:campaign_id", pages::CAMPAIGNS, "CampaignDetail")
            .route("/clients", pages::CLIENTS, "ClientList")
            .route("/clients/:client_id", pages::CLIENTS, "ClientDetail")
            .route("/ad-accounts", pages::AD_ACCOUNTS, "AdAccounts")
            .route("/work-reports", pages::WORK_REPORTS, "WorkReports")
            .route("/finance", pages::FINANCE, "Finance")
            .route("/salaries", pages::SALARIES, "Salaries")
            .route("/own-farming", pages::OWN_FARMING, "OwnFarming")
            .route("/farming-accounts", pages::FARMING_ACCOUNTS, "FarmingAccounts")
            .route("/mail", pages::MAIL, "Mailbox")
            .route("/notifications", pages::NOTIFICATIONS, "Notifications")
            .route("/admin", pages::ADMIN, "AdminConsole")
            .route("/admin/permissions", pages::ADMIN, "PermissionMatrix")
            .route("/admin/users", pages::ADMIN, "UserManagement")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_paths_resolve_to_their_page() {
        let table = RouteTable::default_back_office();
        let m = table.resolve("/ad-accounts").unwrap();
        assert_eq!(m.entry.page_key, pages::AD_ACCOUNTS);
        assert!(m.params.is_empty());

        assert_eq!(table.resolve("/finance/").unwrap().entry.page_key, pages::FINANCE);
        assert_eq!(table.resolve("/mail?folder=inbox").unwrap().entry.component, "Mailbox");
    }

    #[test]
    fn param_segments_are_captured() {
        let table = RouteTable::default_back_office();
        let m = table.resolve("/clients/42").unwrap();
        assert_eq!(m.entry.component, "ClientDetail");
        assert_eq!(m.params.get("client_id").map(String::as_str), Some("42"));
    }

    #[test]
    fn unknown_or_too_deep_paths_do_not_match() {
        let table = RouteTable::default_back_office();
        assert!(table.resolve("/reports").is_none());
        assert!(table.resolve("/clients/42/invoices").is_none());
        assert!(table.resolve("/").is_none());
    }

    #[test]
    fn first_match_wins() {
        let table = RouteTable::new()
            .route("/campaigns/new", pages::CAMPAIGNS, "CampaignCreate")
            .route("/campaigns/:id", pages::CAMPAIGNS, "CampaignDetail");
        assert_eq!(table.resolve("/campaigns/new").unwrap().entry.component, "CampaignCreate");
        assert_eq!(table.resolve("/campaigns/7").unwrap().entry.component, "CampaignDetail");
    }

    #[test]
    fn path_for_skips_parameterized_entries() {
        let table = RouteTable::new()
            .route("/clients/:client_id", pages::CLIENTS, "ClientDetail")
            .route("/clients", pages::CLIENTS, "ClientList");
        assert_eq!(table.path_for(&pages::CLIENTS), Some("/clients"));
        assert_eq!(table.path_for(&pages::FINANCE), None);
    }
}
