//! Permission resolution: one verdict per (principal, page key).
//!
//! This is the only place where role, page and override rows are combined.
//! Everything above it (service, guard, HTTP) asks here instead of comparing
//! role strings itself.

use serde::Serialize;

use crate::{
    Decision, DecisionBasis, MenuKey, Page, PageKey, PermissionError, Principal, Role,
    RolePermission, UserMenuPermission, Verdict, pages,
};

/// The rows a single resolution may consult, already fetched by the caller.
///
/// Rows that do not belong to the question (a role row for another role or
/// page, an override row for another user) are ignored by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionFacts {
    pub page: Option<Page>,
    pub role_permission: Option<RolePermission>,
    pub menu_permission: Option<UserMenuPermission>,
}

impl PermissionFacts {
    pub fn for_page(page: Page) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    pub fn with_role_permission(mut self, row: RolePermission) -> Self {
        self.role_permission = Some(row);
        self
    }

    pub fn with_menu_permission(mut self, row: UserMenuPermission) -> Self {
        self.menu_permission = Some(row);
        self
    }
}

/// Whether the emergency-access bypass applies.
///
/// `super_admin` always reaches the administrative console, whatever the
/// tables say. No other page and no other role gets an unconditional grant.
pub fn is_super_admin_bypass(principal: &Principal, page_key: &PageKey) -> bool {
    principal.role == Role::SuperAdmin && *page_key == pages::ADMIN
}

/// Resolve a principal's verdict for a page.
///
/// - No IO
/// - No panics
/// - Deterministic for identical inputs
pub fn resolve(
    principal: &Principal,
    page_key: &PageKey,
    facts: &PermissionFacts,
) -> Result<Verdict, PermissionError> {
    explain(principal, page_key, facts).map(|d| d.verdict)
}

/// Resolve a verdict and report the basis it was reached on.
pub fn explain(
    principal: &Principal,
    page_key: &PageKey,
    facts: &PermissionFacts,
) -> Result<Decision, PermissionError> {
    principal.ensure_active()?;

    if is_super_admin_bypass(principal, page_key) {
        return Ok(Decision {
            page_key: page_key.clone(),
            verdict: Verdict::full(),
            basis: DecisionBasis::SuperAdminBypass,
            reason: "super_admin always reaches the administrative console".to_string(),
        });
    }

    let page = facts
        .page
        .as_ref()
        .filter(|p| p.key == *page_key)
        .ok_or_else(|| PermissionError::UnknownPage(page_key.clone()))?;

    if !page.is_active {
        return Ok(Decision {
            page_key: page_key.clone(),
            verdict: Verdict::denied(),
            basis: DecisionBasis::PageInactive,
            reason: format!("page '{}' is deactivated", page_key),
        });
    }

    let role_row = facts
        .role_permission
        .as_ref()
        .filter(|row| row.role == principal.role && row.page_id == page.id);

    let mut decision = match role_row {
        Some(row) => Decision {
            page_key: page_key.clone(),
            verdict: Verdict::from_capabilities(row.capabilities),
            basis: DecisionBasis::RolePermission,
            reason: format!(
                "role '{}' has view={} edit={} delete={} on '{}'",
                principal.role,
                row.capabilities.can_view,
                row.capabilities.can_edit,
                row.capabilities.can_delete,
                page_key
            ),
        },
        None => Decision {
            page_key: page_key.clone(),
            verdict: Verdict::denied(),
            basis: DecisionBasis::NoRolePermission,
            reason: format!("role '{}' has no permission row for '{}'", principal.role, page_key),
        },
    };

    if decision.verdict.granted {
        return Ok(decision);
    }

    // Menu surfaces only: an override can widen a denial, never narrow a grant.
    if let Some(menu) = MenuKey::for_page(page_key) {
        let overridden = facts
            .menu_permission
            .as_ref()
            .filter(|row| row.user_id == principal.id)
            .is_some_and(|row| row.allows(menu));

        if overridden {
            decision.verdict.granted = true;
            decision.verdict.can_view = true;
            decision.basis = DecisionBasis::UserOverride;
            decision.reason = format!("user override grants menu '{}'", menu);
        }
    }

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capabilities;
    use agencyops_core::{PageId, UserId};
    use proptest::prelude::*;

    fn page(key: PageKey) -> Page {
        Page::new(key.clone(), key.as_str(), format!("/{}", key.as_str()))
    }

    fn principal(role: Role) -> Principal {
        Principal::new(UserId::new(), role)
    }

    #[test]
    fn user_without_row_is_denied_campaigns() {
        let p = principal(Role::User);
        let facts = PermissionFacts::for_page(page(pages::CAMPAIGNS));

        let v = resolve(&p, &pages::CAMPAIGNS, &facts).unwrap();
        assert_eq!(v, Verdict::denied());
    }

    #[test]
    fn manager_view_only_row_is_copied_verbatim() {
        let p = principal(Role::Manager);
        let clients = page(pages::CLIENTS);
        let row = RolePermission::new(Role::Manager, clients.id, Capabilities::view_only());
        let facts = PermissionFacts::for_page(clients).with_role_permission(row);

        let v = resolve(&p, &pages::CLIENTS, &facts).unwrap();
        assert!(v.granted);
        assert!(v.can_view);
        assert!(!v.can_edit);
        assert!(!v.can_delete);
    }

    #[test]
    fn super_admin_bypass_needs_no_rows() {
        let p = principal(Role::SuperAdmin);
        let decision = explain(&p, &pages::ADMIN, &PermissionFacts::default()).unwrap();
        assert_eq!(decision.verdict, Verdict::full());
        assert_eq!(decision.basis, DecisionBasis::SuperAdminBypass);
    }

    #[test]
    fn super_admin_on_other_pages_follows_the_table() {
        let p = principal(Role::SuperAdmin);
        let facts = PermissionFacts::for_page(page(pages::FINANCE));
        let v = resolve(&p, &pages::FINANCE, &facts).unwrap();
        assert!(!v.granted);
    }

    #[test]
    fn admin_role_gets_no_bypass_on_admin_page() {
        let p = principal(Role::Admin);
        let facts = PermissionFacts::for_page(page(pages::ADMIN));
        let v = resolve(&p, &pages::ADMIN, &facts).unwrap();
        assert!(!v.granted);
    }

    #[test]
    fn inactive_principal_is_rejected_before_the_bypass() {
        let p = principal(Role::SuperAdmin).deactivated();
        let err = resolve(&p, &pages::ADMIN, &PermissionFacts::default()).unwrap_err();
        assert_eq!(err, PermissionError::InactivePrincipal(p.id));
    }

    #[test]
    fn missing_page_is_unknown() {
        let p = principal(Role::Manager);
        let err = resolve(&p, &pages::CLIENTS, &PermissionFacts::default()).unwrap_err();
        assert_eq!(err, PermissionError::UnknownPage(pages::CLIENTS));
    }

    #[test]
    fn page_row_for_a_different_key_is_unknown() {
        let p = principal(Role::Manager);
        let facts = PermissionFacts::for_page(page(pages::FINANCE));
        let err = resolve(&p, &pages::CLIENTS, &facts).unwrap_err();
        assert!(matches!(err, PermissionError::UnknownPage(_)));
    }

    #[test]
    fn inactive_page_denies_even_with_row_and_override() {
        let p = principal(Role::User);
        let mail = page(pages::MAIL).deactivated();
        let row = RolePermission::new(Role::User, mail.id, Capabilities::full());
        let menu = UserMenuPermission::empty(p.id).with(MenuKey::Mail);
        let facts = PermissionFacts::for_page(mail)
            .with_role_permission(row)
            .with_menu_permission(menu);

        let decision = explain(&p, &pages::MAIL, &facts).unwrap();
        assert!(!decision.verdict.granted);
        assert_eq!(decision.basis, DecisionBasis::PageInactive);
    }

    #[test]
    fn override_widens_menu_page_without_role_row() {
        let p = principal(Role::User);
        let menu = UserMenuPermission::empty(p.id).with(MenuKey::OwnFarming);
        let facts = PermissionFacts::for_page(page(pages::OWN_FARMING)).with_menu_permission(menu);

        let decision = explain(&p, &pages::OWN_FARMING, &facts).unwrap();
        assert!(decision.verdict.granted);
        assert!(decision.verdict.can_view);
        assert!(!decision.verdict.can_edit);
        assert_eq!(decision.basis, DecisionBasis::UserOverride);
    }

    #[test]
    fn override_keeps_role_granted_edit_flags() {
        let p = principal(Role::User);
        let farming = page(pages::FARMING_ACCOUNTS);
        let row = RolePermission::new(
            Role::User,
            farming.id,
            Capabilities {
                can_view: false,
                can_edit: true,
                can_delete: false,
            },
        );
        let menu = UserMenuPermission::empty(p.id).with(MenuKey::FarmingAccounts);
        let facts = PermissionFacts::for_page(farming)
            .with_role_permission(row)
            .with_menu_permission(menu);

        let v = resolve(&p, &pages::FARMING_ACCOUNTS, &facts).unwrap();
        assert!(v.granted);
        assert!(v.can_edit);
    }

    #[test]
    fn override_of_another_user_is_ignored() {
        let p = principal(Role::User);
        let menu = UserMenuPermission::empty(UserId::new()).with(MenuKey::Mail);
        let facts = PermissionFacts::for_page(page(pages::MAIL)).with_menu_permission(menu);

        let v = resolve(&p, &pages::MAIL, &facts).unwrap();
        assert!(!v.granted);
    }

    #[test]
    fn override_does_not_apply_to_non_menu_pages() {
        let p = principal(Role::User);
        let mut menu = UserMenuPermission::empty(p.id);
        for key in MenuKey::ALL {
            menu.set(key, true);
        }
        let facts = PermissionFacts::for_page(page(pages::FINANCE)).with_menu_permission(menu);

        let v = resolve(&p, &pages::FINANCE, &facts).unwrap();
        assert!(!v.granted);
    }

    #[test]
    fn role_row_for_another_role_is_ignored() {
        let p = principal(Role::User);
        let clients = page(pages::CLIENTS);
        let row = RolePermission::new(Role::Manager, clients.id, Capabilities::full());
        let facts = PermissionFacts::for_page(clients).with_role_permission(row);

        let v = resolve(&p, &pages::CLIENTS, &facts).unwrap();
        assert!(!v.granted);
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn any_page_key() -> impl Strategy<Value = PageKey> {
        prop::sample::select(vec![
            pages::ADMIN,
            pages::DASHBOARD,
            pages::CAMPAIGNS,
            pages::CLIENTS,
            pages::AD_ACCOUNTS,
            pages::WORK_REPORTS,
            pages::FINANCE,
            pages::SALARIES,
            pages::OWN_FARMING,
            pages::FARMING_ACCOUNTS,
            pages::MAIL,
            pages::NOTIFICATIONS,
        ])
    }

    fn any_capabilities() -> impl Strategy<Value = Capabilities> {
        (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(v, e, d)| Capabilities {
            can_view: v,
            can_edit: e,
            can_delete: d,
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: without a role row (and without overrides) nothing is granted,
        /// except the super_admin console bypass.
        #[test]
        fn default_deny_without_role_row(role in any_role(), key in any_page_key()) {
            let p = principal(role);
            let facts = PermissionFacts::for_page(page(key.clone()));
            let v = resolve(&p, &key, &facts).unwrap();
            prop_assert_eq!(v.granted, is_super_admin_bypass(&p, &key));
        }

        /// Property: super_admin reaches the console whatever the admin row says.
        #[test]
        fn super_admin_console_bypass_ignores_rows(caps in any_capabilities(), active_page in any::<bool>()) {
            let p = principal(Role::SuperAdmin);
            let mut admin = page(pages::ADMIN);
            admin.is_active = active_page;
            let row = RolePermission::new(Role::SuperAdmin, admin.id, caps);
            let facts = PermissionFacts::for_page(admin).with_role_permission(row);
            prop_assert_eq!(resolve(&p, &pages::ADMIN, &facts).unwrap(), Verdict::full());
        }

        /// Property: resolving twice over unchanged facts yields the same verdict.
        #[test]
        fn resolve_is_idempotent(role in any_role(), key in any_page_key(), caps in any_capabilities()) {
            let p = principal(role);
            let pg = page(key.clone());
            let row = RolePermission::new(role, pg.id, caps);
            let facts = PermissionFacts::for_page(pg).with_role_permission(row);
            prop_assert_eq!(resolve(&p, &key, &facts), resolve(&p, &key, &facts));
        }

        /// Property: adding a `true` override never turns a grant into a denial
        /// and never drops a capability.
        #[test]
        fn override_widening_is_monotonic(
            role in any_role(),
            key in any_page_key(),
            row_caps in proptest::option::of(any_capabilities()),
            menu in prop::sample::select(MenuKey::ALL.to_vec()),
        ) {
            let p = principal(role);
            let pg = page(key.clone());
            let mut facts = PermissionFacts::for_page(pg.clone());
            if let Some(caps) = row_caps {
                facts = facts.with_role_permission(RolePermission::new(role, pg.id, caps));
            }

            let before = resolve(&p, &key, &facts).unwrap();
            let widened = facts.with_menu_permission(UserMenuPermission::empty(p.id).with(menu));
            let after = resolve(&p, &key, &widened).unwrap();

            prop_assert!(after.granted || !before.granted);
            prop_assert!(after.can_view || !before.can_view);
            prop_assert_eq!(after.can_edit, before.can_edit);
            prop_assert_eq!(after.can_delete, before.can_delete);
        }

        /// Property: unrelated page ids never leak capabilities.
        #[test]
        fn role_row_for_other_page_id_is_default_deny(role in any_role(), caps in any_capabilities()) {
            let p = principal(role);
            let clients = page(pages::CLIENTS);
            let row = RolePermission::new(role, PageId::new(), caps);
            let facts = PermissionFacts::for_page(clients).with_role_permission(row);
            prop_assert!(!resolve(&p, &pages::CLIENTS, &facts).unwrap().granted);
        }
    }
}
