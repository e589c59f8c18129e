//! `checkPermission`: the async entry point in front of the resolver.
//!
//! Fetches the rows a decision needs from a [`PermissionStore`], bounds the
//! lookup with a timeout and hands the facts to the pure resolver. Callers never
//! read the permission tables directly.

use std::time::Duration;

use serde::Serialize;

use agencyops_auth::{
    Decision, MenuKey, Page, PageKey, PermissionError, PermissionFacts, Principal, Verdict,
    explain, is_super_admin_bypass,
};

use crate::store::{PermissionStore, StoreError};

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

fn lookup_failure(err: StoreError) -> PermissionError {
    PermissionError::LookupFailure(err.to_string())
}

/// A page the principal may open, with its capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessiblePage {
    pub page: Page,
    pub verdict: Verdict,
}

pub struct PermissionService<S> {
    store: S,
    lookup_timeout: Duration,
}

impl<S> PermissionService<S>
where
    S: PermissionStore,
{
    pub fn new(store: S, lookup_timeout: Duration) -> Self {
        Self {
            store,
            lookup_timeout,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Resolve the verdict of `principal` for `page_key`.
    pub async fn check_permission(
        &self,
        principal: &Principal,
        page_key: &PageKey,
    ) -> Result<Verdict, PermissionError> {
        self.explain(principal, page_key).await.map(|d| d.verdict)
    }

    /// Resolve a verdict together with its basis, logging the outcome.
    #[tracing::instrument(
        name = "check_permission",
        skip_all,
        fields(user_id = %principal.id, role = %principal.role, page_key = %page_key)
    )]
    pub async fn explain(
        &self,
        principal: &Principal,
        page_key: &PageKey,
    ) -> Result<Decision, PermissionError> {
        let result = self.decide(principal, page_key).await;

        match &result {
            Ok(d) if d.verdict.granted => {
                tracing::debug!(basis = d.basis.as_str(), "permission granted");
            }
            Ok(d) => {
                tracing::info!(basis = d.basis.as_str(), reason = %d.reason, "permission denied");
            }
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "permission check failed");
            }
        }

        result
    }

    async fn decide(
        &self,
        principal: &Principal,
        page_key: &PageKey,
    ) -> Result<Decision, PermissionError> {
        principal.ensure_active()?;

        if is_super_admin_bypass(principal, page_key) {
            return explain(principal, page_key, &PermissionFacts::default());
        }

        let facts = tokio::time::timeout(self.lookup_timeout, self.gather_facts(principal, page_key))
            .await
            .map_err(|_| PermissionError::Timeout(self.lookup_timeout))??;

        explain(principal, page_key, &facts)
    }

    async fn gather_facts(
        &self,
        principal: &Principal,
        page_key: &PageKey,
    ) -> Result<PermissionFacts, PermissionError> {
        let Some(page) = self
            .store
            .page_by_key(page_key)
            .await
            .map_err(lookup_failure)?
        else {
            return Ok(PermissionFacts::default());
        };

        let is_menu_page = MenuKey::for_page(page_key).is_some();
        let (role_row, menu_row) = tokio::join!(
            self.store.role_permission(principal.role, page.id),
            async {
                if is_menu_page {
                    self.store.user_menu_permission(principal.id).await
                } else {
                    Ok(None)
                }
            }
        );

        Ok(PermissionFacts {
            page: Some(page),
            role_permission: role_row.map_err(lookup_failure)?,
            menu_permission: menu_row.map_err(lookup_failure)?,
        })
    }

    /// Every page the resolver grants the principal, in catalog order.
    ///
    /// Used to build menus; enforcement still goes through
    /// [`check_permission`](Self::check_permission) per navigation.
    #[tracing::instrument(
        skip_all,
        fields(user_id = %principal.id, role = %principal.role)
    )]
    pub async fn accessible_pages(
        &self,
        principal: &Principal,
    ) -> Result<Vec<AccessiblePage>, PermissionError> {
        principal.ensure_active()?;

        let lookup = async {
            tokio::join!(
                self.store.list_pages(),
                self.store.role_permissions(principal.role),
                self.store.user_menu_permission(principal.id),
            )
        };
        let (pages, role_rows, menu_row) = tokio::time::timeout(self.lookup_timeout, lookup)
            .await
            .map_err(|_| PermissionError::Timeout(self.lookup_timeout))?;

        let pages = pages.map_err(lookup_failure)?;
        let role_rows = role_rows.map_err(lookup_failure)?;
        let menu_row = menu_row.map_err(lookup_failure)?;

        let mut accessible = Vec::new();
        for page in pages {
            let facts = PermissionFacts {
                role_permission: role_rows.iter().find(|r| r.page_id == page.id).cloned(),
                menu_permission: menu_row.clone(),
                page: Some(page.clone()),
            };
            let decision = explain(principal, &page.key, &facts)?;
            if decision.verdict.granted {
                accessible.push(AccessiblePage {
                    page,
                    verdict: decision.verdict,
                });
            }
        }

        tracing::debug!(count = accessible.len(), "accessible pages resolved");
        Ok(accessible)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use agencyops_auth::{Capabilities, Role, RolePermission, UserMenuPermission, pages};
    use agencyops_core::{PageId, UserId};

    use crate::seed::seed_defaults;
    use crate::store::InMemoryPermissionStore;

    fn seeded() -> Arc<InMemoryPermissionStore> {
        let store = Arc::new(InMemoryPermissionStore::new());
        seed_defaults(&store).unwrap();
        store
    }

    fn service<S: PermissionStore>(store: S) -> PermissionService<S> {
        PermissionService::new(store, DEFAULT_LOOKUP_TIMEOUT)
    }

    /// Store double that fails, stalls, or counts calls.
    struct FakeStore {
        inner: Arc<InMemoryPermissionStore>,
        fail: bool,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FakeStore {
        fn new(inner: Arc<InMemoryPermissionStore>) -> Self {
            Self {
                inner,
                fail: false,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        async fn enter(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(StoreError::Unavailable("connection refused".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl PermissionStore for FakeStore {
        async fn page_by_key(&self, key: &PageKey) -> Result<Option<Page>, StoreError> {
            self.enter().await?;
            self.inner.page_by_key(key).await
        }

        async fn list_pages(&self) -> Result<Vec<Page>, StoreError> {
            self.enter().await?;
            self.inner.list_pages().await
        }

        async fn role_permission(
            &self,
            role: Role,
            page_id: PageId,
        ) -> Result<Option<RolePermission>, StoreError> {
            self.enter().await?;
            self.inner.role_permission(role, page_id).await
        }

        async fn role_permissions(&self, role: Role) -> Result<Vec<RolePermission>, StoreError> {
            self.enter().await?;
            self.inner.role_permissions(role).await
        }

        async fn user_menu_permission(
            &self,
            user_id: UserId,
        ) -> Result<Option<UserMenuPermission>, StoreError> {
            self.enter().await?;
            self.inner.user_menu_permission(user_id).await
        }
    }

    #[tokio::test]
    async fn user_without_campaigns_row_is_denied() {
        let svc = service(seeded());
        let p = Principal::new(UserId::new(), Role::User);

        let v = svc.check_permission(&p, &pages::CAMPAIGNS).await.unwrap();
        assert!(!v.granted);
    }

    #[tokio::test]
    async fn manager_clients_is_view_only() {
        let svc = service(seeded());
        let p = Principal::new(UserId::new(), Role::Manager);

        let v = svc.check_permission(&p, &pages::CLIENTS).await.unwrap();
        assert!(v.granted);
        assert!(!v.can_edit);
        assert!(!v.can_delete);
    }

    #[tokio::test]
    async fn unknown_page_is_reported() {
        let svc = service(seeded());
        let p = Principal::new(UserId::new(), Role::Admin);

        let err = svc
            .check_permission(&p, &PageKey::from("reports_v2"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "unknown_page");
    }

    #[tokio::test]
    async fn super_admin_console_bypass_does_no_io() {
        let fake = FakeStore {
            fail: true,
            ..FakeStore::new(seeded())
        };
        let svc = service(fake);
        let p = Principal::new(UserId::new(), Role::SuperAdmin);

        let v = svc.check_permission(&p, &pages::ADMIN).await.unwrap();
        assert_eq!(v, Verdict::full());
        assert_eq!(svc.store().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn inactive_principal_is_rejected_without_io() {
        let svc = service(FakeStore::new(seeded()));
        let p = Principal::new(UserId::new(), Role::Admin).deactivated();

        let err = svc.check_permission(&p, &pages::CLIENTS).await.unwrap_err();
        assert_eq!(err, PermissionError::InactivePrincipal(p.id));
        assert_eq!(svc.store().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_failure_is_a_lookup_failure() {
        let fake = FakeStore {
            fail: true,
            ..FakeStore::new(seeded())
        };
        let svc = service(fake);
        let p = Principal::new(UserId::new(), Role::Admin);

        let err = svc.check_permission(&p, &pages::CLIENTS).await.unwrap_err();
        assert!(matches!(err, PermissionError::LookupFailure(_)));
        assert!(err.is_ambiguous());
    }

    #[tokio::test]
    async fn slow_store_times_out_instead_of_granting() {
        let fake = FakeStore {
            delay: Some(Duration::from_secs(5)),
            ..FakeStore::new(seeded())
        };
        let svc = PermissionService::new(fake, Duration::from_millis(20));
        let p = Principal::new(UserId::new(), Role::Admin);

        let err = svc.check_permission(&p, &pages::CLIENTS).await.unwrap_err();
        assert_eq!(err, PermissionError::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn override_row_is_only_read_for_menu_pages() {
        let svc = service(FakeStore::new(seeded()));
        let p = Principal::new(UserId::new(), Role::Manager);

        svc.check_permission(&p, &pages::CLIENTS).await.unwrap();
        // page + role row
        assert_eq!(svc.store().calls.load(Ordering::SeqCst), 2);

        svc.check_permission(&p, &pages::MAIL).await.unwrap();
        // page + role row + override row
        assert_eq!(svc.store().calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn override_grants_menu_page_to_plain_user() {
        let store = seeded();
        let p = Principal::new(UserId::new(), Role::User);
        store
            .upsert_user_menu_permission(UserMenuPermission::empty(p.id).with(MenuKey::OwnFarming))
            .unwrap();
        let svc = service(store);

        let decision = svc.explain(&p, &pages::OWN_FARMING).await.unwrap();
        assert!(decision.verdict.granted);
        assert_eq!(decision.basis, agencyops_auth::DecisionBasis::UserOverride);
    }

    #[tokio::test]
    async fn deactivated_page_is_denied_for_admin() {
        let store = seeded();
        store.set_page_active(&pages::FINANCE, false).unwrap();
        let svc = service(store);
        let p = Principal::new(UserId::new(), Role::Admin);

        let v = svc.check_permission(&p, &pages::FINANCE).await.unwrap();
        assert!(!v.granted);
    }

    #[tokio::test]
    async fn verdict_is_stable_across_calls() {
        let svc = service(seeded());
        let p = Principal::new(UserId::new(), Role::Manager);

        let first = svc.check_permission(&p, &pages::CAMPAIGNS).await.unwrap();
        let second = svc.check_permission(&p, &pages::CAMPAIGNS).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.capabilities(), Capabilities::view_edit());
    }

    #[tokio::test]
    async fn accessible_pages_follow_catalog_order() {
        let store = seeded();
        let p = Principal::new(UserId::new(), Role::User);
        store
            .upsert_user_menu_permission(UserMenuPermission::empty(p.id).with(MenuKey::Mail))
            .unwrap();
        let svc = service(store);

        let keys: Vec<_> = svc
            .accessible_pages(&p)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.page.key)
            .collect();
        assert_eq!(keys, vec![pages::WORK_REPORTS, pages::MAIL]);
    }

    #[tokio::test]
    async fn accessible_pages_include_console_for_super_admin() {
        let svc = service(seeded());
        let p = Principal::new(UserId::new(), Role::SuperAdmin);

        let pages_list = svc.accessible_pages(&p).await.unwrap();
        assert!(pages_list.iter().any(|a| a.page.key == pages::ADMIN));
    }

    #[tokio::test]
    async fn accessible_pages_keep_console_for_super_admin_when_admin_page_inactive() {
        let store = seeded();
        store.set_page_active(&pages::ADMIN, false).unwrap();
        store.set_page_active(&pages::FINANCE, false).unwrap();
        let svc = service(store);
        let p = Principal::new(UserId::new(), Role::SuperAdmin);

        assert!(svc.check_permission(&p, &pages::ADMIN).await.unwrap().granted);
        let keys: Vec<_> = svc
            .accessible_pages(&p)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.page.key)
            .collect();
        assert!(keys.contains(&pages::ADMIN));
        assert!(!keys.contains(&pages::FINANCE));
    }

    mod props {
        use proptest::prelude::*;

        use super::*;
        use crate::seed::default_page_catalog;

        fn block_on<F: std::future::Future>(fut: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(fut)
        }

        proptest! {
            #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

            #[test]
            fn menu_listing_agrees_with_single_checks(
                role in prop::sample::select(Role::ALL.to_vec()),
                flags in prop::collection::vec(any::<bool>(), MenuKey::ALL.len()),
                inactive in prop::collection::vec(any::<bool>(), default_page_catalog().len()),
            ) {
                let store = seeded();
                for (page, off) in default_page_catalog().into_iter().zip(inactive) {
                    store.set_page_active(&page.key, !off).unwrap();
                }
                let p = Principal::new(UserId::new(), role);
                let mut row = UserMenuPermission::empty(p.id);
                for (key, on) in MenuKey::ALL.into_iter().zip(flags) {
                    row.set(key, on);
                }
                store.upsert_user_menu_permission(row).unwrap();
                let svc = service(store.clone());

                let (listed, checked) = block_on(async {
                    let listed: Vec<PageKey> = svc
                        .accessible_pages(&p)
                        .await
                        .unwrap()
                        .into_iter()
                        .map(|a| a.page.key)
                        .collect();

                    let mut checked = Vec::new();
                    for page in store.list_pages().await.unwrap() {
                        if svc.check_permission(&p, &page.key).await.unwrap().granted {
                            checked.push(page.key);
                        }
                    }
                    (listed, checked)
                });

                prop_assert_eq!(listed, checked);
            }
        }
    }
}
