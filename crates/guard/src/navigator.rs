//! Path-level navigation: route lookup plus one guard per visited page.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use agencyops_auth::{PageKey, Verdict};

use crate::checker::PermissionChecker;
use crate::guard::{DeniedAction, DenialReason, GuardOutcome, RouteGuard};
use crate::principal_store::PrincipalStore;
use crate::routes::{RouteMatch, RouteTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Navigation {
    Render {
        path: String,
        page_key: PageKey,
        component: String,
        params: BTreeMap<String, String>,
        verdict: Verdict,
    },
    /// The requested page was denied and the alternate page re-validated.
    Redirect {
        from: String,
        path: String,
        page_key: PageKey,
        component: String,
        verdict: Verdict,
    },
    AccessDenied {
        path: String,
        page_key: PageKey,
        reason: DenialReason,
        actions: Vec<DeniedAction>,
    },
    Login,
    NotFound {
        path: String,
    },
    Cancelled,
}

pub struct Navigator<C> {
    principals: Arc<PrincipalStore>,
    checker: C,
    routes: Arc<RouteTable>,
}

impl<C> Navigator<C>
where
    C: PermissionChecker + Clone,
{
    pub fn new(principals: Arc<PrincipalStore>, checker: C, routes: Arc<RouteTable>) -> Self {
        Self {
            principals,
            checker,
            routes,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn principals(&self) -> &Arc<PrincipalStore> {
        &self.principals
    }

    /// A fresh guard for `page_key`; guards are never reused across navigations.
    pub fn guard(&self, page_key: PageKey) -> RouteGuard<C> {
        RouteGuard::new(
            page_key,
            self.principals.clone(),
            self.checker.clone(),
            self.routes.clone(),
        )
    }

    #[tracing::instrument(skip(self))]
    pub async fn navigate(&self, path: &str) -> Navigation {
        let Some(route) = self.routes.resolve(path) else {
            tracing::debug!("no route for path");
            return Navigation::NotFound {
                path: path.to_string(),
            };
        };

        match self.guard(route.entry.page_key.clone()).evaluate().await {
            GuardOutcome::Redirect { path: target, .. } => self.follow(path, &target).await,
            outcome => settle(path, &route, outcome),
        }
    }

    /// The single redirect hop. The target runs its own guard; a further
    /// redirect from there is not followed.
    async fn follow(&self, from: &str, target: &str) -> Navigation {
        let Some(route) = self.routes.resolve(target) else {
            return Navigation::NotFound {
                path: target.to_string(),
            };
        };

        match self.guard(route.entry.page_key.clone()).evaluate().await {
            GuardOutcome::Render { page_key, verdict } => Navigation::Redirect {
                from: from.to_string(),
                path: target.to_string(),
                page_key,
                component: route.entry.component.clone(),
                verdict,
            },
            outcome => settle(target, &route, outcome),
        }
    }
}

fn settle(path: &str, route: &RouteMatch<'_>, outcome: GuardOutcome) -> Navigation {
    match outcome {
        GuardOutcome::Render { page_key, verdict } => Navigation::Render {
            path: path.to_string(),
            page_key,
            component: route.entry.component.clone(),
            params: route.params.clone(),
            verdict,
        },
        GuardOutcome::AccessDenied {
            page_key,
            reason,
            actions,
        } => Navigation::AccessDenied {
            path: path.to_string(),
            page_key,
            reason,
            actions,
        },
        GuardOutcome::Redirect { page_key, .. } => {
            tracing::warn!(%page_key, "nested redirect not followed");
            Navigation::AccessDenied {
                path: path.to_string(),
                page_key: route.entry.page_key.clone(),
                reason: DenialReason::NotGranted,
                actions: vec![DeniedAction::GoBack, DeniedAction::Logout],
            }
        }
        GuardOutcome::Login => Navigation::Login,
        GuardOutcome::Cancelled => Navigation::Cancelled,
    }
}
