//! Per-navigation route guard.
//!
//! One guard instance protects one page key. [`RouteGuard::evaluate`] runs the
//! state machine to completion and returns what the UI should do; the current
//! state is published on a watch channel so a loading indicator can follow it.
//! No denial is ever published before the permission result is known.
//! [`RouteGuard::run`] keeps re-evaluating as the session changes.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::watch;

use agencyops_auth::{PageKey, PermissionError, Principal, Verdict, pages};

use crate::checker::PermissionChecker;
use crate::principal_store::{PrincipalStore, Session};
use crate::routes::RouteTable;

/// Alternate landing pages tried when the dashboard is denied, by priority.
pub static DASHBOARD_FALLBACKS: [PageKey; 5] = [
    pages::CAMPAIGNS,
    pages::CLIENTS,
    pages::AD_ACCOUNTS,
    pages::WORK_REPORTS,
    pages::FINANCE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    NotGranted,
    UnknownPage,
    InactivePrincipal,
    LookupFailure,
    Timeout,
}

impl From<&PermissionError> for DenialReason {
    fn from(err: &PermissionError) -> Self {
        match err {
            PermissionError::UnknownPage(_) => DenialReason::UnknownPage,
            PermissionError::InactivePrincipal(_) => DenialReason::InactivePrincipal,
            PermissionError::LookupFailure(_) => DenialReason::LookupFailure,
            PermissionError::Timeout(_) => DenialReason::Timeout,
        }
    }
}

/// Actions offered by the access-denied view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeniedAction {
    GoBack,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GuardState {
    Unauthenticated,
    CheckingAuth,
    CheckingPermission,
    Granted { verdict: Verdict },
    Denied { reason: DenialReason },
    Redirecting { page_key: PageKey, path: String },
}

impl GuardState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, GuardState::CheckingAuth | GuardState::CheckingPermission)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuardOutcome {
    /// No usable session; render the login flow.
    Login,
    Render {
        page_key: PageKey,
        verdict: Verdict,
    },
    Redirect {
        page_key: PageKey,
        path: String,
    },
    AccessDenied {
        page_key: PageKey,
        reason: DenialReason,
        actions: Vec<DeniedAction>,
    },
    /// The principal changed while the check was in flight.
    Cancelled,
}

pub struct RouteGuard<C> {
    page_key: PageKey,
    principals: Arc<PrincipalStore>,
    checker: C,
    routes: Arc<RouteTable>,
    state: watch::Sender<GuardState>,
}

impl<C> RouteGuard<C>
where
    C: PermissionChecker,
{
    pub fn new(
        page_key: PageKey,
        principals: Arc<PrincipalStore>,
        checker: C,
        routes: Arc<RouteTable>,
    ) -> Self {
        let (state, _rx) = watch::channel(GuardState::Unauthenticated);
        Self {
            page_key,
            principals,
            checker,
            routes,
            state,
        }
    }

    pub fn page_key(&self) -> &PageKey {
        &self.page_key
    }

    pub fn state(&self) -> GuardState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    /// The "logout" action of the denied view.
    pub fn logout(&self) {
        self.principals.logout();
        self.transition(GuardState::Unauthenticated);
    }

    #[tracing::instrument(name = "route_guard", skip_all, fields(page_key = %self.page_key))]
    pub async fn evaluate(&self) -> GuardOutcome {
        // Subscribe before reading so a change during the check is never missed.
        let mut session_rx = self.principals.subscribe();

        self.transition(GuardState::CheckingAuth);
        let session = session_rx.borrow_and_update().clone();
        let Some(principal) = authenticated(session) else {
            self.transition(GuardState::Unauthenticated);
            return GuardOutcome::Login;
        };

        self.transition(GuardState::CheckingPermission);
        let result = tokio::select! {
            result = self.checker.check_permission(&principal, &self.page_key) => result,
            _ = session_rx.changed() => return self.cancel(),
        };
        if session_rx.has_changed().unwrap_or(true) {
            return self.cancel();
        }

        match result {
            Ok(verdict) if verdict.granted => {
                self.transition(GuardState::Granted { verdict });
                GuardOutcome::Render {
                    page_key: self.page_key.clone(),
                    verdict,
                }
            }
            Ok(_) if self.page_key == pages::DASHBOARD => {
                self.search_fallback(&principal, &mut session_rx).await
            }
            Ok(_) => self.deny(DenialReason::NotGranted),
            Err(err) => {
                tracing::warn!(code = err.code(), error = %err, "permission check failed");
                self.deny(DenialReason::from(&err))
            }
        }
    }

    async fn search_fallback(
        &self,
        principal: &Principal,
        session_rx: &mut watch::Receiver<Option<Session>>,
    ) -> GuardOutcome {
        let candidates: Vec<(&PageKey, &str)> = DASHBOARD_FALLBACKS
            .iter()
            .filter_map(|key| self.routes.path_for(key).map(|path| (key, path)))
            .collect();

        let checks = join_all(
            candidates
                .iter()
                .map(|(key, _)| self.checker.check_permission(principal, key)),
        );
        let results = tokio::select! {
            results = checks => results,
            _ = session_rx.changed() => return self.cancel(),
        };
        if session_rx.has_changed().unwrap_or(true) {
            return self.cancel();
        }

        let chosen = candidates
            .into_iter()
            .zip(results)
            .find_map(|((key, path), result)| match result {
                Ok(verdict) if verdict.granted => Some((key.clone(), path.to_string())),
                Ok(_) => None,
                Err(err) => {
                    tracing::debug!(candidate = %key, code = err.code(), "fallback candidate skipped");
                    None
                }
            });

        match chosen {
            Some((page_key, path)) => {
                tracing::info!(target_page = %page_key, %path, "dashboard denied; redirecting");
                self.transition(GuardState::Redirecting {
                    page_key: page_key.clone(),
                    path: path.clone(),
                });
                GuardOutcome::Redirect { page_key, path }
            }
            None => self.deny(DenialReason::NotGranted),
        }
    }

    /// Evaluate, then evaluate again after every session change.
    ///
    /// Runs until the task driving it is dropped.
    #[tracing::instrument(name = "route_guard_run", skip_all, fields(page_key = %self.page_key))]
    pub async fn run(&self) {
        let mut session_rx = self.principals.subscribe();
        loop {
            session_rx.borrow_and_update();
            if self.evaluate().await == GuardOutcome::Cancelled {
                continue;
            }
            if session_rx.changed().await.is_err() {
                return;
            }
            tracing::debug!("session changed; re-evaluating");
        }
    }

    fn deny(&self, reason: DenialReason) -> GuardOutcome {
        self.transition(GuardState::Denied { reason });
        GuardOutcome::AccessDenied {
            page_key: self.page_key.clone(),
            reason,
            actions: vec![DeniedAction::GoBack, DeniedAction::Logout],
        }
    }

    fn cancel(&self) -> GuardOutcome {
        tracing::info!("principal changed during permission check; verdict discarded");
        self.transition(GuardState::Unauthenticated);
        GuardOutcome::Cancelled
    }

    fn transition(&self, next: GuardState) {
        tracing::trace!(state = ?next, "guard transition");
        self.state.send_replace(next);
    }
}

/// `CheckingAuth`: a non-empty token and an active principal.
fn authenticated(session: Option<Session>) -> Option<Principal> {
    let session = session?;
    if session.token.trim().is_empty() || !session.principal.is_active {
        return None;
    }
    Some(session.principal)
}
