//! Session-global holder of the current principal.
//!
//! Mutated only by `login`, `logout` and `refresh`; everything else reads it
//! or subscribes to its changes.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use agencyops_auth::Principal;

/// An authenticated session: the bearer token and the principal it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
}

#[derive(Debug)]
pub struct PrincipalStore {
    tx: watch::Sender<Option<Session>>,
}

impl PrincipalStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn with_session(token: impl Into<String>, principal: Principal) -> Self {
        let (tx, _rx) = watch::channel(Some(Session {
            token: token.into(),
            principal,
        }));
        Self { tx }
    }

    /// `getCurrentPrincipal()`
    pub fn current(&self) -> Option<Principal> {
        self.tx.borrow().as_ref().map(|s| s.principal.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified on every login, logout and effective refresh.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    /// `onPrincipalChange(callback)`: run `callback` on a background task for
    /// every change until the store is dropped.
    pub fn on_change<F>(&self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(Option<Principal>) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let principal = rx.borrow_and_update().as_ref().map(|s| s.principal.clone());
                callback(principal);
            }
        })
    }

    pub fn login(&self, token: impl Into<String>, principal: Principal) {
        tracing::debug!(user_id = %principal.id, role = %principal.role, "session started");
        self.tx.send_replace(Some(Session {
            token: token.into(),
            principal,
        }));
    }

    pub fn logout(&self) {
        let ended = self.tx.send_if_modified(|session| session.take().is_some());
        if ended {
            tracing::debug!("session ended");
        }
    }

    /// Replace the principal of the open session (role change, deactivation).
    ///
    /// Subscribers are only notified when the principal actually differs.
    pub fn refresh(&self, principal: Principal) -> bool {
        self.tx.send_if_modified(|session| match session {
            Some(s) if s.principal != principal => {
                s.principal = principal;
                true
            }
            _ => false,
        })
    }
}

impl Default for PrincipalStore {
    fn default() -> Self {
        Self::new()
    }
}
