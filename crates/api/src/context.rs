use agencyops_auth::Principal;

/// Principal context for a request.
///
/// Loaded from the principal directory on every request, so role and active
/// flag are never older than the request itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
    token: String,
}

impl PrincipalContext {
    pub fn new(principal: Principal, token: impl Into<String>) -> Self {
        Self {
            principal,
            token: token.into(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}
