use serde::{Deserialize, Serialize};

use agencyops_core::{ClientId, UserId};

use crate::{PermissionError, Role};

/// The authenticated actor a permission question is asked about.
///
/// Owned by the session layer; this crate only reads it. A principal is
/// immutable for the duration of one evaluation and replaced wholesale on
/// re-authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
    pub is_active: bool,
    /// Set for `client` logins: the agency client the login belongs to.
    pub client_id: Option<ClientId>,
}

impl Principal {
    pub fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            is_active: true,
            client_id: None,
        }
    }

    pub fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn ensure_active(&self) -> Result<(), PermissionError> {
        if self.is_active {
            Ok(())
        } else {
            Err(PermissionError::InactivePrincipal(self.id))
        }
    }
}
