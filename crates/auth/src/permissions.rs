use serde::{Deserialize, Serialize};

use agencyops_core::PageId;

use crate::Role;

/// View/edit/delete capability flags.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Capabilities {
    pub const fn none() -> Self {
        Self {
            can_view: false,
            can_edit: false,
            can_delete: false,
        }
    }

    pub const fn full() -> Self {
        Self {
            can_view: true,
            can_edit: true,
            can_delete: true,
        }
    }

    pub const fn view_only() -> Self {
        Self {
            can_view: true,
            can_edit: false,
            can_delete: false,
        }
    }

    pub const fn view_edit() -> Self {
        Self {
            can_view: true,
            can_edit: true,
            can_delete: false,
        }
    }
}

/// One row of the role × page table.
///
/// At most one row exists per `(role, page_id)`; a missing row means no
/// capability at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    pub role: Role,
    pub page_id: PageId,
    #[serde(flatten)]
    pub capabilities: Capabilities,
}

impl RolePermission {
    pub fn new(role: Role, page_id: PageId, capabilities: Capabilities) -> Self {
        Self {
            role,
            page_id,
            capabilities,
        }
    }
}
