use serde::{Deserialize, Serialize};

use crate::{Capabilities, PageKey};

/// Resolved capability set for one (principal, page) pair.
///
/// Serialized flat (`{granted, canView, canEdit, canDelete}`) as the UI expects.
/// Verdicts are never persisted.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub granted: bool,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Verdict {
    pub const fn denied() -> Self {
        Self {
            granted: false,
            can_view: false,
            can_edit: false,
            can_delete: false,
        }
    }

    pub const fn full() -> Self {
        Self::from_capabilities(Capabilities::full())
    }

    /// `granted` follows `can_view`.
    pub const fn from_capabilities(caps: Capabilities) -> Self {
        Self {
            granted: caps.can_view,
            can_view: caps.can_view,
            can_edit: caps.can_edit,
            can_delete: caps.can_delete,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_view: self.can_view,
            can_edit: self.can_edit,
            can_delete: self.can_delete,
        }
    }
}

/// What a verdict was based on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionBasis {
    /// `super_admin` on the administrative console.
    SuperAdminBypass,
    /// Flags copied from the (role, page) row.
    RolePermission,
    /// A user override widened an otherwise denied menu page.
    UserOverride,
    /// No (role, page) row and no applicable override.
    NoRolePermission,
    /// The page is deactivated.
    PageInactive,
}

impl DecisionBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionBasis::SuperAdminBypass => "super_admin_bypass",
            DecisionBasis::RolePermission => "role_permission",
            DecisionBasis::UserOverride => "user_override",
            DecisionBasis::NoRolePermission => "no_role_permission",
            DecisionBasis::PageInactive => "page_inactive",
        }
    }
}

/// A verdict together with its basis (audit trail).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub page_key: PageKey,
    pub verdict: Verdict,
    pub basis: DecisionBasis,
    /// Human-readable reason for the decision.
    pub reason: String,
}
