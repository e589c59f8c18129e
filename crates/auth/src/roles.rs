use core::str::FromStr;

use serde::{Deserialize, Serialize};

use agencyops_core::DomainError;

/// Coarse-grained principal category driving default page permissions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Manager,
    Admin,
    SuperAdmin,
    /// External login belonging to an agency client.
    Client,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::User,
        Role::Manager,
        Role::Admin,
        Role::SuperAdmin,
        Role::Client,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
            Role::Client => "client",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| DomainError::validation(format!("unknown role '{s}'")))
    }
}
