//! Authorization primitives for suite modules.
//!
//! Permission *evaluation* happens upstream (roles, policies). What reaches
//! this crate is the already-resolved list of permission names granted to the
//! caller; modules only ask whether a capability is present.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unknown permission: {0}")]
    Unknown(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    EditEmployee,
    DeleteEmployee,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::EditEmployee => "edit-employee",
            Permission::DeleteEmployee => "delete-employee",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AuthzError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "edit-employee" => Ok(Permission::EditEmployee),
            "delete-employee" => Ok(Permission::DeleteEmployee),
            other => Err(AuthzError::Unknown(other.to_string())),
        }
    }
}

/// Permissions granted to one caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grants {
    permissions: BTreeSet<Permission>,
}

impl Grants {
    pub fn new(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Parse a comma-separated header value. Names this crate does not know
    /// are skipped: they belong to other modules.
    pub fn parse_list(raw: &str) -> Self {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .filter_map(|name| name.parse().ok()),
        )
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}
