//! Privilege tiers attached to user records.
//!
//! Every role comparison in the application goes through this type. The
//! ordering of the variants is the privilege ordering, so `<`/`>=` express
//! "outranks" without string comparisons scattered across handlers.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ordered privilege tier: `User < Admin < SuperAdmin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary account with access to its own profile only.
    User,
    /// May manage users of equal or lower privilege.
    Admin,
    /// Full administrative privilege.
    SuperAdmin,
}

/// Error returned when a role string is not one of the known tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleParseError {
    value: String,
}

impl RoleParseError {
    /// The rejected input value.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

impl fmt::Display for RoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.value)
    }
}

impl std::error::Error for RoleParseError {}

impl Role {
    /// All known roles in ascending privilege order.
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::SuperAdmin];

    /// Canonical serialised form of the role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Parse a role label.
    ///
    /// Matching is case-insensitive and tolerates spaces or hyphens in place
    /// of the underscore, so legacy form values such as `"SUPER ADMIN"` parse
    /// to the canonical `super_admin` tier.
    pub fn parse(value: &str) -> Result<Self, RoleParseError> {
        let normalised = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalised.as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(RoleParseError {
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Role {
    type Error = RoleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
