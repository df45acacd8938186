//! User domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// User permission level.
///
/// Wire and storage format: lowercase token (`user`, `verified`, `moderator`, `admin`).
/// Totally ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular user.
    User,
    /// Uploads are published without moderator approval.
    Verified,
    /// Approves or rejects pending uploads.
    Moderator,
    /// Manages users and uploads.
    Admin,
}

/// A stored role token that does not name any [`UserRole`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role token {0:?}")]
pub struct UnknownRole(pub String);

impl UserRole {
    pub const ALL: [UserRole; 4] = [Self::User, Self::Verified, Self::Moderator, Self::Admin];

    /// The more privileged of two roles.
    ///
    /// Used when two identities are merged: privilege only ever moves up.
    pub fn max(a: UserRole, b: UserRole) -> UserRole {
        if a >= b { a } else { b }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Verified => "verified",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "verified" => Ok(Self::Verified),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}
