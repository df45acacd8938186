use chrono::{DateTime, Utc};

use levelthumbs_domain::id::{UploadId, UserId};
use levelthumbs_domain::user::UserRole;

/// One authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Account id reported by the external login provider.
    pub external_account_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl User {
    /// A fresh identity as created on first external login.
    pub fn new(external_account_id: i64, username: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            external_account_id,
            username: username.into(),
            role: UserRole::User,
        }
    }
}

/// Target user after absorbing `source`.
///
/// The source's public identity (`external_account_id`, `username`) becomes
/// canonical, the role is the higher of the two, and the target keeps its id.
pub fn reconcile(target: &User, source: &User) -> User {
    User {
        id: target.id,
        external_account_id: source.external_account_id,
        username: source.username.clone(),
        role: UserRole::max(target.role, source.role),
    }
}

/// A level thumbnail submitted by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub id: UploadId,
    pub owner_id: UserId,
    pub level_id: i64,
    pub image_path: String,
    pub accepted: bool,
    /// Moderator who accepted the upload.
    pub accepted_by: Option<UserId>,
    pub accepted_time: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub upload_time: DateTime<Utc>,
}

/// Rows repointed from the absorbed user to the surviving one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadTransfer {
    /// Uploads whose `owner_id` moved.
    pub owned: u64,
    /// Uploads whose `accepted_by` moved.
    pub reviewed: u64,
}

/// Result of a committed merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub user: User,
    pub transfer: UploadTransfer,
}
