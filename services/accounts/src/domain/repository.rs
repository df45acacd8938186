#![allow(async_fn_in_trait)]

use levelthumbs_domain::id::{UploadId, UserId};

use crate::domain::types::{Upload, UploadTransfer, User};
use crate::error::AccountsServiceError;

/// Repository for user identities.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AccountsServiceError>;
    async fn find_by_external_account_id(
        &self,
        external_account_id: i64,
    ) -> Result<Option<User>, AccountsServiceError>;
    async fn create(&self, user: &User) -> Result<(), AccountsServiceError>;
    async fn update_username(
        &self,
        id: UserId,
        username: &str,
    ) -> Result<(), AccountsServiceError>;
}

/// Repository for thumbnail uploads.
pub trait UploadRepository: Send + Sync {
    /// Uploads owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Upload>, AccountsServiceError>;
}

/// Transactional storage used by the identity merge.
///
/// Every `begin` opens exactly one transaction attempt. Storage failures are
/// reported as `TransientStore`.
pub trait IdentityStore: Send + Sync {
    type Tx: IdentityTransaction;

    async fn begin(&self) -> Result<Self::Tx, AccountsServiceError>;
}

/// An open merge transaction. Dropping it without `commit` rolls back.
pub trait IdentityTransaction: Send {
    /// Read and row-lock a user until the transaction ends.
    /// Returns `InvalidRole` if the stored role token is unknown.
    async fn lock_user(&mut self, id: UserId) -> Result<Option<User>, AccountsServiceError>;

    /// Row-lock every upload owned or accepted by `user_id`, in ascending id
    /// order. Returns the locked ids.
    async fn lock_uploads_of(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<UploadId>, AccountsServiceError>;

    /// Repoint `owner_id` and `accepted_by` from `from` to `to`.
    async fn transfer_uploads(
        &mut self,
        from: UserId,
        to: UserId,
    ) -> Result<UploadTransfer, AccountsServiceError>;

    /// Overwrite the mutable fields of `user.id`. Returns `false` if no row matched.
    async fn update_user(&mut self, user: &User) -> Result<bool, AccountsServiceError>;

    /// Returns `false` if no row matched.
    async fn delete_user(&mut self, id: UserId) -> Result<bool, AccountsServiceError>;

    async fn commit(self) -> Result<(), AccountsServiceError>;
}
