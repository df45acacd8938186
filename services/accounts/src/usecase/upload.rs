use levelthumbs_domain::id::UserId;

use crate::domain::repository::{UploadRepository, UserRepository};
use crate::domain::types::Upload;
use crate::error::AccountsServiceError;

// ── ListUploads ──────────────────────────────────────────────────────────────

pub struct ListUploadsUseCase<U: UserRepository, R: UploadRepository> {
    pub users: U,
    pub uploads: R,
}

impl<U: UserRepository, R: UploadRepository> ListUploadsUseCase<U, R> {
    pub async fn execute(&self, owner_id: UserId) -> Result<Vec<Upload>, AccountsServiceError> {
        if self.users.find_by_id(owner_id).await?.is_none() {
            return Err(AccountsServiceError::UserNotFound(owner_id));
        }
        self.uploads.list_by_owner(owner_id).await
    }
}
