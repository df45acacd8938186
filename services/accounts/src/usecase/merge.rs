use anyhow::anyhow;
use tracing::{debug, info};

use levelthumbs_domain::id::{UserId, ascending};

use crate::domain::repository::{IdentityStore, IdentityTransaction};
use crate::domain::types::{MergeOutcome, reconcile};
use crate::error::AccountsServiceError;

// ── MergeUsers ───────────────────────────────────────────────────────────────

/// Folds the `source` identity into `target` in one transaction:
/// uploads move to `target`, `target` takes the source's public identity and
/// the higher role, then `source` is deleted.
///
/// Any error leaves both users and all uploads as they were. Only
/// `TransientStore` is worth retrying; repeating a merge that already
/// committed yields `UserNotFound(source)`.
pub struct MergeUsersUseCase<S: IdentityStore> {
    pub store: S,
}

impl<S: IdentityStore> MergeUsersUseCase<S> {
    #[tracing::instrument(name = "merge_users", skip_all, fields(%target, %source))]
    pub async fn execute(
        &self,
        target: UserId,
        source: UserId,
    ) -> Result<MergeOutcome, AccountsServiceError> {
        if target == source {
            return Err(AccountsServiceError::SelfMerge);
        }

        let mut tx = self.store.begin().await?;

        // Lower id first so overlapping merges never wait on each other in a cycle.
        let (first, second) = ascending(target, source);
        let first_user = tx
            .lock_user(first)
            .await?
            .ok_or(AccountsServiceError::UserNotFound(first))?;
        let second_user = tx
            .lock_user(second)
            .await?
            .ok_or(AccountsServiceError::UserNotFound(second))?;
        let (target_user, source_user) = if first == target {
            (first_user, second_user)
        } else {
            (second_user, first_user)
        };

        let locked = tx.lock_uploads_of(source).await?;
        debug!(uploads = locked.len(), "locked source uploads");

        let transfer = tx.transfer_uploads(source, target).await?;

        let merged = reconcile(&target_user, &source_user);
        if !tx.update_user(&merged).await? {
            return Err(AccountsServiceError::TransientStore(anyhow!(
                "user {target} disappeared during merge"
            )));
        }

        if !tx.delete_user(source).await? {
            return Err(AccountsServiceError::TransientStore(anyhow!(
                "user {source} disappeared during merge"
            )));
        }

        tx.commit().await?;

        info!(
            uploads_transferred = transfer.owned,
            reviews_transferred = transfer.reviewed,
            role = %merged.role,
            "merged users"
        );
        Ok(MergeOutcome {
            user: merged,
            transfer,
        })
    }
}
