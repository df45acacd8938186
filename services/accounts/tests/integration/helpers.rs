use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use levelthumbs_accounts::domain::repository::{
    IdentityStore, IdentityTransaction, UserRepository,
};
use levelthumbs_accounts::domain::types::{UploadTransfer, User};
use levelthumbs_accounts::error::AccountsServiceError;
use levelthumbs_domain::id::{UploadId, UserId};
use levelthumbs_domain::user::UserRole;

// ── Rows ─────────────────────────────────────────────────────────────────────

/// Stored user row. `role` is the raw token so invalid values can be seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserId,
    pub external_account_id: i64,
    pub username: String,
    pub role: String,
}

impl UserRow {
    pub fn new(external_account_id: i64, username: &str, role: &str) -> Self {
        Self {
            id: UserId::new(),
            external_account_id,
            username: username.to_owned(),
            role: role.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRow {
    pub id: UploadId,
    pub owner_id: UserId,
    pub accepted_by: Option<UserId>,
    pub level_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub users: BTreeMap<UserId, UserRow>,
    pub uploads: BTreeMap<UploadId, UploadRow>,
}

impl Tables {
    pub fn uploads_owned_by(&self, owner_id: UserId) -> usize {
        self.uploads
            .values()
            .filter(|u| u.owner_id == owner_id)
            .count()
    }

    /// True when every upload references existing users.
    pub fn references_are_intact(&self) -> bool {
        self.uploads.values().all(|u| {
            self.users.contains_key(&u.owner_id)
                && u.accepted_by.is_none_or(|r| self.users.contains_key(&r))
        })
    }
}

fn user_from_row(row: &UserRow) -> Result<User, AccountsServiceError> {
    let role = row
        .role
        .parse::<UserRole>()
        .map_err(|e| AccountsServiceError::InvalidRole {
            user_id: row.id,
            value: e.0,
        })?;
    Ok(User {
        id: row.id,
        external_account_id: row.external_account_id,
        username: row.username.clone(),
        role,
    })
}

// ── MemoryStore ──────────────────────────────────────────────────────────────

/// Step at which a transaction reports a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Begin,
    LockUploads,
    TransferUploads,
    UpdateUser,
    DeleteUser,
    Commit,
}

/// In-memory transactional store.
///
/// A transaction holds the table lock for its whole lifetime and works on a
/// private copy; `commit` publishes the copy, dropping it discards the copy.
/// Foreign keys behave like the migration: `owner_id` restricts deletes,
/// `accepted_by` is set to null.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<AsyncMutex<Tables>>,
    fail_at: Arc<Mutex<Option<FailPoint>>>,
    lock_log: Arc<Mutex<Vec<UserId>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, row: UserRow) -> UserId {
        let id = row.id;
        self.tables.lock().await.users.insert(id, row);
        id
    }

    pub async fn insert_upload(&self, owner_id: UserId, level_id: i64) -> UploadId {
        self.insert_upload_row(owner_id, None, level_id).await
    }

    pub async fn insert_reviewed_upload(
        &self,
        owner_id: UserId,
        reviewer: UserId,
        level_id: i64,
    ) -> UploadId {
        self.insert_upload_row(owner_id, Some(reviewer), level_id)
            .await
    }

    async fn insert_upload_row(
        &self,
        owner_id: UserId,
        accepted_by: Option<UserId>,
        level_id: i64,
    ) -> UploadId {
        let id = UploadId::new();
        self.tables.lock().await.uploads.insert(
            id,
            UploadRow {
                id,
                owner_id,
                accepted_by,
                level_id,
            },
        );
        id
    }

    pub fn fail_at(&self, point: FailPoint) {
        *self.fail_at.lock().unwrap() = Some(point);
    }

    pub fn clear_failure(&self) {
        *self.fail_at.lock().unwrap() = None;
    }

    pub async fn snapshot(&self) -> Tables {
        self.tables.lock().await.clone()
    }

    /// User ids in the order they were row-locked, across all transactions.
    pub fn lock_log(&self) -> Vec<UserId> {
        self.lock_log.lock().unwrap().clone()
    }
}

fn injected(point: FailPoint) -> AccountsServiceError {
    AccountsServiceError::TransientStore(anyhow!("injected failure at {point:?}"))
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    fail_at: Option<FailPoint>,
    lock_log: Arc<Mutex<Vec<UserId>>>,
}

impl MemoryTransaction {
    fn check(&self, point: FailPoint) -> Result<(), AccountsServiceError> {
        if self.fail_at == Some(point) {
            return Err(injected(point));
        }
        Ok(())
    }
}

impl IdentityStore for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, AccountsServiceError> {
        let fail_at = *self.fail_at.lock().unwrap();
        if fail_at == Some(FailPoint::Begin) {
            return Err(injected(FailPoint::Begin));
        }
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTransaction {
            guard,
            working,
            fail_at,
            lock_log: Arc::clone(&self.lock_log),
        })
    }
}

impl IdentityTransaction for MemoryTransaction {
    async fn lock_user(&mut self, id: UserId) -> Result<Option<User>, AccountsServiceError> {
        self.lock_log.lock().unwrap().push(id);
        self.working.users.get(&id).map(user_from_row).transpose()
    }

    async fn lock_uploads_of(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<UploadId>, AccountsServiceError> {
        self.check(FailPoint::LockUploads)?;
        // BTreeMap iteration is already ascending by id.
        Ok(self
            .working
            .uploads
            .values()
            .filter(|u| u.owner_id == user_id || u.accepted_by == Some(user_id))
            .map(|u| u.id)
            .collect())
    }

    async fn transfer_uploads(
        &mut self,
        from: UserId,
        to: UserId,
    ) -> Result<UploadTransfer, AccountsServiceError> {
        let mut transfer = UploadTransfer::default();
        for upload in self.working.uploads.values_mut() {
            if upload.owner_id == from {
                upload.owner_id = to;
                transfer.owned += 1;
            }
            if upload.accepted_by == Some(from) {
                upload.accepted_by = Some(to);
                transfer.reviewed += 1;
            }
        }
        // Fails after the rows have been rewritten in the working copy.
        self.check(FailPoint::TransferUploads)?;
        Ok(transfer)
    }

    async fn update_user(&mut self, user: &User) -> Result<bool, AccountsServiceError> {
        let Some(row) = self.working.users.get_mut(&user.id) else {
            return Ok(false);
        };
        row.external_account_id = user.external_account_id;
        row.username = user.username.clone();
        row.role = user.role.as_str().to_owned();
        self.check(FailPoint::UpdateUser)?;
        Ok(true)
    }

    async fn delete_user(&mut self, id: UserId) -> Result<bool, AccountsServiceError> {
        self.check(FailPoint::DeleteUser)?;
        if self.working.uploads_owned_by(id) > 0 {
            return Err(AccountsServiceError::TransientStore(anyhow!(
                "uploads.owner_id still references {id}"
            )));
        }
        if self.working.users.remove(&id).is_none() {
            return Ok(false);
        }
        for upload in self.working.uploads.values_mut() {
            if upload.accepted_by == Some(id) {
                upload.accepted_by = None;
            }
        }
        Ok(true)
    }

    async fn commit(self) -> Result<(), AccountsServiceError> {
        self.check(FailPoint::Commit)?;
        let MemoryTransaction {
            mut guard, working, ..
        } = self;
        *guard = working;
        Ok(())
    }
}

impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AccountsServiceError> {
        self.tables
            .lock()
            .await
            .users
            .get(&id)
            .map(user_from_row)
            .transpose()
    }

    async fn find_by_external_account_id(
        &self,
        external_account_id: i64,
    ) -> Result<Option<User>, AccountsServiceError> {
        self.tables
            .lock()
            .await
            .users
            .values()
            .find(|u| u.external_account_id == external_account_id)
            .map(user_from_row)
            .transpose()
    }

    async fn create(&self, user: &User) -> Result<(), AccountsServiceError> {
        self.insert_user(UserRow {
            id: user.id,
            external_account_id: user.external_account_id,
            username: user.username.clone(),
            role: user.role.as_str().to_owned(),
        })
        .await;
        Ok(())
    }

    async fn update_username(
        &self,
        id: UserId,
        username: &str,
    ) -> Result<(), AccountsServiceError> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .users
            .get_mut(&id)
            .ok_or(AccountsServiceError::UserNotFound(id))?;
        row.username = username.to_owned();
        Ok(())
    }
}
