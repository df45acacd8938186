use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IsolationLevel, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use levelthumbs_accounts_schema::{uploads, users};
use levelthumbs_domain::id::{UploadId, UserId};
use levelthumbs_domain::user::UserRole;

use crate::domain::repository::{
    IdentityStore, IdentityTransaction, UploadRepository, UserRepository,
};
use crate::domain::types::{Upload, UploadTransfer, User};
use crate::error::AccountsServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AccountsServiceError> {
        let model = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_external_account_id(
        &self,
        external_account_id: i64,
    ) -> Result<Option<User>, AccountsServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::ExternalAccountId.eq(external_account_id))
            .one(&self.db)
            .await
            .context("find user by external account id")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), AccountsServiceError> {
        users::ActiveModel {
            id: Set(user.id.0),
            external_account_id: Set(user.external_account_id),
            username: Set(user.username.clone()),
            role: Set(user.role.as_str().to_owned()),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn update_username(
        &self,
        id: UserId,
        username: &str,
    ) -> Result<(), AccountsServiceError> {
        users::ActiveModel {
            id: Set(id.0),
            username: Set(username.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update username")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> Result<User, AccountsServiceError> {
    let id = UserId(model.id);
    let role = model
        .role
        .parse::<UserRole>()
        .map_err(|e| AccountsServiceError::InvalidRole {
            user_id: id,
            value: e.0,
        })?;
    Ok(User {
        id,
        external_account_id: model.external_account_id,
        username: model.username,
        role,
    })
}

// ── Upload repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUploadRepository {
    pub db: DatabaseConnection,
}

impl UploadRepository for DbUploadRepository {
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Upload>, AccountsServiceError> {
        let models = uploads::Entity::find()
            .filter(uploads::Column::OwnerId.eq(owner_id.0))
            .order_by_desc(uploads::Column::UploadTime)
            .all(&self.db)
            .await
            .context("list uploads by owner")?;
        Ok(models.into_iter().map(upload_from_model).collect())
    }
}

fn upload_from_model(model: uploads::Model) -> Upload {
    Upload {
        id: UploadId(model.id),
        owner_id: UserId(model.owner_id),
        level_id: model.level_id,
        image_path: model.image_path,
        accepted: model.accepted,
        accepted_by: model.accepted_by.map(UserId),
        accepted_time: model.accepted_time,
        reason: model.reason,
        upload_time: model.upload_time,
    }
}

// ── Identity store (merge) ───────────────────────────────────────────────────

/// Every storage failure on the merge path is retryable: the transaction is
/// rolled back before the error reaches the caller.
fn transient(context: &'static str) -> impl FnOnce(DbErr) -> AccountsServiceError {
    move |e| AccountsServiceError::TransientStore(anyhow::Error::new(e).context(context))
}

#[derive(Clone)]
pub struct DbIdentityStore {
    pub db: DatabaseConnection,
}

impl IdentityStore for DbIdentityStore {
    type Tx = DbIdentityTransaction;

    async fn begin(&self) -> Result<DbIdentityTransaction, AccountsServiceError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), None)
            .await
            .map_err(transient("begin merge transaction"))?;
        Ok(DbIdentityTransaction { txn })
    }
}

/// sea-orm rolls a `DatabaseTransaction` back when it is dropped uncommitted,
/// which covers early returns and cancelled futures alike.
pub struct DbIdentityTransaction {
    txn: DatabaseTransaction,
}

impl IdentityTransaction for DbIdentityTransaction {
    async fn lock_user(&mut self, id: UserId) -> Result<Option<User>, AccountsServiceError> {
        let model = users::Entity::find_by_id(id.0)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(transient("lock user"))?;
        model.map(user_from_model).transpose()
    }

    async fn lock_uploads_of(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<UploadId>, AccountsServiceError> {
        let ids: Vec<Uuid> = uploads::Entity::find()
            .select_only()
            .column(uploads::Column::Id)
            .filter(
                Condition::any()
                    .add(uploads::Column::OwnerId.eq(user_id.0))
                    .add(uploads::Column::AcceptedBy.eq(user_id.0)),
            )
            .order_by_asc(uploads::Column::Id)
            .lock_exclusive()
            .into_tuple()
            .all(&self.txn)
            .await
            .map_err(transient("lock uploads"))?;
        Ok(ids.into_iter().map(UploadId).collect())
    }

    async fn transfer_uploads(
        &mut self,
        from: UserId,
        to: UserId,
    ) -> Result<UploadTransfer, AccountsServiceError> {
        let owned = uploads::Entity::update_many()
            .col_expr(uploads::Column::OwnerId, Expr::value(to.0))
            .filter(uploads::Column::OwnerId.eq(from.0))
            .exec(&self.txn)
            .await
            .map_err(transient("transfer upload ownership"))?;
        let reviewed = uploads::Entity::update_many()
            .col_expr(uploads::Column::AcceptedBy, Expr::value(to.0))
            .filter(uploads::Column::AcceptedBy.eq(from.0))
            .exec(&self.txn)
            .await
            .map_err(transient("transfer upload reviews"))?;
        Ok(UploadTransfer {
            owned: owned.rows_affected,
            reviewed: reviewed.rows_affected,
        })
    }

    async fn update_user(&mut self, user: &User) -> Result<bool, AccountsServiceError> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::ExternalAccountId,
                Expr::value(user.external_account_id),
            )
            .col_expr(users::Column::Username, Expr::value(user.username.clone()))
            .col_expr(users::Column::Role, Expr::value(user.role.as_str()))
            .filter(users::Column::Id.eq(user.id.0))
            .exec(&self.txn)
            .await
            .map_err(transient("reconcile target user"))?;
        Ok(result.rows_affected == 1)
    }

    async fn delete_user(&mut self, id: UserId) -> Result<bool, AccountsServiceError> {
        let result = users::Entity::delete_by_id(id.0)
            .exec(&self.txn)
            .await
            .map_err(transient("delete source user"))?;
        Ok(result.rows_affected == 1)
    }

    async fn commit(self) -> Result<(), AccountsServiceError> {
        self.txn
            .commit()
            .await
            .map_err(transient("commit merge transaction"))
    }
}
