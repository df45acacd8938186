use sea_orm::DatabaseConnection;

use crate::infra::db::{DbIdentityStore, DbUploadRepository, DbUserRepository};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn upload_repo(&self) -> DbUploadRepository {
        DbUploadRepository {
            db: self.db.clone(),
        }
    }

    pub fn identity_store(&self) -> DbIdentityStore {
        DbIdentityStore {
            db: self.db.clone(),
        }
    }
}
