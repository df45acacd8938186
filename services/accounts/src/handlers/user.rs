use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use levelthumbs_domain::id::UserId;
use levelthumbs_domain::user::UserRole;

use crate::domain::types::{Upload, User};
use crate::error::AccountsServiceError;
use crate::state::AppState;
use crate::usecase::merge::MergeUsersUseCase;
use crate::usecase::upload::ListUploadsUseCase;
use crate::usecase::user::GetUserUseCase;

#[derive(Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub external_account_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            external_account_id: user.external_account_id,
            username: user.username,
            role: user.role,
        }
    }
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    Path(id): Path<UserId>,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AccountsServiceError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase.execute(id).await?;
    Ok(Json(user.into()))
}

// ── GET /users/{id}/uploads ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UploadResponse {
    pub id: String,
    pub level_id: i64,
    pub accepted: bool,
    pub accepted_by: Option<UserId>,
    #[serde(serialize_with = "levelthumbs_core::serde::to_rfc3339_ms_opt")]
    pub accepted_time: Option<chrono::DateTime<chrono::Utc>>,
    pub reason: Option<String>,
    #[serde(serialize_with = "levelthumbs_core::serde::to_rfc3339_ms")]
    pub upload_time: chrono::DateTime<chrono::Utc>,
}

impl From<Upload> for UploadResponse {
    fn from(upload: Upload) -> Self {
        Self {
            id: upload.id.to_string(),
            level_id: upload.level_id,
            accepted: upload.accepted,
            accepted_by: upload.accepted_by,
            accepted_time: upload.accepted_time,
            reason: upload.reason,
            upload_time: upload.upload_time,
        }
    }
}

pub async fn get_uploads(
    Path(id): Path<UserId>,
    State(state): State<AppState>,
) -> Result<Json<Vec<UploadResponse>>, AccountsServiceError> {
    let usecase = ListUploadsUseCase {
        users: state.user_repo(),
        uploads: state.upload_repo(),
    };
    let uploads = usecase.execute(id).await?;
    Ok(Json(uploads.into_iter().map(Into::into).collect()))
}

// ── POST /users/{id}/merge ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct MergeRequest {
    pub source_id: UserId,
}

#[derive(Serialize)]
pub struct MergeResponse {
    pub user: UserResponse,
    pub uploads_transferred: u64,
    pub reviews_transferred: u64,
}

pub async fn merge_user(
    Path(target_id): Path<UserId>,
    State(state): State<AppState>,
    Json(body): Json<MergeRequest>,
) -> Result<Json<MergeResponse>, AccountsServiceError> {
    let usecase = MergeUsersUseCase {
        store: state.identity_store(),
    };
    let outcome = usecase.execute(target_id, body.source_id).await?;
    Ok(Json(MergeResponse {
        user: outcome.user.into(),
        uploads_transferred: outcome.transfer.owned,
        reviews_transferred: outcome.transfer.reviewed,
    }))
}
