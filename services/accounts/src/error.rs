use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use levelthumbs_domain::id::UserId;

/// Accounts service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AccountsServiceError {
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("cannot merge a user into itself")]
    SelfMerge,
    #[error("user {user_id} has unknown role {value:?}")]
    InvalidRole { user_id: UserId, value: String },
    /// The store was unavailable or the transaction conflicted. Nothing was
    /// written; the same call may be retried unchanged.
    #[error("storage temporarily unavailable")]
    TransientStore(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AccountsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::SelfMerge => "SELF_MERGE",
            Self::InvalidRole { .. } => "INVALID_ROLE",
            Self::TransientStore(_) => "TRANSIENT_STORE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStore(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::SelfMerge => StatusCode::BAD_REQUEST,
            Self::InvalidRole { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TransientStore(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AccountsServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors; TraceLayer already records them.
        match &self {
            Self::Internal(e) | Self::TransientStore(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = self.kind(), "store error");
            }
            Self::InvalidRole { user_id, value } => {
                tracing::error!(%user_id, value = %value, kind = self.kind(), "invalid stored role");
            }
            Self::UserNotFound(_) | Self::SelfMerge => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
