use tonic::{Request, Response, Status};

use levelthumbs_domain::id::UserId;
use levelthumbs_proto::account::{
    FindOrCreateUserRequest, GetUserRequest, MergeUsersRequest, MergeUsersResponse, User,
    account_service_server::AccountService,
};

use crate::domain::types as domain;
use crate::error::AccountsServiceError;
use crate::state::AppState;
use crate::usecase::merge::MergeUsersUseCase;
use crate::usecase::user::{FindOrCreateUserInput, FindOrCreateUserUseCase, GetUserUseCase};

#[derive(Clone)]
pub struct AccountsGrpcServer {
    pub state: AppState,
}

fn parse_user_id(raw: &str, field: &'static str) -> Result<UserId, Status> {
    raw.parse::<UserId>()
        .map_err(|_| Status::invalid_argument(format!("invalid {field}")))
}

fn user_to_proto(user: domain::User) -> User {
    User {
        id: user.id.to_string(),
        external_account_id: user.external_account_id,
        username: user.username,
        role: user.role.to_string(),
    }
}

/// Each merge outcome maps to its own status code so callers can tell
/// "already merged" from "retry later".
pub fn to_status(error: AccountsServiceError) -> Status {
    match &error {
        AccountsServiceError::SelfMerge => Status::invalid_argument(error.to_string()),
        AccountsServiceError::UserNotFound(_) => Status::not_found(error.to_string()),
        AccountsServiceError::InvalidRole { .. } => {
            tracing::error!(error = %error, "invalid stored role");
            Status::failed_precondition(error.to_string())
        }
        AccountsServiceError::TransientStore(e) => {
            tracing::warn!(error = %format!("{e:#}"), "merge aborted, retryable");
            Status::unavailable(error.to_string())
        }
        AccountsServiceError::Internal(e) => {
            tracing::error!(error = %format!("{e:#}"), "internal error");
            Status::internal(error.to_string())
        }
    }
}

#[tonic::async_trait]
impl AccountService for AccountsGrpcServer {
    async fn get_user(&self, request: Request<GetUserRequest>) -> Result<Response<User>, Status> {
        let user_id = parse_user_id(&request.into_inner().user_id, "user_id")?;

        let uc = GetUserUseCase {
            repo: self.state.user_repo(),
        };
        let user = uc.execute(user_id).await.map_err(to_status)?;

        Ok(Response::new(user_to_proto(user)))
    }

    async fn find_or_create_user(
        &self,
        request: Request<FindOrCreateUserRequest>,
    ) -> Result<Response<User>, Status> {
        let req = request.into_inner();
        if req.username.is_empty() {
            return Err(Status::invalid_argument("missing username"));
        }

        let uc = FindOrCreateUserUseCase {
            repo: self.state.user_repo(),
        };
        let user = uc
            .execute(FindOrCreateUserInput {
                external_account_id: req.external_account_id,
                username: req.username,
            })
            .await
            .map_err(to_status)?;

        Ok(Response::new(user_to_proto(user)))
    }

    async fn merge_users(
        &self,
        request: Request<MergeUsersRequest>,
    ) -> Result<Response<MergeUsersResponse>, Status> {
        let req = request.into_inner();
        let target = parse_user_id(&req.target_id, "target_id")?;
        let source = parse_user_id(&req.source_id, "source_id")?;

        let uc = MergeUsersUseCase {
            store: self.state.identity_store(),
        };
        let outcome = uc.execute(target, source).await.map_err(to_status)?;

        Ok(Response::new(MergeUsersResponse {
            user: Some(user_to_proto(outcome.user)),
            uploads_transferred: outcome.transfer.owned,
            reviews_transferred: outcome.transfer.reviewed,
        }))
    }
}
