use tracing::info;

use levelthumbs_domain::id::UserId;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::AccountsServiceError;

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, user_id: UserId) -> Result<User, AccountsServiceError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(AccountsServiceError::UserNotFound(user_id))
    }
}

// ── FindOrCreateUser (login path) ────────────────────────────────────────────

pub struct FindOrCreateUserInput {
    pub external_account_id: i64,
    pub username: String,
}

/// Resolves the user behind a successful external login, creating it on
/// first login. A changed provider username is written back.
pub struct FindOrCreateUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> FindOrCreateUserUseCase<R> {
    pub async fn execute(&self, input: FindOrCreateUserInput) -> Result<User, AccountsServiceError> {
        match self
            .repo
            .find_by_external_account_id(input.external_account_id)
            .await?
        {
            Some(mut user) => {
                if user.username != input.username {
                    self.repo.update_username(user.id, &input.username).await?;
                    user.username = input.username;
                }
                Ok(user)
            }
            None => {
                let user = User::new(input.external_account_id, input.username);
                self.repo.create(&user).await?;
                info!(user_id = %user.id, external_account_id = user.external_account_id, "created user");
                Ok(user)
            }
        }
    }
}
