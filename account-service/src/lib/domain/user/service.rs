use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::AuthenticateCommand;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Session;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token signing, built from configuration
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: CreateUserCommand) -> Result<User, UserError> {
        let password_hash = self
            .authenticator
            .hash_password(command.password.as_str())
            .map_err(|e| UserError::PasswordHashing(e.to_string()))?;

        let user = User {
            id: UserId::new(),
            first_name: command.first_name,
            last_name: command.last_name,
            email: command.email,
            password_hash,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;

        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(created_user)
    }

    async fn authenticate(&self, command: AuthenticateCommand) -> Result<Session, UserError> {
        let Some(user) = self.repository.find_by_email(&command.email).await? else {
            tracing::info!("Sign-in rejected: unknown email");
            return Err(UserError::InvalidCredentials);
        };

        let issued = self
            .authenticator
            .authenticate(
                &command.password,
                &user.password_hash,
                user.id,
                user.display_name(),
            )
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::info!(user_id = %user.id, "Sign-in rejected: wrong password");
                    UserError::InvalidCredentials
                }
                AuthenticationError::JwtError(err) => UserError::TokenIssuance(err.to_string()),
            })?;

        tracing::info!(
            user_id = %user.id,
            expires_at = %issued.expires_at,
            "Token issued"
        );

        Ok(Session {
            token: issued.access_token,
            issued_at: issued.issued_at,
            expires_at: issued.expires_at,
        })
    }

    async fn resolve_token(&self, token: &str) -> Result<User, UserError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::warn!(error = %e, "Token rejected");
            UserError::Unauthorized
        })?;

        let user_id = UserId::from_string(&claims.sub).map_err(|e| {
            tracing::warn!(error = %e, "Token subject is not a user id");
            UserError::Unauthorized
        })?;

        let user = self.repository.find_by_id(&user_id).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Token subject lookup failed");
            UserError::Unauthorized
        })?;

        user.ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "Token subject no longer exists");
            UserError::Unauthorized
        })
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }
}
