use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token
/// issuance/verification.
///
/// Built once at startup from configuration and shared read-only afterwards.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_validity: Duration,
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT
    pub access_token: String,
    pub claims: Claims,
    pub issued_at: DateTime<Utc>,
    /// Instant after which the token is no longer accepted
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `token_validity` - Validity window of issued tokens
    ///
    /// # Errors
    /// * `InvalidSecret` - Secret is empty
    pub fn new(jwt_secret: &[u8], token_validity: Duration) -> Result<Self, JwtError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret)?,
            token_validity,
        })
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue a token for the user.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Subject of the issued token
    /// * `display_name` - Value of the `name` claim
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: impl ToString,
        display_name: impl Into<String>,
    ) -> Result<IssuedToken, AuthenticationError> {
        if !self.verify_password(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token(user_id, display_name)?)
    }

    /// Issue a token valid from now until now + validity window.
    pub fn issue_token(
        &self,
        user_id: impl ToString,
        display_name: impl Into<String>,
    ) -> Result<IssuedToken, JwtError> {
        self.issue_token_at(user_id, display_name, Utc::now())
    }

    /// Issue a token as if it were signed at `issued_at`.
    pub fn issue_token_at(
        &self,
        user_id: impl ToString,
        display_name: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let claims = Claims::for_user(user_id, display_name, issued_at, self.token_validity);
        let access_token = self.jwt_handler.encode(&claims)?;

        Ok(IssuedToken {
            access_token,
            claims,
            issued_at,
            expires_at: issued_at + self.token_validity,
        })
    }

    /// Validate a token's algorithm, signature and expiry and return its claims.
    ///
    /// Says nothing about whether the subject still exists.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
