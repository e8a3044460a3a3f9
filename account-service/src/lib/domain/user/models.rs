use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered user. Only the password hash is ever held.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown to clients and embedded in issued tokens.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// First or last name value type
///
/// Surrounding whitespace is trimmed; the result must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    /// Create a validated name.
    ///
    /// # Arguments
    /// * `field` - Field label used in error messages (`first_name`, `last_name`)
    /// * `name` - Raw name string
    ///
    /// # Errors
    /// * `Missing` - Name is empty after trimming
    pub fn new(field: &'static str, name: String) -> Result<Self, NameError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(NameError::Missing { field });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. Stored lowercased,
/// so addresses differing only in case name the same account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `Missing` - Email is empty
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(EmailError::Missing);
        }

        email_address::EmailAddress::from_str(email)
            .map(|_| EmailAddress(email.to_lowercase()))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password chosen at registration.
///
/// Lives only until it is hashed. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 8;

    /// # Errors
    /// * `Missing` - Password is empty
    /// * `TooShort` - Password shorter than 8 characters
    pub fn new(password: String) -> Result<Self, PasswordError> {
        let length = password.chars().count();

        if length == 0 {
            Err(PasswordError::Missing)
        } else if length < Self::MIN_LENGTH {
            Err(PasswordError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(password))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub password: Password,
}

impl CreateUserCommand {
    pub fn new(
        first_name: PersonName,
        last_name: PersonName,
        email: EmailAddress,
        password: Password,
    ) -> Self {
        Self {
            first_name,
            last_name,
            email,
            password,
        }
    }
}

/// Command to sign in with an email and a presented password.
///
/// The password is only checked for presence; length rules apply at
/// registration.
pub struct AuthenticateCommand {
    pub email: EmailAddress,
    pub password: String,
}

impl AuthenticateCommand {
    /// # Errors
    /// * `Missing` - Password is empty
    pub fn new(email: EmailAddress, password: String) -> Result<Self, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::Missing);
        }

        Ok(Self { email, password })
    }
}

impl fmt::Debug for AuthenticateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticateCommand")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful sign-in.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
