use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claim set carried by an access token.
///
/// Every field is mandatory: a token missing any of them fails to decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Display name of the subject at issuance time
    pub name: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for a user, valid for `validity` starting at `issued_at`.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `name` - Display name embedded as the `name` claim
    /// * `issued_at` - Issuance instant
    /// * `validity` - Length of the validity window
    pub fn for_user(
        user_id: impl ToString,
        name: impl Into<String>,
        issued_at: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        let expiration = issued_at + validity;

        Self {
            sub: user_id.to_string(),
            name: name.into(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        }
    }
}
