use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Signing secret must not be empty")]
    InvalidSecret,

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token declares an unexpected signing algorithm")]
    InvalidAlgorithm,

    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),
}
