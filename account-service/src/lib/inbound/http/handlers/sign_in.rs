use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::AuthenticateCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordError;

/// Name of the cookie carrying the access token.
pub const TOKEN_COOKIE_NAME: &str = "token";

pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiSuccess<SignInResponseData>), ApiError> {
    let Json(body) = payload?;

    let session = state
        .user_service
        .authenticate(body.try_into_command()?)
        .await
        .map_err(ApiError::from)?;

    let cookie = token_cookie(&session.token, session.issued_at, session.expires_at)?;

    Ok((
        jar.add(cookie),
        ApiSuccess::new(
            StatusCode::OK,
            SignInResponseData {
                token: session.token,
            },
        ),
    ))
}

/// Build the HTTP-only cookie holding `token` for the token's validity window.
fn token_cookie(
    token: &str,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<Cookie<'static>, ApiError> {
    let max_age = (expires_at - issued_at).num_seconds().max(0);

    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}; Expires={}",
        TOKEN_COOKIE_NAME,
        token,
        max_age,
        expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
    );

    Cookie::parse(cookie)
        .map_err(|e| ApiError::InternalServerError(format!("Failed to build token cookie: {}", e)))
}

/// HTTP request body for signing in (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Clone, Error)]
enum ParseSignInRequestError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordError),
}

impl SignInRequest {
    fn try_into_command(self) -> Result<AuthenticateCommand, ParseSignInRequestError> {
        let email = EmailAddress::new(self.email)?;
        Ok(AuthenticateCommand::new(email, self.password)?)
    }
}

impl From<ParseSignInRequestError> for ApiError {
    fn from(err: ParseSignInRequestError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignInResponseData {
    pub token: String,
}
