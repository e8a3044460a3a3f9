use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use crate::domain::user::models::User;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::sign_in::TOKEN_COOKIE_NAME;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Extension type carrying the user resolved from the request's token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

/// Middleware guarding protected routes.
///
/// Reads the `token` cookie, verifies it, and resolves its subject against the
/// store on every request. Every rejection produces the same 401 response.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = jar
        .get(TOKEN_COOKIE_NAME)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            tracing::debug!("Missing token cookie");
            ApiError::from(UserError::Unauthorized).into_response()
        })?;

    let user = state
        .user_service
        .resolve_token(token)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    req.extensions_mut().insert(AuthenticatedUser { user });

    Ok(next.run(req).await)
}
