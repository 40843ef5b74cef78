use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::{jwt::JwtKeys, repo_types::User};
use crate::{error::AppError, state::AppState};

/// The caller resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Bearer token → verified claims → existing user.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    // Read Authorization header
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized("missing Authorization header"))?;

    // Expect "Bearer <token>"
    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .ok_or(AppError::Unauthorized("invalid auth scheme"))?;

    let keys = JwtKeys::from_ref(state);
    let user_id = keys.verify(token.trim()).map_err(|e| {
        warn!(error = %e, "rejected bearer token");
        AppError::Unauthorized("invalid or expired token")
    })?;

    // Tokens are stateless, so the user may be gone by now.
    User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        warn!(user_id, "token subject not found");
        AppError::Unauthorized("user not found")
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        authenticate(state, &parts.headers).await.map(AuthUser)
    }
}

/// Route layer that rejects unauthenticated requests and leaves the
/// resolved [`AuthUser`] in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, req.headers()).await?;
    req.extensions_mut().insert(AuthUser(user));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = AppState::for_tests(true).await;
        let err = authenticate(&state, &HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized("missing Authorization header")));
    }

    #[tokio::test]
    async fn wrong_scheme_is_unauthorized() {
        let state = AppState::for_tests(true).await;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        let err = authenticate(&state, &headers).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized("invalid auth scheme")));
    }

    #[tokio::test]
    async fn bad_token_is_unauthorized() {
        let state = AppState::for_tests(true).await;
        let err = authenticate(&state, &bearer("garbage")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized("invalid or expired token")));
    }

    #[tokio::test]
    async fn token_for_missing_user_is_unauthorized() {
        let state = AppState::for_tests(true).await;
        let token = JwtKeys::from_ref(&state).issue(999).unwrap();
        let err = authenticate(&state, &bearer(&token)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized("user not found")));
    }

    #[tokio::test]
    async fn valid_token_resolves_the_user() {
        let state = AppState::for_tests(true).await;
        let user = User::create(&state.db, "eve@example.com", "hash").await.unwrap();
        let token = JwtKeys::from_ref(&state).issue(user.id).unwrap();
        let resolved = authenticate(&state, &bearer(&token)).await.unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.email, "eve@example.com");
    }
}
