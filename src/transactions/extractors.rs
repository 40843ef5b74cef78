use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::repo_types::Scope;
use crate::auth::extractors::AuthUser;

/// Per-user scope when the auth layer resolved a caller, otherwise global.
#[async_trait]
impl<S> FromRequestParts<S> for Scope
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match parts.extensions.get::<AuthUser>() {
            Some(AuthUser(user)) => Scope::User(user.id),
            None => Scope::Global,
        })
    }
}
