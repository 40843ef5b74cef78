use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{PublicUser, TokenResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::User,
    },
    error::AppError,
    state::AppState,
};

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Registers a new account. The email check and the insert are separate
/// statements; the schema's unique index settles concurrent duplicates.
pub async fn signup(state: &AppState, email: &str, password: &str) -> Result<User, AppError> {
    let email = email.trim();

    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if User::find_by_email(&state.db, email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(password)?;
    let user = User::create(&state.db, email, &hash).await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Checks credentials and issues an access token.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<TokenResponse, AppError> {
    let email = email.trim();

    let Some(user) = User::find_by_email(&state.db, email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::Unauthorized("Invalid credentials"));
    };

    if !verify_password(password, &user.password_hash) {
        warn!(email = %email, user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(state);
    let access_token = keys.issue(user.id)?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: keys.expires_in(),
    })
}
