use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

/// Signing and verification keys plus the token policy from config.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub algorithm: Algorithm,
    pub ttl: Duration,
    pub leeway_seconds: u64,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
            leeway_seconds: cfg.leeway_seconds,
        }
    }

    pub fn expires_in(&self) -> u64 {
        self.ttl.as_secs()
    }

    pub fn issue(&self, user_id: i64) -> anyhow::Result<String> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    fn issue_at(&self, user_id: i64, now: OffsetDateTime) -> anyhow::Result<String> {
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Checks signature, algorithm and expiry, and returns the user id
    /// carried in `sub`.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway_seconds;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Invalid)?;
        debug!(user_id, "jwt verified");
        Ok(user_id)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 60,
            leeway_seconds: 120,
        })
    }

    #[test]
    fn issued_token_verifies_within_ttl() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(7).expect("sign");
        assert_eq!(keys.verify(&token), Ok(7));
        assert_eq!(keys.expires_in(), 3600);
    }

    #[test]
    fn token_is_rejected_after_ttl() {
        let keys = make_keys("dev-secret");
        let long_ago = OffsetDateTime::now_utc() - TimeDuration::minutes(60) - TimeDuration::seconds(300);
        let token = keys.issue_at(7, long_ago).expect("sign");
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn leeway_tolerates_small_clock_skew() {
        let keys = make_keys("dev-secret");
        let just_expired = OffsetDateTime::now_utc() - TimeDuration::minutes(60) - TimeDuration::seconds(30);
        let token = keys.issue_at(7, just_expired).expect("sign");
        assert_eq!(keys.verify(&token), Ok(7));
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let token = make_keys("secret-a").issue(1).expect("sign");
        assert_eq!(make_keys("secret-b").verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(make_keys("s").verify("not.a.jwt"), Err(TokenError::Invalid));
        assert_eq!(make_keys("s").verify(""), Err(TokenError::Invalid));
    }

    #[test]
    fn non_numeric_subject_is_invalid() {
        let keys = make_keys("s");
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: "alice".into(),
            iat: now.unix_timestamp() as usize,
            exp: (now + TimeDuration::minutes(5)).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert_eq!(keys.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn algorithm_mismatch_is_invalid() {
        let hs512 = JwtKeys::new(&JwtConfig {
            secret: "s".into(),
            algorithm: Algorithm::HS512,
            ttl_minutes: 60,
            leeway_seconds: 0,
        });
        let token = hs512.issue(3).expect("sign");
        assert_eq!(make_keys("s").verify(&token), Err(TokenError::Invalid));
    }
}
