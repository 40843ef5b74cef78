use std::str::FromStr;

use anyhow::Context;
use jsonwebtoken::Algorithm;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
    pub leeway_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// When false, transaction routes are served without a bearer token.
    pub auth_required: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://expense.db".into());

        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(raw) => Algorithm::from_str(raw.trim())
                .with_context(|| format!("unknown JWT_ALGORITHM {raw}"))?,
            None => Algorithm::HS256,
        };
        anyhow::ensure!(
            matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512),
            "JWT_ALGORITHM must be an HMAC algorithm (HS256, HS384 or HS512)"
        );

        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
            algorithm,
            ttl_minutes: lookup("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(60),
            leeway_seconds: lookup("JWT_LEEWAY_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(120),
        };

        let auth_required = lookup("AUTH_REQUIRED")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off"))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            jwt,
            auth_required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = load(&[("JWT_SECRET", "s3cret")]).expect("config");
        assert_eq!(cfg.database_url, "sqlite://expense.db");
        assert_eq!(cfg.jwt.algorithm, Algorithm::HS256);
        assert_eq!(cfg.jwt.ttl_minutes, 60);
        assert_eq!(cfg.jwt.leeway_seconds, 120);
        assert!(cfg.auth_required);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = load(&[
            ("JWT_SECRET", "x"),
            ("JWT_ALGORITHM", "HS512"),
            ("JWT_TTL_MINUTES", "15"),
            ("JWT_LEEWAY_SECONDS", "5"),
            ("AUTH_REQUIRED", "false"),
            ("DATABASE_URL", "sqlite::memory:"),
        ])
        .expect("config");
        assert_eq!(cfg.jwt.algorithm, Algorithm::HS512);
        assert_eq!(cfg.jwt.ttl_minutes, 15);
        assert_eq!(cfg.jwt.leeway_seconds, 5);
        assert!(!cfg.auth_required);
        assert_eq!(cfg.database_url, "sqlite::memory:");
    }

    #[test]
    fn garbage_ttl_falls_back_to_default() {
        let cfg = load(&[("JWT_SECRET", "x"), ("JWT_TTL_MINUTES", "soon")]).expect("config");
        assert_eq!(cfg.jwt.ttl_minutes, 60);
    }

    #[test]
    fn asymmetric_algorithm_is_rejected() {
        let err = load(&[("JWT_SECRET", "x"), ("JWT_ALGORITHM", "RS256")]).unwrap_err();
        assert!(err.to_string().contains("HMAC"));
    }
}
