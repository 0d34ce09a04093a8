use std::str::FromStr;

use anyhow::{bail, Context};
use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

/// Optional admin identity created at startup when absent.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub password_pepper: String,
    pub cors_allow_origins: Vec<String>,
    pub host: String,
    pub port: u16,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env_or("DATABASE_URL", "sqlite://workout.db");

        let secret = first_env(&["JWT_SECRET", "SECRET_KEY"])
            .context("JWT_SECRET (or SECRET_KEY) must be set")?;
        let algorithm = parse_algorithm(
            &first_env(&["JWT_ALGORITHM", "ALGORITHM"]).unwrap_or_else(|| "HS256".into()),
        )?;

        let jwt = JwtConfig {
            algorithm,
            issuer: env_or("JWT_ISSUER", "workout-log"),
            audience: env_or("JWT_AUDIENCE", "workout-log-users"),
            access_ttl_minutes: parse_env(
                &["ACCESS_TOKEN_EXPIRE_MINUTES", "ACCESS_TOKEN_EXP_MINUTES"],
                15,
            )?,
            refresh_ttl_days: parse_env(&["REFRESH_TOKEN_EXPIRE_DAYS", "REFRESH_TOKEN_EXP_DAYS"], 7)?,
            secret: secret.clone(),
        };
        if jwt.access_ttl_minutes <= 0 || jwt.refresh_ttl_days <= 0 {
            bail!("token lifetimes must be positive");
        }

        let password_pepper = std::env::var("PASSWORD_PEPPER").unwrap_or(secret);

        let cors_allow_origins = env_or("CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt,
            password_pepper,
            cors_allow_origins,
            host: env_or("APP_HOST", "0.0.0.0"),
            port: parse_env(&["APP_PORT"], 8080)?,
            bootstrap_admin,
        })
    }
}

/// Only the HMAC family works with a shared secret.
pub fn parse_algorithm(name: &str) -> anyhow::Result<Algorithm> {
    let algorithm = Algorithm::from_str(&name.trim().to_uppercase())
        .with_context(|| format!("unknown JWT algorithm {name}"))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => bail!("JWT algorithm {other:?} needs a key pair; use HS256, HS384 or HS512"),
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|n| std::env::var(n).ok())
}

fn parse_env<T>(names: &[&str], default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match first_env(names) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid value for {}: {e}", names[0])),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hmac_algorithms_case_insensitively() {
        assert_eq!(parse_algorithm("hs256").unwrap(), Algorithm::HS256);
        assert_eq!(parse_algorithm("HS512").unwrap(), Algorithm::HS512);
    }

    #[test]
    fn rejects_asymmetric_and_unknown_algorithms() {
        assert!(parse_algorithm("RS256").is_err());
        assert!(parse_algorithm("none").is_err());
    }
}
