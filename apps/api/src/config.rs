use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// Application configuration loaded from environment variables.
/// Startup fails if the signing secret is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub port: u16,
    pub uploads_dir: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // JST_SECRET is the spelling some hosting dashboards end up with.
        let jwt_secret = match lookup("JWT_SECRET").or_else(|| lookup("JST_SECRET")) {
            Some(secret) if !secret.is_empty() => secret,
            Some(_) => bail!("JWT_SECRET is set but empty"),
            None => bail!("Required environment variable 'JWT_SECRET' is not set"),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            jwt_secret,
            port,
            uploads_dir: lookup("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR)),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.port, 3000);
        assert_eq!(config.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_missing_secret_fails() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "8080")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_empty_secret_fails() {
        assert!(Config::from_lookup(lookup_from(&[("JWT_SECRET", "")])).is_err());
    }

    #[test]
    fn test_alias_secret_accepted() {
        let config = Config::from_lookup(lookup_from(&[("JST_SECRET", "alias")])).unwrap();
        assert_eq!(config.jwt_secret, "alias");
    }

    #[test]
    fn test_primary_secret_wins_over_alias() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "primary"),
            ("JST_SECRET", "alias"),
        ]))
        .unwrap();
        assert_eq!(config.jwt_secret, "primary");
    }

    #[test]
    fn test_invalid_port_fails() {
        let result = Config::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("PORT", "http")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "x"),
            ("PORT", "8081"),
            ("UPLOADS_DIR", "/tmp/letters"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.uploads_dir, PathBuf::from("/tmp/letters"));
        assert_eq!(config.rust_log, "debug");
    }
}
