//! Process configuration, read from the environment.

use std::net::SocketAddr;

use anyhow::{Context, bail};

pub const MIN_AUTH_SECRET_LEN: usize = 32;

const DEV_AUTH_SECRET: &str = "ironstart-insecure-development-secret-change-me";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Public base URL, used for OpenAPI `servers` and cookie flags.
    pub app_url: String,
    pub auth_secret: String,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub password_hash_iterations: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:3000")?;

        let app_url = get("APP_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        if !(app_url.starts_with("http://") || app_url.starts_with("https://")) {
            bail!("APP_URL must be an http(s) URL, got {app_url:?}");
        }

        let auth_secret = match get("AUTH_SECRET") {
            Some(s) if s.len() < MIN_AUTH_SECRET_LEN => {
                bail!("AUTH_SECRET must be at least {MIN_AUTH_SECRET_LEN} characters")
            }
            Some(s) => s,
            None => {
                tracing::warn!("AUTH_SECRET not set; using insecure dev default");
                DEV_AUTH_SECRET.to_string()
            }
        };

        let use_persistent_stores = match get("USE_PERSISTENT_STORES") {
            Some(v) => v
                .trim()
                .parse::<bool>()
                .with_context(|| format!("USE_PERSISTENT_STORES must be true/false, got {v:?}"))?,
            None => false,
        };

        let database_url = get("DATABASE_URL");
        if use_persistent_stores && database_url.is_none() {
            bail!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        }

        let password_hash_iterations = match get("PASSWORD_HASH_ITERATIONS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .with_context(|| format!("PASSWORD_HASH_ITERATIONS must be a number, got {v:?}"))?,
            None => 100_000,
        };

        Ok(Self {
            bind_addr,
            app_url,
            auth_secret,
            use_persistent_stores,
            database_url,
            password_hash_iterations,
        })
    }

    /// Secure cookies only make sense when the app is served over TLS.
    pub fn secure_cookies(&self) -> bool {
        self.app_url.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 3000);
        assert_eq!(cfg.app_url, "http://localhost:3000");
        assert!(cfg.auth_secret.len() >= MIN_AUTH_SECRET_LEN);
        assert!(!cfg.use_persistent_stores);
        assert!(!cfg.secure_cookies());
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(config(&[("AUTH_SECRET", "too-short")]).is_err());
    }

    #[test]
    fn persistent_stores_require_a_database_url() {
        assert!(config(&[("USE_PERSISTENT_STORES", "true")]).is_err());
        let cfg = config(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/app"),
        ])
        .unwrap();
        assert!(cfg.use_persistent_stores);
    }

    #[test]
    fn app_url_is_normalized_and_checked() {
        let cfg = config(&[("APP_URL", "https://example.com/")]).unwrap();
        assert_eq!(cfg.app_url, "https://example.com");
        assert!(cfg.secure_cookies());
        assert!(config(&[("APP_URL", "example.com")]).is_err());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let cfg = config(&[("BIND_ADDR", ""), ("USE_PERSISTENT_STORES", " ")]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 3000);
        assert!(!cfg.use_persistent_stores);
    }
}
