use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Fixed fallback session secret. Only acceptable outside production; a
/// production deployment must set SESSION_SECRET explicitly.
pub const DEV_SESSION_SECRET: &str = "encore-dev-session-secret-do-not-deploy";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub database: DatabaseConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "development" or "production"; gates the weak-secret fallback.
    pub environment: String,

    /// Number of tokio worker threads. 0 uses the number of CPU cores.
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            environment: "development".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sea-orm connection URL; sqlite or postgres.
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/encore.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    /// Whether to set the Secure flag on session cookies. Disable only for
    /// local development without HTTPS.
    pub secure_cookies: bool,

    /// Session inactivity expiry in minutes.
    pub session_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            secure_cookies: false,
            session_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Secret used to sign session cookies. Falls back to a fixed
    /// development value when unset; required in production.
    pub session_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Root directory for uploaded files and the default avatar catalog.
    pub root: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            root: "uploads".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            uploads: UploadConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("config.toml"),
            PathBuf::from("/etc/encore/config.toml"),
        ]
    }

    /// Process configuration wins over the file for deploy-time values.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL")
            && !url.is_empty()
        {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("SESSION_SECRET")
            && !secret.is_empty()
        {
            self.security.session_secret = Some(secret);
        }
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
        if let Ok(env) = std::env::var("ENCORE_ENV")
            && !env.is_empty()
        {
            self.general.environment = env;
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.general.environment.eq_ignore_ascii_case("production")
    }

    /// The session signing secret, falling back to the documented weak
    /// development default.
    #[must_use]
    pub fn session_secret(&self) -> &str {
        self.security
            .session_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEV_SESSION_SECRET)
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_production()
            && self
                .security
                .session_secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .is_none()
        {
            anyhow::bail!("SESSION_SECRET must be set when running in production");
        }
        if self.server.port == 0 {
            anyhow::bail!("server.port must be non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_outside_production() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session_secret(), DEV_SESSION_SECRET);
    }

    #[test]
    fn production_without_secret_is_rejected() {
        let mut config = Config::default();
        config.general.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.security.session_secret = Some("a-real-secret".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.session_secret(), "a-real-secret");
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [database]
            url = "sqlite::memory:"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.general.log_level, "info");
    }
}
