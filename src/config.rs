use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SESSION_SECRET must be set in environment")]
    MissingSessionSecret,
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

/// Process configuration, loaded once at startup and passed explicitly into
/// the components that need it. Request handling never reads the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub session_secret: String,
    pub admin_password: Option<String>,
}

impl AppConfig {
    /// Reads configuration from the environment. An unset or empty
    /// `SESSION_SECRET` is a fatal error; there is no built-in fallback.
    /// An unset `ADMIN_PASSWORD` is tolerated, but admin login fails closed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        let port = port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port))?;
        let db_path = env::var("DB_PATH").unwrap_or_else(|_| "data/app.db".to_string());

        let session_secret = env::var("SESSION_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSessionSecret)?;

        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty());
        if admin_password.is_none() {
            log::warn!("ADMIN_PASSWORD not set; admin login will reject all attempts");
        }

        Ok(Self {
            host,
            port,
            db_path,
            session_secret,
            admin_password,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
