//! Runtime configuration: an environment preset selected by `APP_ENV`,
//! then individual overrides from the process environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Unknown or missing names fall back to development.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL for the catalog and account stores.
    pub url: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection.
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Replace `slot` with the parsed value of `var`; unparsable values are ignored.
fn parsed_var<T: FromStr>(var: &str, slot: &mut T) {
    if let Some(value) = env::var(var).ok().and_then(|v| v.trim().parse().ok()) {
        *slot = value;
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = Environment::from_name(env::var("APP_ENV").ok().as_deref());
        Self::preset(environment).with_env_overrides()
    }

    /// Defaults for `environment` before any variable is applied.
    pub fn preset(environment: Environment) -> Self {
        let mut config = Self::development();
        config.environment = environment;

        match environment {
            Environment::Development => {}
            Environment::Staging => {
                config.database.connection_timeout = 10;
                config.api.max_request_size_bytes = 512 * 1024;
                config.security.cors_origins = vec!["https://staging.example.com".to_string()];
                config.security.jwt_secret.clear();
            }
            Environment::Production => {
                config.database.connection_timeout = 5;
                config.database.enable_query_logging = false;
                config.api.enable_request_logging = false;
                config.api.max_request_size_bytes = 256 * 1024;
                config.security.cors_origins = vec!["https://app.example.com".to_string()];
                // must come from SECURITY_JWT_SECRET
                config.security.jwt_secret.clear();
                config.security.jwt_expiry_hours = 4;
            }
        }
        config
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-only-secret".to_string(),
                jwt_expiry_hours: 24,
            },
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("DATABASE_URL") {
            self.database.url = Some(url).filter(|s| !s.trim().is_empty());
        }
        parsed_var("DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        parsed_var("DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout);
        parsed_var("DATABASE_ENABLE_QUERY_LOGGING", &mut self.database.enable_query_logging);

        parsed_var("PORT", &mut self.api.port);
        parsed_var("API_PORT", &mut self.api.port);
        parsed_var("API_ENABLE_REQUEST_LOGGING", &mut self.api.enable_request_logging);
        parsed_var("API_MAX_REQUEST_SIZE_BYTES", &mut self.api.max_request_size_bytes);

        parsed_var("SECURITY_ENABLE_CORS", &mut self.security.enable_cors);
        if let Ok(origins) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Ok(secret) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        parsed_var("SECURITY_JWT_EXPIRY_HOURS", &mut self.security.jwt_expiry_hours);

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_names() {
        assert_eq!(Environment::from_name(Some("prod")), Environment::Production);
        assert_eq!(Environment::from_name(Some("stage")), Environment::Staging);
        assert_eq!(Environment::from_name(Some("qa")), Environment::Development);
        assert_eq!(Environment::from_name(None), Environment::Development);
    }

    #[test]
    fn development_preset_can_sign_tokens() {
        let config = AppConfig::development();
        assert_eq!(config.api.port, 3000);
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn production_preset_needs_a_secret() {
        let config = AppConfig::preset(Environment::Production);
        assert_eq!(config.environment, Environment::Production);
        assert!(config.security.jwt_secret.is_empty());
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.security.jwt_expiry_hours, 4);
    }

    #[test]
    fn secret_is_not_serialized() {
        let v = serde_json::to_value(AppConfig::development()).unwrap();
        assert!(v["security"].get("jwt_secret").is_none());
    }
}
