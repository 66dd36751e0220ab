use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Shortest signing secret accepted for HS256.
const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted access token lifetime (one year).
const MAX_EXPIRATION_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_minutes: i64,
}

/// Argon2id cost parameters used for new password hashes.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: auth::PasswordHasher::DEFAULT_MEMORY_KIB,
            iterations: auth::PasswordHasher::DEFAULT_ITERATIONS,
            parallelism: auth::PasswordHasher::DEFAULT_PARALLELISM,
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Lifetime of issued access tokens. Call after `validate`.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.jwt.expiration_minutes)
    }

    /// Reject settings the service cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }

        if self.jwt.expiration_minutes <= 0 {
            return Err(ConfigError::Message(
                "jwt.expiration_minutes must be positive".to_string(),
            ));
        }

        if self.jwt.expiration_minutes > MAX_EXPIRATION_MINUTES {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_minutes must be at most {}",
                MAX_EXPIRATION_MINUTES
            )));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database.max_connections must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
