//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::{RoomId, RoomRole, UserId};

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Persistence backend selection
    pub storage: StorageSettings,

    /// Session token settings
    pub jwt: JwtSettings,

    /// Argon2 password hashing parameters
    pub password: PasswordSettings,

    /// Message admission and paging limits
    pub messages: MessageSettings,

    /// Snowflake ID generator settings
    pub snowflake: SnowflakeSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Rooms created at startup by the memory backend
    #[serde(default)]
    pub rooms: Vec<RoomSeed>,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// Which store implementations back the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local stores; state is lost on restart
    #[default]
    Memory,
    /// PostgreSQL via sqlx
    Postgres,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,

    /// Only read when `backend = "postgres"`
    pub database: DatabaseSettings,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply `migrations/` on startup
    pub run_migrations: bool,
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Token lifetime in minutes
    pub access_token_ttl_minutes: i64,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordSettings {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordSettings {
    /// OWASP-recommended Argon2id baseline (19 MiB, 2 passes, 1 lane).
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Message limits.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageSettings {
    /// Maximum content length in characters (inclusive)
    pub max_content_length: usize,

    /// Page size when the caller gives none
    pub default_page_size: u32,

    /// Upper bound on any requested page size
    pub max_page_size: u32,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            max_content_length: 2000,
            default_page_size: 50,
            max_page_size: 100,
        }
    }
}

/// Snowflake ID generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeSettings {
    /// Machine/worker ID (0-1023)
    pub machine_id: u16,

    /// Custom epoch timestamp in milliseconds
    pub epoch: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// A room to create in the in-memory directory at startup.
///
/// The postgres backend reads rooms from the database and ignores these.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomSeed {
    pub id: RoomId,

    pub name: String,

    /// Admit every registered user as a member
    #[serde(default)]
    pub open: bool,

    #[serde(default)]
    pub members: Vec<RoomMemberSeed>,
}

/// An explicit room membership.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomMemberSeed {
    pub user_id: UserId,

    #[serde(default)]
    pub role: RoomRole,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if the resulting settings fail [`Settings::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let password = PasswordSettings::default();
        let messages = MessageSettings::default();

        let settings: Self = Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("storage.backend", "memory")?
            .set_default("storage.database.url", "")?
            .set_default("storage.database.max_connections", 10)?
            .set_default("storage.database.min_connections", 2)?
            .set_default("storage.database.acquire_timeout", 30)?
            .set_default("storage.database.run_migrations", true)?
            .set_default("jwt.access_token_ttl_minutes", 60)?
            .set_default("password.memory_kib", password.memory_kib as i64)?
            .set_default("password.iterations", password.iterations as i64)?
            .set_default("password.parallelism", password.parallelism as i64)?
            .set_default("messages.max_content_length", messages.max_content_length as i64)?
            .set_default("messages.default_page_size", messages.default_page_size as i64)?
            .set_default("messages.max_page_size", messages.max_page_size as i64)?
            .set_default("snowflake.machine_id", 1)?
            .set_default("snowflake.epoch", 1420070400000_u64)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("storage.backend", std::env::var("STORAGE_BACKEND").ok())?
            .set_override_option("storage.database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option(
                "snowflake.machine_id",
                std::env::var("SNOWFLAKE_MACHINE_ID").ok(),
            )?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints the deserializer cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters for security. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                self.jwt.secret.len()
            )));
        }

        if self.jwt.access_token_ttl_minutes <= 0 {
            return Err(ConfigError::Message(
                "jwt.access_token_ttl_minutes must be positive".into(),
            ));
        }

        if self.storage.backend == StorageBackend::Postgres && self.storage.database.url.is_empty() {
            return Err(ConfigError::Message(
                "storage.database.url (or DATABASE_URL) is required for the postgres backend".into(),
            ));
        }

        if self.storage.backend == StorageBackend::Memory && self.rooms.is_empty() {
            return Err(ConfigError::Message(
                "the memory backend needs at least one [[rooms]] entry".into(),
            ));
        }

        if self.messages.max_content_length == 0
            || self.messages.default_page_size == 0
            || self.messages.default_page_size > self.messages.max_page_size
        {
            return Err(ConfigError::Message(
                "messages limits must be positive and default_page_size <= max_page_size".into(),
            ));
        }

        Ok(())
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
