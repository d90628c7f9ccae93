use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub cors: CorsConfig,
}

/// Which persistence backend holds the issues
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Postgres(DatabaseConfig),
    /// Process-local store, contents are lost on restart
    Memory,
}

/// Database connection pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

/// Cross-origin configuration for browser clients
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Single allowed origin. `None` allows any origin.
    pub allowed_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            store: StoreConfig::from_env()?,
            cors: CorsConfig::from_env(),
        })
    }
}

impl StoreConfig {
    /// Selects the backend from `STORE_BACKEND`
    ///
    /// Defaults to PostgreSQL when `DATABASE_URL` is set and to the
    /// in-memory store otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = env::var("STORE_BACKEND").ok().filter(|v| !v.is_empty());
        let has_database_url = env::var("DATABASE_URL").is_ok();

        match backend.as_deref() {
            Some("postgres") => Ok(StoreConfig::Postgres(DatabaseConfig::from_env()?)),
            Some("memory") => Ok(StoreConfig::Memory),
            Some(other) => Err(ConfigError::InvalidStoreBackend(other.to_string())),
            None if has_database_url => Ok(StoreConfig::Postgres(DatabaseConfig::from_env()?)),
            None => Ok(StoreConfig::Memory),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StoreConfig::Postgres(_) => "postgres",
            StoreConfig::Memory => "memory",
        }
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        Ok(Self {
            url,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            acquire_timeout: Duration::from_secs(
                env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            ),
            idle_timeout: Duration::from_secs(
                env::var("DATABASE_IDLE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .unwrap_or(600),
            ),
            max_lifetime: Duration::from_secs(
                env::var("DATABASE_MAX_LIFETIME_SECS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse()
                    .unwrap_or(1800),
            ),
        })
    }
}

impl CorsConfig {
    pub fn from_env() -> Self {
        Self {
            allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    MissingDatabaseUrl,
    InvalidStoreBackend(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
            ConfigError::MissingDatabaseUrl => {
                write!(
                    f,
                    "DATABASE_URL environment variable is required for the postgres store"
                )
            }
            ConfigError::InvalidStoreBackend(value) => {
                write!(
                    f,
                    "STORE_BACKEND must be 'postgres' or 'memory', got '{}'",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
