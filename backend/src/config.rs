//! Configuration management for the Stockline platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with STOCKLINE__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::TransitionPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Order lifecycle configuration
    pub orders: OrdersConfig,

    /// Notification feed configuration
    pub notifications: NotificationsConfig,

    /// First-run admin provisioning
    pub setup: SetupConfig,

    /// Object storage for product images
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,

    /// Directory of static pages served behind the route guard
    pub static_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrdersConfig {
    /// Reject backwards status moves and changes out of terminal states
    pub enforce_forward_only: bool,
}

impl OrdersConfig {
    pub fn policy(&self) -> TransitionPolicy {
        TransitionPolicy::from_enforce_flag(self.enforce_forward_only)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    /// Seconds between re-derivations on the notification stream
    pub poll_interval_secs: u64,

    /// Rows read per derivation
    pub limit: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SetupConfig {
    /// Email of the single admin account created by the setup endpoint
    pub admin_email: Option<String>,

    /// Password of the admin account
    pub admin_password: Option<String>,

    /// Display name of the admin account
    pub admin_full_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Object storage base URL
    pub base_url: Option<String>,

    /// Bucket that holds product images
    pub bucket: String,

    /// Service key used for uploads
    pub service_key: Option<String>,

    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKLINE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 604800)?
            .set_default("orders.enforce_forward_only", true)?
            .set_default("notifications.poll_interval_secs", 30)?
            .set_default("notifications.limit", 5)?
            .set_default("setup.admin_full_name", "Admin User")?
            .set_default("storage.bucket", "products")?
            .set_default("storage.max_upload_bytes", 5 * 1024 * 1024)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKLINE__ prefix)
            .add_source(
                Environment::with_prefix("STOCKLINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
