//! Application configuration
//!
//! Configuration is loaded with the `config` crate from built-in defaults,
//! optional files under `config/`, and `FLEET__`-prefixed environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub rental: RentalConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_timeout() -> u64 {
    30
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Apply pending migrations on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_run_migrations() -> bool {
    true
}

/// Booking lifecycle settings
#[derive(Debug, Deserialize, Clone)]
pub struct RentalConfig {
    /// Prefix of every confirmation code
    #[serde(default = "default_confirmation_prefix")]
    pub confirmation_prefix: String,

    /// Number of random characters after the prefix
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Attempts before giving up on a colliding confirmation code
    #[serde(default = "default_max_code_attempts")]
    pub max_code_attempts: u32,

    /// Dispatch the invoice email after a return
    #[serde(default = "default_send_invoice_emails")]
    pub send_invoice_emails: bool,

    /// Currency label printed on invoices
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_confirmation_prefix() -> String {
    "BOK-".to_string()
}

fn default_code_length() -> usize {
    8
}

fn default_max_code_attempts() -> u32 {
    5
}

fn default_send_invoice_emails() -> bool {
    true
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for RentalConfig {
    fn default() -> Self {
        Self {
            confirmation_prefix: default_confirmation_prefix(),
            code_length: default_code_length(),
            max_code_attempts: default_max_code_attempts(),
            send_invoice_emails: default_send_invoice_emails(),
            currency: default_currency(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    /// Allowed origins; empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("server.timeout_secs", 30)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.run_migrations", true)?
            .set_default("rental.confirmation_prefix", "BOK-")?
            .set_default("rental.code_length", 8)?
            .set_default("rental.max_code_attempts", 5)?
            .set_default("rental.send_invoice_emails", true)?
            .set_default("rental.currency", "INR")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with FLEET_ prefix
            .add_source(
                Environment::with_prefix("FLEET")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("FLEET").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rental_config() {
        let config = RentalConfig::default();
        assert_eq!(config.confirmation_prefix, "BOK-");
        assert_eq!(config.code_length, 8);
        assert_eq!(config.max_code_attempts, 5);
        assert!(config.send_invoice_emails);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: AppConfig = Config::builder()
            .set_default("server.port", 9090)
            .unwrap()
            .set_default("database.url", "postgres://localhost/fleet")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server_addr(), "0.0.0.0:9090");
        assert!(config.database.run_migrations);
        assert_eq!(config.rental.currency, "INR");
        assert!(config.cors.allowed_origins.is_empty());
    }
}
