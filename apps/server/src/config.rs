use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub rate_limit: RateLimitConfig,
    pub proposals: ProposalConfig,
    pub security: SecurityConfig,
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

/// Security configuration for production deployments
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// True if server is behind a proxy that terminates SSL (nginx, Cloudflare, etc.)
    /// When true: cookie_secure=true is enabled
    pub ssl_proxy: bool,
    /// Session encryption key (64 hex chars). Required when ssl_proxy=true
    pub session_secret_key: Option<String>,
    /// Browser origins allowed to make credentialed requests. Empty means
    /// any origin, without cookies.
    pub allowed_origins: Vec<String>,
}

/// Per-user rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Max pins a single user may drop within one window
    pub max_pins_per_window: i32,
    /// Length of the pin creation window
    pub pin_window: Duration,
}

/// Gathering proposal configuration
#[derive(Debug, Clone)]
pub struct ProposalConfig {
    /// Distinct commitments needed before a proposal is confirmed
    pub quorum: i64,
}

pub const DEFAULT_MAX_PINS_PER_WINDOW: i32 = 10;
pub const DEFAULT_PIN_WINDOW_MINUTES: u64 = 60;
pub const DEFAULT_QUORUM: i64 = 4;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            database: DatabaseConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env(),
            proposals: ProposalConfig::from_env(),
            security: SecurityConfig::from_env()?,
        })
    }
}

impl RateLimitConfig {
    /// Load rate limit configuration from environment variables.
    /// Non-numeric or non-positive values fall back to the defaults.
    pub fn from_env() -> Self {
        let max_pins_per_window = env::var("MAX_PINS_PER_WINDOW")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_PINS_PER_WINDOW);

        let window_minutes = env::var("PIN_WINDOW_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_PIN_WINDOW_MINUTES);

        Self {
            max_pins_per_window,
            pin_window: Duration::from_secs(window_minutes * 60),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_pins_per_window: DEFAULT_MAX_PINS_PER_WINDOW,
            pin_window: Duration::from_secs(DEFAULT_PIN_WINDOW_MINUTES * 60),
        }
    }
}

impl ProposalConfig {
    /// Load proposal configuration from environment variables
    pub fn from_env() -> Self {
        let quorum = env::var("PROPOSAL_QUORUM")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_QUORUM);

        Self { quorum }
    }
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            quorum: DEFAULT_QUORUM,
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

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a valid number")]
    InvalidPort,
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,
    #[error("SESSION_SECRET_KEY is required when SSL_PROXY is enabled")]
    MissingSessionSecret,
}

impl SecurityConfig {
    /// Load security configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_secret_key = env::var("SESSION_SECRET_KEY").ok();

        let ssl_proxy = env::var("SSL_PROXY")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        // When SSL_PROXY is enabled, SESSION_SECRET_KEY is required
        if ssl_proxy && session_secret_key.is_none() {
            return Err(ConfigError::MissingSessionSecret);
        }

        let allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        Ok(Self {
            ssl_proxy,
            session_secret_key,
            allowed_origins,
        })
    }
}

/// Splits a comma-separated origin list, dropping blanks and trailing slashes
pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
