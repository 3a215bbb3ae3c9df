/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 5000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` mirrors the request origin (default: *)
/// - `APP_ENV`: `production` enables `Secure` cookies (default: development)
/// - `DATABASE_URL`: SQLite connection string (default: sqlite://dqwatch.db?mode=rwc)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for access token signing (required, >= 32 chars)
/// - `ACCESS_TOKEN_TTL_MINUTES`: Access token lifetime (default: 15)
/// - `REFRESH_TOKEN_TTL_DAYS`: Refresh token lifetime (default: 7)
/// - `FIREBASE_PROJECT_ID`: Enables Google sign-in when set
/// - `FIREBASE_JWKS_URL`: Provider key set (default: Google securetoken keys)
/// - `SEED_DATA`: Seed empty tables at startup (default: true)
/// - `RUST_LOG` / `LOG_FORMAT`: Log filter and `json` output (read in `main`)
///
/// # Example
///
/// ```no_run
/// use dqwatch_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;

use dqwatch_shared::auth::federated::FIREBASE_JWKS_URL;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token configuration
    pub jwt: JwtConfig,

    /// Federated sign-in configuration
    pub firebase: FirebaseConfig,

    /// Seed empty tables at startup
    pub seed_data: bool,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,

    /// Running in production (HTTPS only cookies)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Token configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for access token signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .finish()
    }
}

impl JwtConfig {
    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_ttl_minutes)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_ttl_days)
    }
}

/// Federated sign-in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    /// Firebase project id; `None` disables Google sign-in
    pub project_id: Option<String>,

    /// Provider key set URL
    pub jwks_url: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - A numeric or boolean variable has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let api_host = get("API_HOST", "0.0.0.0");
        let api_port = get("API_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let cors_origins = parse_origins(&get("CORS_ORIGINS", "*"));
        let production = get("APP_ENV", "development").eq_ignore_ascii_case("production");

        let database_url = get("DATABASE_URL", "sqlite://dqwatch.db?mode=rwc");
        let max_connections = get("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let jwt_secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let access_ttl_minutes = get("ACCESS_TOKEN_TTL_MINUTES", "15")
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("ACCESS_TOKEN_TTL_MINUTES is invalid: {}", e))?;
        let refresh_ttl_days = get("REFRESH_TOKEN_TTL_DAYS", "7")
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("REFRESH_TOKEN_TTL_DAYS is invalid: {}", e))?;

        if access_ttl_minutes <= 0 || refresh_ttl_days <= 0 {
            anyhow::bail!("Token lifetimes must be positive");
        }

        let project_id = var("FIREBASE_PROJECT_ID").filter(|p| !p.trim().is_empty());
        let jwks_url = get("FIREBASE_JWKS_URL", FIREBASE_JWKS_URL);

        let seed_data = parse_bool(&get("SEED_DATA", "true"))
            .ok_or_else(|| anyhow::anyhow!("SEED_DATA must be true or false"))?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_ttl_minutes,
                refresh_ttl_days,
            },
            firebase: FirebaseConfig {
                project_id,
                jwks_url,
            },
            seed_data,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
