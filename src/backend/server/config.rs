/**
 * Server Configuration
 *
 * This module loads server settings from environment variables (optionally
 * populated from a `.env` file by `main`) and opens the optional
 * PostgreSQL connection.
 *
 * # Variables
 *
 * | Variable          | Default                  |
 * |-------------------|--------------------------|
 * | `SERVER_PORT`     | `5000`                   |
 * | `DATABASE_URL`    | unset, in-memory store   |
 * | `JWT_SECRET`      | development fallback     |
 * | `JWT_EXPIRE_SECS` | `604800` (7 days)        |
 * | `CORS_ORIGIN`     | `http://localhost:3000`  |
 * | `BCRYPT_COST`     | `bcrypt::DEFAULT_COST`   |
 * | `RATE_LIMIT_MAX`  | `100` requests           |
 * | `RATE_LIMIT_WINDOW_SECS` | `900` (15 minutes) |
 *
 * # Error Handling
 *
 * Unparseable values fall back to their defaults with a warning. A
 * database that cannot be reached is logged and the server continues on
 * the in-memory store.
 */

use sqlx::PgPool;

const DEV_JWT_SECRET: &str = "teamcollab-dev-secret-change-me";

/// Settings for one server process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expire_secs: u64,
    pub cors_origin: String,
    pub bcrypt_cost: u32,
    /// Requests one client IP may make to `/api` per window
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expire_secs: 7 * 24 * 60 * 60,
            cors_origin: "http://localhost:3000".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            rate_limit_max: 100,
            rate_limit_window_secs: 15 * 60,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using development secret");
                defaults.jwt_secret.clone()
            }
        };

        Self {
            port: parse_var("SERVER_PORT", defaults.port),
            database_url: std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret,
            jwt_expire_secs: parse_var("JWT_EXPIRE_SECS", defaults.jwt_expire_secs),
            cors_origin: std::env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost),
            rate_limit_max: parse_var("RATE_LIMIT_MAX", defaults.rate_limit_max),
            rate_limit_window_secs: parse_var(
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window_secs,
            ),
        }
    }
}

/// Load and initialize database connection pool
///
/// This function:
/// 1. Reads the database URL from the configuration
/// 2. Creates a PostgreSQL connection pool
/// 3. Runs database migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable and migrated
/// - `None` if no URL is configured, the connection fails or migrations fail
pub async fn load_database(config: &ServerConfig) -> Option<PgPool> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Using in-memory store.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to in-memory store.");
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(()) => {
            tracing::info!("Database migrations completed successfully");
            Some(pool)
        }
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Falling back to in-memory store.");
            None
        }
    }
}
