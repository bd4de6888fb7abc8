//! Runtime configuration for the Latter server.

use std::env;
use std::time::Duration;

use crate::notify::SENDGRID_ENDPOINT;
use crate::session::TokenConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: String,
    /// Postgres connection string. In-memory storage when unset.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    /// Lifetime of a login session in days.
    pub session_expiration_days: i64,
    /// SendGrid API key. Mails are only logged when unset.
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_endpoint: String,
    pub mail_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let database_url = non_empty_var("DATABASE_URL");

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

        // Default to 365 days (1 year)
        let session_expiration_days = env::var("SESSION_EXPIRATION_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(365);

        let sendgrid_api_key = non_empty_var("SENDGRID_API_KEY");

        let sendgrid_endpoint =
            env::var("SENDGRID_ENDPOINT").unwrap_or_else(|_| SENDGRID_ENDPOINT.to_string());

        let mail_timeout = env::var("MAIL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        AppConfig {
            bind_addr,
            database_url,
            database_max_connections,
            jwt_secret,
            session_expiration_days,
            sendgrid_api_key,
            sendgrid_endpoint,
            mail_timeout,
        }
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::with_secret(&self.jwt_secret, self.session_expiration_days)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
