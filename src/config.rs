//! Environment-driven configuration: a `.env` file loaded via `dotenvy`,
//! then plain `env::var` reads with sane defaults.

use std::env;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/shazam";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
}

impl Config {
    /// Loads a `.env` file if present, then reads the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: env::var("SHAZAM_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        }
    }

    pub fn init_logging() {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_localhost_when_unset() {
        // SAFETY: test-only process-local env mutation, no other thread in
        // this crate's test binary touches these keys.
        unsafe {
            std::env::remove_var("DATABASE_URL");
            std::env::remove_var("SHAZAM_BIND_ADDR");
        }
        let cfg = Config::from_env();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
    }
}
