use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Which store backend the server runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow::anyhow!("Unknown STORE backend: {}", other)),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub store: StoreBackend,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Rows per list page when the request does not say
    pub paginate_count: u32,
    /// Upper bound on `per_page`
    pub max_page_size: u32,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let store: StoreBackend = env::var("STORE")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;
        let database_url = env::var("DATABASE_URL").ok();
        if store == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when STORE=postgres");
        }

        Ok(Self {
            database_url,
            store,
            port: parse_var("PORT", 8080).context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "circuits".to_string()),
            paginate_count: parse_var("PAGINATE_COUNT", 50)
                .context("PAGINATE_COUNT must be a valid number")?,
            max_page_size: parse_var("MAX_PAGE_SIZE", 1000)
                .context("MAX_PAGE_SIZE must be a valid number")?,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", 30)
                .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
        })
    }

    /// Configuration for tests and local tooling: memory store, fixed secret.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            store: StoreBackend::Memory,
            port: 0,
            jwt_secret: "test_secret_key_for_circuits".to_string(),
            jwt_issuer: "circuits".to_string(),
            paginate_count: 50,
            max_page_size: 1000,
            request_timeout_secs: 30,
        }
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => Ok(value.trim().parse()?),
        Err(_) => Ok(default),
    }
}
